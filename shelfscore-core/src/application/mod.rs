// shelfscore-core/src/application/mod.rs

pub mod pipeline;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI do:
// `use shelfscore_core::application::{run_all, run_data_quality, ...};`
// without knowing the internal file structure.

pub use pipeline::{RunResult, run_all, run_data_quality, run_pricing, run_promos};
