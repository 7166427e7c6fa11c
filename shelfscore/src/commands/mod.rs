// shelfscore/src/commands/mod.rs

pub mod data_quality;
pub mod pricing;
pub mod promos;
pub mod run_all;
pub mod util;
