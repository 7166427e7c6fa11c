// shelfscore-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- LAYERED MODULES ---

// 1. Domain (pure computation)
// Scorers, statistics, the canonical transaction schema.
// Depends on nothing else (no infra, no app).
pub mod domain;

// 2. Infrastructure (adapters)
// CSV ingestion/normalization, output writing, config files.
// Depends on the Domain.
pub mod infrastructure;

// 3. Application (use cases)
// Stage orchestration, timing instrumentation, run results.
// Depends on the Domain and the Infrastructure.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// Lets callers import the main error easily: use shelfscore_core::ShelfscoreError;
pub use error::ShelfscoreError;
