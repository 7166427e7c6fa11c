// shelfscore-core/src/infrastructure/mod.rs

pub mod config;
pub mod error;
pub mod loader;
pub mod writer;

pub use error::InfrastructureError;
