// shelfscore-core/src/domain/mod.rs

pub mod config;
pub mod error;
pub mod health;
pub mod pricing;
pub mod promo;
pub mod stats;
pub mod transaction;

// Convenience re-exports to simplify imports elsewhere
pub use config::ScoringConfig;
pub use error::DomainError;
pub use transaction::Transaction;
