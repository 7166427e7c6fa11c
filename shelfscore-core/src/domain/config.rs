// shelfscore-core/src/domain/config.rs
//
// Threshold surface consumed by the scorers. Values only: where they come
// from (file, env, CLI flags) is the infrastructure's business.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ScoringConfig {
    /// A realised unit price further than this factor from RRP (either way)
    /// is flagged as extreme.
    #[validate(range(min = 1.0))]
    pub extreme_price_factor: f64,

    /// A day is promotional when the realised price is at or below
    /// `(1 - threshold) * RRP`.
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub promo_discount_threshold: f64,

    /// Minimum promo days before a (store, item) pair counts as on promotion.
    #[validate(range(min = 1))]
    pub promo_min_days: u32,

    /// Case-insensitive substring matched against supplier names to split
    /// the target supplier from its peers.
    #[validate(length(min = 1))]
    pub target_supplier: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            extreme_price_factor: 10.0,
            promo_discount_threshold: 0.10,
            promo_min_days: 2,
            target_supplier: "bidco".to_string(),
        }
    }
}

impl ScoringConfig {
    /// Fail-fast threshold validation, mapped into the domain error space.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))
    }
}
