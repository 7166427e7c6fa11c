// shelfscore-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Schema Error: required column(s) missing from input: {0}")]
    #[diagnostic(
        code(shelfscore::domain::schema),
        help("Check the input header row; see the canonical column aliases in the README.")
    )]
    SchemaError(String),

    #[error("Invalid scoring configuration: {0}")]
    #[diagnostic(
        code(shelfscore::domain::config),
        help("Thresholds must be in range (e.g. 0 < promo_discount_threshold < 1).")
    )]
    InvalidConfig(String),
}
