// shelfscore/src/commands/run_all.rs
//
// USE CASE: Run all three KPI stages over the same input table.

use std::sync::Arc;

use shelfscore_core::application::run_all;

use crate::cli::CommonArgs;
use crate::commands::util::{load_input, resolve_config};

pub struct Overrides {
    pub extreme_price_factor: Option<f64>,
    pub promo_discount_threshold: Option<f64>,
    pub promo_min_days: Option<u32>,
    pub target_supplier: Option<String>,
}

pub async fn execute(common: CommonArgs, overrides: Overrides) -> anyhow::Result<()> {
    let config = resolve_config(&common, |cfg| {
        if let Some(factor) = overrides.extreme_price_factor {
            cfg.extreme_price_factor = factor;
        }
        if let Some(threshold) = overrides.promo_discount_threshold {
            cfg.promo_discount_threshold = threshold;
        }
        if let Some(days) = overrides.promo_min_days {
            cfg.promo_min_days = days;
        }
        if let Some(target) = overrides.target_supplier {
            cfg.target_supplier = target;
        }
    })?;
    let rows = load_input(&common)?;

    let result = run_all(Arc::new(rows), config, common.output_dir.clone()).await?;
    if !result.success {
        eprintln!("\n❌ FAILURE. {} stages failed.", result.errors.len());
        std::process::exit(1);
    }
    Ok(())
}
