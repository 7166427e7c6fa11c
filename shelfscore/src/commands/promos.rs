// shelfscore/src/commands/promos.rs
//
// USE CASE: Detect promotions and compute uplift/coverage/price deltas.

use shelfscore_core::application::run_promos;

use crate::cli::CommonArgs;
use crate::commands::util::{load_input, preview_table, resolve_config};

pub fn execute(
    common: CommonArgs,
    promo_discount_threshold: Option<f64>,
    promo_min_days: Option<u32>,
) -> anyhow::Result<()> {
    let config = resolve_config(&common, |cfg| {
        if let Some(threshold) = promo_discount_threshold {
            cfg.promo_discount_threshold = threshold;
        }
        if let Some(days) = promo_min_days {
            cfg.promo_min_days = days;
        }
    })?;
    let rows = load_input(&common)?;

    println!(
        "🏷️  Detecting promotions (discount_threshold={:.2}, min_days={})...",
        config.promo_discount_threshold, config.promo_min_days
    );
    let paths = run_promos(&rows, &config, &common.output_dir)?;
    for path in &paths {
        println!("   📄 {}", path.display());
    }
    preview_table(&paths[0], common.preview)?;
    Ok(())
}
