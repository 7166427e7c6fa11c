// shelfscore/src/commands/data_quality.rs
//
// USE CASE: Compute data health scores by store and by supplier.

use shelfscore_core::application::run_data_quality;

use crate::cli::CommonArgs;
use crate::commands::util::{load_input, preview_table, resolve_config};

pub fn execute(common: CommonArgs, extreme_price_factor: Option<f64>) -> anyhow::Result<()> {
    let config = resolve_config(&common, |cfg| {
        if let Some(factor) = extreme_price_factor {
            cfg.extreme_price_factor = factor;
        }
    })?;
    let rows = load_input(&common)?;

    println!(
        "🩺 Scoring data health (extreme_price_factor={})...",
        config.extreme_price_factor
    );
    let paths = run_data_quality(&rows, &config, &common.output_dir)?;
    for path in &paths {
        println!("   📄 {}", path.display());
    }
    preview_table(&paths[0], common.preview)?;
    Ok(())
}
