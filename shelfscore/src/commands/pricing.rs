// shelfscore/src/commands/pricing.rs
//
// USE CASE: Compute the target-vs-peers price index and its roll-up.

use shelfscore_core::application::run_pricing;

use crate::cli::CommonArgs;
use crate::commands::util::{load_input, preview_table, resolve_config};

pub fn execute(common: CommonArgs, target_supplier: Option<String>) -> anyhow::Result<()> {
    let config = resolve_config(&common, |cfg| {
        if let Some(target) = target_supplier {
            cfg.target_supplier = target;
        }
    })?;
    let rows = load_input(&common)?;

    println!(
        "⚖️  Computing price index (target_supplier='{}')...",
        config.target_supplier
    );
    let paths = run_pricing(&rows, &config, &common.output_dir)?;
    for path in &paths {
        println!("   📄 {}", path.display());
    }
    preview_table(&paths[0], common.preview)?;
    Ok(())
}
