// shelfscore/src/commands/util.rs
//
// Shared command helpers: config resolution (file -> env -> CLI flags) and
// terminal previews of written tables.

use std::path::Path;

use anyhow::Context;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;

use shelfscore_core::domain::ScoringConfig;
use shelfscore_core::domain::Transaction;
use shelfscore_core::infrastructure::config::load_scoring_config;
use shelfscore_core::infrastructure::loader::load_transactions;

use crate::cli::CommonArgs;

/// Loads the threshold configuration and layers CLI overrides on top.
/// Re-validated after the overrides are applied.
pub fn resolve_config(
    common: &CommonArgs,
    apply_overrides: impl FnOnce(&mut ScoringConfig),
) -> anyhow::Result<ScoringConfig> {
    let mut config = load_scoring_config(common.config.as_deref())?;
    apply_overrides(&mut config);
    config.check()?;
    Ok(config)
}

/// Loads and normalizes the input table with a status line.
pub fn load_input(common: &CommonArgs) -> anyhow::Result<Vec<Transaction>> {
    println!("⚙️  Loading {}...", common.input.display());
    let rows = load_transactions(&common.input)
        .with_context(|| format!("Failed to load input table from {:?}", common.input))?;
    println!("   Loaded {} rows", rows.len());
    Ok(rows)
}

/// Renders the first `limit` records of a written table.
pub fn preview_table(path: &Path, limit: usize) -> anyhow::Result<()> {
    if limit == 0 {
        return Ok(());
    }
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to re-open output table at {:?}", path))?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(rdr.headers()?.iter().collect::<Vec<_>>());
    let mut shown = 0usize;
    for record in rdr.records().take(limit) {
        table.add_row(record?.iter().collect::<Vec<_>>());
        shown += 1;
    }

    println!("\n🔍 Preview of {} (first {} rows):", path.display(), shown);
    println!("{table}");
    Ok(())
}
