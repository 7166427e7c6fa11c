// shelfscore-core/src/application/pipeline.rs
//
// Stage orchestration. Each stage is a pure scorer wrapped with timing
// instrumentation and its output tables; `run_all` executes the three
// stages as parallel blocking tasks (they share the same immutable input
// and write disjoint files).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::domain::config::ScoringConfig;
use crate::domain::health::{HealthSummaryRow, score_health};
use crate::domain::pricing::{PriceIndexRollup, PriceIndexRow, compute_price_index};
use crate::domain::promo::{PromoSummaryRow, detect_promotions};
use crate::domain::transaction::Transaction;
use crate::error::ShelfscoreError;
use crate::infrastructure::writer::{atomic_write, write_table};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub tables_written: Vec<String>,
    pub errors: Vec<String>,
    pub stage_timings_ms: Vec<(String, u64)>,
}

/// Timing middleware around a scorer entry point, so the scorers themselves
/// stay pure and independently testable.
fn run_stage<T>(label: &str, rows: usize, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    debug!(stage = label, rows, "⚡ Stage starting");
    let out = f();
    let elapsed = start.elapsed();
    info!(stage = label, "✅ Stage finished in {:.2?}", elapsed);
    (out, elapsed)
}

/// Data-quality stage: health summaries by store and by supplier.
pub fn run_data_quality(
    rows: &[Transaction],
    config: &ScoringConfig,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ShelfscoreError> {
    let (report, _) = run_stage("score_health", rows.len(), || {
        score_health(rows, config.extreme_price_factor)
    });
    info!(
        stores = report.by_store.len(),
        suppliers = report.by_supplier.len(),
        "Health summaries generated"
    );
    Ok(vec![
        write_table(
            out_dir,
            "data_quality_store",
            &HealthSummaryRow::columns("store_name"),
            &report.by_store,
        )?,
        write_table(
            out_dir,
            "data_quality_supplier",
            &HealthSummaryRow::columns("supplier"),
            &report.by_supplier,
        )?,
    ])
}

/// Promotions stage: uplift, coverage and price deltas per item.
pub fn run_promos(
    rows: &[Transaction],
    config: &ScoringConfig,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ShelfscoreError> {
    let (summary, _) = run_stage("detect_promotions", rows.len(), || {
        detect_promotions(rows, config.promo_discount_threshold, config.promo_min_days)
    });
    info!(items = summary.len(), "Promotion summary generated");
    Ok(vec![write_table(
        out_dir,
        "promo_summary",
        &PromoSummaryRow::COLUMNS,
        &summary,
    )?])
}

/// Pricing stage: target-vs-peers price index per segment plus roll-up.
pub fn run_pricing(
    rows: &[Transaction],
    config: &ScoringConfig,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ShelfscoreError> {
    let ((index, rollup), _) = run_stage("compute_price_index", rows.len(), || {
        compute_price_index(rows, &config.target_supplier)
    });
    info!(segments = index.len(), "Price index generated");
    Ok(vec![
        write_table(out_dir, "price_index", &PriceIndexRow::COLUMNS, &index)?,
        write_table(
            out_dir,
            "price_index_rollup",
            &PriceIndexRollup::COLUMNS,
            &[rollup],
        )?,
    ])
}

fn save_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), ShelfscoreError> {
    let bytes = serde_json::to_vec_pretty(data)
        .map_err(|e| ShelfscoreError::InternalError(format!("JSON serialization failed: {e}")))?;
    atomic_write(path, bytes)?;
    Ok(())
}

/// Runs the three scorers over the same immutable table and writes the five
/// output tables plus `run_results.json`.
pub async fn run_all(
    rows: Arc<Vec<Transaction>>,
    config: ScoringConfig,
    out_dir: PathBuf,
) -> Result<RunResult, ShelfscoreError> {
    println!("🚀 Starting KPI pipeline ({} rows)...", rows.len());
    let start_time = Instant::now();
    std::fs::create_dir_all(&out_dir)?;

    let stages: [(&str, StageFn); 3] = [
        ("data-quality", run_data_quality),
        ("promos", run_promos),
        ("pricing", run_pricing),
    ];

    let (labels, handles): (Vec<_>, Vec<_>) = stages
        .into_iter()
        .map(|(label, stage)| {
            let rows = Arc::clone(&rows);
            let config = config.clone();
            let out_dir = out_dir.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                let res = stage(&rows, &config, &out_dir);
                (res, start.elapsed())
            });
            (label, handle)
        })
        .unzip();

    let joined = futures::future::join_all(handles).await;

    let mut tables_written = Vec::new();
    let mut errors = Vec::new();
    let mut stage_timings_ms = Vec::new();
    for (label, joined_res) in labels.into_iter().zip(joined) {
        let (res, elapsed) = joined_res
            .map_err(|e| ShelfscoreError::InternalError(format!("stage task panicked: {e}")))?;
        stage_timings_ms.push((label.to_string(), elapsed.as_millis() as u64));
        match res {
            Ok(paths) => {
                println!("    ✅ Stage {} finished in {:.2?}", label, elapsed);
                tables_written.extend(
                    paths
                        .iter()
                        .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned()),
                );
            }
            Err(e) => {
                eprintln!("    ❌ Stage {} failed: {}", label, e);
                errors.push(format!("{label}: {e}"));
            }
        }
    }

    let result = RunResult {
        success: errors.is_empty(),
        tables_written,
        errors,
        stage_timings_ms,
    };
    save_json(&out_dir.join("run_results.json"), &result)?;

    println!(
        "✨ Done in {:.2}s. {} tables written.",
        start_time.elapsed().as_secs_f64(),
        result.tables_written.len()
    );
    Ok(result)
}

type StageFn = fn(&[Transaction], &ScoringConfig, &Path) -> Result<Vec<PathBuf>, ShelfscoreError>;
