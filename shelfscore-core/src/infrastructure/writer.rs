// shelfscore-core/src/infrastructure/writer.rs
//
// Output tables as delimited text with a header row. Rows arrive already
// sorted by group key, so repeated runs produce byte-identical files.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::health::HealthSummaryRow;
use crate::domain::pricing::{PriceIndexRollup, PriceIndexRow};
use crate::domain::promo::PromoSummaryRow;
use crate::error::ShelfscoreError;
use crate::infrastructure::error::InfrastructureError;

/// A domain row renderable as one CSV record. Nulls render as empty cells.
pub trait TableRow {
    fn record(&self) -> Vec<String>;
}

fn fmt_f64(v: f64) -> String {
    format!("{v}")
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_f64).unwrap_or_default()
}

fn fmt_opt_str(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

impl HealthSummaryRow {
    /// Header for a health table; the group column is named after the
    /// grouping (store_name or supplier).
    pub fn columns(group_key: &'static str) -> Vec<&'static str> {
        let mut cols = vec![group_key];
        cols.extend([
            "rows",
            "missing_rate",
            "dup_rate",
            "neg_qty_rate",
            "bad_rrp_rate",
            "extreme_price_rate",
            "score_completeness",
            "score_uniqueness",
            "score_validity",
            "avg_rrp_std",
            "score_consistency",
            "data_health_score",
        ]);
        cols
    }
}

impl TableRow for HealthSummaryRow {
    fn record(&self) -> Vec<String> {
        vec![
            self.group.clone(),
            self.rows.to_string(),
            fmt_f64(self.missing_rate),
            fmt_f64(self.dup_rate),
            fmt_f64(self.neg_qty_rate),
            fmt_f64(self.bad_rrp_rate),
            fmt_f64(self.extreme_price_rate),
            fmt_f64(self.score_completeness),
            fmt_f64(self.score_uniqueness),
            fmt_f64(self.score_validity),
            fmt_opt(self.avg_rrp_std),
            fmt_f64(self.score_consistency),
            fmt_f64(self.data_health_score),
        ]
    }
}

impl PromoSummaryRow {
    pub const COLUMNS: [&'static str; 17] = [
        "item_code",
        "baseline_units",
        "promo_units",
        "promo_days_count",
        "baseline_days_count",
        "promo_uplift_pct",
        "description",
        "supplier",
        "sub_department",
        "section",
        "promo_coverage_sku",
        "avg_price_all",
        "avg_rrp_all",
        "avg_discount_depth_all",
        "units_all",
        "baseline_avg_price",
        "promo_avg_price",
    ];
}

impl TableRow for PromoSummaryRow {
    fn record(&self) -> Vec<String> {
        vec![
            self.item_code.clone(),
            fmt_f64(self.baseline_units),
            fmt_f64(self.promo_units),
            self.promo_days_count.to_string(),
            self.baseline_days_count.to_string(),
            fmt_opt(self.promo_uplift_pct),
            fmt_opt_str(&self.description),
            fmt_opt_str(&self.supplier),
            fmt_opt_str(&self.sub_department),
            fmt_opt_str(&self.section),
            fmt_opt(self.promo_coverage_sku),
            fmt_opt(self.avg_price_all),
            fmt_opt(self.avg_rrp_all),
            fmt_opt(self.avg_discount_depth_all),
            fmt_f64(self.units_all),
            fmt_opt(self.baseline_avg_price),
            fmt_opt(self.promo_avg_price),
        ]
    }
}

impl PriceIndexRow {
    pub const COLUMNS: [&'static str; 8] = [
        "store_name",
        "sub_department",
        "section",
        "bidco_avg_price",
        "bidco_units",
        "peer_avg_price",
        "peer_units",
        "price_index",
    ];
}

impl TableRow for PriceIndexRow {
    fn record(&self) -> Vec<String> {
        vec![
            self.store_name.clone(),
            self.sub_department.clone(),
            self.section.clone(),
            fmt_opt(self.bidco_avg_price),
            fmt_opt(self.bidco_units),
            fmt_opt(self.peer_avg_price),
            fmt_opt(self.peer_units),
            fmt_opt(self.price_index),
        ]
    }
}

impl PriceIndexRollup {
    pub const COLUMNS: [&'static str; 3] = [
        "bidco_avg_price_rollup",
        "peer_avg_price_rollup",
        "price_index_rollup",
    ];
}

impl TableRow for PriceIndexRollup {
    fn record(&self) -> Vec<String> {
        vec![
            fmt_opt(self.bidco_avg_price_rollup),
            fmt_opt(self.peer_avg_price_rollup),
            fmt_opt(self.price_index_rollup),
        ]
    }
}

/// Write content to a file atomically using a temporary file in the same
/// directory, so the target is either fully written or untouched.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;
    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Materializes one output table as `<out_dir>/<name>.csv`.
pub fn write_table<T: TableRow>(
    out_dir: &Path,
    name: &str,
    columns: &[&str],
    rows: &[T],
) -> Result<PathBuf, ShelfscoreError> {
    std::fs::create_dir_all(out_dir).map_err(InfrastructureError::Io)?;

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(columns).map_err(InfrastructureError::Csv)?;
    for row in rows {
        wtr.write_record(row.record())
            .map_err(InfrastructureError::Csv)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ShelfscoreError::InternalError(format!("CSV buffer flush failed: {e}")))?;

    let path = out_dir.join(format!("{name}.csv"));
    atomic_write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn sample_rollup() -> PriceIndexRollup {
        PriceIndexRollup {
            bidco_avg_price_rollup: Some(12.5),
            peer_avg_price_rollup: Some(10.0),
            price_index_rollup: Some(1.25),
        }
    }

    #[test]
    fn test_write_table_header_and_nulls() -> Result<()> {
        let dir = tempdir()?;
        let rows = vec![PriceIndexRollup {
            price_index_rollup: None,
            ..sample_rollup()
        }];
        let path = write_table(dir.path(), "price_index_rollup", &PriceIndexRollup::COLUMNS, &rows)?;
        let content = fs::read_to_string(path)?;
        assert_eq!(
            content,
            "bidco_avg_price_rollup,peer_avg_price_rollup,price_index_rollup\n12.5,10,\n"
        );
        Ok(())
    }

    #[test]
    fn test_rewrite_is_byte_identical() -> Result<()> {
        let dir = tempdir()?;
        let rows = vec![sample_rollup()];
        let p1 = write_table(dir.path(), "t", &PriceIndexRollup::COLUMNS, &rows)?;
        let first = fs::read(&p1)?;
        let p2 = write_table(dir.path(), "t", &PriceIndexRollup::COLUMNS, &rows)?;
        assert_eq!(first, fs::read(&p2)?);
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.csv");
        atomic_write(&file_path, "Initial")?;
        atomic_write(&file_path, "Updated")?;
        assert_eq!(fs::read_to_string(file_path)?, "Updated");
        Ok(())
    }

    #[test]
    fn test_health_columns_carry_group_key_name() {
        let store = HealthSummaryRow::columns("store_name");
        let supplier = HealthSummaryRow::columns("supplier");
        assert_eq!(store[0], "store_name");
        assert_eq!(supplier[0], "supplier");
        assert_eq!(store[1..], supplier[1..]);
    }
}
