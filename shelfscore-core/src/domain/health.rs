// shelfscore-core/src/domain/health.rs
//
// Health Scorer: per-group data-quality rates and a composite 0-100 score,
// grouped independently by store and by supplier. Explicit map-reduce:
// fold rows into per-key accumulators, then finalize.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::stats::{mean, round4, sample_std};
use crate::domain::transaction::Transaction;

/// Composite weights: completeness / uniqueness / validity / consistency.
const W_COMPLETENESS: f64 = 0.30;
const W_UNIQUENESS: f64 = 0.30;
const W_VALIDITY: f64 = 0.25;
const W_CONSISTENCY: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummaryRow {
    pub group: String,
    pub rows: u64,
    pub missing_rate: f64,
    pub dup_rate: f64,
    pub neg_qty_rate: f64,
    pub bad_rrp_rate: f64,
    pub extreme_price_rate: f64,
    pub score_completeness: f64,
    pub score_uniqueness: f64,
    pub score_validity: f64,
    pub avg_rrp_std: Option<f64>,
    pub score_consistency: f64,
    pub data_health_score: f64,
}

/// Both groupings computed over the same flagged row set.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub by_store: Vec<HealthSummaryRow>,
    pub by_supplier: Vec<HealthSummaryRow>,
}

struct RowFlags {
    missing: bool,
    dup: bool,
    neg_qty: bool,
    bad_rrp: bool,
    extreme: bool,
}

/// Duplicate-detection key. The key mode is decided once for the whole
/// dataset: if the primary key (store, date, item_code) contains a null
/// anywhere, every row is keyed by the fallback
/// (store, date, barcode, description) instead.
type DupKey<'a> = (
    Option<&'a str>,
    Option<NaiveDate>,
    Option<&'a str>,
    Option<&'a str>,
);

fn dup_key<'a>(t: &'a Transaction, fallback: bool) -> DupKey<'a> {
    if fallback {
        (
            t.store_name.as_deref(),
            t.date_of_sale,
            t.item_barcode.as_deref(),
            t.description.as_deref(),
        )
    } else {
        (
            t.store_name.as_deref(),
            t.date_of_sale,
            t.item_code.as_deref(),
            None,
        )
    }
}

fn compute_flags(rows: &[Transaction], extreme_price_factor: f64) -> Vec<RowFlags> {
    let fallback = rows.iter().any(|t| {
        t.store_name.is_none() || t.date_of_sale.is_none() || t.item_code.is_none()
    });

    let mut key_counts: HashMap<DupKey<'_>, u32> = HashMap::new();
    for t in rows {
        *key_counts.entry(dup_key(t, fallback)).or_insert(0) += 1;
    }

    rows.iter()
        .map(|t| {
            let extreme = match (t.realised_unit_price, t.rrp) {
                (Some(p), Some(r)) => {
                    p > extreme_price_factor * r || p < r / extreme_price_factor
                }
                _ => false,
            };
            RowFlags {
                missing: t.has_missing(),
                dup: key_counts.get(&dup_key(t, fallback)).copied().unwrap_or(0) > 1,
                neg_qty: t.quantity.is_some_and(|q| q < 0.0),
                bad_rrp: t.rrp.is_none_or(|r| r <= 0.0),
                extreme,
            }
        })
        .collect()
}

#[derive(Default)]
struct GroupAccum {
    rows: u64,
    missing: u64,
    dup: u64,
    neg_qty: u64,
    bad_rrp: u64,
    extreme: u64,
    // Non-null RRP observations per item, for the consistency metric
    rrp_by_item: BTreeMap<String, Vec<f64>>,
}

fn summarize<F>(rows: &[Transaction], flags: &[RowFlags], key_of: F) -> Vec<HealthSummaryRow>
where
    F: Fn(&Transaction) -> Option<&str>,
{
    // MAP: fold rows into per-group accumulators. Rows whose group key is
    // null belong to no group, as in the source semantics.
    let mut groups: BTreeMap<String, GroupAccum> = BTreeMap::new();
    for (t, f) in rows.iter().zip(flags) {
        let Some(key) = key_of(t) else { continue };
        let acc = groups.entry(key.to_string()).or_default();
        acc.rows += 1;
        acc.missing += u64::from(f.missing);
        acc.dup += u64::from(f.dup);
        acc.neg_qty += u64::from(f.neg_qty);
        acc.bad_rrp += u64::from(f.bad_rrp);
        acc.extreme += u64::from(f.extreme);
        if let (Some(item), Some(rrp)) = (t.item_code.as_deref(), t.rrp) {
            acc.rrp_by_item
                .entry(item.to_string())
                .or_default()
                .push(rrp);
        }
    }

    // REDUCE: rates + the per-group average of per-item RRP stddevs.
    struct Partial {
        group: String,
        rows: u64,
        rates: [f64; 5],
        avg_rrp_std: Option<f64>,
    }
    let partials: Vec<Partial> = groups
        .into_iter()
        .map(|(group, acc)| {
            let n = acc.rows as f64;
            let stds: Vec<f64> = acc
                .rrp_by_item
                .values()
                .filter_map(|vals| sample_std(vals))
                .collect();
            Partial {
                group,
                rows: acc.rows,
                rates: [
                    acc.missing as f64 / n,
                    acc.dup as f64 / n,
                    acc.neg_qty as f64 / n,
                    acc.bad_rrp as f64 / n,
                    acc.extreme as f64 / n,
                ],
                avg_rrp_std: mean(&stds),
            }
        })
        .collect();

    // Consistency: min-max scale avg_rrp_std across groups. With fewer than
    // two comparable groups, or a degenerate (min == max) range, every
    // group scores 1.0. The degenerate range must be detected explicitly so
    // no 0/0 ever reaches the output.
    let comparable: Vec<f64> = partials.iter().filter_map(|p| p.avg_rrp_std).collect();
    let scale: Option<(f64, f64)> = if comparable.len() > 1 {
        let lo = comparable.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = comparable.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (hi > lo).then_some((lo, hi))
    } else {
        None
    };

    partials
        .into_iter()
        .map(|p| {
            let score_consistency = match (scale, p.avg_rrp_std) {
                (Some((lo, hi)), Some(s)) => 1.0 - (s - lo) / (hi - lo),
                // Insufficient variance to compare, or no RRP data for this
                // group: not penalized.
                _ => 1.0,
            };
            let [missing_rate, dup_rate, neg_qty_rate, bad_rrp_rate, extreme_price_rate] = p.rates;
            let score_completeness = 1.0 - missing_rate;
            let score_uniqueness = 1.0 - dup_rate;
            let validity_penalty = neg_qty_rate.max(bad_rrp_rate).max(extreme_price_rate);
            let score_validity = 1.0 - validity_penalty;
            let data_health_score = 100.0
                * (score_completeness * W_COMPLETENESS
                    + score_uniqueness * W_UNIQUENESS
                    + score_validity * W_VALIDITY
                    + score_consistency * W_CONSISTENCY);

            HealthSummaryRow {
                group: p.group,
                rows: p.rows,
                missing_rate: round4(missing_rate),
                dup_rate: round4(dup_rate),
                neg_qty_rate: round4(neg_qty_rate),
                bad_rrp_rate: round4(bad_rrp_rate),
                extreme_price_rate: round4(extreme_price_rate),
                score_completeness: round4(score_completeness),
                score_uniqueness: round4(score_uniqueness),
                score_validity: round4(score_validity),
                avg_rrp_std: p.avg_rrp_std,
                score_consistency: round4(score_consistency),
                data_health_score: round4(data_health_score),
            }
        })
        .collect()
}

/// Computes the per-store and per-supplier health summaries over the full
/// transaction set.
pub fn score_health(rows: &[Transaction], extreme_price_factor: f64) -> HealthReport {
    let flags = compute_flags(rows, extreme_price_factor);
    HealthReport {
        by_store: summarize(rows, &flags, |t| t.store_name.as_deref()),
        by_supplier: summarize(rows, &flags, |t| t.supplier.as_deref()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 3, day)
    }

    fn tx(store: &str, day: u32, item: &str, qty: f64, total: f64, rrp: f64) -> Transaction {
        let mut t = Transaction {
            store_name: Some(store.to_string()),
            date_of_sale: d(day),
            item_code: Some(item.to_string()),
            item_barcode: Some(format!("bc-{item}")),
            description: Some(format!("desc {item}")),
            category: Some("Food".into()),
            department: Some("Grocery".into()),
            sub_department: Some("Dry".into()),
            section: Some("A".into()),
            quantity: Some(qty),
            total_sales: Some(total),
            rrp: Some(rrp),
            supplier: Some("Acme".into()),
            realised_unit_price: None,
        };
        t.derive_unit_price();
        t
    }

    #[test]
    fn test_perfect_group_scores_exactly_100() {
        // Clean rows, unique keys, constant RRP per item across both groups
        let rows = vec![
            tx("S1", 1, "A", 2.0, 4.0, 2.0),
            tx("S1", 2, "A", 2.0, 4.0, 2.0),
            tx("S2", 1, "A", 2.0, 4.0, 2.0),
            tx("S2", 2, "A", 2.0, 4.0, 2.0),
        ];
        let report = score_health(&rows, 10.0);
        assert_eq!(report.by_store.len(), 2);
        for row in &report.by_store {
            assert_eq!(row.missing_rate, 0.0);
            assert_eq!(row.dup_rate, 0.0);
            assert_eq!(row.score_consistency, 1.0);
            assert_eq!(row.data_health_score, 100.0);
        }
    }

    #[test]
    fn test_rates_and_score_stay_in_bounds() {
        let mut rows = vec![
            tx("S1", 1, "A", -3.0, 6.0, 2.0),  // negative quantity
            tx("S1", 1, "A", 2.0, 4.0, 0.0),   // bad rrp
            tx("S1", 2, "B", 1.0, 100.0, 2.0), // extreme price (50x rrp)
            tx("S2", 1, "A", 2.0, 4.0, 2.0),
        ];
        rows[3].category = None; // missing field
        let report = score_health(&rows, 10.0);
        for row in report.by_store.iter().chain(&report.by_supplier) {
            for rate in [
                row.missing_rate,
                row.dup_rate,
                row.neg_qty_rate,
                row.bad_rrp_rate,
                row.extreme_price_rate,
            ] {
                assert!((0.0..=1.0).contains(&rate), "rate out of bounds: {rate}");
            }
            assert!(
                (0.0..=100.0).contains(&row.data_health_score),
                "score out of bounds: {}",
                row.data_health_score
            );
        }
    }

    #[test]
    fn test_primary_key_duplicates_flagged() {
        let rows = vec![
            tx("S1", 1, "A", 2.0, 4.0, 2.0),
            tx("S1", 1, "A", 3.0, 6.0, 2.0), // same (store, date, item)
            tx("S1", 2, "A", 2.0, 4.0, 2.0),
        ];
        let report = score_health(&rows, 10.0);
        let s1 = &report.by_store[0];
        assert_eq!(s1.rows, 3);
        assert_eq!(s1.dup_rate, round4(2.0 / 3.0));
    }

    #[test]
    fn test_null_primary_key_switches_whole_run_to_fallback() {
        // Rows 0 and 1: duplicates under the fallback key (same store, date,
        // barcode, description) but NOT under the primary key (distinct
        // item codes). Row 2 carries a null item_code, which forces the
        // fallback key for the entire dataset.
        let mut a = tx("S1", 1, "A", 2.0, 4.0, 2.0);
        let mut b = tx("S1", 1, "B", 3.0, 6.0, 2.0);
        a.item_barcode = Some("bc-X".into());
        b.item_barcode = Some("bc-X".into());
        a.description = Some("same desc".into());
        b.description = Some("same desc".into());
        let mut c = tx("S1", 2, "C", 1.0, 2.0, 2.0);
        c.item_code = None;

        let report = score_health(&[a.clone(), b.clone(), c], 10.0);
        let s1 = &report.by_store[0];
        // a and b are flagged, c is not
        assert_eq!(s1.dup_rate, round4(2.0 / 3.0));

        // Without the null key field, the same pair is NOT a duplicate
        let c2 = tx("S1", 2, "C", 1.0, 2.0, 2.0);
        let report = score_health(&[a, b, c2], 10.0);
        assert_eq!(report.by_store[0].dup_rate, 0.0);
    }

    #[test]
    fn test_consistency_scaled_across_groups() {
        // S1: constant RRP per item (std 0); S2: volatile RRP (std > 0)
        let rows = vec![
            tx("S1", 1, "A", 1.0, 2.0, 2.0),
            tx("S1", 2, "A", 1.0, 2.0, 2.0),
            tx("S2", 1, "A", 1.0, 2.0, 1.0),
            tx("S2", 2, "A", 1.0, 2.0, 5.0),
        ];
        let report = score_health(&rows, 10.0);
        let s1 = report.by_store.iter().find(|r| r.group == "S1").unwrap();
        let s2 = report.by_store.iter().find(|r| r.group == "S2").unwrap();
        assert_eq!(s1.score_consistency, 1.0);
        assert_eq!(s2.score_consistency, 0.0);
    }

    #[test]
    fn test_consistency_degenerate_range_is_not_a_division_by_zero() {
        // Two groups with identical non-zero avg_rrp_std: min == max
        let rows = vec![
            tx("S1", 1, "A", 1.0, 2.0, 1.0),
            tx("S1", 2, "A", 1.0, 2.0, 3.0),
            tx("S2", 1, "A", 1.0, 2.0, 1.0),
            tx("S2", 2, "A", 1.0, 2.0, 3.0),
        ];
        let report = score_health(&rows, 10.0);
        for row in &report.by_store {
            assert!(row.avg_rrp_std.unwrap() > 0.0);
            assert_eq!(row.score_consistency, 1.0);
            assert!(row.data_health_score.is_finite());
        }
    }

    #[test]
    fn test_rows_with_null_group_key_emit_no_group() {
        let mut anon = tx("S1", 1, "A", 1.0, 2.0, 2.0);
        anon.store_name = None;
        let rows = vec![anon, tx("S2", 1, "A", 1.0, 2.0, 2.0)];
        let report = score_health(&rows, 10.0);
        assert_eq!(report.by_store.len(), 1);
        assert_eq!(report.by_store[0].group, "S2");
    }

    #[test]
    fn test_extreme_price_both_directions() {
        let rows = vec![
            tx("S1", 1, "A", 1.0, 50.0, 2.0),  // 25x rrp
            tx("S1", 2, "B", 10.0, 1.0, 2.0),  // 0.05x rrp
            tx("S1", 3, "C", 1.0, 2.0, 2.0),   // at rrp
        ];
        let report = score_health(&rows, 10.0);
        assert_eq!(report.by_store[0].extreme_price_rate, round4(2.0 / 3.0));
    }
}
