// shelfscore-core/src/domain/promo.rs
//
// Promotion Detector: flags promotional days per (store, item), then
// aggregates baseline-vs-promo unit uplift, cross-store coverage and price
// deltas into one summary row per item. All intermediate aggregations are
// attached by join key; nothing relies on positional alignment.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::stats::mean;
use crate::domain::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromoSummaryRow {
    pub item_code: String,
    pub baseline_units: f64,
    pub promo_units: f64,
    pub promo_days_count: u32,
    pub baseline_days_count: u32,
    pub promo_uplift_pct: Option<f64>,
    pub description: Option<String>,
    pub supplier: Option<String>,
    pub sub_department: Option<String>,
    pub section: Option<String>,
    pub promo_coverage_sku: Option<f64>,
    pub avg_price_all: Option<f64>,
    pub avg_rrp_all: Option<f64>,
    pub avg_discount_depth_all: Option<f64>,
    pub units_all: f64,
    pub baseline_avg_price: Option<f64>,
    pub promo_avg_price: Option<f64>,
}

/// Running mean over the non-null observations only.
#[derive(Debug, Default, Clone, Copy)]
struct MeanAccum {
    sum: f64,
    n: u64,
}

impl MeanAccum {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.n += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// `(rrp - price) / rrp`; null when either operand is null or rrp is zero.
fn discount_depth(t: &Transaction) -> Option<f64> {
    match (t.rrp, t.realised_unit_price) {
        (Some(rrp), Some(price)) if rrp != 0.0 => Some((rrp - price) / rrp),
        _ => None,
    }
}

/// A sale line is promotional when the realised price sits at or below
/// `(1 - threshold) * RRP`; null operands mean "not promotional".
fn is_promo_line(t: &Transaction, discount_threshold: f64) -> bool {
    match (t.rrp, t.realised_unit_price) {
        (Some(rrp), Some(price)) => price <= (1.0 - discount_threshold) * rrp,
        _ => false,
    }
}

/// Daily rollup per (store, item, date).
#[derive(Debug, Default)]
struct DayAccum {
    units: f64,
    price: MeanAccum,
    rrp: MeanAccum,
    promo: bool,
}

/// Per-(store, item) baseline / promo sides, built from the daily table.
#[derive(Debug, Default)]
struct PairAccum {
    baseline_units: MeanAccum,
    promo_units: MeanAccum,
    baseline_days: u32,
    promo_days: u32,
}

/// Per-(item, promo-split) price statistics over raw rows.
#[derive(Debug, Default)]
struct SplitAccum {
    price: MeanAccum,
    rrp: MeanAccum,
    depth: MeanAccum,
    units: f64,
}

/// First encountered non-null descriptive attributes per item.
#[derive(Debug, Default, Clone)]
struct ItemAttrs {
    description: Option<String>,
    supplier: Option<String>,
    sub_department: Option<String>,
    section: Option<String>,
}

impl ItemAttrs {
    fn absorb(&mut self, t: &Transaction) {
        if self.description.is_none() {
            self.description = t.description.clone();
        }
        if self.supplier.is_none() {
            self.supplier = t.supplier.clone();
        }
        if self.sub_department.is_none() {
            self.sub_department = t.sub_department.clone();
        }
        if self.section.is_none() {
            self.section = t.section.clone();
        }
    }
}

pub fn detect_promotions(
    rows: &[Transaction],
    discount_threshold: f64,
    promo_min_days: u32,
) -> Vec<PromoSummaryRow> {
    // 1. Daily rollup per (store, item, date). Rows missing any of the three
    //    keys are excluded from the day-level view (but not from the
    //    row-level statistics below).
    let mut daily: BTreeMap<(String, String, NaiveDate), DayAccum> = BTreeMap::new();
    for t in rows {
        let (Some(store), Some(item), Some(date)) =
            (t.store_name.as_ref(), t.item_code.as_ref(), t.date_of_sale)
        else {
            continue;
        };
        let day = daily
            .entry((store.clone(), item.clone(), date))
            .or_default();
        if let Some(q) = t.quantity {
            day.units += q;
        }
        if let Some(p) = t.realised_unit_price {
            day.price.push(p);
        }
        if let Some(r) = t.rrp {
            day.rrp.push(r);
        }
        // A day is promotional if ANY line qualifies (max across lines)
        day.promo |= is_promo_line(t, discount_threshold);
    }

    // 2. Fold days into per-(store, item) sides, and collect the item-level
    //    baseline/promo average realised prices at the same time.
    let mut pairs: BTreeMap<(String, String), PairAccum> = BTreeMap::new();
    let mut item_base_price: BTreeMap<String, MeanAccum> = BTreeMap::new();
    let mut item_promo_price: BTreeMap<String, MeanAccum> = BTreeMap::new();
    for ((store, item, _date), day) in &daily {
        let pair = pairs.entry((store.clone(), item.clone())).or_default();
        if day.promo {
            pair.promo_units.push(day.units);
            pair.promo_days += 1;
            if let Some(p) = day.price.value() {
                item_promo_price.entry(item.clone()).or_default().push(p);
            }
        } else {
            pair.baseline_units.push(day.units);
            pair.baseline_days += 1;
            if let Some(p) = day.price.value() {
                item_base_price.entry(item.clone()).or_default().push(p);
            }
        }
    }

    // 3. On-promo flag per (store, item): enough distinct promo days.
    let on_promo = |store: &str, item: &str| -> bool {
        pairs
            .get(&(store.to_string(), item.to_string()))
            .is_some_and(|p| p.promo_days >= promo_min_days)
    };

    // 4. Row-level passes keyed by item: coverage, split price statistics,
    //    descriptive attributes.
    let mut seen_stores: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut splits: BTreeMap<(String, bool), SplitAccum> = BTreeMap::new();
    let mut attrs: BTreeMap<String, ItemAttrs> = BTreeMap::new();
    for t in rows {
        let Some(item) = t.item_code.as_ref() else {
            continue;
        };
        attrs.entry(item.clone()).or_default().absorb(t);

        // A row outside any (store, item) pair counts as not on promotion
        let flag = t
            .store_name
            .as_deref()
            .is_some_and(|store| on_promo(store, item));
        if let Some(store) = t.store_name.as_ref() {
            seen_stores
                .entry(item.clone())
                .or_default()
                .insert(store.clone());
        }

        let split = splits.entry((item.clone(), flag)).or_default();
        if let Some(p) = t.realised_unit_price {
            split.price.push(p);
        }
        if let Some(r) = t.rrp {
            split.rrp.push(r);
        }
        if let Some(d) = discount_depth(t) {
            split.depth.push(d);
        }
        if let Some(q) = t.quantity {
            split.units += q;
        }
    }

    // 5. Item roll-up. The summary is keyed by item; one row per item that
    //    has at least one dated transaction (the uplift base).
    let mut per_item: BTreeMap<String, Vec<&PairAccum>> = BTreeMap::new();
    for ((_store, item), pair) in &pairs {
        per_item.entry(item.clone()).or_default().push(pair);
    }

    per_item
        .into_iter()
        .map(|(item, item_pairs)| {
            // Outer-join fill-0: a pair absent from one side contributes a
            // zero mean for that side.
            let base_means: Vec<f64> = item_pairs
                .iter()
                .map(|p| p.baseline_units.value().unwrap_or(0.0))
                .collect();
            let promo_means: Vec<f64> = item_pairs
                .iter()
                .map(|p| p.promo_units.value().unwrap_or(0.0))
                .collect();
            let baseline_units = mean(&base_means).unwrap_or(0.0);
            let promo_units = mean(&promo_means).unwrap_or(0.0);
            let baseline_days_count: u32 = item_pairs.iter().map(|p| p.baseline_days).sum();
            let promo_days_count: u32 = item_pairs.iter().map(|p| p.promo_days).sum();

            // Uplift needs at least two days on each side; a zero on either
            // side is a structural absence, not a -100% reading.
            let promo_uplift_pct = (baseline_days_count >= 2
                && promo_days_count >= 2
                && promo_units != 0.0
                && baseline_units != 0.0)
                .then(|| (promo_units - baseline_units) / baseline_units);

            let promo_coverage_sku = seen_stores.get(&item).map(|stores| {
                let on = stores.iter().filter(|s| on_promo(s, &item)).count();
                on as f64 / stores.len() as f64
            });

            // Re-aggregate the promo/non-promo split: mean of the per-split
            // means, sum of units.
            let split_rows: Vec<&SplitAccum> = [false, true]
                .iter()
                .filter_map(|flag| splits.get(&(item.clone(), *flag)))
                .collect();
            let price_means: Vec<f64> =
                split_rows.iter().filter_map(|s| s.price.value()).collect();
            let rrp_means: Vec<f64> = split_rows.iter().filter_map(|s| s.rrp.value()).collect();
            let depth_means: Vec<f64> =
                split_rows.iter().filter_map(|s| s.depth.value()).collect();
            let units_all: f64 = split_rows.iter().map(|s| s.units).sum();

            let item_attrs = attrs.get(&item).cloned().unwrap_or_default();

            PromoSummaryRow {
                baseline_units,
                promo_units,
                promo_days_count,
                baseline_days_count,
                promo_uplift_pct,
                description: item_attrs.description,
                supplier: item_attrs.supplier,
                sub_department: item_attrs.sub_department,
                section: item_attrs.section,
                promo_coverage_sku,
                avg_price_all: mean(&price_means),
                avg_rrp_all: mean(&rrp_means),
                avg_discount_depth_all: mean(&depth_means),
                units_all,
                baseline_avg_price: item_base_price.get(&item).and_then(MeanAccum::value),
                promo_avg_price: item_promo_price.get(&item).and_then(MeanAccum::value),
                item_code: item,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 5, day)
    }

    // One sale line at a given unit price; total_sales = qty * price.
    fn line(store: &str, day: u32, item: &str, qty: f64, unit_price: f64, rrp: f64) -> Transaction {
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
            total_sales: Some(qty * unit_price),
            rrp: Some(rrp),
            supplier: Some("Acme".into()),
            realised_unit_price: None,
        };
        t.derive_unit_price();
        t
    }

    #[test]
    fn test_uplift_formula_with_enough_days() {
        // Baseline days: units 4 and 6 (mean 5). Promo days (20% off rrp 10):
        // units 8 and 12 (mean 10). Uplift = (10 - 5) / 5 = 1.0.
        let rows = vec![
            line("S1", 1, "A", 4.0, 10.0, 10.0),
            line("S1", 2, "A", 6.0, 10.0, 10.0),
            line("S1", 3, "A", 8.0, 8.0, 10.0),
            line("S1", 4, "A", 12.0, 8.0, 10.0),
        ];
        let summary = detect_promotions(&rows, 0.10, 2);
        assert_eq!(summary.len(), 1);
        let row = &summary[0];
        assert_eq!(row.baseline_units, 5.0);
        assert_eq!(row.promo_units, 10.0);
        assert_eq!(row.baseline_days_count, 2);
        assert_eq!(row.promo_days_count, 2);
        assert_eq!(row.promo_uplift_pct, Some(1.0));
        // Item-level price deltas from the daily table
        assert_eq!(row.baseline_avg_price, Some(10.0));
        assert_eq!(row.promo_avg_price, Some(8.0));
    }

    #[test]
    fn test_single_promo_day_yields_null_uplift() {
        let rows = vec![
            line("S1", 1, "A", 4.0, 10.0, 10.0),
            line("S1", 2, "A", 6.0, 10.0, 10.0),
            line("S1", 3, "A", 50.0, 8.0, 10.0), // only promo day
        ];
        let summary = detect_promotions(&rows, 0.10, 2);
        assert_eq!(summary[0].promo_days_count, 1);
        assert_eq!(summary[0].promo_uplift_pct, None);
    }

    #[test]
    fn test_zero_promo_units_forced_null() {
        // Each promo day nets out to zero units (a sale and a return), so
        // promo_units == 0 with two legitimate promo days on record.
        let mut ret1 = line("S1", 3, "A", -2.0, 8.0, 10.0);
        ret1.total_sales = Some(-16.0);
        let mut ret2 = line("S1", 4, "A", -2.0, 8.0, 10.0);
        ret2.total_sales = Some(-16.0);
        let rows = vec![
            line("S1", 1, "A", 4.0, 10.0, 10.0),
            line("S1", 2, "A", 6.0, 10.0, 10.0),
            line("S1", 3, "A", 2.0, 8.0, 10.0),
            ret1,
            line("S1", 4, "A", 2.0, 8.0, 10.0),
            ret2,
        ];
        let summary = detect_promotions(&rows, 0.10, 2);
        let row = &summary[0];
        assert_eq!(row.promo_days_count, 2);
        assert_eq!(row.promo_units, 0.0);
        assert_eq!(row.promo_uplift_pct, None, "no spurious -100% reading");
    }

    #[test]
    fn test_promo_day_is_or_of_lines() {
        // Same store/item/day: one full-price line, one discounted line.
        // The day counts as promotional.
        let rows = vec![
            line("S1", 1, "A", 4.0, 10.0, 10.0),
            line("S1", 1, "A", 2.0, 8.0, 10.0),
        ];
        let summary = detect_promotions(&rows, 0.10, 2);
        assert_eq!(summary[0].promo_days_count, 1);
        assert_eq!(summary[0].baseline_days_count, 0);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // price == (1 - 0.10) * rrp exactly
        let rows = vec![line("S1", 1, "A", 1.0, 9.0, 10.0)];
        let summary = detect_promotions(&rows, 0.10, 1);
        assert_eq!(summary[0].promo_days_count, 1);
    }

    #[test]
    fn test_coverage_two_of_five_stores() {
        let mut rows = Vec::new();
        // Stores S1, S2: on promo (2 promo days each)
        for store in ["S1", "S2"] {
            rows.push(line(store, 1, "A", 5.0, 8.0, 10.0));
            rows.push(line(store, 2, "A", 5.0, 8.0, 10.0));
        }
        // Stores S3..S5: never discounted
        for store in ["S3", "S4", "S5"] {
            rows.push(line(store, 1, "A", 5.0, 10.0, 10.0));
            rows.push(line(store, 2, "A", 5.0, 10.0, 10.0));
        }
        let summary = detect_promotions(&rows, 0.10, 2);
        assert_eq!(summary[0].promo_coverage_sku, Some(0.4));
    }

    #[test]
    fn test_undated_rows_excluded_from_day_counting_only() {
        let mut undated = line("S1", 1, "A", 3.0, 8.0, 10.0);
        undated.date_of_sale = None;
        let rows = vec![line("S1", 1, "A", 4.0, 10.0, 10.0), undated];
        let summary = detect_promotions(&rows, 0.10, 2);
        let row = &summary[0];
        // The undated discounted line creates no promo day...
        assert_eq!(row.promo_days_count, 0);
        assert_eq!(row.baseline_days_count, 1);
        // ...but still participates in the row-level statistics
        assert_eq!(row.units_all, 7.0);
    }

    #[test]
    fn test_discount_depth_null_on_zero_rrp() {
        let mut t = line("S1", 1, "A", 1.0, 5.0, 0.0);
        t.derive_unit_price();
        assert_eq!(discount_depth(&t), None);
        let ok = line("S1", 1, "A", 1.0, 8.0, 10.0);
        let depth = discount_depth(&ok).unwrap();
        assert!((depth - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_split_price_stats_are_mean_of_split_means() {
        // Baseline split: prices 10, 10 (mean 10). Promo split: price 8.
        // avg_price_all = (10 + 8) / 2 = 9; units_all = total units.
        let rows = vec![
            line("S1", 1, "A", 4.0, 10.0, 10.0),
            line("S1", 2, "A", 6.0, 10.0, 10.0),
            line("S2", 3, "A", 2.0, 8.0, 10.0),
            line("S2", 4, "A", 2.0, 8.0, 10.0),
        ];
        let summary = detect_promotions(&rows, 0.10, 2);
        let row = &summary[0];
        assert_eq!(row.avg_price_all, Some(9.0));
        assert_eq!(row.units_all, 14.0);
    }

    #[test]
    fn test_first_non_null_attributes() {
        let mut anon = line("S1", 1, "A", 1.0, 10.0, 10.0);
        anon.description = None;
        anon.supplier = None;
        let named = line("S1", 2, "A", 1.0, 10.0, 10.0);
        let rows = vec![anon, named];
        let summary = detect_promotions(&rows, 0.10, 2);
        assert_eq!(summary[0].description.as_deref(), Some("desc A"));
        assert_eq!(summary[0].supplier.as_deref(), Some("Acme"));
    }
}
