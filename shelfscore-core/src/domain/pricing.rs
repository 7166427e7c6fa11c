// shelfscore-core/src/domain/pricing.rs
//
// Price Indexer: units-weighted realised price of the target supplier
// against peers at (store, sub-department, section) grain, plus one global
// roll-up computed with the same weighting rule (a ratio of weighted
// totals, not a mean of per-segment indices).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::stats::{safe_div, weighted_mean};
use crate::domain::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceIndexRow {
    pub store_name: String,
    pub sub_department: String,
    pub section: String,
    pub bidco_avg_price: Option<f64>,
    pub bidco_units: Option<f64>,
    pub peer_avg_price: Option<f64>,
    pub peer_units: Option<f64>,
    pub price_index: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceIndexRollup {
    pub bidco_avg_price_rollup: Option<f64>,
    pub peer_avg_price_rollup: Option<f64>,
    pub price_index_rollup: Option<f64>,
}

/// Supplier-grain aggregate: mean realised price and summed units.
#[derive(Debug, Default)]
struct SupplierAccum {
    price_sum: f64,
    price_n: u64,
    units: f64,
}

impl SupplierAccum {
    fn avg_price(&self) -> Option<f64> {
        (self.price_n > 0).then(|| self.price_sum / self.price_n as f64)
    }
}

/// One side (target or peers) of a (store, sub-department, section) group.
#[derive(Debug, Default)]
struct SideAccum {
    // (avg_price, units) per supplier; price-less suppliers only add weight
    weighted: Vec<(f64, f64)>,
    units: f64,
    present: bool,
}

impl SideAccum {
    fn absorb(&mut self, s: &SupplierAccum) {
        self.present = true;
        self.units += s.units;
        if let Some(p) = s.avg_price() {
            self.weighted.push((p, s.units));
        }
    }

    fn avg_price(&self) -> Option<f64> {
        weighted_mean(&self.weighted)
    }

    fn total_units(&self) -> Option<f64> {
        self.present.then_some(self.units)
    }
}

pub fn compute_price_index(
    rows: &[Transaction],
    target_supplier: &str,
) -> (Vec<PriceIndexRow>, PriceIndexRollup) {
    let needle = target_supplier.to_lowercase();

    // 1. Supplier grain: (store, sub_department, section, supplier).
    //    Rows with a null grouping key belong to no group.
    let mut grain: BTreeMap<(String, String, String, String), SupplierAccum> = BTreeMap::new();
    for t in rows {
        let (Some(store), Some(sub), Some(section), Some(supplier)) = (
            t.store_name.as_ref(),
            t.sub_department.as_ref(),
            t.section.as_ref(),
            t.supplier.as_ref(),
        ) else {
            continue;
        };
        let acc = grain
            .entry((store.clone(), sub.clone(), section.clone(), supplier.clone()))
            .or_default();
        if let Some(p) = t.realised_unit_price {
            acc.price_sum += p;
            acc.price_n += 1;
        }
        if let Some(q) = t.quantity {
            acc.units += q;
        }
    }

    // 2. Partition into target vs peers per segment; outer-join semantics
    //    (a segment may have only one side).
    let mut segments: BTreeMap<(String, String, String), (SideAccum, SideAccum)> = BTreeMap::new();
    for ((store, sub, section, supplier), acc) in &grain {
        let entry = segments
            .entry((store.clone(), sub.clone(), section.clone()))
            .or_default();
        if supplier.to_lowercase().contains(&needle) {
            entry.0.absorb(acc);
        } else {
            entry.1.absorb(acc);
        }
    }

    let index: Vec<PriceIndexRow> = segments
        .into_iter()
        .map(|((store_name, sub_department, section), (bidco, peers))| {
            let bidco_avg_price = bidco.avg_price();
            let peer_avg_price = peers.avg_price();
            PriceIndexRow {
                store_name,
                sub_department,
                section,
                bidco_avg_price,
                bidco_units: bidco.total_units(),
                peer_avg_price,
                peer_units: peers.total_units(),
                price_index: safe_div(bidco_avg_price, peer_avg_price),
            }
        })
        .collect();

    // 3. Global roll-up: weighted average of each side across all segments,
    //    weighted by that side's units; null-price and zero-weight rows are
    //    skipped.
    let side_rollup = |price: fn(&PriceIndexRow) -> Option<f64>,
                       units: fn(&PriceIndexRow) -> Option<f64>|
     -> Option<f64> {
        let pairs: Vec<(f64, f64)> = index
            .iter()
            .filter_map(|r| match (price(r), units(r)) {
                (Some(p), Some(u)) if u != 0.0 => Some((p, u)),
                _ => None,
            })
            .collect();
        weighted_mean(&pairs)
    };

    let bidco_avg_price_rollup = side_rollup(|r| r.bidco_avg_price, |r| r.bidco_units);
    let peer_avg_price_rollup = side_rollup(|r| r.peer_avg_price, |r| r.peer_units);
    let rollup = PriceIndexRollup {
        bidco_avg_price_rollup,
        peer_avg_price_rollup,
        price_index_rollup: safe_div(bidco_avg_price_rollup, peer_avg_price_rollup),
    };

    (index, rollup)
}
