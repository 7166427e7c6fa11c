// shelfscore-core/src/domain/stats.rs
//
// Shared numeric helpers for the scorers. Degenerate inputs (empty sets,
// zero weights, single-valued ranges) resolve to `None`, never to NaN/inf.

/// Mean of a finite sample; `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1); `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Weighted mean over (value, weight) pairs: `Σ(v·w) / Σ(w)`.
/// `None` when there are no pairs or the total weight is zero.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let total_w: f64 = pairs.iter().map(|(_, w)| w).sum();
    if total_w == 0.0 {
        return None;
    }
    let total_vw: f64 = pairs.iter().map(|(v, w)| v * w).sum();
    let avg = total_vw / total_w;
    avg.is_finite().then_some(avg)
}

/// Division that treats a zero or missing denominator as "insufficient
/// data" rather than inf.
pub fn safe_div(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Round to 4 decimal places (output contract for rate/score columns).
pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
