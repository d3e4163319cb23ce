//! Descriptive statistics over plain `f64` samples.
//!
//! Quantiles use linear interpolation between closest ranks: the q-th
//! quantile of `n` sorted values sits at position `(n - 1) * q`. The median
//! is the 0.5 quantile, so an even-sized sample gives the mean of the two
//! middle values.

/// Return a sorted copy of the sample. NaN values are dropped.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    out.sort_by(f64::total_cmp);
    out
}

/// Quantile of an already sorted sample. `None` for an empty sample.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Quantile of an unsorted sample.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(values), q)
}

/// Median of the sample.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Arithmetic mean. NaN for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (denominator `n`). NaN for an empty sample.
pub fn population_std(values: &[f64]) -> f64 {
    let mu = mean(values);
    if mu.is_nan() {
        return f64::NAN;
    }
    let variance =
        values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
