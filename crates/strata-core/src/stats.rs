//! Small statistics helpers shared by the cleanser and the KPI calculator.
//!
//! Quantiles use linear interpolation between the two closest ranks
//! (`pos = (n - 1) * q`), the same convention the upstream analytics
//! tooling uses, so percentile-based filters produce identical cutoffs.

/// Arithmetic mean. `None` on an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile `q` in `[0, 1]` with linear interpolation.
///
/// `values` does not need to be sorted; a sorted copy is made internally.
/// `None` on an empty slice.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    #[allow(clippy::cast_precision_loss)]
    let pos = (sorted.len() - 1) as f64 * q;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = pos.floor() as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let hi = pos.ceil() as usize;

    if lo == hi {
        Some(sorted[lo])
    } else {
        #[allow(clippy::cast_precision_loss)]
        let frac = pos - lo as f64;
        Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
    }
}

/// Median (the 0.5 quantile). `None` on an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Sample standard deviation (n − 1 denominator).
///
/// `None` when fewer than two values exist, since a single observation
/// has no spread.
#[must_use]
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    #[allow(clippy::cast_precision_loss)]
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Minimum, ignoring nothing. `None` on an empty slice.
#[must_use]
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Maximum. `None` on an empty slice.
#[must_use]
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}
