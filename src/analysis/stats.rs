//! Sample statistics.

/// Arithmetic mean, `None` for an empty sample set.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation around `reference`, `None` for an empty sample set.
///
/// The reference is not necessarily the mean of `samples`.
pub fn std_dev(samples: &[f64], reference: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|s| (reference - s).powi(2)).sum();
    Some((sum / samples.len() as f64).sqrt())
}

/// Baseline mean over configuration mean; above 1 is an improvement.
pub fn speedup(baseline_mean: f64, config_mean: f64) -> f64 {
    baseline_mean / config_mean
}
