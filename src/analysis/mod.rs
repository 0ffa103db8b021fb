//! Sample accumulation and statistics, one submodule per mode.

pub mod numa;
pub mod results;
pub mod stats;
pub mod thread_adj;

use crate::models::{Error, Result};
use std::fmt::Display;

/// Mean of a sample set that must not be empty.
pub(crate) fn required_mean(benchmark: &str, key: impl Display, samples: &[f64]) -> Result<f64> {
    stats::mean(samples).ok_or_else(|| Error::EmptySampleSet {
        benchmark: benchmark.to_string(),
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_mean() {
        assert_eq!(required_mean("mg", "cell", &[1.0, 3.0]).unwrap(), 2.0);
        assert!(matches!(
            required_mean("mg", "cpu 0 / mem 1", &[]),
            Err(Error::EmptySampleSet { .. })
        ));
    }
}
