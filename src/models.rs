//! Data models for the benchmark aggregator.
//!
//! This module contains the records parsed out of log files, the
//! configuration variants they belong to, and the error taxonomy shared by
//! the scanner and the statistics code.

use std::fmt;
use std::path::{Path, PathBuf};

/// Experimental configuration that produced a directory of logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    /// Static thread count, no adjustment.
    Baseline,
    /// Dynamic thread-count adjustment.
    ThreadAdjustment,
    /// NUMA-aware dynamic thread-count adjustment.
    NumaAware,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Baseline => write!(f, "baseline"),
            Variant::ThreadAdjustment => write!(f, "thread adjustment"),
            Variant::NumaAware => write!(f, "NUMA-aware"),
        }
    }
}

impl Variant {
    /// Classifies a results directory by its path.
    ///
    /// `"baseline"` wins over `"numa"`; anything else is the plain
    /// thread-adjustment run.
    pub fn classify(dir: &Path) -> Self {
        let path = dir.to_string_lossy();
        if path.contains("baseline") {
            Variant::Baseline
        } else if path.contains("numa") {
            Variant::NumaAware
        } else {
            Variant::ThreadAdjustment
        }
    }
}

/// A single observation extracted from one log file.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord<K> {
    /// Directory the log was found in.
    pub source_dir: PathBuf,
    /// Benchmark name (first filename token).
    pub benchmark: String,
    /// Mode-specific dimensions parsed from the filename.
    pub key: K,
    /// Value from the `Time in seconds` line.
    pub elapsed_seconds: f64,
}

/// CPU/memory placement of a NUMA motivation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumaCell {
    pub cpu: usize,
    pub mem: usize,
}

/// External workload and iteration of a main results run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunKey {
    /// External-workload identifier, kept as the raw filename token.
    pub workload: String,
    pub iteration: u32,
}

/// Co-running benchmark and thread count of a thread-adjustment motivation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorunKey {
    pub other: String,
    pub threads: u32,
}

/// Errors raised while classifying logs and computing statistics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading a log file or listing a directory failed.
    #[error("Reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The log has no `Time in seconds` line.
    #[error("Log file {path:?} has no \"Time in seconds\" line")]
    MissingMarkerLine { path: PathBuf },

    /// The marker line is too short to hold a time value.
    #[error("Log file {path:?}: marker line has no time field: {line:?}")]
    MalformedMarkerLine { path: PathBuf, line: String },

    /// The time field is not a number.
    #[error("Log file {path:?}: invalid time value {token:?}")]
    InvalidTime { path: PathBuf, token: String },

    /// The file name does not follow `<bench>-<dim1>-<dim2>`.
    #[error("Malformed log file name {name:?}: {reason}")]
    MalformedFileName { name: String, reason: String },

    /// A NUMA node index lies outside the configured node count.
    #[error("Log file {name:?}: node {node} is out of range for {nodes} node(s)")]
    NodeOutOfRange {
        name: String,
        node: usize,
        nodes: usize,
    },

    /// A statistic was requested for a key with no samples.
    #[error("Benchmark {benchmark}: no samples for {key}")]
    EmptySampleSet { benchmark: String, key: String },

    /// No directory of the needed configuration contributed to a benchmark.
    #[error("Benchmark {benchmark}: no {variant} results directory")]
    UnknownConfigurationDirectory { benchmark: String, variant: Variant },

    /// More external-workload keys than the results table has columns for.
    #[error("Benchmark {benchmark}: {found} external workloads, the table holds {expected}")]
    TooManyWorkloads {
        benchmark: String,
        found: usize,
        expected: usize,
    },
}

/// Result alias for classification and statistics.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_classify() {
        assert_eq!(
            Variant::classify(Path::new("/data/external_workload_baseline")),
            Variant::Baseline
        );
        assert_eq!(
            Variant::classify(Path::new("/data/external_workload_numa")),
            Variant::NumaAware
        );
        assert_eq!(
            Variant::classify(Path::new("/data/external_workload")),
            Variant::ThreadAdjustment
        );
    }

    #[test]
    fn test_variant_classify_baseline_wins() {
        assert_eq!(
            Variant::classify(Path::new("numa_baseline")),
            Variant::Baseline
        );
    }

    #[test]
    fn test_error_messages() {
        let err = Error::EmptySampleSet {
            benchmark: "mg".to_string(),
            key: "cpu 0 / mem 1".to_string(),
        };
        assert_eq!(err.to_string(), "Benchmark mg: no samples for cpu 0 / mem 1");

        let err = Error::UnknownConfigurationDirectory {
            benchmark: "cg".to_string(),
            variant: Variant::NumaAware,
        };
        assert!(err.to_string().contains("NUMA-aware"));
    }
}
