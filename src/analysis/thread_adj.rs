//! Thread-adjustment motivation heat map.
//!
//! Each benchmark is co-run with every other benchmark, once with as many
//! threads as processors and once with half as many. The reported value is
//! how much faster the half-thread run is.

use super::required_mean;
use crate::models::{CorunKey, LogRecord, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Benchmark whose self-pairing is always reported as 0.
pub const ZEROED_BENCHMARK: &str = "dc.W.x";

/// Samples of one benchmark, by co-running benchmark then thread count.
#[derive(Debug, Clone, Default)]
pub struct ThreadAdjBenchmark {
    pub name: String,
    samples: BTreeMap<String, BTreeMap<u32, Vec<f64>>>,
}

/// Speedup of the half-thread run per co-running benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadAdjStats {
    pub benchmark: String,
    pub ratios: BTreeMap<String, f64>,
}

impl ThreadAdjBenchmark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, record: &LogRecord<CorunKey>) {
        self.samples
            .entry(record.key.other.clone())
            .or_default()
            .entry(record.key.threads)
            .or_default()
            .push(record.elapsed_seconds);
    }

    /// Samples recorded for a co-runner and thread count.
    pub fn samples(&self, other: &str, threads: u32) -> &[f64] {
        self.samples
            .get(other)
            .and_then(|t| t.get(&threads))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mean at `procs` threads over mean at `procs / 2` threads, per co-runner.
    pub fn stats(&self, procs: u32) -> Result<ThreadAdjStats> {
        let max_threads = procs;
        let half_threads = procs / 2;

        let mut ratios = BTreeMap::new();
        for other in self.samples.keys() {
            let baseline = required_mean(
                &self.name,
                format!("co-runner {} at {} threads", other, max_threads),
                self.samples(other, max_threads),
            )?;
            let adjusted = required_mean(
                &self.name,
                format!("co-runner {} at {} threads", other, half_threads),
                self.samples(other, half_threads),
            )?;
            ratios.insert(other.clone(), baseline / adjusted);
        }

        if self.name == ZEROED_BENCHMARK {
            ratios.insert(ZEROED_BENCHMARK.to_string(), 0.0);
        }

        debug!("{}: {} co-runner(s)", self.name, ratios.len());
        Ok(ThreadAdjStats {
            benchmark: self.name.clone(),
            ratios,
        })
    }
}

/// Route records into per-benchmark sample sets.
pub fn aggregate(records: &[LogRecord<CorunKey>]) -> BTreeMap<String, ThreadAdjBenchmark> {
    let mut benches: BTreeMap<String, ThreadAdjBenchmark> = BTreeMap::new();

    for record in records {
        benches
            .entry(record.benchmark.clone())
            .or_insert_with(|| ThreadAdjBenchmark::new(record.benchmark.clone()))
            .add(record);
    }

    benches
}

/// Statistics for every benchmark, in descending name order.
pub fn compute(
    benches: &BTreeMap<String, ThreadAdjBenchmark>,
    procs: u32,
) -> Result<Vec<ThreadAdjStats>> {
    benches.values().rev().map(|b| b.stats(procs)).collect()
}
