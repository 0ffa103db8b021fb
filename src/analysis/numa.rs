//! NUMA motivation heat map.
//!
//! Every benchmark is run with its threads on one node and its memory on
//! another. Runtimes are normalized by the local `[0][0]` placement, and only
//! CPU node 0 is reported.

use super::required_mean;
use crate::models::{Error, LogRecord, NumaCell, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Samples of one benchmark, indexed `[cpu node][memory node]`.
#[derive(Debug, Clone)]
pub struct NumaBenchmark {
    pub name: String,
    samples: Vec<Vec<Vec<f64>>>,
}

/// Runtime ratios of one benchmark on CPU node 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumaStats {
    pub benchmark: String,
    /// `ratios[mem]` is the mean at `[0][mem]` over the mean at `[0][0]`.
    pub ratios: Vec<f64>,
}

impl NumaBenchmark {
    /// Create an empty `nodes x nodes` sample matrix.
    pub fn new(name: impl Into<String>, nodes: usize) -> Self {
        Self {
            name: name.into(),
            samples: vec![vec![Vec::new(); nodes]; nodes],
        }
    }

    /// Append the record's runtime to its cell.
    pub fn add(&mut self, record: &LogRecord<NumaCell>) -> Result<()> {
        let nodes = self.samples.len();
        let NumaCell { cpu, mem } = record.key;
        let cell = self
            .samples
            .get_mut(cpu)
            .and_then(|row| row.get_mut(mem))
            .ok_or_else(|| Error::NodeOutOfRange {
                name: record.benchmark.clone(),
                node: cpu.max(mem),
                nodes,
            })?;
        cell.push(record.elapsed_seconds);
        Ok(())
    }

    /// Samples recorded for a cell.
    pub fn samples(&self, cell: NumaCell) -> &[f64] {
        self.samples
            .get(cell.cpu)
            .and_then(|row| row.get(cell.mem))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Normalize CPU node 0 by the `[0][0]` cell.
    pub fn stats(&self) -> Result<NumaStats> {
        let nodes = self.samples.len();
        let cell_key = |mem: usize| format!("cpu 0 / mem {}", mem);

        let baseline = required_mean(&self.name, cell_key(0), self.samples(NumaCell { cpu: 0, mem: 0 }))?;
        let ratios = (0..nodes)
            .map(|mem| {
                let average =
                    required_mean(&self.name, cell_key(mem), self.samples(NumaCell { cpu: 0, mem }))?;
                Ok(average / baseline)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NumaStats {
            benchmark: self.name.clone(),
            ratios,
        })
    }
}

/// Route records into per-benchmark matrices.
pub fn aggregate(
    records: &[LogRecord<NumaCell>],
    nodes: usize,
) -> Result<BTreeMap<String, NumaBenchmark>> {
    let mut benches: BTreeMap<String, NumaBenchmark> = BTreeMap::new();

    for record in records {
        benches
            .entry(record.benchmark.clone())
            .or_insert_with(|| NumaBenchmark::new(record.benchmark.clone(), nodes))
            .add(record)?;
    }

    Ok(benches)
}

/// Statistics for every benchmark, in descending name order.
pub fn compute(benches: &BTreeMap<String, NumaBenchmark>) -> Result<Vec<NumaStats>> {
    benches.values().rev().map(NumaBenchmark::stats).collect()
}
