//! Main results: speedups of the two thread-adjustment configurations over
//! the baseline, per external workload.

use super::{required_mean, stats};
use crate::models::{Error, LogRecord, Result, RunKey, Variant};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Iterations below this index are warm-up runs and are discarded.
pub const WARMUP_ITERATIONS: u32 = 5;

/// External workloads per configuration in the output table.
pub const WORKLOAD_COLUMNS: usize = 4;

/// Divisor of the overall averages row.
pub const AVERAGE_DIVISOR: f64 = 9.0;

/// Samples of one benchmark, by configuration then external workload.
#[derive(Debug, Clone, Default)]
pub struct ResultsBenchmark {
    pub name: String,
    samples: BTreeMap<Variant, BTreeMap<String, Vec<f64>>>,
}

/// Derived values for one external workload of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadStats {
    pub workload: String,
    pub mean: f64,
    pub std_dev: f64,
    /// Absent for the baseline itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speedup: Option<f64>,
}

/// Statistics of one benchmark across all three configurations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsStats {
    pub benchmark: String,
    pub baseline: Vec<WorkloadStats>,
    pub thread_adjustment: Vec<WorkloadStats>,
    pub numa_aware: Vec<WorkloadStats>,
}

impl ResultsStats {
    /// Thread-adjustment speedups followed by NUMA-aware speedups.
    pub fn speedup_row(&self) -> Vec<f64> {
        self.thread_adjustment
            .iter()
            .chain(&self.numa_aware)
            .filter_map(|w| w.speedup)
            .collect()
    }

    /// Baseline, thread-adjustment, then NUMA-aware standard deviations.
    pub fn std_dev_row(&self) -> Vec<f64> {
        self.baseline
            .iter()
            .chain(&self.thread_adjustment)
            .chain(&self.numa_aware)
            .map(|w| w.std_dev)
            .collect()
    }
}

impl ResultsBenchmark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: BTreeMap::new(),
        }
    }

    /// Append the record's runtime. Returns `false` for a discarded warm-up run.
    pub fn add(&mut self, record: &LogRecord<RunKey>) -> bool {
        if record.key.iteration < WARMUP_ITERATIONS {
            return false;
        }

        let variant = Variant::classify(&record.source_dir);
        self.samples
            .entry(variant)
            .or_default()
            .entry(record.key.workload.clone())
            .or_default()
            .push(record.elapsed_seconds);
        true
    }

    /// Samples recorded for a configuration and workload.
    #[cfg(test)]
    pub fn samples(&self, variant: Variant, workload: &str) -> &[f64] {
        self.samples
            .get(&variant)
            .and_then(|w| w.get(workload))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn variant(&self, variant: Variant) -> Result<&BTreeMap<String, Vec<f64>>> {
        let workloads = self
            .samples
            .get(&variant)
            .ok_or_else(|| Error::UnknownConfigurationDirectory {
                benchmark: self.name.clone(),
                variant,
            })?;
        if workloads.len() > WORKLOAD_COLUMNS {
            return Err(Error::TooManyWorkloads {
                benchmark: self.name.clone(),
                found: workloads.len(),
                expected: WORKLOAD_COLUMNS,
            });
        }
        Ok(workloads)
    }

    /// Baseline means and deviations, then speedups of both adjusted
    /// configurations. Every deviation is taken around its own mean.
    pub fn stats(&self) -> Result<ResultsStats> {
        let baseline = self
            .variant(Variant::Baseline)?
            .iter()
            .map(|(workload, samples)| {
                let mean = required_mean(&self.name, workload_key(Variant::Baseline, workload), samples)?;
                Ok(WorkloadStats {
                    workload: workload.clone(),
                    mean,
                    std_dev: stats::std_dev(samples, mean).unwrap_or_default(),
                    speedup: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let thread_adjustment = self.compare(Variant::ThreadAdjustment, &baseline)?;
        let numa_aware = self.compare(Variant::NumaAware, &baseline)?;

        Ok(ResultsStats {
            benchmark: self.name.clone(),
            baseline,
            thread_adjustment,
            numa_aware,
        })
    }

    fn compare(&self, variant: Variant, baseline: &[WorkloadStats]) -> Result<Vec<WorkloadStats>> {
        self.variant(variant)?
            .iter()
            .map(|(workload, samples)| {
                let mean = required_mean(&self.name, workload_key(variant, workload), samples)?;
                let baseline_mean = baseline
                    .iter()
                    .find(|b| &b.workload == workload)
                    .map(|b| b.mean)
                    .ok_or_else(|| Error::EmptySampleSet {
                        benchmark: self.name.clone(),
                        key: workload_key(Variant::Baseline, workload),
                    })?;

                Ok(WorkloadStats {
                    workload: workload.clone(),
                    mean,
                    std_dev: stats::std_dev(samples, mean).unwrap_or_default(),
                    speedup: Some(stats::speedup(baseline_mean, mean)),
                })
            })
            .collect()
    }
}

fn workload_key(variant: Variant, workload: &str) -> String {
    format!("{} external workload {}", variant, workload)
}

/// Route records into per-benchmark sample sets. Returns the benchmarks and
/// the number of discarded warm-up runs.
pub fn aggregate(records: &[LogRecord<RunKey>]) -> (BTreeMap<String, ResultsBenchmark>, usize) {
    let mut benches: BTreeMap<String, ResultsBenchmark> = BTreeMap::new();
    let mut warmups = 0;

    for record in records {
        let kept = benches
            .entry(record.benchmark.clone())
            .or_insert_with(|| ResultsBenchmark::new(record.benchmark.clone()))
            .add(record);
        if !kept {
            warmups += 1;
        }
    }

    debug!("Discarded {} warm-up run(s)", warmups);
    (benches, warmups)
}

/// Statistics for every benchmark, in ascending name order.
pub fn compute(benches: &BTreeMap<String, ResultsBenchmark>) -> Result<Vec<ResultsStats>> {
    benches.values().map(ResultsBenchmark::stats).collect()
}

/// Column sums of the speedup rows divided by [`AVERAGE_DIVISOR`].
pub fn overall_averages(stats: &[ResultsStats]) -> Vec<f64> {
    let mut averages = vec![0.0; 2 * WORKLOAD_COLUMNS];

    for bench in stats {
        for (i, w) in bench.thread_adjustment.iter().enumerate() {
            averages[i] += w.speedup.unwrap_or_default();
        }
        for (i, w) in bench.numa_aware.iter().enumerate() {
            averages[i + WORKLOAD_COLUMNS] += w.speedup.unwrap_or_default();
        }
    }

    averages.iter().map(|sum| sum / AVERAGE_DIVISOR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report;
    use crate::scanner::{LogScanner, ResultsClassifier, ScanConfig};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const BASELINE_DIR: &str = "runs/external_workload_baseline";
    const THREAD_ADJ_DIR: &str = "runs/external_workload";
    const NUMA_DIR: &str = "runs/external_workload_numa";

    fn record(dir: &str, bench: &str, workload: &str, iteration: u32, time: f64) -> LogRecord<RunKey> {
        LogRecord {
            source_dir: PathBuf::from(dir),
            benchmark: bench.to_string(),
            key: RunKey {
                workload: workload.to_string(),
                iteration,
            },
            elapsed_seconds: time,
        }
    }

    fn runs(dir: &str, bench: &str, workload: &str, times: &[f64]) -> Vec<LogRecord<RunKey>> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| record(dir, bench, workload, WARMUP_ITERATIONS + i as u32, t))
            .collect()
    }

    #[test]
    fn test_warmup_runs_discarded() {
        let mut records = vec![
            record(BASELINE_DIR, "mg", "0", 0, 100.0),
            record(BASELINE_DIR, "mg", "0", 4, 100.0),
        ];
        records.extend(runs(BASELINE_DIR, "mg", "0", &[20.0, 22.0]));

        let (benches, warmups) = aggregate(&records);
        assert_eq!(warmups, 2);
        assert_eq!(benches["mg"].samples(Variant::Baseline, "0"), &[20.0, 22.0]);
    }

    #[test]
    fn test_records_routed_by_directory() {
        let mut records = runs(BASELINE_DIR, "mg", "1", &[20.0]);
        records.extend(runs(THREAD_ADJ_DIR, "mg", "1", &[10.0]));
        records.extend(runs(NUMA_DIR, "mg", "1", &[5.0]));

        let (benches, _) = aggregate(&records);
        let mg = &benches["mg"];
        assert_eq!(mg.samples(Variant::Baseline, "1"), &[20.0]);
        assert_eq!(mg.samples(Variant::ThreadAdjustment, "1"), &[10.0]);
        assert_eq!(mg.samples(Variant::NumaAware, "1"), &[5.0]);
    }

    #[test]
    fn test_speedup_of_two() {
        let mut records = runs(BASELINE_DIR, "mg", "0", &[20.0; 6]);
        records.extend(runs(THREAD_ADJ_DIR, "mg", "0", &[10.0; 6]));
        records.extend(runs(NUMA_DIR, "mg", "0", &[20.0; 6]));

        let (benches, _) = aggregate(&records);
        let stats = benches["mg"].stats().unwrap();
        assert_eq!(stats.thread_adjustment[0].speedup, Some(2.0));
        assert_eq!(stats.numa_aware[0].speedup, Some(1.0));
        assert_eq!(stats.speedup_row(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_std_devs_around_own_means() {
        let mut records = runs(BASELINE_DIR, "mg", "0", &[18.0, 22.0]);
        records.extend(runs(THREAD_ADJ_DIR, "mg", "0", &[9.0, 11.0]));
        records.extend(runs(NUMA_DIR, "mg", "0", &[10.0, 10.0]));

        let (benches, _) = aggregate(&records);
        let stats = benches["mg"].stats().unwrap();
        assert_eq!(stats.std_dev_row(), vec![2.0, 1.0, 0.0]);
        assert_eq!(stats.baseline[0].speedup, None);
    }

    #[test]
    fn test_workloads_in_lexicographic_order() {
        let mut records = Vec::new();
        for (workload, base, adjusted) in [("7", 40.0, 10.0), ("0", 10.0, 10.0), ("3", 30.0, 10.0)] {
            records.extend(runs(BASELINE_DIR, "mg", workload, &[base]));
            records.extend(runs(THREAD_ADJ_DIR, "mg", workload, &[adjusted]));
            records.extend(runs(NUMA_DIR, "mg", workload, &[adjusted]));
        }

        let (benches, _) = aggregate(&records);
        let stats = benches["mg"].stats().unwrap();
        let order: Vec<_> = stats.thread_adjustment.iter().map(|w| w.workload.as_str()).collect();
        assert_eq!(order, vec!["0", "3", "7"]);
        assert_eq!(stats.speedup_row(), vec![1.0, 3.0, 4.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_missing_configuration() {
        let mut records = runs(BASELINE_DIR, "mg", "0", &[20.0]);
        records.extend(runs(THREAD_ADJ_DIR, "mg", "0", &[10.0]));

        let (benches, _) = aggregate(&records);
        assert!(matches!(
            benches["mg"].stats(),
            Err(Error::UnknownConfigurationDirectory {
                variant: Variant::NumaAware,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_baseline_workload() {
        let mut records = runs(BASELINE_DIR, "mg", "0", &[20.0]);
        records.extend(runs(THREAD_ADJ_DIR, "mg", "1", &[10.0]));
        records.extend(runs(NUMA_DIR, "mg", "0", &[10.0]));

        let (benches, _) = aggregate(&records);
        assert!(matches!(
            benches["mg"].stats(),
            Err(Error::EmptySampleSet { .. })
        ));
    }

    #[test]
    fn test_too_many_workloads() {
        let mut records = Vec::new();
        for workload in ["0", "1", "3", "7", "15"] {
            records.extend(runs(BASELINE_DIR, "mg", workload, &[1.0]));
        }

        let (benches, _) = aggregate(&records);
        assert!(matches!(
            benches["mg"].stats(),
            Err(Error::TooManyWorkloads { found: 5, .. })
        ));
    }

    #[test]
    fn test_overall_averages() {
        let mut records = Vec::new();
        for bench in ["bt", "cg", "mg"] {
            records.extend(runs(BASELINE_DIR, bench, "0", &[27.0]));
            records.extend(runs(THREAD_ADJ_DIR, bench, "0", &[9.0]));
            records.extend(runs(NUMA_DIR, bench, "0", &[27.0]));
        }

        let (benches, _) = aggregate(&records);
        let stats = compute(&benches).unwrap();
        let averages = overall_averages(&stats);
        assert_eq!(averages.len(), 8);
        // (3 + 3 + 3) / 9 and (1 + 1 + 1) / 9
        assert_eq!(averages[0], 1.0);
        assert!((averages[4] - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(averages[1], 0.0);
    }

    #[test]
    fn test_end_to_end_speedup_column() {
        let root = TempDir::new().unwrap();
        let dirs: Vec<PathBuf> = ["external_workload_baseline", "external_workload", "external_workload_numa"]
            .iter()
            .map(|name| root.path().join(name))
            .collect();
        for (dir, time) in dirs.iter().zip(["20.0", "10.0", "8.0"]) {
            std::fs::create_dir(dir).unwrap();
            for iteration in 0..11 {
                // Warm-up runs carry a value that would skew every column.
                let value = if iteration < 5 { "1000.0" } else { time };
                std::fs::write(
                    dir.join(format!("mg.C.x-0-{}.log", iteration)),
                    format!(" Time in seconds =  {}\n", value),
                )
                .unwrap();
            }
        }

        let scanner = LogScanner::new(ScanConfig {
            show_progress: false,
        });
        let outcome = scanner.scan(&dirs, &ResultsClassifier).unwrap();
        assert_eq!(outcome.records.len(), 33);

        let (benches, warmups) = aggregate(&outcome.records);
        assert_eq!(warmups, 15);
        let stats = compute(&benches).unwrap();
        assert_eq!(stats[0].speedup_row(), vec![2.0, 2.5]);

        let table = report::results_table(&stats, &overall_averages(&stats));
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2.0,2.5");
    }
}
