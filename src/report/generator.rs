//! Table generation.
//!
//! This module serializes computed statistics into the comma-delimited
//! tables the plot scripts read, plus an optional JSON summary.

use crate::analysis::numa::NumaStats;
use crate::analysis::results::{ResultsStats, WORKLOAD_COLUMNS};
use crate::analysis::thread_adj::ThreadAdjStats;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Header of the main results speedup table.
pub const RESULTS_HEADER: &str = "No workload,1 external app,3 external apps,7 external apps,\
No workload (NUMA),1 external app (NUMA),3 external apps (NUMA),7 external apps (NUMA),\
Average,Average (NUMA)";

/// Header of the main results standard deviation table.
pub const STD_DEVS_HEADER: &str = "Baseline,Baseline w/ 1 app,Baseline w/ 3 apps,Baseline w/ 7 apps,\
DynThreadAdj,DynThreadAdj w/ 1 app,DynThreadAdj w/ 3 apps,DynThreadAdj w/ 7 apps,\
NUMA-aware,NUMA-aware w/ 1 app,NUMA-aware w/ 3 apps,NUMA-aware w/ 7 apps";

/// Format a value the way the plot inputs expect: shortest round-trip
/// digits, integral values keep a `.0`, and decimal exponents below -4 or
/// from 16 up switch to `1.5e+17` / `5e-05` notation.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if value != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// One comma-joined line with a trailing newline.
fn push_row(table: &mut String, values: impl IntoIterator<Item = f64>) {
    let row: Vec<String> = values.into_iter().map(format_value).collect();
    table.push_str(&row.join(","));
    table.push('\n');
}

/// NUMA motivation table: one row per benchmark, memory node 0 omitted.
pub fn numa_table(stats: &[NumaStats]) -> String {
    let mut table = String::new();

    for bench in stats {
        // Column 0 is the normalizer and always 1.
        push_row(&mut table, bench.ratios.iter().skip(1).copied());
    }

    table
}

/// Main results speedup table followed by the overall averages row.
pub fn results_table(stats: &[ResultsStats], averages: &[f64]) -> String {
    let mut table = String::new();
    table.push_str(RESULTS_HEADER);
    table.push('\n');

    for bench in stats {
        let row = bench.speedup_row();
        if row.len() != 2 * WORKLOAD_COLUMNS {
            warn!(
                "{}: {} speedup column(s), header expects {}",
                bench.benchmark,
                row.len(),
                2 * WORKLOAD_COLUMNS
            );
        }
        push_row(&mut table, row);
    }
    push_row(&mut table, averages.iter().copied());

    table
}

/// Main results standard deviation table.
pub fn std_devs_table(stats: &[ResultsStats]) -> String {
    let mut table = String::new();
    table.push_str(STD_DEVS_HEADER);
    table.push('\n');

    for bench in stats {
        push_row(&mut table, bench.std_dev_row());
    }

    table
}

/// Thread-adjustment motivation table, co-runners in ascending order.
pub fn thread_adj_table(stats: &[ThreadAdjStats]) -> String {
    let mut table = String::new();

    for bench in stats {
        push_row(&mut table, bench.ratios.values().copied());
    }

    table
}

/// Write a generated table to disk.
pub fn write_table(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write table to {}", path.display()))?;
    info!(
        "Wrote {} row(s) to {}",
        content.lines().count(),
        path.display()
    );
    Ok(())
}

/// Machine-readable record of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary<'a, T> {
    pub mode: &'a str,
    pub generated_at: DateTime<Utc>,
    pub benchmarks: &'a [T],
}

impl<'a, T: Serialize> Summary<'a, T> {
    pub fn new(mode: &'a str, benchmarks: &'a [T]) -> Self {
        Self {
            mode,
            generated_at: Utc::now(),
            benchmarks,
        }
    }
}

/// Generate a JSON summary.
pub fn generate_json_summary<T: Serialize>(summary: &Summary<'_, T>) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write a JSON summary to a file.
pub fn write_json_summary<T: Serialize>(summary: &Summary<'_, T>, path: &Path) -> Result<()> {
    let content = generate_json_summary(summary)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write summary to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::results::WorkloadStats;
    use std::collections::BTreeMap;

    fn workload(name: &str, std_dev: f64, speedup: Option<f64>) -> WorkloadStats {
        WorkloadStats {
            workload: name.to_string(),
            mean: 1.0,
            std_dev,
            speedup,
        }
    }

    fn results_stats(bench: &str, speedup: f64) -> ResultsStats {
        let names = ["0", "1", "3", "7"];
        ResultsStats {
            benchmark: bench.to_string(),
            baseline: names.iter().map(|n| workload(n, 0.5, None)).collect(),
            thread_adjustment: names.iter().map(|n| workload(n, 0.25, Some(speedup))).collect(),
            numa_aware: names.iter().map(|n| workload(n, 0.125, Some(speedup * 2.0))).collect(),
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.2), "1.2");
        assert_eq!(format_value(2.0), "2.0");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_value(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(format_value(f64::INFINITY), "inf");
    }

    #[test]
    fn test_format_value_exponent_range() {
        assert_eq!(format_value(0.0001), "0.0001");
        assert_eq!(format_value(0.00005), "5e-05");
        assert_eq!(format_value(-2.5e-7), "-2.5e-07");
        assert_eq!(format_value(1e15), "1000000000000000.0");
        assert_eq!(format_value(1e16), "1e+16");
        assert_eq!(format_value(1.5e17), "1.5e+17");
        assert_eq!(format_value(1e100), "1e+100");
    }

    #[test]
    fn test_numa_table_drops_first_column() {
        let stats = vec![
            NumaStats {
                benchmark: "mg".to_string(),
                ratios: vec![1.0, 1.5, 2.0, 0.75],
            },
            NumaStats {
                benchmark: "cg".to_string(),
                ratios: vec![1.0, 1.25],
            },
        ];
        assert_eq!(numa_table(&stats), "1.5,2.0,0.75\n1.25\n");
    }

    #[test]
    fn test_results_table_layout() {
        let stats = vec![results_stats("bt", 2.0), results_stats("cg", 1.0)];
        let table = results_table(&stats, &[0.5; 8]);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines[0], RESULTS_HEADER);
        assert_eq!(lines[1], "2.0,2.0,2.0,2.0,4.0,4.0,4.0,4.0");
        assert_eq!(lines[2], "1.0,1.0,1.0,1.0,2.0,2.0,2.0,2.0");
        assert_eq!(lines[3], "0.5,0.5,0.5,0.5,0.5,0.5,0.5,0.5");
        assert!(table.ends_with("0.5\n"));
        assert!(!table.contains(",\n"));
    }

    #[test]
    fn test_std_devs_table_layout() {
        let table = std_devs_table(&[results_stats("bt", 2.0)]);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(',').count(), 12);
        assert_eq!(
            lines[1],
            "0.5,0.5,0.5,0.5,0.25,0.25,0.25,0.25,0.125,0.125,0.125,0.125"
        );
    }

    #[test]
    fn test_thread_adj_table_sorted_columns() {
        let ratios: BTreeMap<String, f64> = [("mg", 0.5), ("cg", 2.0), ("dc.W.x", 0.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let stats = vec![ThreadAdjStats {
            benchmark: "dc.W.x".to_string(),
            ratios,
        }];
        assert_eq!(thread_adj_table(&stats), "2.0,0.0,0.5\n");
    }

    #[test]
    fn test_json_summary() {
        let stats = vec![NumaStats {
            benchmark: "mg".to_string(),
            ratios: vec![1.0, 1.2],
        }];
        let json = generate_json_summary(&Summary::new("numa", &stats)).unwrap();

        assert!(json.contains("\"mode\": \"numa\""));
        assert!(json.contains("\"generated_at\""));
        assert!(json.contains("\"benchmark\": \"mg\""));
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_table(&path, "1.2\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.2\n");
    }
}
