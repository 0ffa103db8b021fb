//! Log file classification.
//!
//! Turns a log file into a [`LogRecord`]: the hyphen-delimited file name
//! supplies the benchmark and the mode-specific dimensions, and the body
//! supplies the elapsed time.

use crate::models::{CorunKey, Error, LogRecord, NumaCell, Result, RunKey};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Substring of the log line that carries the elapsed time.
pub const MARKER: &str = "Time in seconds";

/// File names containing this are never classified.
pub const SKIP_PATTERN: &str = "lu";

/// Whitespace-delimited position of the time value on the marker line.
const TIME_FIELD: usize = 4;

/// Mode-specific interpretation of the file name tokens after the benchmark.
pub trait Classify {
    /// Dimensions the samples are grouped by.
    type Key;

    /// Builds the key from the second and third file name tokens.
    fn key(&self, name: &str, dim1: &str, dim2: &str) -> Result<Self::Key>;
}

/// `<bench>-<cpu node>-<mem node>-...`
#[derive(Debug, Clone, Copy)]
pub struct NumaClassifier {
    pub nodes: usize,
}

impl Classify for NumaClassifier {
    type Key = NumaCell;

    fn key(&self, name: &str, dim1: &str, dim2: &str) -> Result<NumaCell> {
        let cpu: usize = parse_index(name, dim1)?;
        let mem: usize = parse_index(name, dim2)?;
        for node in [cpu, mem] {
            if node >= self.nodes {
                return Err(Error::NodeOutOfRange {
                    name: name.to_string(),
                    node,
                    nodes: self.nodes,
                });
            }
        }
        Ok(NumaCell { cpu, mem })
    }
}

/// `<bench>-<external workload>-<iteration>[.ext]`
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsClassifier;

impl Classify for ResultsClassifier {
    type Key = RunKey;

    fn key(&self, name: &str, dim1: &str, dim2: &str) -> Result<RunKey> {
        Ok(RunKey {
            workload: dim1.to_string(),
            iteration: parse_index(name, dim2)?,
        })
    }
}

/// `<bench>-<co-running bench>-<thread count>[.ext]`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadAdjClassifier;

impl Classify for ThreadAdjClassifier {
    type Key = CorunKey;

    fn key(&self, name: &str, dim1: &str, dim2: &str) -> Result<CorunKey> {
        Ok(CorunKey {
            other: dim1.to_string(),
            threads: parse_index(name, dim2)?,
        })
    }
}

/// Check whether a file name belongs to the excluded benchmark.
pub fn is_skipped(name: &str) -> bool {
    name.contains(SKIP_PATTERN)
}

/// Classify a single log file.
pub fn classify<C: Classify>(classifier: &C, path: &Path) -> Result<LogRecord<C::Key>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let tokens: Vec<&str> = name.split('-').collect();
    if tokens.len() < 3 {
        let found = tokens.len();
        return Err(Error::MalformedFileName {
            name,
            reason: format!("expected at least 3 '-' separated fields, found {}", found),
        });
    }

    let key = classifier.key(&name, tokens[1], tokens[2])?;
    let elapsed_seconds = parse_elapsed(path)?;
    debug!("{} -> {} ({}s)", name, tokens[0], elapsed_seconds);

    Ok(LogRecord {
        source_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        benchmark: tokens[0].to_string(),
        key,
        elapsed_seconds,
    })
}

/// Read the elapsed time from a log file.
///
/// The last line containing [`MARKER`] wins.
pub fn parse_elapsed(path: &Path) -> Result<f64> {
    let io_error = |source: std::io::Error| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut marker_line = None;
    for line in reader.lines() {
        let line = line.map_err(io_error)?;
        if line.contains(MARKER) {
            marker_line = Some(line);
        }
    }

    let line = marker_line.ok_or_else(|| Error::MissingMarkerLine {
        path: path.to_path_buf(),
    })?;
    let token = line
        .split_whitespace()
        .nth(TIME_FIELD)
        .ok_or_else(|| Error::MalformedMarkerLine {
            path: path.to_path_buf(),
            line: line.clone(),
        })?;

    token.parse::<f64>().map_err(|_| Error::InvalidTime {
        path: path.to_path_buf(),
        token: token.to_string(),
    })
}

/// Parse a numeric file name token, ignoring any `.ext` suffix.
fn parse_index<T: FromStr>(name: &str, token: &str) -> Result<T> {
    let stem = token.split('.').next().unwrap_or(token);
    stem.parse::<T>().map_err(|_| Error::MalformedFileName {
        name: name.to_string(),
        reason: format!("{:?} is not a non-negative integer in range", token),
    })
}
