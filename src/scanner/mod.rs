//! Log directory scanner.
//!
//! Lists the log files of one or more result directories in a stable order
//! and classifies each of them.

pub mod classifier;

pub use classifier::{Classify, NumaClassifier, ResultsClassifier, ThreadAdjClassifier};

use crate::models::{Error, LogRecord, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Configuration for log scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Show a progress bar while parsing.
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            show_progress: config.show_progress,
        }
    }
}

/// Records classified from a set of directories.
#[derive(Debug)]
pub struct ScanOutcome<K> {
    pub records: Vec<LogRecord<K>>,
    /// Files excluded by name.
    pub skipped: usize,
}

/// Scanner for result directories.
pub struct LogScanner {
    config: ScanConfig,
}

impl LogScanner {
    /// Create a new log scanner.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// List the regular files of a directory, sorted by name.
    pub fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::Io {
                path: dir.to_path_buf(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Classify every log file under `dirs`, in directory then file name order.
    pub fn scan<C: Classify>(&self, dirs: &[PathBuf], kind: &C) -> Result<ScanOutcome<C::Key>> {
        let mut files = Vec::new();
        for dir in dirs {
            let listed = self.list(dir)?;
            debug!("{} file(s) in {}", listed.len(), dir.display());
            files.extend(listed);
        }

        let progress_bar = self.progress_bar(files.len() as u64);
        let mut records = Vec::with_capacity(files.len());
        let mut skipped = 0;

        for path in &files {
            progress_bar.inc(1);

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            if classifier::is_skipped(&name) {
                debug!("Skipping {}", name);
                skipped += 1;
                continue;
            }

            records.push(classifier::classify(kind, path)?);
        }

        progress_bar.finish_and_clear();
        info!(
            "Parsed {} log file(s), skipped {}",
            records.len(),
            skipped
        );

        Ok(ScanOutcome { records, skipped })
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} logs")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn quiet_scanner() -> LogScanner {
        LogScanner::new(ScanConfig {
            show_progress: false,
        })
    }

    #[test]
    fn test_list_sorted_files_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mg-1-5"), "").unwrap();
        std::fs::write(dir.path().join("cg-0-5"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = quiet_scanner().list(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["cg-0-5", "mg-1-5"]);
    }

    #[test]
    fn test_list_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            quiet_scanner().list(&missing),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_scan_skips_excluded_benchmark() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mg-0-5"), "Time in seconds = 1.0\n").unwrap();
        std::fs::write(dir.path().join("lu-0-5"), "garbage").unwrap();
        std::fs::write(dir.path().join("cg-0-6"), "Time in seconds = 2.0\n").unwrap();

        let outcome = quiet_scanner()
            .scan(&[dir.path().to_path_buf()], &ResultsClassifier)
            .unwrap();
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].benchmark, "cg");
        assert_eq!(outcome.records[1].benchmark, "mg");
    }

    #[test]
    fn test_scan_aborts_on_bad_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mg-0-5"), "Time in seconds = 1.0\n").unwrap();
        std::fs::write(dir.path().join("mg-0-6"), "crashed\n").unwrap();

        let result = quiet_scanner().scan(&[dir.path().to_path_buf()], &ResultsClassifier);
        assert!(matches!(result, Err(Error::MissingMarkerLine { .. })));
    }
}
