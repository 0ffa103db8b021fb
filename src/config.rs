//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.benchagg.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".benchagg.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Chart renderer settings.
    #[serde(default)]
    pub renderer: RendererConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Log scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Show a progress bar while parsing logs.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// External plotting tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Plotting executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Directory holding the plot scripts.
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,

    /// NUMA motivation heat map script.
    #[serde(default = "default_numa_script")]
    pub numa_script: String,

    /// Main results script.
    #[serde(default = "default_results_script")]
    pub results_script: String,

    /// Standard deviations script.
    #[serde(default = "default_std_devs_script")]
    pub std_devs_script: String,

    /// Thread-adjustment motivation heat map script.
    #[serde(default = "default_thread_adj_script")]
    pub thread_adj_script: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            script_dir: default_script_dir(),
            numa_script: default_numa_script(),
            results_script: default_results_script(),
            std_devs_script: default_std_devs_script(),
            thread_adj_script: default_thread_adj_script(),
        }
    }
}

impl RendererConfig {
    /// Full path of a script named in this section.
    pub fn script(&self, name: &str) -> PathBuf {
        self.script_dir.join(name)
    }
}

fn default_program() -> String {
    "gnuplot".to_string()
}

fn default_script_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_numa_script() -> String {
    "plot_numa_motivation.gp".to_string()
}

fn default_results_script() -> String {
    "plot_results.gp".to_string()
}

fn default_std_devs_script() -> String {
    "plot_std_devs.gp".to_string()
}

fn default_thread_adj_script() -> String {
    "plot_thread_adj_motivation.gp".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Flags only ever switch settings on (verbose) or off (progress).
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if args.verbose {
            self.general.verbose = true;
        }
        if args.quiet {
            self.general.verbose = false;
            self.scanner.show_progress = false;
        }
        if let Some(ref program) = args.plotter {
            self.renderer.program = program.clone();
        }
        if let Some(ref dir) = args.script_dir {
            self.renderer.script_dir = dir.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.general.verbose);
        assert!(config.scanner.show_progress);
        assert_eq!(config.renderer.program, "gnuplot");
        assert_eq!(
            config.renderer.script(&config.renderer.results_script),
            PathBuf::from("./plot_results.gp")
        );
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[scanner]
show_progress = false

[renderer]
program = "/usr/local/bin/gnuplot"
script_dir = "scripts"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert!(!config.scanner.show_progress);
        assert_eq!(config.renderer.program, "/usr/local/bin/gnuplot");
        assert_eq!(
            config.renderer.script(&config.renderer.numa_script),
            PathBuf::from("scripts/plot_numa_motivation.gp")
        );
        assert_eq!(config.renderer.std_devs_script, "plot_std_devs.gp");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[renderer]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.renderer.thread_adj_script, "plot_thread_adj_motivation.gp");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::load(&dir.path().join("absent.toml")).is_err());
    }
}
