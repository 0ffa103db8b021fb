//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// benchagg - aggregate thread-adjustment benchmark logs
///
/// Parses NPB-style benchmark logs from baseline, dynamic thread adjustment
/// and NUMA-aware dynamic thread adjustment runs, writes CSV tables and
/// renders them into heat maps with gnuplot.
///
/// Examples:
///   benchagg numa logs/numa_motivation -n 4
///   benchagg results -b logs/external_workload_baseline -t logs/external_workload -c logs/external_workload_numa
///   benchagg results -b ... -t ... -c ... --graph-only
///   benchagg thread-adj logs/thread_adj_motivation -n 16
///   benchagg --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .benchagg.toml in the current directory
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress bar)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Plotting program to invoke instead of the configured one
    #[arg(long, value_name = "PROGRAM", env = "BENCHAGG_PLOTTER", global = true)]
    pub plotter: Option<String>,

    /// Directory containing the plot scripts
    #[arg(long, value_name = "DIR", global = true)]
    pub script_dir: Option<PathBuf>,

    /// Generate a default .benchagg.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Aggregation mode.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Parse NUMA motivational results & generate heat map
    Numa(NumaArgs),
    /// Parse experimental results (baseline vs. thread adjustment vs. NUMA-aware)
    Results(ResultsArgs),
    /// Parse thread adjustment motivational results & generate heat map
    #[command(name = "thread-adj")]
    ThreadAdj(ThreadAdjArgs),
}

/// Arguments of the NUMA motivation mode.
#[derive(ClapArgs, Debug, Clone)]
pub struct NumaArgs {
    /// Directory of `<bench>-<cpu node>-<mem node>-<run>` logs
    #[arg(value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Number of NUMA nodes on the machine used for the experiments
    #[arg(short = 'n', long, value_name = "NUMBER")]
    pub nodes: usize,

    /// Stats file (please use .csv suffix)
    #[arg(short = 'o', long, default_value = "numa_motivation.csv", value_name = "FILE")]
    pub stats: PathBuf,

    /// Graph file (please use .png suffix)
    #[arg(short = 'g', long, default_value = "numa_motivation.png", value_name = "FILE")]
    pub graph: PathBuf,

    /// Also write the computed statistics as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

/// Arguments of the main results mode.
#[derive(ClapArgs, Debug, Clone)]
pub struct ResultsArgs {
    /// Directory containing baseline results
    #[arg(short = 'b', long = "baseline", value_name = "DIR")]
    pub baseline_dir: PathBuf,

    /// Directory containing dynamic thread adjustment results
    #[arg(short = 't', long = "thread-adj", value_name = "DIR")]
    pub thread_adj_dir: PathBuf,

    /// Directory containing NUMA-aware dynamic thread adjustment results
    #[arg(short = 'c', long = "numa", value_name = "DIR")]
    pub numa_dir: PathBuf,

    /// Stats file (please use .csv suffix)
    #[arg(short = 'o', long, default_value = "results.csv", value_name = "FILE")]
    pub stats: PathBuf,

    /// Standard deviations file (please use .csv suffix)
    #[arg(short = 's', long, default_value = "standard_deviations.csv", value_name = "FILE")]
    pub std_devs: PathBuf,

    /// Graph file (please use .png suffix)
    #[arg(short = 'g', long, default_value = "results.png", value_name = "FILE")]
    pub graph: PathBuf,

    /// Graph file for standard deviations (please use .png suffix)
    #[arg(short = 'v', long, default_value = "standard_deviations.png", value_name = "FILE")]
    pub std_devs_graph: PathBuf,

    /// Just graph the existing stats files
    #[arg(short = 'n', long)]
    pub graph_only: bool,

    /// Also write the computed statistics as JSON
    #[arg(long, value_name = "FILE", conflicts_with = "graph_only")]
    pub json: Option<PathBuf>,
}

impl ResultsArgs {
    /// Input directories in baseline, thread adjustment, NUMA-aware order.
    pub fn dirs(&self) -> Vec<PathBuf> {
        vec![
            self.baseline_dir.clone(),
            self.thread_adj_dir.clone(),
            self.numa_dir.clone(),
        ]
    }
}

/// Arguments of the thread-adjustment motivation mode.
#[derive(ClapArgs, Debug, Clone)]
pub struct ThreadAdjArgs {
    /// Directory of `<bench>-<co-running bench>-<threads>` logs
    #[arg(value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Number of processors in the machine used to conduct the experiments
    #[arg(short = 'n', long, value_name = "NUM")]
    pub procs: u32,

    /// Stats file (please use .csv suffix)
    #[arg(short = 'o', long, default_value = "thread_adj_motivation.csv", value_name = "FILE")]
    pub stats: PathBuf,

    /// Graph file (please use .png suffix)
    #[arg(short = 'g', long, default_value = "thread_adj_motivation.png", value_name = "FILE")]
    pub graph: PathBuf,

    /// Also write the computed statistics as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Skip the rest for --init-config
        if self.init_config {
            return Ok(());
        }

        match &self.command {
            None => Err("Please specify a mode: numa, results or thread-adj".to_string()),
            Some(Command::Numa(args)) => {
                if args.nodes == 0 {
                    return Err("Please specify the number of NUMA nodes!".to_string());
                }
                check_dir(&args.input_dir)
            }
            Some(Command::Results(args)) => {
                if args.graph_only {
                    check_file(&args.stats)?;
                    return check_file(&args.std_devs);
                }
                for dir in args.dirs() {
                    check_dir(&dir)?;
                }
                Ok(())
            }
            Some(Command::ThreadAdj(args)) => {
                if args.procs == 0 {
                    return Err("Please specify the number of processors!".to_string());
                }
                check_dir(&args.input_dir)
            }
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn check_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Input directory does not exist: {}", path.display()));
    }
    if !path.is_dir() {
        return Err(format!("Input path is not a directory: {}", path.display()));
    }
    Ok(())
}

fn check_file(path: &Path) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!(
            "Stats file does not exist (run without --graph-only first): {}",
            path.display()
        ));
    }
    Ok(())
}
