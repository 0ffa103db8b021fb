//! benchagg - benchmark log aggregator
//!
//! A CLI tool that parses benchmark logs from static, dynamic
//! thread-adjustment and NUMA-aware thread-adjustment runs, computes
//! runtime ratios, writes CSV tables and renders heat maps.
//!
//! Exit codes:
//!   0 - Success (including a chart that could not be rendered)
//!   1 - Invalid arguments, unreadable or malformed logs, missing samples

mod analysis;
mod cli;
mod config;
mod models;
mod render;
mod report;
mod scanner;

use analysis::{numa, results, thread_adj};
use anyhow::{Context, Result};
use cli::{Args, Command, NumaArgs, ResultsArgs, ThreadAdjArgs};
use config::Config;
use models::Variant;
use render::{render_or_warn, ChartJob, ChartRenderer, Gnuplot};
use report::Summary;
use scanner::{LogScanner, NumaClassifier, ResultsClassifier, ScanConfig, ThreadAdjClassifier};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("benchagg v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let renderer = Gnuplot::new(config.renderer.program.clone());
    let start_time = Instant::now();

    let outcome = match &args.command {
        Some(command) => run(command, &config, &renderer),
        None => Ok(()),
    };

    match outcome {
        Ok(()) => {
            info!("Done in {:.1}s", start_time.elapsed().as_secs_f64());
            Ok(())
        }
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .benchagg.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .benchagg.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .benchagg.toml")?;

    println!("✅ Created .benchagg.toml with default settings.");
    println!("   Edit it to point at your gnuplot binary and plot scripts.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let mut level = args.log_level();
    if level == tracing::Level::INFO && config.general.verbose {
        level = tracing::Level::DEBUG;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("Warning: failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Dispatch a mode.
fn run(command: &Command, config: &Config, renderer: &dyn ChartRenderer) -> Result<()> {
    match command {
        Command::Numa(args) => run_numa(args, config, renderer),
        Command::Results(args) => run_results(args, config, renderer),
        Command::ThreadAdj(args) => run_thread_adj(args, config, renderer),
    }
}

/// NUMA motivation: parse, normalize by the local placement, render.
fn run_numa(args: &NumaArgs, config: &Config, renderer: &dyn ChartRenderer) -> Result<()> {
    println!("📂 Parsing NUMA motivation logs in {}", args.input_dir.display());

    let scanner = LogScanner::new(ScanConfig::from(&config.scanner));
    let outcome = scanner.scan(
        &[args.input_dir.clone()],
        &NumaClassifier { nodes: args.nodes },
    )?;

    let benches = numa::aggregate(&outcome.records, args.nodes)?;
    let stats = numa::compute(&benches)?;
    info!(
        "{} benchmark(s) over {} NUMA node(s), {} excluded log(s)",
        stats.len(),
        args.nodes,
        outcome.skipped
    );

    report::write_table(&args.stats, &report::numa_table(&stats))?;
    if let Some(ref json) = args.json {
        report::write_json_summary(&Summary::new("numa", &stats), json)?;
    }
    println!("✅ Stats saved to {}", args.stats.display());

    let job = ChartJob::new(
        config.renderer.script(&config.renderer.numa_script),
        &args.stats,
        &args.graph,
    )
    .with_node_count(args.nodes);
    render_or_warn(renderer, &job);

    Ok(())
}

/// Main results: speedups and standard deviations over the baseline.
fn run_results(args: &ResultsArgs, config: &Config, renderer: &dyn ChartRenderer) -> Result<()> {
    if args.graph_only {
        info!("Graphing existing {} and {}", args.stats.display(), args.std_devs.display());
    } else {
        check_directory_roles(args)?;
        println!("📂 Parsing results in {} directories", args.dirs().len());

        let scanner = LogScanner::new(ScanConfig::from(&config.scanner));
        let outcome = scanner.scan(&args.dirs(), &ResultsClassifier)?;

        let (benches, warmups) = results::aggregate(&outcome.records);
        info!(
            "{} benchmark(s), {} warm-up run(s) discarded, {} excluded log(s)",
            benches.len(),
            warmups,
            outcome.skipped
        );
        if benches.len() as f64 != results::AVERAGE_DIVISOR {
            warn!(
                "Averages row divides by {} but {} benchmark(s) were found",
                results::AVERAGE_DIVISOR,
                benches.len()
            );
        }

        let stats = results::compute(&benches)?;
        let averages = results::overall_averages(&stats);

        report::write_table(&args.stats, &report::results_table(&stats, &averages))?;
        report::write_table(&args.std_devs, &report::std_devs_table(&stats))?;
        if let Some(ref json) = args.json {
            report::write_json_summary(&Summary::new("results", &stats), json)?;
        }
        println!(
            "✅ Stats saved to {} and {}",
            args.stats.display(),
            args.std_devs.display()
        );
    }

    let renderer_config = &config.renderer;
    render_or_warn(
        renderer,
        &ChartJob::new(
            renderer_config.script(&renderer_config.results_script),
            &args.stats,
            &args.graph,
        ),
    );
    render_or_warn(
        renderer,
        &ChartJob::new(
            renderer_config.script(&renderer_config.std_devs_script),
            &args.std_devs,
            &args.std_devs_graph,
        ),
    );

    Ok(())
}

/// Each results directory must classify as the role it was passed for,
/// otherwise its samples would be grouped under another configuration.
fn check_directory_roles(args: &ResultsArgs) -> Result<()> {
    let roles = [
        (&args.baseline_dir, Variant::Baseline),
        (&args.thread_adj_dir, Variant::ThreadAdjustment),
        (&args.numa_dir, Variant::NumaAware),
    ];

    for (dir, role) in roles {
        let classified = Variant::classify(dir);
        if classified != role {
            anyhow::bail!(
                "{} was given as the {} directory but its path classifies as {} \
                 (baseline paths contain \"baseline\", NUMA-aware paths contain \"numa\")",
                dir.display(),
                role,
                classified
            );
        }
    }

    Ok(())
}

/// Thread-adjustment motivation: half vs. all processors, render.
fn run_thread_adj(args: &ThreadAdjArgs, config: &Config, renderer: &dyn ChartRenderer) -> Result<()> {
    println!(
        "📂 Parsing thread adjustment motivation logs in {}",
        args.input_dir.display()
    );

    let scanner = LogScanner::new(ScanConfig::from(&config.scanner));
    let outcome = scanner.scan(&[args.input_dir.clone()], &ThreadAdjClassifier)?;

    let benches = thread_adj::aggregate(&outcome.records);
    let stats = thread_adj::compute(&benches, args.procs)?;
    info!(
        "{} benchmark(s), {} vs. {} threads, {} excluded log(s)",
        stats.len(),
        args.procs,
        args.procs / 2,
        outcome.skipped
    );

    report::write_table(&args.stats, &report::thread_adj_table(&stats))?;
    if let Some(ref json) = args.json {
        report::write_json_summary(&Summary::new("thread-adj", &stats), json)?;
    }
    println!("✅ Stats saved to {}", args.stats.display());

    let job = ChartJob::new(
        config.renderer.script(&config.renderer.thread_adj_script),
        &args.stats,
        &args.graph,
    );
    render_or_warn(renderer, &job);

    Ok(())
}
