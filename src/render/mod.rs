//! Heat map rendering through an external plotting tool.
//!
//! Rendering is the last step of a run and never fails it: a tool that
//! cannot be started or exits non-zero is reported and skipped.

use crate::report::format_value;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// One chart to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartJob {
    /// Plot script understood by the tool.
    pub script: PathBuf,
    /// Table the chart is drawn from.
    pub input: PathBuf,
    /// Image to write.
    pub output: PathBuf,
    /// Extra `name=value` variables, in order.
    pub variables: Vec<(String, String)>,
}

impl ChartJob {
    pub fn new(script: PathBuf, input: &Path, output: &Path) -> Self {
        Self {
            script,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            variables: Vec::new(),
        }
    }

    /// Add the NUMA node count, shifted to center the heat map cells.
    pub fn with_node_count(mut self, nodes: usize) -> Self {
        let centered = (nodes as f64 - 2.0) + 0.5;
        self.variables
            .push(("numnodes".to_string(), format_value(centered)));
        self
    }
}

/// Something that turns a table into an image.
pub trait ChartRenderer {
    /// Render one chart. The error is a human-readable reason.
    fn render(&self, job: &ChartJob) -> Result<(), String>;
}

/// Renders charts with gnuplot scripts.
#[derive(Debug, Clone)]
pub struct Gnuplot {
    program: String,
}

impl Gnuplot {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for a job.
    pub fn arguments(job: &ChartJob) -> Vec<String> {
        let mut args = Vec::new();
        for (name, value) in &job.variables {
            args.push("-e".to_string());
            args.push(format!("{}={}", name, value));
        }
        args.push("-e".to_string());
        args.push(format!("infile='{}'", job.input.display()));
        args.push("-e".to_string());
        args.push(format!("outfile='{}'", job.output.display()));
        args.push(job.script.display().to_string());
        args
    }
}

impl ChartRenderer for Gnuplot {
    fn render(&self, job: &ChartJob) -> Result<(), String> {
        let args = Self::arguments(job);
        debug!("Running {} {}", self.program, args.join(" "));

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| format!("failed to start {}: {}", self.program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(format!("{} exited with {}", self.program, status))
        }
    }
}

/// Render a chart, reporting failure without aborting. Returns whether the
/// image was produced.
pub fn render_or_warn(renderer: &dyn ChartRenderer, job: &ChartJob) -> bool {
    match renderer.render(job) {
        Ok(()) => {
            info!("Rendered {}", job.output.display());
            true
        }
        Err(reason) => {
            warn!("Chart {} not rendered: {}", job.output.display(), reason);
            println!("could not generate heat map!");
            false
        }
    }
}
