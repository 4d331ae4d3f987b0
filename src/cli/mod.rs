//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use sweep_bench_core::presentation::realized_tasks;
use sweep_bench_core::{
    plan_charts, Domain, MetricKind, ShellRunner, SuiteConfig, SuiteResults, SuiteRunner,
    SweepOutcome, Visualizer,
};
use sweep_bench_report::{CsvExporter, JsonExporter, PlotVisualizer};

const RULE_WIDTH: usize = 70;

/// sweep-bench - parameter-sweep benchmark harness
#[derive(Parser, Debug)]
#[command(name = "sweep-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a benchmark suite
    Run(RunArgs),
    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print a built-in preset as JSON
    Preset {
        /// Preset name (nqueens, matrix)
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Built-in suite to run (nqueens, matrix)
    #[arg(short, long, conflicts_with = "config")]
    pub preset: Option<String>,

    /// Path to a JSON suite configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory for charts and exports
    #[arg(short, long, env = "SWEEP_BENCH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Trials per configuration point
    #[arg(short, long)]
    pub repeats: Option<usize>,

    /// Kill trials running longer than this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Skip chart generation
    #[arg(long)]
    pub no_plots: bool,

    /// Export result tables to CSV
    #[arg(long)]
    pub csv: bool,

    /// Export the full run to JSON
    #[arg(long)]
    pub json: bool,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Dispatch the selected command
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Run(args) => args.run().await,
            Commands::Validate { config } => {
                let suite = SuiteConfig::from_file(config)?;
                suite
                    .validate()
                    .with_context(|| format!("Invalid configuration: {}", config.display()))?;
                println!(
                    "✓ {} is valid: suite '{}' with {} sweeps",
                    config.display(),
                    suite.name,
                    suite.sweeps.len()
                );
                Ok(())
            }
            Commands::Preset { name } => {
                let Some(suite) = SuiteConfig::preset(name) else {
                    bail!("Unknown preset: {name}. Expected nqueens or matrix");
                };
                println!("{}", serde_json::to_string_pretty(&suite)?);
                Ok(())
            }
        }
    }
}

impl RunArgs {
    /// Resolve the configuration from preset or file plus overrides
    fn suite_config(&self) -> Result<SuiteConfig> {
        let mut config = match (&self.preset, &self.config) {
            (Some(name), _) => SuiteConfig::preset(name)
                .with_context(|| format!("Unknown preset: {name}. Expected nqueens or matrix"))?,
            (None, Some(path)) => SuiteConfig::from_file(path)?,
            (None, None) => bail!("Either --preset or --config is required"),
        };

        if let Some(repeats) = self.repeats {
            config = config.with_repeats(repeats);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if self.timeout.is_some() {
            config = config.with_trial_timeout(self.timeout);
        }

        config.validate()?;
        Ok(config)
    }

    async fn run(&self) -> Result<()> {
        let config = self.suite_config()?;
        tracing::debug!(?config, "resolved configuration");
        print_banner(&config);

        let runner = ShellRunner::new().with_timeout(config.trial_timeout());
        let output_dir = config.output_dir.clone();
        let suite = SuiteRunner::new(config, runner)?.with_progress(!self.no_progress);
        let results = suite.run().await?;

        println!();
        print_results(&results)?;

        if !self.no_plots || self.csv || self.json {
            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory: {}", output_dir.display())
            })?;
            rule();
            println!("   Exporting Results");
            rule();
        }

        if self.csv {
            let paths = CsvExporter::export(&results, &output_dir)
                .with_context(|| format!("Failed to export CSV to: {}", output_dir.display()))?;
            for path in paths {
                println!("✓ CSV exported to: {}", path.display());
            }
        }

        if self.json {
            let path = output_dir.join("results.json");
            JsonExporter::export(&results, &path)
                .with_context(|| format!("Failed to export JSON to: {}", path.display()))?;
            println!("✓ JSON exported to: {}", path.display());
        }

        if !self.no_plots {
            render_charts(&results, &output_dir)?;
        }

        if !self.no_plots || self.csv || self.json {
            rule();
            println!();
        }

        Ok(())
    }
}

fn render_charts(results: &SuiteResults, dir: &Path) -> Result<()> {
    println!("\nGenerating plots...");
    let charts = plan_charts(results)?;
    let visualizer = PlotVisualizer::new();
    for chart in &charts {
        let path = visualizer.render(chart, dir)?;
        println!("✓ {}", path.display());
    }
    Ok(())
}

fn rule() {
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn print_banner(config: &SuiteConfig) {
    println!();
    rule();
    println!("   sweep-bench - {}", config.name);
    rule();
    println!();
    println!("Configuration:");
    println!("  Sweeps:       {}", config.sweeps.len());
    println!("  Repeats:      {}", config.repeats);
    println!("  Output:       {}", config.output_dir.display());
    if let Some(secs) = config.trial_timeout_secs {
        println!("  Timeout:      {secs} s per trial");
    }
    if let Some(size) = config.comparison_size {
        println!("  Compare at:   N={size}");
    }
    for sweep in &config.sweeps {
        println!(
            "  - {:<18} {} points{}",
            sweep.strategy,
            sweep.domain.len(),
            if sweep.sizes.is_empty() {
                String::new()
            } else {
                format!(" x sizes {:?}", sweep.sizes)
            }
        );
    }
    rule();
    println!();
}

fn axis_name(domain: &Domain) -> &'static str {
    match domain {
        Domain::Linear { axis, .. } => axis.placeholder(),
        _ => "value",
    }
}

fn size_tag(size: Option<u32>) -> String {
    size.map(|n| format!(" N={n}")).unwrap_or_default()
}

/// Best configuration per strategy and size, the task conversion tables and
/// the final comparison
fn print_results(results: &SuiteResults) -> Result<()> {
    rule();
    println!("   Benchmark Results");
    rule();
    println!();

    for sweep in &results.sweeps {
        for run in &sweep.runs {
            let tag = size_tag(run.size);
            match &run.outcome {
                SweepOutcome::Fixed(agg) => println!(
                    "  {:<28} {:>10.2} ± {:.2} ms",
                    format!("{}{tag}", sweep.spec.strategy),
                    agg.mean,
                    agg.stddev
                ),
                SweepOutcome::Linear(table) => {
                    let best = table.best()?;
                    println!(
                        "  {:<28} {:>10.2} ± {:.2} ms  best at {}={}",
                        format!("{}{tag}", sweep.spec.strategy),
                        best.aggregate.mean,
                        best.aggregate.stddev,
                        axis_name(&sweep.spec.domain),
                        best.key
                    );
                }
                SweepOutcome::Grid(table) => {
                    let best = table.best()?;
                    println!(
                        "  {:<28} {:>10.2} ± {:.2} ms  best at {}",
                        format!("{}{tag}", sweep.spec.strategy),
                        best.aggregate.mean,
                        best.aggregate.stddev,
                        best.key
                    );
                }
            }
        }
    }
    println!();

    for sweep in results
        .sweeps
        .iter()
        .filter(|s| s.spec.metric == MetricKind::TimeAndTasks)
    {
        for run in &sweep.runs {
            let SweepOutcome::Linear(table) = &run.outcome else {
                continue;
            };
            println!(
                "🔢 {} threshold → tasks created{}:",
                sweep.spec.strategy,
                size_tag(run.size)
            );
            for m in realized_tasks(table)? {
                println!("  th={:<6} {:>12.1}", m.threshold, m.tasks_mean);
            }
            println!();
        }
    }

    let comparison = results.comparison()?;
    if !comparison.is_empty() {
        // comparison entries follow the compared sweeps one to one
        let baseline = results
            .sweeps
            .iter()
            .filter(|s| s.spec.compare)
            .zip(&comparison)
            .find(|(s, _)| s.spec.domain == Domain::Fixed)
            .map(|(_, e)| e.mean);
        println!(
            "📊 Best configurations{}:",
            size_tag(results.config.comparison_size)
        );
        for entry in &comparison {
            match baseline {
                Some(base) if entry.mean > 0.0 => println!(
                    "  {:<28} {:>10.2} ± {:.2} ms  x{:.2}",
                    entry.label,
                    entry.mean,
                    entry.stddev,
                    base / entry.mean
                ),
                _ => println!(
                    "  {:<28} {:>10.2} ± {:.2} ms",
                    entry.label, entry.mean, entry.stddev
                ),
            }
        }
        println!();
    }

    Ok(())
}
