//! Forecast Arena Binary
//!
//! Benchmarks the EWMA-variance mixture strategy against a baseline on one
//! observation stream, scoring both by delayed log-likelihood.
//!
//! Observations come from a JSON-lines file (`--input`) or, by default, a
//! seeded synthetic jump walk. Runs until the input is exhausted, `--ticks`
//! is reached, or Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin arena -- generate-config
//! cargo run --bin arena -- --config arena.toml validate-config
//! cargo run --bin arena -- --ticks 100000 --report-every 10000
//! cargo run --bin arena -- --input observations.jsonl --snapshots ticks.jsonl
//! ```

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::info;

use forecast_arena::harness::log_report;
use forecast_arena::infra::init_logging;
use forecast_arena::{
    ArenaConfig, BenchmarkHarness, ComparisonReport, EvaluationSession, EwmaVarianceStrategy,
    ForecastStrategy, JsonLinesSource, Observation, SyntheticWalk, SyntheticWalkConfig,
};

/// Observations buffered between the producer and the evaluation loop.
const CHANNEL_CAPACITY: usize = 1024;

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(version, about = "Benchmark probabilistic forecasts by delayed log-likelihood")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "arena.toml")]
    config: String,

    /// Override forecast horizon (candidate and reference)
    #[arg(long)]
    horizon: Option<f64>,

    /// Stop after this many observations
    #[arg(long)]
    ticks: Option<usize>,

    /// Override ticks between comparison reports
    #[arg(long)]
    report_every: Option<usize>,

    /// Read observations from a JSON-lines file instead of the synthetic walk
    #[arg(long)]
    input: Option<PathBuf>,

    /// Write per-tick snapshots of both sessions as JSON lines
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Override synthetic walk seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, overrides RUST_LOG and the config level
    #[arg(long, env = "ARENA_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a sample config file
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "arena.toml")]
        output: String,
    },
    /// Validate config without running
    ValidateConfig,
    /// Run the benchmark (default)
    Run,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::GenerateConfig { ref output }) = cli.command {
        return generate_sample_config(output);
    }

    let config = load_config(&cli)?;
    config.validate()?;

    if let Some(Commands::ValidateConfig) = cli.command {
        println!("Config OK: {}", cli.config);
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let _guard = init_logging(&config.logging, cli.log_level.as_deref())?;
    print_startup_banner(&config, &cli);

    run(config, &cli).await
}

async fn run(config: ArenaConfig, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let horizon = config.candidate.horizon;
    let candidate = EvaluationSession::with_config(
        EwmaVarianceStrategy::new(config.candidate.clone())?,
        config.session.clone(),
    )?;
    let reference =
        EvaluationSession::with_config(config.reference.build(horizon)?, config.session.clone())?;
    let mut harness = BenchmarkHarness::new(candidate, reference, config.harness.report_every);

    let (tx, mut rx) = mpsc::channel::<Observation>(CHANNEL_CAPACITY);
    let producer = spawn_producer(
        cli.input.as_deref(),
        &config.source,
        config.harness.max_ticks,
        tx,
    )?;

    let mut snapshots = match cli.snapshots {
        Some(ref path) => {
            info!(path = %path.display(), "Writing tick snapshots");
            Some(BufWriter::new(File::create(path)?))
        }
        None => None,
    };

    let start = Instant::now();
    print_report_header();

    evaluate(&mut harness, &mut rx, tokio::signal::ctrl_c(), snapshots.as_mut()).await?;

    // Unblocks a producer waiting on a full channel
    drop(rx);
    let produced = producer.await?;

    if let Some(mut writer) = snapshots {
        writer.flush()?;
    }

    print_final_report(&harness.report(), produced, start.elapsed().as_secs_f64());
    Ok(())
}

/// Tick `harness` on every received observation until the channel closes
/// or `shutdown` resolves.
///
/// `shutdown` is polled first on every turn, so a pending signal wins over
/// queued observations.
async fn evaluate<C, R, W>(
    harness: &mut BenchmarkHarness<C, R>,
    rx: &mut Receiver<Observation>,
    shutdown: impl Future,
    mut snapshots: Option<&mut W>,
) -> Result<(), Box<dyn std::error::Error>>
where
    C: ForecastStrategy,
    R: ForecastStrategy,
    W: Write,
{
    // One listener for the whole run, so no signal is missed between ticks
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Received Ctrl-C, shutting down...");
                return Ok(());
            }

            next = rx.recv() => {
                let Some(observation) = next else {
                    info!("Observation source exhausted");
                    return Ok(());
                };

                let tick = harness.tick(&observation)?;

                if let Some(writer) = snapshots.as_deref_mut() {
                    serde_json::to_writer(&mut *writer, &tick)?;
                    writer.write_all(b"\n")?;
                }

                if harness.should_report() {
                    let report = harness.report();
                    log_report(&report);
                    println!("{}", report.as_row());
                }
            }
        }
    }
}

// ============================================================================
// Observation producer
// ============================================================================

/// Feed observations into `tx` from a blocking task.
///
/// Resolves to the number of observations sent.
fn spawn_producer(
    input: Option<&Path>,
    source: &SyntheticWalkConfig,
    max_ticks: Option<usize>,
    tx: Sender<Observation>,
) -> Result<JoinHandle<usize>, Box<dyn std::error::Error>> {
    let limit = max_ticks.unwrap_or(usize::MAX);

    let handle = match input {
        Some(path) => {
            let file = File::open(path)?;
            info!(path = %path.display(), "Reading observations");
            tokio::task::spawn_blocking(move || {
                let lines = JsonLinesSource::new(BufReader::new(file));
                forward(lines.skip_invalid().take(limit), &tx)
            })
        }
        None => {
            let walk = SyntheticWalk::new(source)?;
            info!(
                seed = source.seed,
                increment_std = source.increment_std,
                jump_probability = source.jump_probability,
                "Generating synthetic walk"
            );
            tokio::task::spawn_blocking(move || forward(walk.take(limit), &tx))
        }
    };

    Ok(handle)
}

fn forward(source: impl Iterator<Item = Observation>, tx: &Sender<Observation>) -> usize {
    let mut sent = 0;
    for observation in source {
        if tx.blocking_send(observation).is_err() {
            break;
        }
        sent += 1;
    }
    sent
}

// ============================================================================
// Configuration
// ============================================================================

fn load_config(cli: &Cli) -> Result<ArenaConfig, Box<dyn std::error::Error>> {
    let mut config = if Path::new(&cli.config).exists() {
        let content = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&content)?
    } else {
        eprintln!("Config file {} not found, using defaults", cli.config);
        ArenaConfig::default()
    };

    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut ArenaConfig, cli: &Cli) {
    if let Some(horizon) = cli.horizon {
        config.candidate.horizon = horizon;
    }
    if let Some(ticks) = cli.ticks {
        config.harness.max_ticks = Some(ticks);
    }
    if let Some(report_every) = cli.report_every {
        config.harness.report_every = report_every;
    }
    if let Some(seed) = cli.seed {
        config.source.seed = seed;
    }
}

fn generate_sample_config(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sample = ArenaConfig::default();
    let content = toml::to_string_pretty(&sample)?;

    let with_comments = format!(
        r#"# Forecast Arena Configuration
# See: cargo run --bin arena -- --help
#
# reference.kind: "last_value" | "constant"
# session.metric: "pdf_score" | "z_score" (log aggregates assume densities)
# candidate.reset_threshold: re-enter warm-up when the recent score drops below it

{}"#,
        content
    );

    std::fs::write(path, with_comments)?;
    println!("Sample config written to: {}", path);
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_startup_banner(config: &ArenaConfig, cli: &Cli) {
    let version = env!("CARGO_PKG_VERSION");
    let source = match cli.input {
        Some(ref path) => path.display().to_string(),
        None => format!("synthetic walk (seed {})", config.source.seed),
    };

    println!();
    println!("=== Forecast Arena v{version} ===");
    println!("  Source:     {source}");
    println!("  Horizon:    {}", config.candidate.horizon);
    println!("  Reference:  {:?} (scale {})", config.reference.kind, config.reference.scale);
    println!("  Metric:     {}", config.session.metric);
    println!("  Window:     {}", config.session.rolling_capacity);
    match config.harness.max_ticks {
        Some(n) => println!("  Ticks:      {n}"),
        None => println!("  Ticks:      until exhausted or Ctrl-C"),
    }
    println!();
}

fn print_report_header() {
    println!(
        "{:>14} | {:>14} {:>9} / {:>9} | {:>14} {:>9} / {:>9}",
        "", "candidate", "lifetime", "recent", "reference", "lifetime", "recent"
    );
}

fn print_final_report(report: &ComparisonReport, produced: usize, elapsed_secs: f64) {
    let rate = if elapsed_secs > 0.0 {
        report.ticks as f64 / elapsed_secs
    } else {
        0.0
    };

    println!();
    println!("=== Final Report ===");
    println!("{}", report.as_row());
    println!(
        "  {} observations produced, {} ticked in {:.2}s ({:.0} ticks/s)",
        produced, report.ticks, elapsed_secs, rate
    );
    println!(
        "  Scored: candidate {} / reference {}",
        report.candidate_scores, report.reference_scores
    );
    println!(
        "  Lifetime gap: {:+.4} ({} leads)",
        report.candidate_lifetime - report.reference_lifetime,
        if report.candidate_leads() {
            report.candidate
        } else {
            report.reference
        }
    );
}
