//! Replay a session log and print the running TWAP of the best price.

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flash_twap::{replay_file, OutputFormat, ReplayConfig, UnknownOpPolicy};

/// Running time-weighted average of the best order price.
#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Replay an order event log and print the running TWAP of the best price")]
#[command(version)]
struct Args {
    /// Session log: `<time> <I|E> <order_id> [price]` per line.
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "plain", env = "TWAP_FORMAT")]
    format: OutputFormat,

    /// Significant digits for plain output.
    #[arg(short, long, default_value_t = flash_twap::format::DEFAULT_PRECISION, env = "TWAP_PRECISION")]
    precision: usize,

    /// Handling of lines whose op is neither I nor E.
    #[arg(long, value_enum, default_value = "skip", env = "TWAP_UNKNOWN_OP")]
    unknown_op: UnknownOpPolicy,

    /// Report per-event processing latency when done.
    #[arg(long)]
    latency: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the averages
    let filter = if args.verbose {
        EnvFilter::new("flash_twap=debug,replay=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let config = ReplayConfig {
        format: args.format,
        precision: args.precision,
        unknown_op: args.unknown_op,
        measure_latency: args.latency,
    };

    let stdout = io::stdout();
    let output = BufWriter::new(stdout.lock());

    let stats = replay_file(&args.input, output, &config)
        .with_context(|| format!("replay of {} failed", args.input.display()))?;

    if let Some(latency) = stats.latency {
        eprintln!(
            "latency (ns): n={} min={} p50={} p99={} p99.9={} max={}",
            latency.count, latency.min, latency.p50, latency.p99, latency.p999, latency.max
        );
    }

    Ok(())
}
