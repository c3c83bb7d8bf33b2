//! Replay driver - feeds a session log through an `Engine`.
//!
//! For every line: parse, apply to the engine, and write the running TWAP
//! if one is defined. Lines that fail to parse are skipped without any
//! effect on the session.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::Instant;

use hdrhistogram::Histogram;
use serde::Serialize;
use tracing::{info, trace};

use crate::command::{Event, Price, Timestamp};
use crate::config::{OutputFormat, ReplayConfig, UnknownOpPolicy};
use crate::engine::{Engine, EngineStats, Tick};
use crate::error::{ParseError, ReplayError, Result};
use crate::format::format_general;
use crate::parser::{parse_line, parse_line_lenient};

/// Highest latency the histogram tracks (1 second, in ns)
const MAX_TRACKED_LATENCY_NS: u64 = 1_000_000_000;

/// Summary of a finished replay
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Lines read, including skipped ones
    pub lines: u64,
    /// Lines skipped as malformed
    pub skipped: u64,
    /// Averages written
    pub emitted: u64,
    /// Engine counters
    pub engine: EngineStats,
    /// Per-event latency, when measured
    pub latency: Option<LatencySummary>,
}

/// Per-event processing latency percentiles (ns)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub count: u64,
    pub min: u64,
    pub p50: u64,
    pub p99: u64,
    pub p999: u64,
    pub max: u64,
}

impl LatencySummary {
    fn from_histogram(histogram: &Histogram<u64>) -> Self {
        Self {
            count: histogram.len(),
            min: histogram.min(),
            p50: histogram.value_at_quantile(0.50),
            p99: histogram.value_at_quantile(0.99),
            p999: histogram.value_at_quantile(0.999),
            max: histogram.max(),
        }
    }
}

/// One CSV output row
#[derive(Debug, Serialize)]
struct TwapRow {
    time: Timestamp,
    max_price: Option<Price>,
    twap: Price,
}

/// Destination for emitted averages
enum Sink<W: Write> {
    Plain { out: W, precision: usize },
    Csv(csv::Writer<W>),
}

impl<W: Write> Sink<W> {
    fn new(out: W, config: &ReplayConfig) -> Self {
        match config.format {
            OutputFormat::Plain => Sink::Plain { out, precision: config.precision },
            OutputFormat::Csv => Sink::Csv(csv::Writer::from_writer(out)),
        }
    }

    fn emit(&mut self, tick: &Tick, twap: Price) -> Result<()> {
        match self {
            Sink::Plain { out, precision } => {
                writeln!(out, "{}", format_general(twap, *precision)).map_err(ReplayError::Write)
            }
            Sink::Csv(writer) => {
                writer.serialize(TwapRow {
                    time: tick.time,
                    max_price: tick.max_price,
                    twap,
                })?;
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<()> {
        match self {
            Sink::Plain { mut out, .. } => out.flush().map_err(ReplayError::Write),
            Sink::Csv(mut writer) => writer.flush().map_err(ReplayError::Write),
        }
    }
}

/// Open `path` and replay it into `output`.
pub fn replay_file<W: Write>(path: &Path, output: W, config: &ReplayConfig) -> Result<ReplayStats> {
    let file = File::open(path).map_err(|source| ReplayError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "replaying");
    replay(BufReader::new(file), output, config)
}

/// Replay every line of `input`, writing averages to `output`.
///
/// Each call runs an independent session: nothing carries over between
/// calls.
pub fn replay<R: BufRead, W: Write>(
    mut input: R,
    output: W,
    config: &ReplayConfig,
) -> Result<ReplayStats> {
    let mut engine = Engine::new();
    let mut sink = Sink::new(output, config);
    let mut stats = ReplayStats::default();

    let mut histogram = if config.measure_latency {
        let histogram = Histogram::<u64>::new_with_bounds(1, MAX_TRACKED_LATENCY_NS, 3)
            .map_err(|e| ReplayError::Histogram(e.to_string()))?;
        Some(histogram)
    } else {
        None
    };

    let parse: fn(&str) -> std::result::Result<Event, ParseError> = match config.unknown_op {
        UnknownOpPolicy::Skip => parse_line,
        UnknownOpPolicy::Sample => parse_line_lenient,
    };

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).map_err(ReplayError::Read)? == 0 {
            break;
        }
        stats.lines += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            stats.skipped += 1;
            trace!(line = stats.lines, "skipping non-UTF-8 line");
            continue;
        };

        let event = match parse(line) {
            Ok(event) => event,
            Err(err) => {
                stats.skipped += 1;
                trace!(line = stats.lines, error = %err, "skipping line");
                continue;
            }
        };

        let tick = match histogram.as_mut() {
            Some(histogram) => {
                let start = Instant::now();
                let tick = engine.process_event(event);
                histogram.saturating_record(start.elapsed().as_nanos() as u64);
                tick
            }
            None => engine.process_event(event),
        };

        if let Some(twap) = tick.twap {
            sink.emit(&tick, twap)?;
            stats.emitted += 1;
        }
    }

    sink.finish()?;

    stats.engine = engine.stats();
    stats.latency = histogram.as_ref().map(LatencySummary::from_histogram);

    info!(
        lines = stats.lines,
        skipped = stats.skipped,
        emitted = stats.emitted,
        out_of_order = stats.engine.out_of_order,
        live_orders = engine.order_count(),
        "replay finished"
    );

    Ok(stats)
}
