//! Replay configuration.

use clap::ValueEnum;

use crate::format::DEFAULT_PRECISION;

/// How averages are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `%g`-formatted number per line
    #[default]
    Plain,
    /// `time,max_price,twap` rows with a header
    Csv,
}

/// What to do with lines whose op is neither `I` nor `E`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum UnknownOpPolicy {
    /// Skip the line entirely, like any malformed line
    #[default]
    Skip,
    /// Leave the book untouched but still take a TWAP sample
    Sample,
}

/// Options for a replay run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Output format
    pub format: OutputFormat,

    /// Significant digits for plain output
    pub precision: usize,

    /// Unknown op handling
    pub unknown_op: UnknownOpPolicy,

    /// Record per-event processing latency
    pub measure_latency: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: DEFAULT_PRECISION,
            unknown_op: UnknownOpPolicy::default(),
            measure_latency: false,
        }
    }
}
