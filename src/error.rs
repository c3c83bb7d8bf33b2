//! Error types for parsing and replay.
//!
//! `ParseError` is always recovered locally (the line is skipped);
//! `ReplayError` is fatal and surfaces at the process boundary.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fields of a log line, for error reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Time,
    Op,
    OrderId,
    Price,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Time => "time",
            Field::Op => "op",
            Field::OrderId => "order_id",
            Field::Price => "price",
        })
    }
}

/// Why a log line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Line ended before a required field.
    #[error("missing {0}")]
    MissingField(Field),

    /// An integer field did not parse.
    #[error("invalid {field}: {token:?}")]
    InvalidInt {
        /// Which field
        field: Field,
        /// Offending token
        token: String,
    },

    /// Price did not parse as a finite number.
    #[error("invalid price: {0:?}")]
    InvalidPrice(String),

    /// Op token other than `I` or `E`.
    #[error("unknown op: {0:?}")]
    UnknownOp(String),
}

/// Fatal replay errors.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Input file could not be opened.
    #[error("can't access input file {}: {source}", .path.display())]
    Open {
        /// Path as given
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Reading a line failed.
    #[error("read error: {0}")]
    Read(#[source] io::Error),

    /// Writing output failed.
    #[error("write error: {0}")]
    Write(#[source] io::Error),

    /// CSV serialization failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Latency histogram could not be created.
    #[error("histogram error: {0}")]
    Histogram(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ReplayError>;
