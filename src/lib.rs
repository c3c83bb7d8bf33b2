//! # Flash-TWAP
//!
//! Time-weighted average of the best (maximum) outstanding price over a
//! replayed order event log.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: One session owns its book and accumulator (no locks)
//! - **O(1) Best Price**: Cached maximum, O(log L) to maintain on erase
//! - **Count Buckets**: Orders at the same price share one ladder entry
//! - **No Sentinels**: Undefined prices and averages are `None`, never NaN
//!
//! ## Architecture
//!
//! ```text
//! [Log Line] --> [Parser] --> [OrderBook] --max_price--> [TwapAccumulator]
//!                                                               |
//!                                                         [Running TWAP]
//! ```

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod order_book;
pub mod parser;
pub mod replay;
pub mod twap;

// Re-exports for convenience
pub use command::{EraseOrder, Event, InsertOrder, Op, OrderId, Price, Timestamp};
pub use config::{OutputFormat, ReplayConfig, UnknownOpPolicy};
pub use engine::{Engine, EngineStats, Tick};
pub use error::{Field, ParseError, ReplayError};
pub use format::format_general;
pub use order_book::OrderBook;
pub use parser::{parse_line, parse_line_lenient};
pub use replay::{replay, replay_file, LatencySummary, ReplayStats};
pub use twap::{Sample, SampleOutcome, TwapAccumulator, TwapState};
