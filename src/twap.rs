//! Time-weighted average price accumulator.
//!
//! A price's contribution is only known once the interval it was held for
//! has ended, i.e. when the *next* sample arrives. The accumulator therefore
//! lags by one sample: the first call never produces an average.
//!
//! Samples with an undefined price (empty book) are stored like any other.
//! They contribute no weight because folding only happens when the
//! *previous* sample carried a price.

use crate::command::{Price, Timestamp};

/// One `(time, price)` observation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time: Timestamp,
    /// `None` while the book was empty
    pub price: Option<Price>,
}

/// What `next_price` did with a sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Sample stored, nothing folded (previous price undefined, or first sample)
    Stored,
    /// The previous interval was folded into the average, then the sample stored
    Folded {
        /// Length of the folded interval
        elapsed: u64,
    },
    /// Time moved backwards; the sample was discarded and state is unchanged
    OutOfOrder,
}

/// Lifecycle of an accumulator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TwapState {
    /// Nothing observed yet
    NoSample,
    /// At least one sample stored, no interval folded yet
    OneSample,
    /// An average is available
    Averaging,
}

/// Running TWAP over the defined segments of a `(time, price)` stream.
///
/// The average is blended incrementally rather than as `sum(price * dt) /
/// sum(dt)`, so nothing grows without bound over long sessions.
#[derive(Clone, Debug, Default)]
pub struct TwapAccumulator {
    last: Option<Sample>,
    avg: Option<Price>,
    total_elapsed: u64,
}

impl TwapAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new observation.
    ///
    /// If the previous sample had a price, the interval `[last.time, time)`
    /// is folded in at that price first. A timestamp earlier than the
    /// previous priced sample is discarded outright: neither folded nor
    /// stored.
    pub fn next_price(&mut self, time: Timestamp, price: Option<Price>) -> SampleOutcome {
        let mut outcome = SampleOutcome::Stored;

        if let Some(Sample { time: last_time, price: Some(last_price) }) = self.last {
            let elapsed = time.saturating_sub(last_time);
            if elapsed < 0 {
                return SampleOutcome::OutOfOrder;
            }
            let elapsed = elapsed.unsigned_abs();
            self.fold(last_price, elapsed);
            outcome = SampleOutcome::Folded { elapsed };
        }

        self.last = Some(Sample { time, price });
        outcome
    }

    /// Blend `price` held for `elapsed` into the running average.
    fn fold(&mut self, price: Price, elapsed: u64) {
        match self.avg {
            Some(avg) if self.total_elapsed > 0 => {
                let total = self.total_elapsed.saturating_add(elapsed);
                let weight = elapsed as f64 / total as f64;
                self.avg = Some(avg + (price - avg) * weight);
                self.total_elapsed = total;
            }
            // First fold, or only zero-length intervals so far
            _ => {
                self.avg = Some(price);
                self.total_elapsed = elapsed;
            }
        }
    }

    /// Current running average, or `None` before the first fold.
    #[inline]
    pub fn avg_price(&self) -> Option<Price> {
        self.avg
    }

    /// Sum of all folded interval lengths
    #[inline]
    pub fn total_elapsed(&self) -> u64 {
        self.total_elapsed
    }

    /// Most recently stored sample
    #[inline]
    pub fn last_sample(&self) -> Option<Sample> {
        self.last
    }

    pub fn state(&self) -> TwapState {
        match (self.last, self.avg) {
            (_, Some(_)) => TwapState::Averaging,
            (Some(_), None) => TwapState::OneSample,
            (None, None) => TwapState::NoSample,
        }
    }

    /// Forget everything, as if freshly constructed
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
