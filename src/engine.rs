//! Engine - One TWAP session over an order event stream.
//!
//! Each event runs to completion before the next: the book is mutated, its
//! best price is sampled into the accumulator, and the resulting average is
//! returned. The fold for event N must see the book as of event N.

use tracing::{debug, trace};

use crate::command::{Event, Op, Price, Timestamp};
use crate::order_book::OrderBook;
use crate::twap::{SampleOutcome, TwapAccumulator};

/// Result of processing a single event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Event timestamp
    pub time: Timestamp,
    /// Best price after the book mutation
    pub max_price: Option<Price>,
    /// Running TWAP after the sample, if defined
    pub twap: Option<Price>,
    /// What the accumulator did with the sample
    pub outcome: SampleOutcome,
}

/// Counters for a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Events processed
    pub events: u64,
    /// Orders added to the book
    pub inserts: u64,
    /// Orders removed from the book
    pub erases: u64,
    /// Inserts ignored because the id was already live
    pub duplicate_inserts: u64,
    /// Erases ignored because the id was not live
    pub unknown_erases: u64,
    /// Events whose op left the book untouched
    pub noops: u64,
    /// Samples discarded for moving back in time
    pub out_of_order: u64,
}

/// Composes an `OrderBook` and a `TwapAccumulator` for one session.
#[derive(Debug, Default)]
pub struct Engine {
    /// Live orders
    pub book: OrderBook,
    /// Running average of the best price
    pub twap: TwapAccumulator,
    stats: EngineStats,
}

impl Engine {
    /// Create a new engine with an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new engine sized for `orders` concurrently live orders.
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            book: OrderBook::with_capacity(orders),
            ..Self::default()
        }
    }

    /// Apply one event and sample the book's best price.
    pub fn process_event(&mut self, event: Event) -> Tick {
        self.stats.events += 1;
        self.apply(event.op);

        let max_price = self.book.max_price();
        let outcome = self.twap.next_price(event.time, max_price);
        if outcome == SampleOutcome::OutOfOrder {
            self.stats.out_of_order += 1;
            debug!(time = event.time, "timestamp moved backwards, sample discarded");
        }

        Tick {
            time: event.time,
            max_price,
            twap: self.twap.avg_price(),
            outcome,
        }
    }

    /// Mutate the book for one op.
    fn apply(&mut self, op: Op) {
        match op {
            Op::Insert(order) => {
                if self.book.insert_order(order.order_id, order.price) {
                    self.stats.inserts += 1;
                } else {
                    self.stats.duplicate_inserts += 1;
                    trace!(order_id = order.order_id, "duplicate insert ignored");
                }
            }
            Op::Erase(erase) => {
                if self.book.erase_order(erase.order_id).is_some() {
                    self.stats.erases += 1;
                } else {
                    self.stats.unknown_erases += 1;
                    trace!(order_id = erase.order_id, "erase of unknown order ignored");
                }
            }
            Op::Noop => self.stats.noops += 1,
        }
    }

    /// Best price currently in the book.
    #[inline]
    pub fn max_price(&self) -> Option<Price> {
        self.book.max_price()
    }

    /// Running TWAP.
    #[inline]
    pub fn avg_price(&self) -> Option<Price> {
        self.twap.avg_price()
    }

    /// Get total live order count.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.book.order_count()
    }

    /// Session counters.
    #[inline]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Compute a hash of the current state (for determinism testing)
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        // Price ladder, in price order
        for (price, count) in self.book.levels() {
            price.to_bits().hash(&mut hasher);
            count.hash(&mut hasher);
        }
        self.book.order_count().hash(&mut hasher);

        // Accumulator
        self.twap.avg_price().map(f64::to_bits).hash(&mut hasher);
        self.twap.total_elapsed().hash(&mut hasher);
        if let Some(sample) = self.twap.last_sample() {
            sample.time.hash(&mut hasher);
            sample.price.map(f64::to_bits).hash(&mut hasher);
        }

        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = Engine::with_capacity(1000);
        assert_eq!(engine.order_count(), 0);
        assert_eq!(engine.max_price(), None);
        assert_eq!(engine.avg_price(), None);
        assert_eq!(engine.stats(), EngineStats::default());
    }

    #[test]
    fn test_reference_session() {
        let mut engine = Engine::new();

        let tick = engine.process_event(Event::new(0, Op::insert(1, 10.0)));
        assert_eq!(tick.max_price, Some(10.0));
        assert_eq!(tick.twap, None);

        let tick = engine.process_event(Event::new(100, Op::insert(2, 20.0)));
        assert_eq!(tick.max_price, Some(20.0));
        assert_eq!(tick.twap, Some(10.0));

        let tick = engine.process_event(Event::new(300, Op::erase(2)));
        assert_eq!(tick.max_price, Some(10.0));
        let twap = tick.twap.unwrap();
        assert!((twap - (10.0 * 100.0 + 20.0 * 200.0) / 300.0).abs() < 1e-12);
    }

    #[test]
    fn test_engine_counts_noops() {
        let mut engine = Engine::new();
        engine.process_event(Event::new(0, Op::insert(1, 10.0)));
        engine.process_event(Event::new(1, Op::insert(1, 99.0)));
        engine.process_event(Event::new(2, Op::erase(7)));
        engine.process_event(Event::new(3, Op::Noop));
        engine.process_event(Event::new(4, Op::erase(1)));

        let stats = engine.stats();
        assert_eq!(stats.events, 5);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.duplicate_inserts, 1);
        assert_eq!(stats.unknown_erases, 1);
        assert_eq!(stats.noops, 1);
        assert_eq!(stats.erases, 1);
        assert_eq!(engine.max_price(), None);
    }

    #[test]
    fn test_out_of_order_event_still_mutates_book() {
        let mut engine = Engine::new();
        engine.process_event(Event::new(0, Op::insert(1, 10.0)));
        engine.process_event(Event::new(100, Op::insert(2, 20.0)));

        let tick = engine.process_event(Event::new(50, Op::insert(3, 30.0)));
        assert_eq!(tick.outcome, SampleOutcome::OutOfOrder);
        assert_eq!(tick.max_price, Some(30.0));
        assert_eq!(tick.twap, Some(10.0));
        assert_eq!(engine.stats().out_of_order, 1);
    }

    #[test]
    fn test_engine_state_hash_determinism() {
        let mut engine1 = Engine::new();
        let mut engine2 = Engine::new();

        for i in 0..100 {
            let op = if i % 3 == 2 {
                Op::erase(i - 1)
            } else {
                Op::insert(i, 100.0 + (i % 10) as f64 * 0.25)
            };
            engine1.process_event(Event::new(i * 10, op));
            engine2.process_event(Event::new(i * 10, op));
        }

        assert_eq!(engine1.state_hash(), engine2.state_hash());

        engine2.process_event(Event::new(2000, Op::insert(1000, 1.0)));
        assert_ne!(engine1.state_hash(), engine2.state_hash());
    }
}
