//! Event types handed to the engine.
//!
//! An `Event` is one parsed line of the session log: a timestamp plus the
//! book operation to apply at that time.

/// External order identifier (unique while the order is live)
pub type OrderId = i64;

/// Event timestamp. The unit is opaque to the engine (milliseconds in practice).
pub type Timestamp = i64;

/// Order price, read verbatim from input and never recomputed
pub type Price = f64;

// ============================================================================
// Operations
// ============================================================================

/// Add a live order at a fixed price
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsertOrder {
    /// Order ID (client-assigned)
    pub order_id: OrderId,
    /// Price, fixed for the lifetime of the order
    pub price: Price,
}

/// Remove a live order entirely
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EraseOrder {
    /// Order ID to erase
    pub order_id: OrderId,
}

/// Book operation carried by an event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Op {
    /// `I` in the log format
    Insert(InsertOrder),
    /// `E` in the log format
    Erase(EraseOrder),
    /// Any other op token. Leaves the book untouched but still counts as a
    /// sample when the replay policy lets it through.
    Noop,
}

impl Op {
    /// Convenience constructor for an insert
    #[inline]
    pub const fn insert(order_id: OrderId, price: Price) -> Self {
        Op::Insert(InsertOrder { order_id, price })
    }

    /// Convenience constructor for an erase
    #[inline]
    pub const fn erase(order_id: OrderId) -> Self {
        Op::Erase(EraseOrder { order_id })
    }
}

/// A timestamped book operation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub time: Timestamp,
    pub op: Op,
}

impl Event {
    #[inline]
    pub const fn new(time: Timestamp, op: Op) -> Self {
        Self { time, op }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_constructors() {
        assert_eq!(
            Op::insert(7, 10.5),
            Op::Insert(InsertOrder { order_id: 7, price: 10.5 })
        );
        assert_eq!(Op::erase(7), Op::Erase(EraseOrder { order_id: 7 }));
    }

    #[test]
    fn test_event_variants() {
        let insert = Event::new(0, Op::insert(1, 10.0));
        let erase = Event::new(100, Op::erase(1));

        match insert.op {
            Op::Insert(o) => {
                assert_eq!(o.order_id, 1);
                assert_eq!(o.price, 10.0);
            }
            _ => panic!("Expected Insert"),
        }

        match erase.op {
            Op::Erase(e) => assert_eq!(e.order_id, 1),
            _ => panic!("Expected Erase"),
        }
        assert_eq!(erase.time, 100);
    }
}
