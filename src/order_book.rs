//! Order Book - Live orders and the current maximum price.
//!
//! Two maps are kept in lockstep:
//!
//! - `orders`: OrderId -> price, so an erase can find its price level
//! - `levels`: price -> number of live orders at that exact price
//!
//! The level map is ordered, so the best (maximum) price is its last key.
//! Order flow clusters at a small number of price ticks, which keeps the
//! ladder short relative to the number of live orders.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use crate::command::{OrderId, Price};

/// Ladder key. `OrderedFloat` gives `f64` a total order; equality is still
/// exact, there is no tolerance between neighbouring ticks.
pub type LevelKey = OrderedFloat<Price>;

/// Mapping from OrderId to price for O(1) erase lookup
pub type OrderMap = FxHashMap<OrderId, Price>;

/// Order book tracking live orders and their best price.
pub struct OrderBook {
    /// Order lookup map: OrderId -> price
    orders: OrderMap,
    /// Price ladder: price -> live order count (never zero)
    levels: BTreeMap<LevelKey, u32>,
    /// Cached maximum price across all live orders
    best: Option<Price>,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new() -> Self {
        Self {
            orders: FxHashMap::default(),
            levels: BTreeMap::new(),
            best: None,
        }
    }

    /// Create a new order book with room for `orders` live orders
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            orders: FxHashMap::with_capacity_and_hasher(orders, Default::default()),
            levels: BTreeMap::new(),
            best: None,
        }
    }

    // ========================================================================
    // Best Price Access
    // ========================================================================

    /// Greatest price among live orders, or `None` when the book is empty.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn max_price(&self) -> Option<Price> {
        self.best
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Add a live order to the book.
    ///
    /// # Returns
    /// `true` if the order was added, `false` if `order_id` is already live.
    /// A duplicate is ignored: the existing order keeps its price.
    ///
    /// # Complexity
    /// O(log L) where L is the number of distinct price levels
    pub fn insert_order(&mut self, order_id: OrderId, price: Price) -> bool {
        if self.orders.contains_key(&order_id) {
            return false;
        }

        self.orders.insert(order_id, price);
        *self.levels.entry(OrderedFloat(price)).or_insert(0) += 1;

        if self.best.map_or(true, |best| price > best) {
            self.best = Some(price);
        }

        true
    }

    /// Remove a live order from the book.
    ///
    /// # Returns
    /// The erased order's price, or `None` if `order_id` was not live.
    ///
    /// # Complexity
    /// O(log L)
    pub fn erase_order(&mut self, order_id: OrderId) -> Option<Price> {
        let price = self.orders.remove(&order_id)?;

        // Every live order has a level; the entry is always occupied
        if let Entry::Occupied(mut level) = self.levels.entry(OrderedFloat(price)) {
            *level.get_mut() -= 1;
            if *level.get() == 0 {
                level.remove();
                if self.best == Some(price) {
                    self.recalculate_best();
                }
            }
        }

        Some(price)
    }

    /// Look up a live order's price.
    #[inline]
    pub fn get_order(&self, order_id: OrderId) -> Option<Price> {
        self.orders.get(&order_id).copied()
    }

    /// Check if an order is live.
    #[inline]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    /// Recompute the cached best price from the top of the ladder.
    fn recalculate_best(&mut self) {
        self.best = self.levels.last_key_value().map(|(price, _)| price.0);
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Number of live orders
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of distinct price levels
    pub fn price_levels(&self) -> usize {
        self.levels.len()
    }

    /// Number of live orders at exactly `price`
    pub fn count_at(&self, price: Price) -> u32 {
        self.levels.get(&OrderedFloat(price)).copied().unwrap_or(0)
    }

    /// Iterate `(price, count)` pairs in ascending price order
    pub fn levels(&self) -> impl DoubleEndedIterator<Item = (Price, u32)> + '_ {
        self.levels.iter().map(|(price, count)| (price.0, *count))
    }

    /// Check if the book is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Clear all orders from the book
    pub fn clear(&mut self) {
        self.orders.clear();
        self.levels.clear();
        self.best = None;
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("best", &self.best)
            .field("price_levels", &self.levels.len())
            .field("order_count", &self.orders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ladder counts must always add up to the live order count.
    fn assert_consistent(book: &OrderBook) {
        let total: u32 = book.levels().map(|(_, count)| count).sum();
        assert_eq!(total as usize, book.order_count());
        assert!(book.levels().all(|(_, count)| count > 0));
        assert_eq!(book.max_price(), book.levels().next_back().map(|(p, _)| p));
    }

    #[test]
    fn test_empty_book() {
        let book = OrderBook::new();
        assert!(book.is_empty());
        assert_eq!(book.max_price(), None);
        assert_eq!(book.price_levels(), 0);
    }

    #[test]
    fn test_insert_tracks_max() {
        let mut book = OrderBook::new();

        assert!(book.insert_order(1, 10.0));
        assert_eq!(book.max_price(), Some(10.0));

        assert!(book.insert_order(2, 10.5));
        assert_eq!(book.max_price(), Some(10.5)); // Higher wins

        assert!(book.insert_order(3, 9.5));
        assert_eq!(book.max_price(), Some(10.5)); // Still 10.5

        assert_eq!(book.order_count(), 3);
        assert_consistent(&book);
    }

    #[test]
    fn test_duplicate_order_id() {
        let mut book = OrderBook::new();

        assert!(book.insert_order(1, 10.0));
        assert!(!book.insert_order(1, 50.0)); // First writer wins

        assert_eq!(book.order_count(), 1);
        assert_eq!(book.get_order(1), Some(10.0));
        assert_eq!(book.max_price(), Some(10.0));
        assert_eq!(book.count_at(50.0), 0);
        assert_consistent(&book);
    }

    #[test]
    fn test_erase_order() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.0);

        assert_eq!(book.erase_order(1), Some(10.0));
        assert!(book.is_empty());
        assert!(!book.contains_order(1));
        assert_eq!(book.max_price(), None);
        assert_eq!(book.price_levels(), 0);
    }

    #[test]
    fn test_erase_nonexistent_order() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.0);

        assert_eq!(book.erase_order(999), None);
        assert_eq!(book.order_count(), 1);
        assert_eq!(book.max_price(), Some(10.0));
    }

    #[test]
    fn test_erase_twice() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.0);

        assert_eq!(book.erase_order(1), Some(10.0));
        assert_eq!(book.erase_order(1), None);
        assert!(book.is_empty());
    }

    #[test]
    fn test_best_price_recalculation() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.5);
        book.insert_order(2, 10.0);
        book.insert_order(3, 9.5);

        book.erase_order(1);
        assert_eq!(book.max_price(), Some(10.0));

        book.erase_order(2);
        assert_eq!(book.max_price(), Some(9.5));

        book.erase_order(3);
        assert_eq!(book.max_price(), None);
    }

    #[test]
    fn test_erase_below_best_keeps_best() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.5);
        book.insert_order(2, 10.0);

        book.erase_order(2);
        assert_eq!(book.max_price(), Some(10.5));
        assert_consistent(&book);
    }

    #[test]
    fn test_multiple_orders_same_level() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.0);
        book.insert_order(2, 10.0);
        book.insert_order(3, 10.0);

        assert_eq!(book.order_count(), 3);
        assert_eq!(book.price_levels(), 1);
        assert_eq!(book.count_at(10.0), 3);

        // Level survives while any order remains
        book.erase_order(2);
        assert_eq!(book.count_at(10.0), 2);
        assert_eq!(book.price_levels(), 1);
        assert_eq!(book.max_price(), Some(10.0));

        book.erase_order(1);
        book.erase_order(3);
        assert_eq!(book.price_levels(), 0);
        assert_eq!(book.max_price(), None);
    }

    #[test]
    fn test_same_price_pair_then_erase_one() {
        let mut book = OrderBook::new();
        book.insert_order(1, 12.25);
        book.insert_order(2, 12.25);
        book.insert_order(3, 11.0);

        book.erase_order(1);
        assert_eq!(book.max_price(), Some(12.25));
        assert_consistent(&book);
    }

    #[test]
    fn test_exact_price_bucketing() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.3);
        book.insert_order(2, 10.3);
        book.insert_order(3, 10.300000000000001);

        assert_eq!(book.price_levels(), 2);
        assert_eq!(book.count_at(10.3), 2);
    }

    #[test]
    fn test_negative_prices() {
        let mut book = OrderBook::new();
        book.insert_order(1, -5.0);
        book.insert_order(2, -2.5);

        assert_eq!(book.max_price(), Some(-2.5));
        book.erase_order(2);
        assert_eq!(book.max_price(), Some(-5.0));
    }

    #[test]
    fn test_levels_ascending() {
        let mut book = OrderBook::with_capacity(16);
        book.insert_order(1, 3.0);
        book.insert_order(2, 1.0);
        book.insert_order(3, 2.0);
        book.insert_order(4, 1.0);

        let levels: Vec<_> = book.levels().collect();
        assert_eq!(levels, vec![(1.0, 2), (2.0, 1), (3.0, 1)]);
    }

    #[test]
    fn test_clear() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.0);
        book.insert_order(2, 11.0);

        book.clear();
        assert!(book.is_empty());
        assert_eq!(book.max_price(), None);

        // Usable after clear
        assert!(book.insert_order(1, 5.0));
        assert_eq!(book.max_price(), Some(5.0));
    }

    #[test]
    fn test_debug_format() {
        let mut book = OrderBook::new();
        book.insert_order(1, 10.0);
        let out = format!("{:?}", book);
        assert!(out.contains("order_count: 1"));
    }
}
