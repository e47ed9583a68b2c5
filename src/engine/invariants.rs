//! Structural audit of an [`OrderBook`].
//!
//! Walks every level of both sides and cross-checks the queues, the
//! aggregate volumes, the cached best prices and the order index. Any
//! disagreement is reported as [`BookError::InvariantViolation`].
//!
//! | Check | Failure means |
//! |-------|---------------|
//! | level volume = Σ remaining | aggregate drifted from its members |
//! | side total = Σ level volume | running side total drifted |
//! | prev/next/head/tail agree | queue links corrupted |
//! | no empty level | a drained level was not dropped |
//! | cached best = tree extreme | best price went stale |
//! | index ↔ arena bijection | an order is unreachable or orphaned |
//! | best bid < best ask | a crossing order was rested |

use crate::error::{BookError, Result};
use crate::orderbook::{OrderBook, PriceLevel};
use crate::types::{OrderStatus, OrderType, Side};

/// Run every check; the first failure wins.
pub fn audit(book: &OrderBook) -> Result<()> {
    let mut seen = 0usize;
    for side in [Side::Buy, Side::Sell] {
        seen += audit_side(book, side)?;
    }

    let arena = book.nodes().len();
    let indexed = book.index().len();
    if seen != arena || seen != indexed {
        return Err(BookError::invariant(format!(
            "{seen} orders queued, {arena} in arena, {indexed} indexed"
        )));
    }

    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        if bid >= ask {
            return Err(BookError::invariant(format!("book crossed: bid {bid} >= ask {ask}")));
        }
    }
    Ok(())
}

fn audit_side(book: &OrderBook, side: Side) -> Result<usize> {
    let book_side = book.side(side);
    let cached = book_side.best_price();
    let actual = book_side.extreme();
    if cached != actual {
        return Err(BookError::invariant(format!(
            "{side:?} best cached as {cached:?}, tree has {actual:?}"
        )));
    }

    let mut count = 0;
    for level in book_side.iter_best_first() {
        count += audit_level(book, side, level)?;
    }

    let total = book_side.total_volume();
    match book_side.summed_volume() {
        Some(summed) if summed == total => Ok(count),
        summed => Err(BookError::invariant(format!(
            "{side:?} total is {total}, levels sum to {summed:?}"
        ))),
    }
}

fn audit_level(book: &OrderBook, side: Side, level: &PriceLevel) -> Result<usize> {
    let price = level.price;
    if level.is_empty() {
        return Err(BookError::invariant(format!("{side:?} level {price} is empty")));
    }

    let nodes = book.nodes();
    let mut volume = 0u64;
    let mut count = 0usize;
    let mut prev_key: Option<usize> = None;
    let mut last_sequence: Option<u64> = None;

    // Bounded so a cycle cannot hang the audit
    for (key, node) in level.iter(nodes).take(nodes.len() + 1) {
        let order = &node.order;
        if node.prev != prev_key {
            return Err(BookError::invariant(format!(
                "order {} at {price}: prev link {:?}, expected {prev_key:?}",
                order.id, node.prev
            )));
        }
        if node.side() != side || node.price() != price || order.order_type() != OrderType::Limit {
            return Err(BookError::invariant(format!(
                "order {} queued at {side:?} {price} but is {:?} {:?} at {}",
                order.id,
                order.order_type(),
                node.side(),
                node.price()
            )));
        }
        if order.remaining == 0 || order.remaining > order.quantity || order.status() != OrderStatus::Resting {
            return Err(BookError::invariant(format!(
                "order {} resting with remaining {} of {} ({:?})",
                order.id,
                order.remaining,
                order.quantity,
                order.status()
            )));
        }
        if last_sequence.is_some_and(|last| last >= order.sequence) {
            return Err(BookError::invariant(format!(
                "order {} at {price} breaks arrival order",
                order.id
            )));
        }

        let entry = book.index().lookup(order.id).map_err(|_| {
            BookError::invariant(format!("order {} resting but not indexed", order.id))
        })?;
        if entry.side != side || entry.price != price || entry.key != key {
            return Err(BookError::invariant(format!(
                "order {} indexed at {:?} {} key {}, found at {side:?} {price} key {key}",
                order.id, entry.side, entry.price, entry.key
            )));
        }

        volume = volume.checked_add(order.remaining).ok_or_else(|| {
            BookError::invariant(format!("level {price}: volume overflows at order {}", order.id))
        })?;
        count += 1;
        prev_key = Some(key);
        last_sequence = Some(order.sequence);
    }

    if level.back_key() != prev_key {
        return Err(BookError::invariant(format!(
            "level {price}: tail {:?}, walk ended at {prev_key:?}",
            level.back_key()
        )));
    }
    if count != level.order_count() {
        return Err(BookError::invariant(format!(
            "level {price}: counted {count} orders, level says {}",
            level.order_count()
        )));
    }
    if volume != level.total_volume() {
        return Err(BookError::invariant(format!(
            "level {price}: orders sum to {volume}, level says {}",
            level.total_volume()
        )));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Order;

    #[test]
    fn test_empty_book_passes() {
        assert_eq!(audit(&OrderBook::new()), Ok(()));
    }

    #[test]
    fn test_consistent_book_passes() {
        let mut book = OrderBook::with_capacity(16);
        book.insert(Order::limit(1, Side::Buy, 10_000, 5, 1)).unwrap();
        book.insert(Order::limit(2, Side::Buy, 10_000, 3, 2)).unwrap();
        book.insert(Order::limit(3, Side::Buy, 9_900, 1, 3)).unwrap();
        book.insert(Order::limit(4, Side::Sell, 10_100, 7, 4)).unwrap();

        book.fill_best(Side::Buy, 6).unwrap();
        book.remove(3).unwrap();
        book.requeue(4, 9, 5).unwrap();

        assert_eq!(audit(&book), Ok(()));
    }

    #[test]
    fn test_crossed_book_is_reported() {
        // OrderBook does not match, so resting both sides at one price crosses it
        let mut book = OrderBook::new();
        book.insert(Order::limit(1, Side::Buy, 10_000, 5, 1)).unwrap();
        book.insert(Order::limit(2, Side::Sell, 10_000, 5, 2)).unwrap();

        let err = audit(&book).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("crossed"));
    }
}
