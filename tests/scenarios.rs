//! End-to-end matching scenarios against the public engine API.

use limit_book::{BookConfig, BookError, MatchingEngine, OrderStatus, Side};

fn engine() -> MatchingEngine {
    MatchingEngine::with_config(BookConfig::new("SCENARIO").with_verification(true))
}

// ============================================================================
// Core scenarios
// ============================================================================

#[test]
fn market_buy_partially_consumes_single_ask() {
    let mut engine = engine();
    let o1 = engine.place_limit(Side::Sell, 20_000, 5).unwrap().order_id;

    let result = engine.place_market(Side::Buy, 2).unwrap();
    assert_eq!(result.matches.len(), 1);
    let m = &result.matches[0];
    assert_eq!((m.price, m.quantity, m.maker_order_id), (20_000, 2, o1));

    assert_eq!(engine.level_volume(Side::Sell, 20_000), 3);
    assert_eq!(engine.order(o1).unwrap().remaining, 3);
}

#[test]
fn market_buy_walks_asks_lowest_first() {
    let mut engine = engine();
    let o1 = engine.place_limit(Side::Sell, 20_000, 5).unwrap().order_id;
    let o2 = engine.place_limit(Side::Sell, 19_000, 5).unwrap().order_id;

    let result = engine.place_market(Side::Buy, 6).unwrap();
    let fills: Vec<(u64, u64, u64)> = result
        .matches
        .iter()
        .map(|m| (m.price, m.quantity, m.maker_order_id))
        .collect();
    assert_eq!(fills, vec![(19_000, 5, o2), (20_000, 1, o1)]);

    let depth = engine.depth_snapshot();
    assert_eq!(depth.asks.len(), 1);
    assert_eq!(depth.asks[0].price, 20_000);
    assert_eq!(depth.asks[0].total_volume, 4);
}

#[test]
fn cancel_then_cancel_again() {
    let mut engine = engine();
    let o1 = engine.place_limit(Side::Buy, 10_000, 5).unwrap().order_id;

    engine.cancel(o1).unwrap();
    assert_eq!(engine.bid_levels(), 0);
    assert_eq!(engine.total_volume(Side::Buy), 0);
    assert_eq!(engine.cancel(o1), Err(BookError::OrderNotFound(o1)));
}

#[test]
fn market_sell_drains_bids_best_first() {
    let mut engine = engine();
    engine.place_limit(Side::Buy, 10_000, 5).unwrap();
    engine.place_limit(Side::Buy, 9_000, 8).unwrap();
    let deep_a = engine.place_limit(Side::Buy, 5_000, 10).unwrap().order_id;
    let deep_b = engine.place_limit(Side::Buy, 5_000, 1).unwrap().order_id;
    assert_eq!(engine.total_volume(Side::Buy), 24);

    let result = engine.place_market(Side::Sell, 20).unwrap();
    let fills: Vec<(u64, u64)> = result.matches.iter().map(|m| (m.price, m.quantity)).collect();
    assert_eq!(fills, vec![(10_000, 5), (9_000, 8), (5_000, 7)]);

    assert_eq!(engine.total_volume(Side::Buy), 4);
    assert_eq!(engine.bid_levels(), 1);
    assert_eq!(engine.order(deep_a).unwrap().remaining, 3);
    assert_eq!(engine.order(deep_b).unwrap().remaining, 1);
}

// ============================================================================
// Priority and atomicity
// ============================================================================

#[test]
fn same_price_fills_in_arrival_order() {
    let mut engine = engine();
    let ids: Vec<u64> = (0..4)
        .map(|_| engine.place_limit(Side::Sell, 20_000, 2).unwrap().order_id)
        .collect();

    let result = engine.place_limit(Side::Buy, 20_000, 5).unwrap();
    let makers: Vec<u64> = result.matches.iter().map(|m| m.maker_order_id).collect();
    assert_eq!(makers, vec![ids[0], ids[1], ids[2]]);
    assert_eq!(result.matches[2].quantity, 1);
    assert_eq!(result.status, OrderStatus::Filled);

    // The partially filled maker keeps the front of the queue
    let next = engine.place_market(Side::Buy, 1).unwrap();
    assert_eq!(next.matches[0].maker_order_id, ids[2]);
}

#[test]
fn failed_market_order_changes_nothing() {
    let mut engine = engine();
    engine.place_limit(Side::Sell, 20_000, 5).unwrap();
    engine.place_limit(Side::Sell, 21_000, 5).unwrap();
    let root = engine.state_root().unwrap();
    let depth = engine.depth_snapshot();

    assert_eq!(
        engine.place_market(Side::Buy, 11),
        Err(BookError::InsufficientLiquidity { requested: 11, available: 10 })
    );
    assert_eq!(engine.state_root().unwrap(), root);
    assert_eq!(engine.depth_snapshot(), depth);
}

#[test]
fn cancel_isolates_one_order() {
    let mut engine = engine();
    let a = engine.place_limit(Side::Buy, 10_000, 3).unwrap().order_id;
    let b = engine.place_limit(Side::Buy, 10_000, 4).unwrap().order_id;
    let c = engine.place_limit(Side::Buy, 10_000, 5).unwrap().order_id;

    let cancelled = engine.cancel(b).unwrap();
    assert_eq!(cancelled.status(), OrderStatus::Cancelled);
    assert_eq!(engine.level_volume(Side::Buy, 10_000), 8);

    let result = engine.place_market(Side::Sell, 8).unwrap();
    let makers: Vec<u64> = result.matches.iter().map(|m| m.maker_order_id).collect();
    assert_eq!(makers, vec![a, c]);
    assert_eq!(engine.bid_levels(), 0);
}

#[test]
fn crossing_limit_never_leaves_book_crossed() {
    let mut engine = engine();
    engine.place_limit(Side::Sell, 20_000, 2).unwrap();
    engine.place_limit(Side::Sell, 20_100, 2).unwrap();

    let result = engine.place_limit(Side::Buy, 20_200, 10).unwrap();
    assert_eq!(result.filled_quantity(), 4);
    assert_eq!(result.resting, 6);
    assert_eq!(engine.best_bid(), Some(20_200));
    assert_eq!(engine.best_ask(), None);
    assert_eq!(engine.spread(), None);
    engine.verify().unwrap();
}

#[test]
fn amend_adjusts_level_volume() {
    let mut engine = engine();
    let id = engine.place_limit(Side::Sell, 20_000, 5).unwrap().order_id;
    engine.place_market(Side::Buy, 2).unwrap();

    let order = engine.amend(id, 10).unwrap();
    assert_eq!(order.remaining, 10);
    assert_eq!(order.filled_quantity(), 2);
    assert_eq!(engine.level_volume(Side::Sell, 20_000), 10);

    engine.amend(id, 1).unwrap();
    assert_eq!(engine.total_volume(Side::Sell), 1);
}

#[test]
fn replay_produces_identical_state_root() {
    let run = || {
        let mut engine = engine();
        engine.place_limit(Side::Buy, 10_000, 5).unwrap();
        engine.place_limit(Side::Sell, 10_200, 7).unwrap();
        engine.place_limit(Side::Buy, 10_200, 3).unwrap();
        engine.amend(2, 9).unwrap();
        engine.cancel(1).unwrap();
        engine.state_root().unwrap()
    };
    assert_eq!(run(), run());
}
