//! Limit Book - demo binary
//!
//! Replays a short session against one book and prints the matches, the
//! resulting depth and the state root. Set `RUST_LOG=debug` to see every
//! match and resting order as it happens.

use limit_book::types::price::{from_fixed, to_fixed};
use limit_book::{BookConfig, BookError, DepthSnapshot, PlaceResult, SharedBook, Side};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), BookError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("===========================================");
    println!("  Limit Book - matching demo");
    println!("===========================================");
    println!();

    let book = SharedBook::new(BookConfig::new("BTC-USD").with_verification(true));
    let events = book.subscribe();

    let price = |s: &str| to_fixed(s).ok_or_else(|| BookError::InvalidPrice(s.to_string()));

    // Resting liquidity on both sides
    book.place_limit(Side::Sell, price("50010")?, 5)?;
    book.place_limit(Side::Sell, price("50020")?, 3)?;
    book.place_limit(Side::Sell, price("50020")?, 4)?;
    let bid = book.place_limit(Side::Buy, price("49990")?, 6)?;
    book.place_limit(Side::Buy, price("49980")?, 2)?;
    print_depth(&book.depth_snapshot());

    println!("Crossing buy 7 @ 50020:");
    print_result(&book.place_limit(Side::Buy, price("50020")?, 7)?);

    println!("Market sell 6:");
    print_result(&book.place_market(Side::Sell, 6)?);

    println!("Market buy 100:");
    match book.place_market(Side::Buy, 100) {
        Ok(result) => print_result(&result),
        Err(err) => println!("  rejected: {err}\n"),
    }

    match book.cancel(bid.order_id) {
        Ok(order) => println!("Cancelled order {} ({} left)\n", order.id, order.remaining),
        Err(err) => println!("Cancel of order {} rejected: {err}\n", bid.order_id),
    }

    print_depth(&book.depth_snapshot());
    book.verify()?;

    let root = book.state_root()?;
    println!("State root: 0x{}", hex::encode(root));
    info!(events = events.try_iter().count(), "demo finished");
    Ok(())
}

fn print_result(result: &PlaceResult) {
    println!("  order {} -> {:?}", result.order_id, result.status);
    for m in &result.matches {
        println!(
            "    match #{}: maker {} x {} @ {}",
            m.sequence,
            m.maker_order_id,
            m.quantity,
            from_fixed(m.price)
        );
    }
    if result.resting > 0 {
        println!("    resting {}", result.resting);
    }
    println!();
}

fn print_depth(depth: &DepthSnapshot) {
    println!("  {:>18} | {:>6} | {:>6}", "price", "qty", "orders");
    for level in depth.asks.iter().rev() {
        println!("  {:>18} | {:>6} | {:>6}  ask", from_fixed(level.price), level.total_volume, level.order_count);
    }
    for level in &depth.bids {
        println!("  {:>18} | {:>6} | {:>6}  bid", from_fixed(level.price), level.total_volume, level.order_count);
    }
    println!();
}
