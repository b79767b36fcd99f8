//! End-to-end flow through the facade: trades in, reconciled prices out,
//! snapshot round trip across a restart.

use bazaar_core::{ActorId, ItemId, PriceQuote, TradeRecord, TradeSide};
use bazaar_engine::{MarketPricing, TradeOutcome};
use bazaar_guard::{GuardConfig, LogAlertSink, ManipulationGuard};
use bazaar_persistence::SnapshotStore;
use bazaar_pricing::PricingConfig;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

fn new_market() -> MarketPricing {
    let guard = Arc::new(ManipulationGuard::new(
        GuardConfig::default(),
        Arc::new(LogAlertSink),
    ));
    let market = MarketPricing::new(PricingConfig::default(), guard).unwrap();
    market
        .register_item(ItemId::new("ore"), 1000, Some(300), Some(1700))
        .unwrap();
    market
}

#[test]
fn buy_pressure_cycle_produces_deterministic_quote() {
    let market = new_market();
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

    // Ten 5-unit buys from distinct actors, spread out enough that the
    // guard sees nothing suspicious.
    for i in 0..10 {
        let trade = TradeRecord::new(
            ActorId::new(format!("actor{i}")),
            ItemId::new("ore"),
            5,
            TradeSide::Buy,
            base + Duration::seconds(i * 30),
        );
        assert!(matches!(
            market.record_trade(&trade),
            TradeOutcome::Accepted { .. }
        ));
    }

    market.reconcile_now(base + Duration::minutes(10));

    let ore = ItemId::new("ore");
    assert_eq!(market.quote(&ore), Some(PriceQuote::new(1030, 485)));
}

#[test]
fn nullified_trades_do_not_amplify_price_move() {
    let market = new_market();
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

    // One actor slicing a large buy into rapid small ones. The first four
    // land; from the fifth on, everything is nullified.
    let mut accepted = 0usize;
    for i in 0..20 {
        let trade = TradeRecord::new(
            ActorId::new("manipulator"),
            ItemId::new("ore"),
            2,
            TradeSide::Buy,
            base + Duration::milliseconds(i * 100),
        );
        if matches!(market.record_trade(&trade), TradeOutcome::Accepted { .. }) {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 4);

    market.reconcile_now(base + Duration::minutes(10));

    // Only 8 units of discounted volume landed; the price still moves, but
    // far less than the 40-unit attempt intended.
    let quote = market.quote(&ItemId::new("ore")).unwrap();
    assert_eq!(quote, PriceQuote::new(1030, 485));
}

#[test]
fn snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

    let market = new_market();
    for i in 0..10 {
        let trade = TradeRecord::new(
            ActorId::new(format!("actor{i}")),
            ItemId::new("ore"),
            5,
            TradeSide::Buy,
            base + Duration::seconds(i * 30),
        );
        market.record_trade(&trade);
    }
    let records = market.reconcile_now(base + Duration::minutes(10));
    store.save(&records).unwrap();

    // "Restart": a fresh facade restores the persisted quote.
    let restarted = new_market();
    assert_eq!(
        restarted.quote(&ItemId::new("ore")),
        Some(PriceQuote::new(1000, 500))
    );
    restarted.restore_quotes(&store.load().unwrap());
    assert_eq!(
        restarted.quote(&ItemId::new("ore")),
        Some(PriceQuote::new(1030, 485))
    );
}

#[test]
fn unknown_snapshot_items_do_not_break_restore() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    let market = new_market();
    let records = vec![
        bazaar_core::PriceSnapshotRecord {
            item_id: ItemId::new("ore"),
            buy_price: 1200,
            sell_price: 550,
            saved_at_ms: 0,
        },
        bazaar_core::PriceSnapshotRecord {
            item_id: ItemId::new("retired_item"),
            buy_price: 10,
            sell_price: 5,
            saved_at_ms: 0,
        },
    ];
    store.save(&records).unwrap();

    market.restore_quotes(&store.load().unwrap());
    assert_eq!(
        market.quote(&ItemId::new("ore")),
        Some(PriceQuote::new(1200, 550))
    );
    assert_eq!(market.quote(&ItemId::new("retired_item")), None);
}
