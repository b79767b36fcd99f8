//! Prometheus metrics for the bazaar pricing engine.
//!
//! Provides observability for:
//! - Trade intake and nullification
//! - Reconciliation cycles and committed prices
//! - Manipulation alerts
//! - Snapshot persistence
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge_vec, register_histogram_vec, Counter,
    CounterVec, GaugeVec, HistogramVec,
};

/// Total trades recorded, by item and side.
pub static TRADES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bazaar_trades_total",
        "Total trades recorded by the pricing facade",
        &["item", "side"]
    )
    .unwrap()
});

/// Total trades whose price influence was nullified, by item and reason.
/// Reasons: split_trading / volume_bombing.
pub static TRADES_NULLIFIED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bazaar_trades_nullified_total",
        "Total trades with price influence nullified by the manipulation guard",
        &["item", "reason"]
    )
    .unwrap()
});

/// Total trades referencing an unregistered item.
pub static TRADES_UNKNOWN_ITEM_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "bazaar_trades_unknown_item_total",
        "Total trades dropped because the item was never registered"
    )
    .unwrap()
});

/// Total completed reconciliation cycles.
pub static CYCLES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "bazaar_cycles_total",
        "Total completed price reconciliation cycles"
    )
    .unwrap()
});

/// Current published prices, by item and side.
pub static PRICE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "bazaar_price",
        "Current published price in coins",
        &["item", "side"]
    )
    .unwrap()
});

/// Per-cycle price change ratio distribution (signed, before smoothing).
pub static CHANGE_RATIO: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "bazaar_change_ratio",
        "Per-cycle raw price change ratio before smoothing",
        &["item"],
        vec![-0.10, -0.05, -0.02, -0.01, 0.0, 0.01, 0.02, 0.05, 0.10]
    )
    .unwrap()
});

/// Total operator alerts emitted, by reason.
pub static ALERTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bazaar_alerts_total",
        "Total manipulation alerts emitted to the operator sink",
        &["reason"]
    )
    .unwrap()
});

/// Total alerts suppressed by the per-(actor,item) cooldown.
pub static ALERTS_SUPPRESSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bazaar_alerts_suppressed_total",
        "Total manipulation alerts suppressed by cooldown",
        &["reason"]
    )
    .unwrap()
});

/// Total snapshot save failures.
pub static SNAPSHOT_FAILURES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "bazaar_snapshot_failures_total",
        "Total price snapshot save failures (state stays in memory, next cycle retries)"
    )
    .unwrap()
});

/// Trade-history records purged by the guard sweep.
pub static GUARD_RECORDS_PURGED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "bazaar_guard_records_purged_total",
        "Total expired trade-history records purged by the background sweep"
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a trade accepted into the aggregator.
    pub fn trade_recorded(item: &str, side: &str) {
        TRADES_TOTAL.with_label_values(&[item, side]).inc();
    }

    /// Record a trade nullified by the guard.
    pub fn trade_nullified(item: &str, reason: &str) {
        TRADES_NULLIFIED_TOTAL
            .with_label_values(&[item, reason])
            .inc();
    }

    /// Record a trade against an unregistered item.
    pub fn trade_unknown_item() {
        TRADES_UNKNOWN_ITEM_TOTAL.inc();
    }

    /// Record a completed reconciliation cycle.
    pub fn cycle_completed() {
        CYCLES_TOTAL.inc();
    }

    /// Publish the committed quote for an item.
    pub fn price_committed(item: &str, buy: i64, sell: i64) {
        PRICE.with_label_values(&[item, "buy"]).set(buy as f64);
        PRICE.with_label_values(&[item, "sell"]).set(sell as f64);
    }

    /// Record the raw change ratio applied to an item this cycle.
    pub fn change_ratio(item: &str, ratio: f64) {
        CHANGE_RATIO.with_label_values(&[item]).observe(ratio);
    }

    /// Record an alert emitted to the operator sink.
    pub fn alert_emitted(reason: &str) {
        ALERTS_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record an alert suppressed by cooldown.
    pub fn alert_suppressed(reason: &str) {
        ALERTS_SUPPRESSED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record a snapshot save failure.
    pub fn snapshot_failed() {
        SNAPSHOT_FAILURES_TOTAL.inc();
    }

    /// Record purged trade-history records.
    pub fn guard_records_purged(count: u64) {
        GUARD_RECORDS_PURGED_TOTAL.inc_by(count as f64);
    }
}
