//! Periodic price reconciliation.
//!
//! Once per cycle the reconciler drains every item's accumulated volume,
//! turns net demand into a bounded price move, smooths it, clamps it into
//! the allowed band and republishes the quote. This is the only write path
//! to published prices after startup.

use crate::aggregator::{CycleVolume, TradeVolumeAggregator};
use crate::config::PricingConfig;
use crate::price_state::{round_to_coins, ItemPricingBounds, PriceTable};
use bazaar_core::{ItemId, PriceQuote, PriceSnapshotRecord};
use bazaar_telemetry::Metrics;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct PriceReconciler {
    table: Arc<PriceTable>,
    aggregator: Arc<TradeVolumeAggregator>,
}

impl PriceReconciler {
    pub fn new(table: Arc<PriceTable>, aggregator: Arc<TradeVolumeAggregator>) -> Self {
        Self { table, aggregator }
    }

    /// Run one reconciliation cycle over every registered item.
    ///
    /// Items with no traded volume this cycle keep their quote exactly;
    /// there is no drift toward base absent trading. Returns the snapshot
    /// records for the full table, for the caller to persist.
    pub fn reconcile_all(
        &self,
        config: &PricingConfig,
        now: DateTime<Utc>,
    ) -> Vec<PriceSnapshotRecord> {
        let drained: HashMap<ItemId, CycleVolume> = self.aggregator.drain().into_iter().collect();

        for item_id in self.table.items() {
            let Some(volume) = drained.get(&item_id) else {
                continue;
            };
            if volume.total() <= Decimal::ZERO {
                continue;
            }
            let (Some(quote), Some(bounds)) =
                (self.table.quote(&item_id), self.table.bounds(&item_id))
            else {
                continue;
            };

            let (next, change_ratio) = next_quote(quote, bounds, volume, config);
            self.table.commit(&item_id, next);

            debug!(
                item = %item_id,
                buy_volume = %volume.buy_volume,
                sell_volume = %volume.sell_volume,
                %change_ratio,
                old = %quote,
                new = %next,
                "Reconciled price"
            );
            Metrics::price_committed(item_id.as_str(), next.buy, next.sell);
            Metrics::change_ratio(item_id.as_str(), change_ratio.to_f64().unwrap_or(0.0));
        }

        Metrics::cycle_completed();
        self.table.snapshot_records(now)
    }
}

/// Compute one item's next quote from its drained cycle volume.
///
/// Returns the new quote and the raw (pre-smoothing) change ratio applied.
fn next_quote(
    quote: PriceQuote,
    bounds: ItemPricingBounds,
    volume: &CycleVolume,
    config: &PricingConfig,
) -> (PriceQuote, Decimal) {
    let demand_ratio = volume.net() / volume.total();
    let change_ratio = demand_ratio * config.max_change_ratio();

    let current_buy = Decimal::from(quote.buy);
    let current_sell = Decimal::from(quote.sell);

    // Rising demand pushes the buy price up and the sell price down.
    let target_buy = current_buy * (Decimal::ONE + change_ratio);
    let target_sell = current_sell * (Decimal::ONE - change_ratio);

    let alpha = config.smoothing_alpha;
    let keep = Decimal::ONE - alpha;
    let mut buy = round_to_coins(current_buy * keep + target_buy * alpha);
    let mut sell = round_to_coins(current_sell * keep + target_sell * alpha);

    buy = clamp_to_band(buy, bounds, config.max_range_ratio());

    // Spread invariant, then an absolute floor of one coin.
    let spread_cap = (Decimal::from(buy) * config.sell_spread_ratio)
        .floor()
        .to_i64()
        .unwrap_or(buy);
    sell = sell.min(spread_cap).max(1);
    buy = buy.max(1);

    (PriceQuote::new(buy, sell), change_ratio)
}

/// Clamp a price into the base-centered band intersected with the item's
/// absolute floor and ceiling.
fn clamp_to_band(price: i64, bounds: ItemPricingBounds, max_range_ratio: Decimal) -> i64 {
    let base = Decimal::from(bounds.base_price);
    let band_low = (base * (Decimal::ONE - max_range_ratio))
        .ceil()
        .to_i64()
        .unwrap_or(bounds.min_price);
    let band_high = (base * (Decimal::ONE + max_range_ratio))
        .floor()
        .to_i64()
        .unwrap_or(bounds.max_price);

    let low = band_low.max(bounds.min_price).max(1);
    let high = band_high.min(bounds.max_price).max(low);
    price.clamp(low, high)
}
