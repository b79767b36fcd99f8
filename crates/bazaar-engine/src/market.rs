//! The market pricing facade.
//!
//! Single entry point for the shop layer: register items, record trades,
//! read prices. Trades flow guard -> impact curve -> aggregator; prices are
//! published only by the reconciler. All methods are hot-path safe: reads
//! never block on a cycle, and `record_trade` reports problems through its
//! return value instead of failing the caller.

use bazaar_core::{ItemId, PriceQuote, PriceSnapshotRecord, TradeRecord};
use bazaar_guard::{ManipulationGuard, ManipulationKind, TradeVerdict};
use bazaar_pricing::{
    ItemPricingBounds, PriceReconciler, PriceTable, PricingConfig, PricingResult,
    TradeVolumeAggregator, VolumeImpactCurve,
};
use bazaar_telemetry::Metrics;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What became of a recorded trade.
///
/// The trade itself always goes through at the shop layer; this only says
/// whether and how much it influenced price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    /// Counted toward this cycle's volume at the given discounted weight.
    Accepted { discounted_volume: Decimal },
    /// Flagged by the manipulation guard; zero price influence.
    Nullified(ManipulationKind),
    /// The item was never registered.
    UnknownItem,
    /// Zero-quantity trade, nothing to record.
    Ignored,
}

/// Facade over the pricing table, aggregator, guard and reconciler.
pub struct MarketPricing {
    table: Arc<PriceTable>,
    aggregator: Arc<TradeVolumeAggregator>,
    guard: Arc<ManipulationGuard>,
    reconciler: PriceReconciler,
    config: RwLock<PricingConfig>,
}

impl MarketPricing {
    pub fn new(config: PricingConfig, guard: Arc<ManipulationGuard>) -> PricingResult<Self> {
        config.validate()?;
        let table = Arc::new(PriceTable::new());
        let aggregator = Arc::new(TradeVolumeAggregator::new());
        let reconciler = PriceReconciler::new(table.clone(), aggregator.clone());
        Ok(Self {
            table,
            aggregator,
            guard,
            reconciler,
            config: RwLock::new(config),
        })
    }

    /// Register an item for pricing.
    ///
    /// Bounds default to the configured band around base when not given.
    /// Idempotent; re-registration replaces bounds but keeps the current
    /// runtime quote.
    pub fn register_item(
        &self,
        item_id: ItemId,
        base_price: i64,
        min_price: Option<i64>,
        max_price: Option<i64>,
    ) -> PricingResult<()> {
        let config = self.config.read();
        let bounds = match (min_price, max_price) {
            (Some(min), Some(max)) => ItemPricingBounds::new(base_price, min, max)?,
            _ => {
                let derived = ItemPricingBounds::derive(base_price, config.max_range_ratio())?;
                ItemPricingBounds::new(
                    base_price,
                    min_price.unwrap_or(derived.min_price),
                    max_price.unwrap_or(derived.max_price),
                )?
            }
        };
        self.table
            .register(item_id.clone(), bounds, config.sell_spread_ratio)?;
        self.aggregator.register_item(item_id.clone());
        info!(item = %item_id, base = base_price, min = bounds.min_price, max = bounds.max_price, "Registered item");
        Ok(())
    }

    /// Record a trade's price influence.
    ///
    /// Never fails: problems are reported in the outcome and the caller's
    /// trade proceeds regardless.
    pub fn record_trade(&self, trade: &TradeRecord) -> TradeOutcome {
        if trade.quantity == 0 {
            return TradeOutcome::Ignored;
        }
        if !self.table.is_registered(&trade.item_id) {
            debug!(item = %trade.item_id, actor = %trade.actor_id, "Trade against unregistered item");
            Metrics::trade_unknown_item();
            return TradeOutcome::UnknownItem;
        }

        if let TradeVerdict::Suspicious(kind) = self.guard.classify(trade) {
            Metrics::trade_nullified(trade.item_id.as_str(), kind.as_str());
            return TradeOutcome::Nullified(kind);
        }

        let discounted = {
            let config = self.config.read();
            VolumeImpactCurve::new(&config.volume_influence).discounted(trade.quantity)
        };
        if !self
            .aggregator
            .accumulate(&trade.item_id, trade.side, discounted)
        {
            Metrics::trade_unknown_item();
            return TradeOutcome::UnknownItem;
        }

        Metrics::trade_recorded(trade.item_id.as_str(), &trade.side.to_string());
        TradeOutcome::Accepted {
            discounted_volume: discounted,
        }
    }

    pub fn buy_price(&self, item_id: &ItemId) -> Option<i64> {
        self.table.quote(item_id).map(|quote| quote.buy)
    }

    pub fn sell_price(&self, item_id: &ItemId) -> Option<i64> {
        self.table.quote(item_id).map(|quote| quote.sell)
    }

    pub fn base_price(&self, item_id: &ItemId) -> Option<i64> {
        self.table.base_price(item_id)
    }

    pub fn quote(&self, item_id: &ItemId) -> Option<PriceQuote> {
        self.table.quote(item_id)
    }

    /// Restore quotes from a startup snapshot.
    ///
    /// Records for unknown items are skipped; insane quotes are ignored and
    /// the item keeps its registration-time base pair. Never fails startup.
    pub fn restore_quotes(&self, records: &[PriceSnapshotRecord]) {
        let mut restored = 0usize;
        for record in records {
            if !self.table.is_registered(&record.item_id) {
                warn!(item = %record.item_id, "Snapshot for unregistered item, skipping");
                continue;
            }
            let quote = record.quote();
            if !quote.is_sane() {
                warn!(item = %record.item_id, %quote, "Insane snapshot quote, keeping base pair");
                continue;
            }
            self.table.commit(&record.item_id, quote);
            restored += 1;
        }
        info!(restored, total = records.len(), "Restored price snapshot");
    }

    /// Run one reconciliation cycle and return the snapshot to persist.
    pub fn reconcile_now(&self, now: DateTime<Utc>) -> Vec<PriceSnapshotRecord> {
        let config = self.config.read().clone();
        self.reconciler.reconcile_all(&config, now)
    }

    /// Snapshot current quotes without reconciling, for shutdown.
    pub fn snapshot_records(&self, now: DateTime<Utc>) -> Vec<PriceSnapshotRecord> {
        self.table.snapshot_records(now)
    }

    /// Purge expired guard history; returns records removed.
    pub fn sweep_guard(&self, now: DateTime<Utc>) -> usize {
        self.guard.purge_expired(now)
    }

    /// Replace the pricing configuration at runtime.
    ///
    /// Takes effect from the next trade and the next cycle; already
    /// accumulated volume is kept.
    pub fn update_config(&self, new_config: PricingConfig) -> PricingResult<()> {
        new_config.validate()?;
        *self.config.write() = new_config;
        info!("Pricing configuration updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{ActorId, TradeSide};
    use bazaar_guard::{GuardConfig, LogAlertSink};
    use rust_decimal_macros::dec;

    fn market() -> MarketPricing {
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

    fn trade(actor: &str, item: &str, quantity: u32, side: TradeSide) -> TradeRecord {
        TradeRecord::now(ActorId::new(actor), ItemId::new(item), quantity, side)
    }

    #[test]
    fn test_unknown_item_is_reported_not_failed() {
        let market = market();
        let outcome = market.record_trade(&trade("steve", "mystery", 5, TradeSide::Buy));
        assert_eq!(outcome, TradeOutcome::UnknownItem);
        assert_eq!(market.buy_price(&ItemId::new("mystery")), None);
    }

    #[test]
    fn test_zero_quantity_ignored() {
        let market = market();
        let outcome = market.record_trade(&trade("steve", "ore", 0, TradeSide::Buy));
        assert_eq!(outcome, TradeOutcome::Ignored);
    }

    #[test]
    fn test_whale_trade_discounted() {
        let market = market();
        let outcome = market.record_trade(&trade("steve", "ore", 200, TradeSide::Buy));
        assert_eq!(
            outcome,
            TradeOutcome::Accepted {
                discounted_volume: dec!(40)
            }
        );
    }

    #[test]
    fn test_split_trades_nullified() {
        let market = market();
        for _ in 0..4 {
            let outcome = market.record_trade(&trade("steve", "ore", 2, TradeSide::Buy));
            assert!(matches!(outcome, TradeOutcome::Accepted { .. }));
        }
        let outcome = market.record_trade(&trade("steve", "ore", 2, TradeSide::Buy));
        assert_eq!(
            outcome,
            TradeOutcome::Nullified(ManipulationKind::SplitTrading)
        );
    }

    #[test]
    fn test_initial_quote_is_base_pair() {
        let market = market();
        let ore = ItemId::new("ore");
        assert_eq!(market.buy_price(&ore), Some(1000));
        assert_eq!(market.sell_price(&ore), Some(500));
        assert_eq!(market.base_price(&ore), Some(1000));
    }

    #[test]
    fn test_restore_skips_insane_quote() {
        let market = market();
        let ore = ItemId::new("ore");
        let records = vec![PriceSnapshotRecord {
            item_id: ore.clone(),
            buy_price: 100,
            sell_price: 900,
            saved_at_ms: 0,
        }];
        market.restore_quotes(&records);
        // Sell above buy is rejected; the base pair stays.
        assert_eq!(market.quote(&ore), Some(PriceQuote::new(1000, 500)));
    }

    #[test]
    fn test_restore_applies_sane_quote() {
        let market = market();
        let ore = ItemId::new("ore");
        let records = vec![PriceSnapshotRecord {
            item_id: ore.clone(),
            buy_price: 1030,
            sell_price: 485,
            saved_at_ms: 0,
        }];
        market.restore_quotes(&records);
        assert_eq!(market.quote(&ore), Some(PriceQuote::new(1030, 485)));
    }

    #[test]
    fn test_update_config_rejects_invalid() {
        let market = market();
        let bad = PricingConfig {
            sell_spread_ratio: dec!(1.2),
            ..Default::default()
        };
        assert!(market.update_config(bad).is_err());
        // The old configuration is still in force.
        let outcome = market.record_trade(&trade("steve", "ore", 200, TradeSide::Buy));
        assert_eq!(
            outcome,
            TradeOutcome::Accepted {
                discounted_volume: dec!(40)
            }
        );
    }

    #[test]
    fn test_arbitrage_registration_rejected() {
        let guard = Arc::new(ManipulationGuard::new(
            GuardConfig::default(),
            Arc::new(LogAlertSink),
        ));
        let bad = PricingConfig {
            sell_spread_ratio: dec!(1.0),
            ..Default::default()
        };
        assert!(MarketPricing::new(bad, guard).is_err());
    }
}
