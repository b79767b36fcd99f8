//! Per-cycle trade volume aggregation.

use bazaar_core::{ItemId, TradeSide};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Impact-discounted volume accumulated for one item over the current cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleVolume {
    pub buy_volume: Decimal,
    pub sell_volume: Decimal,
    /// Trades that contributed this cycle (nullified trades excluded).
    pub trades: u64,
}

impl CycleVolume {
    /// Total traded volume, both directions.
    pub fn total(&self) -> Decimal {
        self.buy_volume + self.sell_volume
    }

    /// Net demand: positive when buying dominates.
    pub fn net(&self) -> Decimal {
        self.buy_volume - self.sell_volume
    }

    pub fn is_empty(&self) -> bool {
        self.trades == 0
    }
}

/// Accumulates discounted trade volume per item between reconciliations.
///
/// Accumulation happens concurrently from trade handlers; the reconciler is
/// the single drainer. Calls racing a drain land in either the closing cycle
/// or the next one, which is acceptable.
#[derive(Debug, Default)]
pub struct TradeVolumeAggregator {
    volumes: DashMap<ItemId, CycleVolume>,
}

impl TradeVolumeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the accumulator slot for an item. Idempotent; re-registration
    /// keeps any volume already accumulated this cycle.
    pub fn register_item(&self, item_id: ItemId) {
        self.volumes.entry(item_id).or_default();
    }

    pub fn is_registered(&self, item_id: &ItemId) -> bool {
        self.volumes.contains_key(item_id)
    }

    /// Add discounted volume for the current cycle.
    ///
    /// Returns `false` when the item was never registered; the caller
    /// surfaces that, never this component.
    #[must_use]
    pub fn accumulate(&self, item_id: &ItemId, side: TradeSide, discounted: Decimal) -> bool {
        let Some(mut volume) = self.volumes.get_mut(item_id) else {
            return false;
        };
        match side {
            TradeSide::Buy => volume.buy_volume += discounted,
            TradeSide::Sell => volume.sell_volume += discounted,
        }
        volume.trades += 1;
        true
    }

    /// Take this cycle's totals for every item and zero them.
    ///
    /// Each item's slot is swapped out under its own lock, so a concurrent
    /// `accumulate` is never lost, only deferred to the next cycle.
    pub fn drain(&self) -> Vec<(ItemId, CycleVolume)> {
        self.volumes
            .iter_mut()
            .map(|mut entry| (entry.key().clone(), std::mem::take(entry.value_mut())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_accumulate_unregistered_is_refused() {
        let aggregator = TradeVolumeAggregator::new();
        assert!(!aggregator.accumulate(&ItemId::new("ore"), TradeSide::Buy, dec!(5)));
    }

    #[test]
    fn test_directions_accumulate_separately() {
        let aggregator = TradeVolumeAggregator::new();
        let ore = ItemId::new("ore");
        aggregator.register_item(ore.clone());

        assert!(aggregator.accumulate(&ore, TradeSide::Buy, dec!(5)));
        assert!(aggregator.accumulate(&ore, TradeSide::Buy, dec!(3)));
        assert!(aggregator.accumulate(&ore, TradeSide::Sell, dec!(2)));

        let drained = aggregator.drain();
        assert_eq!(drained.len(), 1);
        let (item, volume) = &drained[0];
        assert_eq!(*item, ore);
        assert_eq!(volume.buy_volume, dec!(8));
        assert_eq!(volume.sell_volume, dec!(2));
        assert_eq!(volume.net(), dec!(6));
        assert_eq!(volume.total(), dec!(10));
        assert_eq!(volume.trades, 3);
    }

    #[test]
    fn test_drain_resets_totals() {
        let aggregator = TradeVolumeAggregator::new();
        let ore = ItemId::new("ore");
        aggregator.register_item(ore.clone());
        assert!(aggregator.accumulate(&ore, TradeSide::Buy, dec!(5)));

        let _ = aggregator.drain();
        let drained = aggregator.drain();
        assert_eq!(drained.len(), 1);
        assert!(drained[0].1.is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        let aggregator = TradeVolumeAggregator::new();
        let ore = ItemId::new("ore");
        aggregator.register_item(ore.clone());
        assert!(aggregator.accumulate(&ore, TradeSide::Buy, dec!(5)));
        aggregator.register_item(ore.clone());

        let drained = aggregator.drain();
        assert_eq!(drained[0].1.buy_volume, dec!(5));
    }
}
