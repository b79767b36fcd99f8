//! Per-item price state and the concurrent price table.

use crate::error::{PricingError, PricingResult};
use bazaar_core::{ItemId, PriceQuote, PriceSnapshotRecord};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a decimal price to whole coins, midpoints away from zero.
pub fn round_to_coins(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Configured price anchors for one item. Immutable between registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPricingBounds {
    /// Anchor price, the center of the allowed range.
    pub base_price: i64,
    /// Absolute floor.
    pub min_price: i64,
    /// Absolute ceiling.
    pub max_price: i64,
}

impl ItemPricingBounds {
    pub fn new(base_price: i64, min_price: i64, max_price: i64) -> PricingResult<Self> {
        if base_price < 1 {
            return Err(PricingError::InvalidBounds(format!(
                "base_price ({base_price}) must be at least 1"
            )));
        }
        if min_price < 1 || min_price > base_price || base_price > max_price {
            return Err(PricingError::InvalidBounds(format!(
                "require 1 <= min ({min_price}) <= base ({base_price}) <= max ({max_price})"
            )));
        }
        Ok(Self {
            base_price,
            min_price,
            max_price,
        })
    }

    /// Derive floor and ceiling from the base price and a band half-width
    /// ratio, for items configured without explicit bounds.
    pub fn derive(base_price: i64, max_range_ratio: Decimal) -> PricingResult<Self> {
        let base = Decimal::from(base_price);
        let min_price = (base * (Decimal::ONE - max_range_ratio))
            .ceil()
            .to_i64()
            .unwrap_or(1)
            .max(1);
        let max_price = (base * (Decimal::ONE + max_range_ratio))
            .floor()
            .to_i64()
            .unwrap_or(i64::MAX);
        Self::new(base_price, min_price, max_price)
    }
}

/// One item's pricing state.
#[derive(Debug, Clone, Copy)]
struct PriceState {
    bounds: ItemPricingBounds,
    quote: PriceQuote,
}

/// Registry of per-item price state.
///
/// Quotes are read lock-free at arbitrary frequency from the shop path and
/// written only by the reconciler (or a startup restore). The buy/sell pair
/// is stored as one value, so readers never see a torn update.
#[derive(Debug, Default)]
pub struct PriceTable {
    states: DashMap<ItemId, PriceState>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item, publishing its initial quote
    /// `(base, base x spread_ratio)`.
    ///
    /// Idempotent per id: re-registration replaces the bounds but keeps the
    /// current runtime quote, which the next cycle re-clamps into the new
    /// band.
    pub fn register(
        &self,
        item_id: ItemId,
        bounds: ItemPricingBounds,
        spread_ratio: Decimal,
    ) -> PricingResult<()> {
        if spread_ratio >= Decimal::ONE || spread_ratio <= Decimal::ZERO {
            return Err(PricingError::ArbitrageConfiguration(spread_ratio));
        }

        match self.states.entry(item_id) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                occupied.get_mut().bounds = bounds;
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let sell = round_to_coins(Decimal::from(bounds.base_price) * spread_ratio).max(1);
                vacant.insert(PriceState {
                    bounds,
                    quote: PriceQuote::new(bounds.base_price, sell),
                });
            }
        }
        Ok(())
    }

    pub fn is_registered(&self, item_id: &ItemId) -> bool {
        self.states.contains_key(item_id)
    }

    pub fn quote(&self, item_id: &ItemId) -> Option<PriceQuote> {
        self.states.get(item_id).map(|state| state.quote)
    }

    pub fn base_price(&self, item_id: &ItemId) -> Option<i64> {
        self.states.get(item_id).map(|state| state.bounds.base_price)
    }

    pub fn bounds(&self, item_id: &ItemId) -> Option<ItemPricingBounds> {
        self.states.get(item_id).map(|state| state.bounds)
    }

    /// Publish a new quote. Returns `false` for unregistered items.
    pub fn commit(&self, item_id: &ItemId, quote: PriceQuote) -> bool {
        match self.states.get_mut(item_id) {
            Some(mut state) => {
                state.quote = quote;
                true
            }
            None => false,
        }
    }

    pub fn items(&self) -> Vec<ItemId> {
        self.states.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Snapshot every registered item's current quote.
    pub fn snapshot_records(&self, saved_at: DateTime<Utc>) -> Vec<PriceSnapshotRecord> {
        self.states
            .iter()
            .map(|entry| PriceSnapshotRecord::new(entry.key().clone(), entry.value().quote, saved_at))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_register_publishes_base_pair() {
        let table = PriceTable::new();
        let ore = ItemId::new("ore");
        let bounds = ItemPricingBounds::new(1000, 300, 1700).unwrap();
        table.register(ore.clone(), bounds, dec!(0.5)).unwrap();

        assert_eq!(table.quote(&ore), Some(PriceQuote::new(1000, 500)));
        assert_eq!(table.base_price(&ore), Some(1000));
    }

    #[test]
    fn test_reregistration_keeps_runtime_quote() {
        let table = PriceTable::new();
        let ore = ItemId::new("ore");
        let bounds = ItemPricingBounds::new(1000, 300, 1700).unwrap();
        table.register(ore.clone(), bounds, dec!(0.5)).unwrap();
        assert!(table.commit(&ore, PriceQuote::new(1030, 485)));

        let wider = ItemPricingBounds::new(1000, 100, 1900).unwrap();
        table.register(ore.clone(), wider, dec!(0.5)).unwrap();

        assert_eq!(table.quote(&ore), Some(PriceQuote::new(1030, 485)));
        assert_eq!(table.bounds(&ore), Some(wider));
    }

    #[test]
    fn test_register_rejects_arbitrage_spread() {
        let table = PriceTable::new();
        let bounds = ItemPricingBounds::new(1000, 300, 1700).unwrap();
        let result = table.register(ItemId::new("ore"), bounds, dec!(1.0));
        assert!(matches!(
            result,
            Err(PricingError::ArbitrageConfiguration(_))
        ));
        assert!(!table.is_registered(&ItemId::new("ore")));
    }

    #[test]
    fn test_bounds_validation() {
        assert!(ItemPricingBounds::new(1000, 1200, 1700).is_err());
        assert!(ItemPricingBounds::new(1000, 300, 900).is_err());
        assert!(ItemPricingBounds::new(0, 0, 10).is_err());
    }

    #[test]
    fn test_derived_bounds_match_band() {
        let bounds = ItemPricingBounds::derive(1000, dec!(0.7)).unwrap();
        assert_eq!(bounds.min_price, 300);
        assert_eq!(bounds.max_price, 1700);
    }

    #[test]
    fn test_derived_bounds_floor_at_one() {
        let bounds = ItemPricingBounds::derive(1, dec!(0.7)).unwrap();
        assert_eq!(bounds.min_price, 1);
        assert_eq!(bounds.base_price, 1);
    }

    #[test]
    fn test_rounding_midpoint_away_from_zero() {
        assert_eq!(round_to_coins(dec!(484.5)), 485);
        assert_eq!(round_to_coins(dec!(484.4)), 484);
        assert_eq!(round_to_coins(dec!(485.0)), 485);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let table = PriceTable::new();
        let bounds = ItemPricingBounds::new(1000, 300, 1700).unwrap();
        table.register(ItemId::new("ORE"), bounds, dec!(0.5)).unwrap();
        assert!(table.quote(&ItemId::new("ore")).is_some());
    }
}
