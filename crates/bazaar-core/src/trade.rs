//! Trade events and published prices.

use crate::{ActorId, ItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade from the actor's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    /// Actor buys the item from the shop.
    Buy,
    /// Actor sells the item to the shop.
    Sell,
}

impl TradeSide {
    #[inline]
    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// A single trade event.
///
/// Ephemeral: retained only inside the manipulation guard's sliding windows
/// and purged once older than the retention horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub actor_id: ActorId,
    pub item_id: ItemId,
    /// Raw traded quantity in whole units (before impact discounting).
    pub quantity: u32,
    pub side: TradeSide,
    pub timestamp: DateTime<Utc>,
}

impl TradeRecord {
    pub fn new(
        actor_id: ActorId,
        item_id: ItemId,
        quantity: u32,
        side: TradeSide,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            actor_id,
            item_id,
            quantity,
            side,
            timestamp,
        }
    }

    /// Convenience constructor stamping the record with the current time.
    pub fn now(actor_id: ActorId, item_id: ItemId, quantity: u32, side: TradeSide) -> Self {
        Self::new(actor_id, item_id, quantity, side, Utc::now())
    }
}

/// The published buy/sell price pair for an item.
///
/// Always read and written as one value so concurrent readers never observe
/// a buy price from one cycle paired with a sell price from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Price an actor pays to buy one unit from the shop.
    pub buy: i64,
    /// Price an actor receives selling one unit to the shop.
    pub sell: i64,
}

impl PriceQuote {
    pub fn new(buy: i64, sell: i64) -> Self {
        Self { buy, sell }
    }

    /// Basic sanity for restored snapshots: positive prices, sell not above buy.
    pub fn is_sane(&self) -> bool {
        self.buy >= 1 && self.sell >= 1 && self.sell <= self.buy
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buy={} sell={}", self.buy, self.sell)
    }
}

/// Persisted form of one item's quote, written at the end of every
/// reconciliation cycle and read back at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshotRecord {
    pub item_id: ItemId,
    pub buy_price: i64,
    pub sell_price: i64,
    /// Millisecond timestamp of the cycle that produced this record.
    pub saved_at_ms: i64,
}

impl PriceSnapshotRecord {
    pub fn new(item_id: ItemId, quote: PriceQuote, saved_at: DateTime<Utc>) -> Self {
        Self {
            item_id,
            buy_price: quote.buy,
            sell_price: quote.sell,
            saved_at_ms: saved_at.timestamp_millis(),
        }
    }

    pub fn quote(&self) -> PriceQuote {
        PriceQuote::new(self.buy_price, self.sell_price)
    }
}
