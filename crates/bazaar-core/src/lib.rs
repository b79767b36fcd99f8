//! Core domain types for the bazaar market-pricing engine.
//!
//! This crate provides fundamental types used throughout the pricing system:
//! - `ItemId`, `ActorId`: stable identifiers
//! - `TradeSide`, `TradeRecord`: the trade event stream
//! - `PriceQuote`, `PriceSnapshotRecord`: published prices and their
//!   persisted form

pub mod ids;
pub mod trade;

pub use ids::{ActorId, ItemId};
pub use trade::{PriceQuote, PriceSnapshotRecord, TradeRecord, TradeSide};
