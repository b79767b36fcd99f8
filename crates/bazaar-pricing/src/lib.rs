//! Dynamic pricing for the bazaar engine.
//!
//! Trades accumulate impact-discounted volume per item over a cycle; the
//! reconciler periodically turns each item's net demand into a bounded,
//! smoothed, clamped price move and publishes a fresh buy/sell quote.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod impact;
pub mod price_state;
pub mod reconciler;

pub use aggregator::{CycleVolume, TradeVolumeAggregator};
pub use config::{PricingConfig, VolumeInfluenceConfig};
pub use error::{PricingError, PricingResult};
pub use impact::VolumeImpactCurve;
pub use price_state::{round_to_coins, ItemPricingBounds, PriceTable};
pub use reconciler::PriceReconciler;
