//! Bazaar pricing service runtime.
//!
//! Wires the pricing table, volume aggregator, manipulation guard and
//! snapshot store into one facade (`MarketPricing`) and one long-running
//! application loop (`Application`).

pub mod app;
pub mod config;
pub mod error;
pub mod market;

pub use app::Application;
pub use config::{AppConfig, ItemConfig, PersistenceConfig};
pub use error::{AppError, AppResult};
pub use market::{MarketPricing, TradeOutcome};
