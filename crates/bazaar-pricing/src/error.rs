//! Pricing error types.

use bazaar_core::ItemId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Item '{0}' is not registered")]
    UnregisteredItem(ItemId),

    /// The configured spread would let an actor sell back at or above the
    /// buy price. Registration is rejected and prior state retained.
    #[error("Arbitrage configuration: sell spread ratio {0} must be below 1")]
    ArbitrageConfiguration(Decimal),

    #[error("Invalid price bounds: {0}")]
    InvalidBounds(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type PricingResult<T> = Result<T, PricingError>;
