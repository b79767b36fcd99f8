//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pricing error: {0}")]
    Pricing(#[from] bazaar_pricing::PricingError),

    #[error("Guard error: {0}")]
    Guard(#[from] bazaar_guard::GuardError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] bazaar_persistence::PersistenceError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] bazaar_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
