//! Prometheus metrics and structured logging for the bazaar engine.
//!
//! - Prometheus counters/gauges for trades, nullifications, cycles, alerts
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
