//! Trade manipulation detection for the bazaar pricing engine.
//!
//! Classifies each trade before it is allowed to influence price:
//! - Split-trading: one large trade sliced into many small ones to evade
//!   the volume-impact discount
//! - Volume-bombing: one actor dominating an item's traded volume inside
//!   a trailing window
//!
//! Detection never blocks the trade itself; only its price influence is
//! nullified ("detect, don't reject").

pub mod alert;
pub mod config;
pub mod error;
pub mod guard;

pub use alert::{AlertSink, LogAlertSink, ManipulationAlert};
pub use config::GuardConfig;
pub use error::{GuardError, GuardResult};
pub use guard::{ManipulationGuard, ManipulationKind, TradeVerdict};
