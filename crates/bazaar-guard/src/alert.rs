//! Operator-facing manipulation alerts.
//!
//! The `AlertSink` trait is the boundary to whatever notification transport
//! the host runs (chat webhook, admin broadcast, pager). Delivery is
//! fire-and-forget and best-effort; the guard never waits on it.

use crate::guard::ManipulationKind;
use bazaar_core::{ActorId, ItemId, TradeSide};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// A manipulation alert emitted to the operator sink.
///
/// Rate-limited per (actor, item) pair by the guard's alert cooldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManipulationAlert {
    /// Unique alert id, for cross-referencing with logs.
    pub alert_id: String,
    pub actor_id: ActorId,
    pub item_id: ItemId,
    pub kind: ManipulationKind,
    pub side: TradeSide,
    /// Quantity of the trade that triggered the alert.
    pub quantity: u32,
    /// Trades by this actor on this item currently inside the detection
    /// window (the triggering trade included).
    pub trades_in_window: usize,
    pub detected_at: DateTime<Utc>,
}

impl ManipulationAlert {
    pub fn new(
        actor_id: ActorId,
        item_id: ItemId,
        kind: ManipulationKind,
        side: TradeSide,
        quantity: u32,
        trades_in_window: usize,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            alert_id: Uuid::new_v4().to_string(),
            actor_id,
            item_id,
            kind,
            side,
            quantity,
            trades_in_window,
            detected_at,
        }
    }
}

/// Destination for operator alerts.
///
/// Implementations must not block: the guard calls `notify` on the trade
/// hot path.
pub trait AlertSink: Send + Sync {
    fn notify(&self, alert: &ManipulationAlert);
}

/// Default sink: a structured warning in the service log.
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn notify(&self, alert: &ManipulationAlert) {
        warn!(
            alert_id = %alert.alert_id,
            actor = %alert.actor_id,
            item = %alert.item_id,
            kind = %alert.kind,
            side = %alert.side,
            quantity = alert.quantity,
            trades_in_window = alert.trades_in_window,
            "Manipulation alert"
        );
    }
}
