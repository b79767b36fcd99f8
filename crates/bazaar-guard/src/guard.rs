//! Manipulation guard implementation.
//!
//! Maintains short-lived trade histories over two indexes, by (actor, item)
//! for split-trade detection and by item for volume-bomb detection, and
//! classifies every trade before it may influence price.
//!
//! Histories live in `DashMap` buckets; classification locks one bucket at a
//! time, and the background sweep uses the same per-bucket locking, so a
//! sweep never deletes records out from under a concurrent classification.

use crate::alert::{AlertSink, ManipulationAlert};
use crate::config::GuardConfig;
use bazaar_core::{ActorId, ItemId, TradeRecord};
use bazaar_telemetry::Metrics;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// The pattern a suspicious trade matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManipulationKind {
    /// A large trade sliced into many small same-direction trades.
    SplitTrading,
    /// One actor dominating an item's traded volume.
    VolumeBombing,
}

impl ManipulationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SplitTrading => "split_trading",
            Self::VolumeBombing => "volume_bombing",
        }
    }
}

impl fmt::Display for ManipulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification result for one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeVerdict {
    /// The trade may influence price.
    Legitimate,
    /// The trade's price influence must be nullified.
    Suspicious(ManipulationKind),
}

impl TradeVerdict {
    pub fn is_suspicious(&self) -> bool {
        matches!(self, Self::Suspicious(_))
    }
}

/// Sliding-window manipulation detector.
///
/// Thread-safe: classification is called concurrently from trade handlers,
/// the sweep runs from a background task.
pub struct ManipulationGuard {
    config: GuardConfig,
    /// Split-trade index: same actor, same item.
    actor_history: DashMap<(ActorId, ItemId), VecDeque<TradeRecord>>,
    /// Volume-bomb index: all actors, same item.
    item_history: DashMap<ItemId, VecDeque<TradeRecord>>,
    /// Operator-alert rate limiting per (actor, item).
    alert_cooldowns: DashMap<(ActorId, ItemId), DateTime<Utc>>,
    sink: Arc<dyn AlertSink>,
}

impl ManipulationGuard {
    pub fn new(config: GuardConfig, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            config,
            actor_history: DashMap::new(),
            item_history: DashMap::new(),
            alert_cooldowns: DashMap::new(),
            sink,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Classify a trade, recording it into the detection windows.
    ///
    /// The record is kept whether or not the trade is flagged: a nullified
    /// trade still happened, and later volume-bomb shares must count it.
    /// Only the aggregator contribution is dropped by the caller.
    pub fn classify(&self, trade: &TradeRecord) -> TradeVerdict {
        if !self.config.enabled {
            return TradeVerdict::Legitimate;
        }

        let horizon = trade.timestamp - self.config.retention_horizon();

        // Split-trade index: record, trim, count same-direction trades in
        // the trailing window (this trade included).
        let split_cutoff = trade.timestamp - self.config.split_window();
        let split_count = {
            let key = (trade.actor_id.clone(), trade.item_id.clone());
            let mut history = self.actor_history.entry(key).or_default();
            history.push_back(trade.clone());
            trim_front(&mut history, horizon);
            history
                .iter()
                .filter(|t| t.side == trade.side && t.timestamp >= split_cutoff)
                .count()
        };

        // Volume-bomb index: record, trim, total up the trailing window.
        let bomb_cutoff = trade.timestamp - self.config.volume_bomb_window();
        let (actor_quantity, total_quantity, actor_trades) = {
            let mut history = self.item_history.entry(trade.item_id.clone()).or_default();
            history.push_back(trade.clone());
            trim_front(&mut history, horizon);

            let mut actor_quantity = 0u64;
            let mut total_quantity = 0u64;
            let mut actor_trades = 0usize;
            for t in history.iter().filter(|t| t.timestamp >= bomb_cutoff) {
                total_quantity += u64::from(t.quantity);
                if t.actor_id == trade.actor_id {
                    actor_quantity += u64::from(t.quantity);
                    actor_trades += 1;
                }
            }
            (actor_quantity, total_quantity, actor_trades)
        };

        if split_count >= self.config.split_max_transactions {
            warn!(
                actor = %trade.actor_id,
                item = %trade.item_id,
                side = %trade.side,
                trades_in_window = split_count,
                window_s = self.config.split_window_seconds,
                "Split-trading detected, nullifying price influence"
            );
            self.maybe_alert(trade, ManipulationKind::SplitTrading, split_count);
            return TradeVerdict::Suspicious(ManipulationKind::SplitTrading);
        }

        if total_quantity > 0 && actor_quantity >= u64::from(self.config.volume_bomb_min_amount) {
            let share = Decimal::from(actor_quantity) / Decimal::from(total_quantity);
            if share > self.config.volume_bomb_threshold {
                warn!(
                    actor = %trade.actor_id,
                    item = %trade.item_id,
                    side = %trade.side,
                    actor_quantity,
                    total_quantity,
                    %share,
                    "Volume-bombing detected, nullifying price influence"
                );
                self.maybe_alert(trade, ManipulationKind::VolumeBombing, actor_trades);
                return TradeVerdict::Suspicious(ManipulationKind::VolumeBombing);
            }
        }

        TradeVerdict::Legitimate
    }

    /// Emit an operator alert unless the (actor, item) pair is cooling down.
    fn maybe_alert(&self, trade: &TradeRecord, kind: ManipulationKind, trades_in_window: usize) {
        let key = (trade.actor_id.clone(), trade.item_id.clone());

        let mut last = self.alert_cooldowns.entry(key).or_insert(DateTime::<Utc>::MIN_UTC);
        if trade.timestamp - *last < self.config.alert_cooldown() {
            Metrics::alert_suppressed(kind.as_str());
            return;
        }
        *last = trade.timestamp;
        drop(last);

        let alert = ManipulationAlert::new(
            trade.actor_id.clone(),
            trade.item_id.clone(),
            kind,
            trade.side,
            trade.quantity,
            trades_in_window,
            trade.timestamp,
        );
        Metrics::alert_emitted(kind.as_str());
        self.sink.notify(&alert);
    }

    /// Purge records older than the retention horizon from both indexes.
    ///
    /// Returns the number of records removed. Driven by a periodic
    /// background task; per-bucket locking keeps it safe against concurrent
    /// classification.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let horizon = now - self.config.retention_horizon();
        let mut purged = 0usize;

        self.actor_history.retain(|_, history| {
            purged += trim_front(history, horizon);
            !history.is_empty()
        });
        self.item_history.retain(|_, history| {
            purged += trim_front(history, horizon);
            !history.is_empty()
        });

        // Cooldown entries past their window can never suppress again.
        let cooldown = self.config.alert_cooldown();
        self.alert_cooldowns.retain(|_, last| now - *last < cooldown);

        if purged > 0 {
            debug!(purged, "Purged expired trade-history records");
            Metrics::guard_records_purged(purged as u64);
        }
        purged
    }

    /// Total records currently retained (both indexes).
    pub fn history_len(&self) -> usize {
        let by_actor: usize = self.actor_history.iter().map(|e| e.value().len()).sum();
        let by_item: usize = self.item_history.iter().map(|e| e.value().len()).sum();
        by_actor + by_item
    }
}

/// Drop records with `timestamp < horizon` from the front of a
/// time-ordered deque; returns how many were removed.
fn trim_front(history: &mut VecDeque<TradeRecord>, horizon: DateTime<Utc>) -> usize {
    let mut removed = 0usize;
    while history.front().is_some_and(|t| t.timestamp < horizon) {
        history.pop_front();
        removed += 1;
    }
    removed
}
