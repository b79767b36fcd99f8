//! Manipulation guard configuration.

use crate::error::{GuardError, GuardResult};
use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for the manipulation guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Enable manipulation detection. When disabled, every trade is
    /// classified as legitimate and no history is retained.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Trailing window for split-trade detection (seconds).
    #[serde(default = "default_split_window_seconds")]
    pub split_window_seconds: u64,

    /// Same-actor same-item same-direction trade count inside the window
    /// at which a trade is flagged (the flagged trade included).
    #[serde(default = "default_split_max_transactions")]
    pub split_max_transactions: usize,

    /// Trailing window for volume-bomb detection (seconds).
    #[serde(default = "default_volume_bomb_window_seconds")]
    pub volume_bomb_window_seconds: u64,

    /// Actor share of an item's total traded quantity above which the trade
    /// is flagged (0.0-1.0).
    #[serde(default = "default_volume_bomb_threshold")]
    pub volume_bomb_threshold: Decimal,

    /// Absolute quantity floor for volume-bomb flagging. Avoids false
    /// positives on thin, low-liquidity items.
    #[serde(default = "default_volume_bomb_min_amount")]
    pub volume_bomb_min_amount: u32,

    /// Minimum time between operator alerts per (actor, item) pair (seconds).
    #[serde(default = "default_alert_cooldown_seconds")]
    pub alert_cooldown_seconds: u64,

    /// Interval of the background history sweep (seconds).
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

fn default_enabled() -> bool {
    true
}
fn default_split_window_seconds() -> u64 {
    60
}
fn default_split_max_transactions() -> usize {
    5
}
fn default_volume_bomb_window_seconds() -> u64 {
    600
}
fn default_volume_bomb_threshold() -> Decimal {
    Decimal::new(3, 1) // 0.3
}
fn default_volume_bomb_min_amount() -> u32 {
    20
}
fn default_alert_cooldown_seconds() -> u64 {
    300
}
fn default_sweep_interval_seconds() -> u64 {
    60
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            split_window_seconds: default_split_window_seconds(),
            split_max_transactions: default_split_max_transactions(),
            volume_bomb_window_seconds: default_volume_bomb_window_seconds(),
            volume_bomb_threshold: default_volume_bomb_threshold(),
            volume_bomb_min_amount: default_volume_bomb_min_amount(),
            alert_cooldown_seconds: default_alert_cooldown_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

impl GuardConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> GuardResult<()> {
        if self.split_window_seconds == 0 {
            return Err(GuardError::Config(
                "split_window_seconds must be positive".to_string(),
            ));
        }
        if self.split_max_transactions < 2 {
            return Err(GuardError::Config(format!(
                "split_max_transactions ({}) must be at least 2",
                self.split_max_transactions
            )));
        }
        if self.volume_bomb_window_seconds == 0 {
            return Err(GuardError::Config(
                "volume_bomb_window_seconds must be positive".to_string(),
            ));
        }
        if self.volume_bomb_threshold <= Decimal::ZERO || self.volume_bomb_threshold >= Decimal::ONE
        {
            return Err(GuardError::Config(format!(
                "volume_bomb_threshold ({}) must be in (0, 1)",
                self.volume_bomb_threshold
            )));
        }
        if self.sweep_interval_seconds == 0 {
            return Err(GuardError::Config(
                "sweep_interval_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn split_window(&self) -> Duration {
        Duration::seconds(self.split_window_seconds as i64)
    }

    pub fn volume_bomb_window(&self) -> Duration {
        Duration::seconds(self.volume_bomb_window_seconds as i64)
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::seconds(self.alert_cooldown_seconds as i64)
    }

    /// How long trade records must be retained: the longest detection window.
    pub fn retention_horizon(&self) -> Duration {
        std::cmp::max(self.split_window(), self.volume_bomb_window())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = GuardConfig::default();
        assert!(config.enabled);
        assert_eq!(config.split_window_seconds, 60);
        assert_eq!(config.split_max_transactions, 5);
        assert_eq!(config.volume_bomb_threshold, dec!(0.3));
        assert_eq!(config.volume_bomb_min_amount, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retention_horizon_is_longest_window() {
        let config = GuardConfig::default();
        assert_eq!(config.retention_horizon(), Duration::seconds(600));

        let config = GuardConfig {
            split_window_seconds: 900,
            ..Default::default()
        };
        assert_eq!(config.retention_horizon(), Duration::seconds(900));
    }

    #[test]
    fn test_validate_rejects_degenerate_threshold() {
        let config = GuardConfig {
            volume_bomb_threshold: dec!(1.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GuardConfig {
            volume_bomb_threshold: dec!(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_split_count() {
        let config = GuardConfig {
            split_max_transactions: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
