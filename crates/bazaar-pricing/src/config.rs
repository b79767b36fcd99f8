//! Pricing engine configuration.

use crate::error::{PricingError, PricingResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Volume-impact curve parameters.
///
/// Trades up to `tier1_max` units count at full weight; influence falls
/// linearly until `tier3_max`, where it bottoms out at `tier4_influence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeInfluenceConfig {
    /// Largest quantity that still counts at full weight.
    #[serde(default = "default_tier1_max")]
    pub tier1_max: u32,

    /// Quantity at which influence reaches its floor.
    #[serde(default = "default_tier3_max")]
    pub tier3_max: u32,

    /// Influence floor for very large trades (0.0-1.0).
    #[serde(default = "default_tier4_influence")]
    pub tier4_influence: Decimal,
}

fn default_tier1_max() -> u32 {
    10
}
fn default_tier3_max() -> u32 {
    100
}
fn default_tier4_influence() -> Decimal {
    Decimal::new(2, 1) // 0.2
}

impl Default for VolumeInfluenceConfig {
    fn default() -> Self {
        Self {
            tier1_max: default_tier1_max(),
            tier3_max: default_tier3_max(),
            tier4_influence: default_tier4_influence(),
        }
    }
}

impl VolumeInfluenceConfig {
    pub fn validate(&self) -> PricingResult<()> {
        if self.tier1_max == 0 {
            return Err(PricingError::Config(
                "volume_influence.tier1_max must be positive".to_string(),
            ));
        }
        if self.tier3_max <= self.tier1_max {
            return Err(PricingError::Config(format!(
                "volume_influence.tier3_max ({}) must exceed tier1_max ({})",
                self.tier3_max, self.tier1_max
            )));
        }
        if self.tier4_influence <= Decimal::ZERO || self.tier4_influence > Decimal::ONE {
            return Err(PricingError::Config(format!(
                "volume_influence.tier4_influence ({}) must be in (0, 1]",
                self.tier4_influence
            )));
        }
        Ok(())
    }
}

/// Configuration for price reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Reconciliation period in minutes.
    #[serde(default = "default_update_interval_minutes")]
    pub update_interval_minutes: u64,

    /// Half-width of the allowed price band around the base price, as a
    /// percentage (70 allows prices between 30% and 170% of base).
    #[serde(default = "default_max_price_change_percent")]
    pub max_price_change_percent: Decimal,

    /// Cap on a single cycle's raw price swing, as a percentage.
    #[serde(default = "default_max_change_per_update")]
    pub max_change_per_update: Decimal,

    /// Sell price may never exceed buy price times this ratio.
    #[serde(default = "default_sell_spread_ratio")]
    pub sell_spread_ratio: Decimal,

    /// Exponential smoothing factor toward the target price (0.0-1.0,
    /// higher reacts faster).
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: Decimal,

    #[serde(default)]
    pub volume_influence: VolumeInfluenceConfig,
}

fn default_update_interval_minutes() -> u64 {
    10
}
fn default_max_price_change_percent() -> Decimal {
    Decimal::from(70)
}
fn default_max_change_per_update() -> Decimal {
    Decimal::from(10)
}
fn default_sell_spread_ratio() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_smoothing_alpha() -> Decimal {
    Decimal::new(3, 1) // 0.3
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            update_interval_minutes: default_update_interval_minutes(),
            max_price_change_percent: default_max_price_change_percent(),
            max_change_per_update: default_max_change_per_update(),
            sell_spread_ratio: default_sell_spread_ratio(),
            smoothing_alpha: default_smoothing_alpha(),
            volume_influence: VolumeInfluenceConfig::default(),
        }
    }
}

impl PricingConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> PricingResult<()> {
        if self.update_interval_minutes == 0 {
            return Err(PricingError::Config(
                "update_interval_minutes must be positive".to_string(),
            ));
        }
        if self.max_price_change_percent <= Decimal::ZERO
            || self.max_price_change_percent >= Decimal::from(100)
        {
            return Err(PricingError::Config(format!(
                "max_price_change_percent ({}) must be in (0, 100)",
                self.max_price_change_percent
            )));
        }
        if self.max_change_per_update <= Decimal::ZERO
            || self.max_change_per_update > Decimal::from(100)
        {
            return Err(PricingError::Config(format!(
                "max_change_per_update ({}) must be in (0, 100]",
                self.max_change_per_update
            )));
        }
        if self.sell_spread_ratio <= Decimal::ZERO || self.sell_spread_ratio >= Decimal::ONE {
            return Err(PricingError::ArbitrageConfiguration(self.sell_spread_ratio));
        }
        if self.smoothing_alpha <= Decimal::ZERO || self.smoothing_alpha > Decimal::ONE {
            return Err(PricingError::Config(format!(
                "smoothing_alpha ({}) must be in (0, 1]",
                self.smoothing_alpha
            )));
        }
        self.volume_influence.validate()
    }

    /// Allowed band half-width as a ratio of base price.
    pub fn max_range_ratio(&self) -> Decimal {
        self.max_price_change_percent / Decimal::from(100)
    }

    /// Per-cycle change cap as a ratio.
    pub fn max_change_ratio(&self) -> Decimal {
        self.max_change_per_update / Decimal::from(100)
    }

    pub fn update_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.update_interval_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_validate() {
        let config = PricingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_range_ratio(), dec!(0.7));
        assert_eq!(config.max_change_ratio(), dec!(0.1));
        assert_eq!(config.update_interval().as_secs(), 600);
    }

    #[test]
    fn test_arbitrage_spread_rejected() {
        let config = PricingConfig {
            sell_spread_ratio: dec!(1.0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PricingError::ArbitrageConfiguration(_))
        ));
    }

    #[test]
    fn test_degenerate_influence_tiers_rejected() {
        let config = PricingConfig {
            volume_influence: VolumeInfluenceConfig {
                tier1_max: 100,
                tier3_max: 100,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = PricingConfig {
            update_interval_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
