//! Volume-impact discounting.
//!
//! A trade's price influence falls off with its size, so one whale trade
//! cannot move the market as much as many small trades of equal total.

use crate::config::VolumeInfluenceConfig;
use rust_decimal::Decimal;

/// Piecewise-linear impact curve.
///
/// Full weight up to `tier1_max`, linear falloff to `tier4_influence` at
/// `tier3_max`, flat beyond.
#[derive(Debug, Clone)]
pub struct VolumeImpactCurve {
    full_weight_max: Decimal,
    floor_quantity: Decimal,
    floor_factor: Decimal,
}

impl VolumeImpactCurve {
    pub fn new(config: &VolumeInfluenceConfig) -> Self {
        Self {
            full_weight_max: Decimal::from(config.tier1_max),
            floor_quantity: Decimal::from(config.tier3_max),
            floor_factor: config.tier4_influence,
        }
    }

    /// Impact factor for a trade of `quantity` units, in
    /// `[floor_factor, 1.0]`.
    pub fn factor(&self, quantity: u32) -> Decimal {
        let quantity = Decimal::from(quantity);
        if quantity <= self.full_weight_max {
            return Decimal::ONE;
        }
        if quantity >= self.floor_quantity {
            return self.floor_factor;
        }
        let span = self.floor_quantity - self.full_weight_max;
        let progress = (quantity - self.full_weight_max) / span;
        Decimal::ONE - (Decimal::ONE - self.floor_factor) * progress
    }

    /// Impact-discounted volume contribution of a trade.
    pub fn discounted(&self, quantity: u32) -> Decimal {
        Decimal::from(quantity) * self.factor(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn curve() -> VolumeImpactCurve {
        VolumeImpactCurve::new(&VolumeInfluenceConfig::default())
    }

    #[test]
    fn test_small_trades_full_weight() {
        let curve = curve();
        assert_eq!(curve.factor(1), dec!(1));
        assert_eq!(curve.factor(10), dec!(1));
        assert_eq!(curve.discounted(5), dec!(5));
    }

    #[test]
    fn test_floor_beyond_tier3() {
        let curve = curve();
        assert_eq!(curve.factor(100), dec!(0.2));
        assert_eq!(curve.factor(200), dec!(0.2));
        assert_eq!(curve.discounted(200), dec!(40));
    }

    #[test]
    fn test_linear_interpolation_midpoint() {
        let curve = curve();
        // Halfway between 10 and 100 the factor is halfway between 1 and 0.2.
        assert_eq!(curve.factor(55), dec!(0.6));
    }

    #[test]
    fn test_factor_monotone_nonincreasing() {
        let curve = curve();
        let mut previous = curve.factor(1);
        for quantity in 2..150 {
            let factor = curve.factor(quantity);
            assert!(factor <= previous, "factor rose at quantity {quantity}");
            previous = factor;
        }
    }

    #[test]
    fn test_whale_trade_moves_less_than_split_equivalent() {
        let curve = curve();
        let whale = curve.discounted(200);
        let split: Decimal = (0..20).map(|_| curve.discounted(10)).sum();
        assert!(whale < split);
        assert_eq!(split, dec!(200));
    }
}
