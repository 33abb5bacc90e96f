//! Regulatory policy data: revolving simulation constants and card-line tiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CatError, CatResult};

/// Constants of the mandated revolving-credit simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevolvingPolicy {
    /// Periods simulated before the balance is paid off in full
    pub horizon_periods: u32,

    /// Fixed currency floor of the minimum payment
    pub minimum_payment_floor: f64,

    /// The annual fee is charged on every period that is a multiple of this
    pub fee_interval_periods: u32,
}

impl RevolvingPolicy {
    pub fn validate(&self) -> CatResult<()> {
        if self.horizon_periods == 0 {
            return Err(CatError::invalid("horizon_periods must be at least 1"));
        }
        if self.fee_interval_periods == 0 {
            return Err(CatError::invalid("fee_interval_periods must be at least 1"));
        }
        if !self.minimum_payment_floor.is_finite() || self.minimum_payment_floor < 0.0 {
            return Err(CatError::invalid(format!(
                "minimum_payment_floor must be non-negative, got {}",
                self.minimum_payment_floor
            )));
        }
        Ok(())
    }
}

impl Default for RevolvingPolicy {
    fn default() -> Self {
        Self {
            horizon_periods: 36,
            minimum_payment_floor: 100.0,
            fee_interval_periods: 12,
        }
    }
}

/// Standard credit-card line sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTier {
    Classic,
    Gold,
    Platinum,
}

impl CardTier {
    pub const ALL: [CardTier; 3] = [CardTier::Classic, CardTier::Gold, CardTier::Platinum];
}

impl fmt::Display for CardTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardTier::Classic => "classic",
            CardTier::Gold => "gold",
            CardTier::Platinum => "platinum",
        };
        f.write_str(name)
    }
}

impl FromStr for CardTier {
    type Err = CatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" | "clasica" | "clásica" => Ok(CardTier::Classic),
            "gold" | "oro" => Ok(CardTier::Gold),
            "platinum" | "platino" => Ok(CardTier::Platinum),
            other => Err(CatError::invalid(format!("unknown card tier: {other}"))),
        }
    }
}

/// Line sizes per tier, expressed in a secondary unit of account (UDIs) and
/// converted to currency by a fixed factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardTierTable {
    /// Currency value of one unit of account
    pub unit_value: f64,
    pub classic_units: f64,
    pub gold_units: f64,
    pub platinum_units: f64,
}

impl CardTierTable {
    pub fn with_unit_value(mut self, unit_value: f64) -> Self {
        self.unit_value = unit_value;
        self
    }

    pub fn units(&self, tier: CardTier) -> f64 {
        match tier {
            CardTier::Classic => self.classic_units,
            CardTier::Gold => self.gold_units,
            CardTier::Platinum => self.platinum_units,
        }
    }

    /// Credit line in currency for a tier
    pub fn line_amount(&self, tier: CardTier) -> f64 {
        self.units(tier) * self.unit_value
    }
}

impl Default for CardTierTable {
    fn default() -> Self {
        Self {
            unit_value: 7.5,
            classic_units: 3_000.0,
            gold_units: 7_000.0,
            platinum_units: 13_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RevolvingPolicy::default();
        assert_eq!(policy.horizon_periods, 36);
        assert_eq!(policy.minimum_payment_floor, 100.0);
        assert_eq!(policy.fee_interval_periods, 12);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_policy_rejects_zero_horizon() {
        let policy = RevolvingPolicy {
            horizon_periods: 0,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_tier_line_amounts() {
        let table = CardTierTable::default();
        assert_eq!(table.line_amount(CardTier::Classic), 22_500.0);
        assert_eq!(table.line_amount(CardTier::Gold), 52_500.0);
        assert_eq!(table.line_amount(CardTier::Platinum), 97_500.0);

        let table = table.with_unit_value(8.0);
        assert_eq!(table.line_amount(CardTier::Classic), 24_000.0);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("clasica".parse::<CardTier>().unwrap(), CardTier::Classic);
        assert_eq!("Oro".parse::<CardTier>().unwrap(), CardTier::Gold);
        assert_eq!(" platinum ".parse::<CardTier>().unwrap(), CardTier::Platinum);
        assert!("diamante".parse::<CardTier>().is_err());

        for tier in CardTier::ALL {
            assert_eq!(tier.to_string().parse::<CardTier>().unwrap(), tier);
        }
    }
}
