// 3.0 config.rs: session settings for a futures account. starting cash, margin multiplier, units.
// 3.1 presets cover the common simulation setups. validate() before building an account.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Quote;

// Session wide constants shared by every account built from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    // Cash the futures account starts the session with
    pub future_starting_cash: Quote,
    // Scales every exchange margin rate (1 = exchange rate as published)
    pub margin_multiplier: Decimal,
    // Ownership units outstanding. NAV per unit = total value / units
    pub units: Decimal,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            future_starting_cash: Quote::new(dec!(1_000_000)),
            margin_multiplier: Decimal::ONE,
            // one unit per unit of cash, so NAV starts at 1.0
            units: dec!(1_000_000),
        }
    }
}

impl AccountConfig {
    pub fn new(future_starting_cash: Quote, units: Decimal) -> Self {
        Self {
            future_starting_cash,
            units,
            ..Self::default()
        }
    }

    // Brokers commonly charge above exchange margin. 1.2x is a typical CTP add-on
    pub fn broker_margin() -> Self {
        Self {
            margin_multiplier: dec!(1.2),
            ..Self::default()
        }
    }

    // Small account for strategy smoke tests
    pub fn small() -> Self {
        Self {
            future_starting_cash: Quote::new(dec!(100_000)),
            units: dec!(100_000),
            ..Self::default()
        }
    }

    pub fn with_margin_multiplier(mut self, multiplier: Decimal) -> Self {
        self.margin_multiplier = multiplier;
        self
    }

    // NAV per unit the account opens the session with
    pub fn initial_unit_net_value(&self) -> Decimal {
        self.future_starting_cash.value() / self.units
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.future_starting_cash.is_negative() {
            return Err(ConfigError::InvalidStartingCash {
                reason: format!("starting cash {} is negative", self.future_starting_cash),
            });
        }

        if self.margin_multiplier <= Decimal::ZERO {
            return Err(ConfigError::InvalidMarginMultiplier {
                reason: format!("margin multiplier {} must be positive", self.margin_multiplier),
            });
        }

        // units is a divisor for NAV per unit
        if self.units <= Decimal::ZERO {
            return Err(ConfigError::InvalidUnits {
                reason: format!("units {} must be positive", self.units),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid starting cash: {reason}")]
    InvalidStartingCash { reason: String },

    #[error("Invalid margin multiplier: {reason}")]
    InvalidMarginMultiplier { reason: String },

    #[error("Invalid units: {reason}")]
    InvalidUnits { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = AccountConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_unit_net_value(), Decimal::ONE);
    }

    #[test]
    fn test_presets_valid() {
        assert!(AccountConfig::broker_margin().validate().is_ok());
        assert!(AccountConfig::small().validate().is_ok());
        assert_eq!(AccountConfig::broker_margin().margin_multiplier, dec!(1.2));
    }

    #[test]
    fn test_explicit_units() {
        let config = AccountConfig::new(Quote::new(dec!(1_000_000)), dec!(1000));
        assert_eq!(config.initial_unit_net_value(), dec!(1000));
        assert_eq!(config.margin_multiplier, Decimal::ONE);
    }

    #[test]
    fn test_invalid_units() {
        let config = AccountConfig::new(Quote::new(dec!(1_000_000)), Decimal::ZERO);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUnits { .. })));
    }

    #[test]
    fn test_invalid_margin_multiplier() {
        let config = AccountConfig::default().with_margin_multiplier(dec!(-1));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMarginMultiplier { .. })
        ));
    }

    #[test]
    fn test_negative_starting_cash() {
        let config = AccountConfig::new(Quote::new(dec!(-5)), dec!(1));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStartingCash { .. })
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AccountConfig::broker_margin();
        let json = serde_json::to_string(&config).unwrap();
        let back: AccountConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.margin_multiplier, config.margin_multiplier);
        assert_eq!(back.future_starting_cash, config.future_starting_cash);
    }
}
