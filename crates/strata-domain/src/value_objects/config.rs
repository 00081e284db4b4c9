use crate::error::SimulationError;
use serde::{Deserialize, Serialize};

fn default_cost_pct() -> f64 {
    0.0
}

/// Strategy configuration, a closed tagged variant. The dispatcher matches
/// exhaustively over this enum, so an unknown strategy name can only appear
/// at the serde/CLI boundary, where it surfaces as a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    BuyAndHold {
        #[serde(default = "default_cost_pct")]
        transaction_cost_pct: f64,
    },
    MaCrossover {
        short_window: usize,
        long_window: usize,
        #[serde(default = "default_cost_pct")]
        transaction_cost_pct: f64,
    },
    VolatilityTakeProfit {
        vol_threshold: f64,
        take_profit: f64,
        #[serde(default)]
        stop_loss: Option<f64>,
        #[serde(default = "default_cost_pct")]
        transaction_cost_pct: f64,
    },
}

impl StrategyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::BuyAndHold { .. } => "buy_and_hold",
            StrategyConfig::MaCrossover { .. } => "ma_crossover",
            StrategyConfig::VolatilityTakeProfit { .. } => "volatility_take_profit",
        }
    }

    pub fn transaction_cost_pct(&self) -> f64 {
        match self {
            StrategyConfig::BuyAndHold {
                transaction_cost_pct,
            }
            | StrategyConfig::MaCrossover {
                transaction_cost_pct,
                ..
            }
            | StrategyConfig::VolatilityTakeProfit {
                transaction_cost_pct,
                ..
            } => *transaction_cost_pct,
        }
    }

    /// Fails fast on nonsensical parameters, before any data is touched.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let cost = self.transaction_cost_pct();
        if !cost.is_finite() || !(0.0..1.0).contains(&cost) {
            return Err(SimulationError::InvalidConfig(format!(
                "transaction_cost_pct must be a fraction in [0, 1), got {cost}"
            )));
        }

        if let StrategyConfig::MaCrossover {
            short_window,
            long_window,
            ..
        } = self
        {
            if *short_window == 0 {
                return Err(SimulationError::InvalidConfig(
                    "short_window must be at least 1".to_string(),
                ));
            }
            if short_window >= long_window {
                return Err(SimulationError::InvalidConfig(format!(
                    "short_window ({short_window}) must be strictly less than long_window ({long_window})"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StrategyConfig;

    #[test]
    fn window_ordering_is_enforced() {
        let config = StrategyConfig::MaCrossover {
            short_window: 50,
            long_window: 20,
            transaction_cost_pct: 0.0,
        };
        assert!(config.validate().is_err());

        let equal = StrategyConfig::MaCrossover {
            short_window: 20,
            long_window: 20,
            transaction_cost_pct: 0.0,
        };
        assert!(equal.validate().is_err());
    }

    #[test]
    fn cost_fraction_is_bounded() {
        let config = StrategyConfig::BuyAndHold {
            transaction_cost_pct: 1.0,
        };
        assert!(config.validate().is_err());

        let ok = StrategyConfig::BuyAndHold {
            transaction_cost_pct: 0.001,
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn serde_round_trips_the_tag() {
        let config = StrategyConfig::VolatilityTakeProfit {
            vol_threshold: 0.05,
            take_profit: 0.02,
            stop_loss: None,
            transaction_cost_pct: 0.0,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"strategy\":\"volatility_take_profit\""));
        let back: StrategyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
