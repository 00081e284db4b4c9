pub mod backtest;
pub mod compare;
pub mod grid;

use clap::{Args, ValueEnum};
use strata_domain::value_objects::config::StrategyConfig;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StrategyName {
    BuyAndHold,
    MaCrossover,
    VolatilityTakeProfit,
}

/// Strategy selection flags shared by `backtest` and `compare`. Parameter
/// checks beyond presence live in `StrategyConfig::validate`.
#[derive(Args, Debug, Clone)]
pub struct StrategyArgs {
    /// Strategy to simulate.
    #[arg(long, value_enum)]
    pub strategy: StrategyName,

    /// Proportional fee per trade, e.g. 0.001 for 10 bps.
    #[arg(long, default_value_t = 0.0)]
    pub transaction_cost_pct: f64,

    /// Short moving-average window in bars (ma-crossover only).
    #[arg(long)]
    pub short_window: Option<usize>,

    /// Long moving-average window in bars (ma-crossover only).
    #[arg(long)]
    pub long_window: Option<usize>,

    /// Absolute daily-return entry trigger (volatility-take-profit only).
    #[arg(long)]
    pub vol_threshold: Option<f64>,

    /// Gain fraction that closes the position (volatility-take-profit only).
    #[arg(long)]
    pub take_profit: Option<f64>,

    /// Optional loss fraction that closes the position (volatility-take-profit only).
    #[arg(long)]
    pub stop_loss: Option<f64>,
}

impl StrategyArgs {
    pub fn to_config(&self) -> Result<StrategyConfig, String> {
        let config = match self.strategy {
            StrategyName::BuyAndHold => StrategyConfig::BuyAndHold {
                transaction_cost_pct: self.transaction_cost_pct,
            },
            StrategyName::MaCrossover => StrategyConfig::MaCrossover {
                short_window: self
                    .short_window
                    .ok_or("--short-window is required for ma-crossover")?,
                long_window: self
                    .long_window
                    .ok_or("--long-window is required for ma-crossover")?,
                transaction_cost_pct: self.transaction_cost_pct,
            },
            StrategyName::VolatilityTakeProfit => StrategyConfig::VolatilityTakeProfit {
                vol_threshold: self
                    .vol_threshold
                    .ok_or("--vol-threshold is required for volatility-take-profit")?,
                take_profit: self
                    .take_profit
                    .ok_or("--take-profit is required for volatility-take-profit")?,
                stop_loss: self.stop_loss,
                transaction_cost_pct: self.transaction_cost_pct,
            },
        };
        config.validate().map_err(|err| err.to_string())?;
        Ok(config)
    }
}
