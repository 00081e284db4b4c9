use crate::error::SimulationError;
use crate::services::rolling::RollingMean;
use crate::services::state::SimulationState;
use crate::value_objects::bar::PriceSeries;
use crate::value_objects::config::StrategyConfig;
use crate::value_objects::snapshot::{PortfolioSnapshot, Trajectory};

/// Simulate `config` against `series`, producing a day-by-day trajectory.
///
/// Validation happens in a fixed order: configuration and capital first,
/// then data sufficiency, then entry feasibility. An invalid MA window
/// ordering therefore fails before any bar is touched.
pub fn run_strategy(
    series: &PriceSeries,
    config: &StrategyConfig,
    initial_capital: f64,
) -> Result<Trajectory, SimulationError> {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(SimulationError::InvalidConfig(format!(
            "initial_capital must be positive, got {initial_capital}"
        )));
    }
    config.validate()?;

    match config {
        StrategyConfig::BuyAndHold {
            transaction_cost_pct,
        } => buy_and_hold(series, *transaction_cost_pct, initial_capital),
        StrategyConfig::MaCrossover {
            short_window,
            long_window,
            transaction_cost_pct,
        } => ma_crossover(
            series,
            *short_window,
            *long_window,
            *transaction_cost_pct,
            initial_capital,
        ),
        StrategyConfig::VolatilityTakeProfit {
            vol_threshold,
            take_profit,
            stop_loss,
            transaction_cost_pct,
        } => volatility_take_profit(
            series,
            *vol_threshold,
            *take_profit,
            *stop_loss,
            *transaction_cost_pct,
            initial_capital,
        ),
    }
}

/// Single round trip: the transaction cost is deducted once, up front, from
/// capital. Effective capital buys an integer share count at the first close
/// and the leftover cash is held constant for the rest of the series.
fn buy_and_hold(
    series: &PriceSeries,
    cost_pct: f64,
    initial_capital: f64,
) -> Result<Trajectory, SimulationError> {
    let Some(first) = series.bars.first() else {
        return Err(SimulationError::InsufficientData(format!(
            "no bars available for {}",
            series.ticker
        )));
    };

    let effective_capital = initial_capital * (1.0 - cost_pct);
    let entry_price = first.close;
    let shares = (effective_capital / entry_price).floor() as u64;
    if shares == 0 {
        return Err(SimulationError::InsufficientCapital {
            price: entry_price,
            available: effective_capital,
        });
    }
    let cash = effective_capital - shares as f64 * entry_price;

    let mut trajectory = Vec::with_capacity(series.bars.len());
    for bar in &series.bars {
        let portfolio_value = cash + shares as f64 * bar.close;
        trajectory.push(PortfolioSnapshot {
            date: bar.date,
            price: bar.close,
            shares,
            cash,
            portfolio_value,
            returns_factor: portfolio_value / initial_capital,
            signal: 1,
            short_ma: None,
            long_ma: None,
        });
    }
    Ok(trajectory)
}

/// Two-state machine over `signal = short_MA > long_MA`. Bars before both
/// windows are populated are excluded from the trajectory, not NaN-filled:
/// entry logic requires a defined signal. Fees are per trade, proportional
/// to the notional at the moment of the trade. No forced liquidation at
/// series end.
fn ma_crossover(
    series: &PriceSeries,
    short_window: usize,
    long_window: usize,
    cost_pct: f64,
    initial_capital: f64,
) -> Result<Trajectory, SimulationError> {
    if series.bars.len() < long_window {
        return Err(SimulationError::InsufficientData(format!(
            "{} has {} bars, need at least {} to fill the long window",
            series.ticker,
            series.bars.len(),
            long_window
        )));
    }

    let mut short_mean = RollingMean::new(short_window);
    let mut long_mean = RollingMean::new(long_window);
    let mut state = SimulationState::new(initial_capital);
    let mut trajectory = Vec::with_capacity(series.bars.len() - long_window + 1);

    for bar in &series.bars {
        let short = short_mean.update(bar.close);
        let long = long_mean.update(bar.close);
        let (Some(short), Some(long)) = (short, long) else {
            continue;
        };

        let signal = short > long;
        if signal && !state.is_invested() {
            if state.enter(bar.close, cost_pct) == 0 {
                return Err(SimulationError::InsufficientCapital {
                    price: bar.close,
                    available: state.cash,
                });
            }
        } else if !signal && state.is_invested() {
            state.exit(bar.close, cost_pct);
        }

        let portfolio_value = state.value_at(bar.close);
        trajectory.push(PortfolioSnapshot {
            date: bar.date,
            price: bar.close,
            shares: state.shares,
            cash: state.cash,
            portfolio_value,
            returns_factor: portfolio_value / initial_capital,
            signal: signal as u8,
            short_ma: Some(short),
            long_ma: Some(long),
        });
    }

    Ok(trajectory)
}

/// Event-driven entry on daily absolute return, exit on return since entry.
/// The first bar has no defined return and never triggers an entry. An open
/// position at series end is force-liquidated at the last close so that
/// final_value reflects realizable cash; only the final row is rewritten.
fn volatility_take_profit(
    series: &PriceSeries,
    vol_threshold: f64,
    take_profit: f64,
    stop_loss: Option<f64>,
    cost_pct: f64,
    initial_capital: f64,
) -> Result<Trajectory, SimulationError> {
    if series.bars.is_empty() {
        return Err(SimulationError::InsufficientData(format!(
            "no bars available for {}",
            series.ticker
        )));
    }

    let mut state = SimulationState::new(initial_capital);
    let mut prev_close: Option<f64> = None;
    let mut trajectory = Vec::with_capacity(series.bars.len());

    for bar in &series.bars {
        let daily_return = prev_close.map(|prev| bar.close / prev - 1.0);
        prev_close = Some(bar.close);

        if let Some(entry) = state.entry_price {
            let since_entry = bar.close / entry - 1.0;
            let hit_take_profit = since_entry >= take_profit;
            let hit_stop_loss = stop_loss.is_some_and(|sl| since_entry <= -sl);
            if hit_take_profit || hit_stop_loss {
                state.exit(bar.close, cost_pct);
            }
        } else if let Some(ret) = daily_return {
            if ret.abs() > vol_threshold {
                // Zero computable shares leaves the state flat, not failed.
                state.enter(bar.close, cost_pct);
            }
        }

        let portfolio_value = state.value_at(bar.close);
        trajectory.push(PortfolioSnapshot {
            date: bar.date,
            price: bar.close,
            shares: state.shares,
            cash: state.cash,
            portfolio_value,
            returns_factor: portfolio_value / initial_capital,
            signal: state.is_invested() as u8,
            short_ma: None,
            long_ma: None,
        });
    }

    if state.is_invested() {
        if let (Some(last_bar), Some(last_row)) = (series.bars.last(), trajectory.last_mut()) {
            state.exit(last_bar.close, cost_pct);
            last_row.shares = 0;
            last_row.cash = state.cash;
            last_row.portfolio_value = state.cash;
            last_row.returns_factor = state.cash / initial_capital;
            last_row.signal = 0;
        }
    }

    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::run_strategy;
    use crate::error::SimulationError;
    use crate::value_objects::bar::{Bar, PriceSeries};
    use crate::value_objects::config::StrategyConfig;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(idx, close)| Bar::from_close(start + chrono::Days::new(idx as u64), *close))
            .collect();
        PriceSeries::new("TEST", bars)
    }

    #[test]
    fn empty_series_is_insufficient_data() {
        let config = StrategyConfig::BuyAndHold {
            transaction_cost_pct: 0.0,
        };
        let err = run_strategy(&series(&[]), &config, 1000.0).unwrap_err();
        assert!(matches!(err, SimulationError::InsufficientData(_)));
    }

    #[test]
    fn non_positive_capital_is_invalid_config() {
        let config = StrategyConfig::BuyAndHold {
            transaction_cost_pct: 0.0,
        };
        let err = run_strategy(&series(&[100.0]), &config, 0.0).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfig(_)));
    }

    #[test]
    fn buy_and_hold_holds_integer_shares_and_leftover_cash() {
        let config = StrategyConfig::BuyAndHold {
            transaction_cost_pct: 0.0,
        };
        let trajectory = run_strategy(&series(&[30.0, 33.0]), &config, 1000.0).unwrap();
        // floor(1000 / 30) = 33 shares, leftover 10
        assert_eq!(trajectory[0].shares, 33);
        assert!((trajectory[0].cash - 10.0).abs() < 1e-9);
        assert!((trajectory[1].portfolio_value - (10.0 + 33.0 * 33.0)).abs() < 1e-9);
    }

    #[test]
    fn buy_and_hold_cost_is_deducted_once_up_front() {
        let config = StrategyConfig::BuyAndHold {
            transaction_cost_pct: 0.1,
        };
        let trajectory = run_strategy(&series(&[100.0, 100.0, 100.0]), &config, 1000.0).unwrap();
        // effective capital 900 -> 9 shares, zero cash; value stays 900
        assert_eq!(trajectory[0].shares, 9);
        for row in &trajectory {
            assert!((row.portfolio_value - 900.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ma_crossover_requires_long_window_of_bars() {
        let config = StrategyConfig::MaCrossover {
            short_window: 2,
            long_window: 5,
            transaction_cost_pct: 0.0,
        };
        let err = run_strategy(&series(&[10.0, 10.0, 10.0]), &config, 1000.0).unwrap_err();
        assert!(matches!(err, SimulationError::InsufficientData(_)));
    }

    #[test]
    fn ma_crossover_trims_warmup_bars_from_trajectory() {
        let config = StrategyConfig::MaCrossover {
            short_window: 2,
            long_window: 3,
            transaction_cost_pct: 0.0,
        };
        let trajectory =
            run_strategy(&series(&[10.0, 10.0, 10.0, 20.0, 20.0, 20.0]), &config, 1000.0).unwrap();
        assert_eq!(trajectory.len(), 4);
        assert!(trajectory.iter().all(|row| row.short_ma.is_some()));
        assert!(trajectory.iter().all(|row| row.long_ma.is_some()));
    }

    #[test]
    fn ma_crossover_exit_charges_fee_on_notional() {
        // Signal turns on at the fourth bar and off at the last one.
        let closes = [10.0, 10.0, 10.0, 20.0, 20.0, 1.0];
        let config = StrategyConfig::MaCrossover {
            short_window: 2,
            long_window: 3,
            transaction_cost_pct: 0.01,
        };
        let trajectory = run_strategy(&series(&closes), &config, 1000.0).unwrap();

        // Entry at 20: fee = 10, floor(990 / 20) = 49 shares, cash = 10.
        let entry = &trajectory[1];
        assert_eq!(entry.shares, 49);
        assert!((entry.cash - 10.0).abs() < 1e-9);

        // Exit at 1: proceeds 49, fee 0.49.
        let exit = trajectory.last().unwrap();
        assert_eq!(exit.shares, 0);
        assert!((exit.cash - (10.0 + 49.0 - 0.49)).abs() < 1e-9);
        assert_eq!(exit.signal, 0);
    }

    #[test]
    fn ma_crossover_entry_without_one_share_is_insufficient_capital() {
        let config = StrategyConfig::MaCrossover {
            short_window: 2,
            long_window: 3,
            transaction_cost_pct: 0.0,
        };
        // Signal turns on at the 20 bar; 15 cannot buy a single share.
        let err =
            run_strategy(&series(&[10.0, 10.0, 10.0, 20.0, 20.0]), &config, 15.0).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InsufficientCapital { price, .. } if price == 20.0
        ));
    }

    #[test]
    fn volatility_strategy_never_enters_on_first_bar() {
        let config = StrategyConfig::VolatilityTakeProfit {
            vol_threshold: 0.0,
            take_profit: 10.0,
            stop_loss: None,
            transaction_cost_pct: 0.0,
        };
        let trajectory = run_strategy(&series(&[100.0]), &config, 1000.0).unwrap();
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory[0].signal, 0);
        assert_eq!(trajectory[0].shares, 0);
    }

    #[test]
    fn volatility_strategy_stays_flat_when_shares_would_be_zero() {
        let config = StrategyConfig::VolatilityTakeProfit {
            vol_threshold: 0.05,
            take_profit: 0.02,
            stop_loss: None,
            transaction_cost_pct: 0.0,
        };
        // |return| > 5% on the second bar, but 50 cannot buy a 200 share.
        let trajectory = run_strategy(&series(&[100.0, 200.0, 200.0]), &config, 50.0).unwrap();
        assert!(trajectory.iter().all(|row| row.shares == 0));
        assert!(trajectory.iter().all(|row| (row.cash - 50.0).abs() < 1e-9));
    }

    #[test]
    fn volatility_strategy_take_profit_exits_with_fee_on_notional() {
        let config = StrategyConfig::VolatilityTakeProfit {
            vol_threshold: 0.05,
            take_profit: 0.10,
            stop_loss: None,
            transaction_cost_pct: 0.01,
        };
        let trajectory =
            run_strategy(&series(&[100.0, 106.0, 120.0, 120.0, 120.0]), &config, 1000.0).unwrap();

        // Enter at 106: fee = 10, shares = floor(990 / 106) = 9, cash = 36.
        assert_eq!(trajectory[1].shares, 9);
        assert!((trajectory[1].cash - 36.0).abs() < 1e-9);

        // 120 / 106 - 1 = 13.2% >= 10%: exit mid-series.
        // Proceeds 9 * 120 = 1080, fee 10.80, cash = 36 + 1069.20.
        assert_eq!(trajectory[2].shares, 0);
        assert_eq!(trajectory[2].signal, 0);
        assert!((trajectory[2].cash - 1105.2).abs() < 1e-9);

        // Flat to the end; no terminal rewrite of the last row.
        let last = trajectory.last().unwrap();
        assert_eq!(last.shares, 0);
        assert!((last.portfolio_value - 1105.2).abs() < 1e-9);
    }

    #[test]
    fn volatility_strategy_stop_loss_exits() {
        let config = StrategyConfig::VolatilityTakeProfit {
            vol_threshold: 0.05,
            take_profit: 0.50,
            stop_loss: Some(0.04),
            transaction_cost_pct: 0.0,
        };
        // Enter at 106 (6% move), then fall to 101: -4.7% since entry.
        let trajectory =
            run_strategy(&series(&[100.0, 106.0, 101.0, 101.0]), &config, 1060.0).unwrap();
        assert_eq!(trajectory[1].signal, 1);
        assert_eq!(trajectory[2].signal, 0);
        assert_eq!(trajectory[2].shares, 0);
    }
}
