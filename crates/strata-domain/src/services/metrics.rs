use crate::error::SimulationError;
use crate::value_objects::snapshot::PortfolioSnapshot;
use crate::value_objects::summary::PerformanceSummary;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Reduce a trajectory to comparable summary statistics.
///
/// The horizon for annualization is calendar days between the first and last
/// trajectory dates, not trading days. Undefined statistics (zero-day
/// horizon, fewer than two return observations) come back as NaN, never as
/// an error.
pub fn summarize(
    trajectory: &[PortfolioSnapshot],
    initial_capital: f64,
) -> Result<PerformanceSummary, SimulationError> {
    let (Some(first), Some(last)) = (trajectory.first(), trajectory.last()) else {
        return Err(SimulationError::InsufficientData(
            "cannot summarize an empty trajectory".to_string(),
        ));
    };

    let final_value = last.portfolio_value;
    let total_return = final_value / initial_capital - 1.0;

    let n_days = (last.date - first.date).num_days();
    let annualized_return = if n_days > 0 {
        (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / n_days as f64) - 1.0
    } else {
        f64::NAN
    };

    let mut returns = Vec::with_capacity(trajectory.len().saturating_sub(1));
    for pair in trajectory.windows(2) {
        let prev = pair[0].portfolio_value;
        if prev != 0.0 {
            returns.push(pair[1].portfolio_value / prev - 1.0);
        }
    }
    let annualized_vol = if returns.len() >= 2 {
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let var = returns
            .iter()
            .map(|ret| {
                let diff = ret - mean;
                diff * diff
            })
            .sum::<f64>()
            / (returns.len() as f64 - 1.0);
        var.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        f64::NAN
    };

    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0f64;
    let mut run = 0u64;
    let mut max_run = 0u64;
    for row in trajectory {
        peak = peak.max(row.portfolio_value);
        let drawdown = row.portfolio_value / peak - 1.0;
        if drawdown < max_drawdown {
            max_drawdown = drawdown;
        }
        // A drawdown of exactly zero ends a run; duration is measured in
        // trajectory rows, matching the trajectory's own granularity.
        if drawdown < 0.0 {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 0;
        }
    }

    Ok(PerformanceSummary {
        final_value,
        total_return,
        annualized_return,
        annualized_vol,
        max_drawdown,
        max_drawdown_duration_days: max_run,
    })
}
