use crate::shared::sell_date;
use chrono::NaiveDate;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use strata_domain::repositories::artifacts::ArtifactWriter;
use strata_domain::repositories::market_data::{MarketDataRepository, SeriesQuery};
use strata_domain::services::metrics::summarize;
use strata_domain::services::strategy::run_strategy;
use strata_domain::value_objects::config::StrategyConfig;
use strata_domain::value_objects::snapshot::Trajectory;
use strata_domain::value_objects::summary::PerformanceSummary;
use tracing::info_span;

#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub run_id: String,
    pub ticker: String,
    pub config: StrategyConfig,
    pub buy_date: NaiveDate,
    pub holding_period_days: u32,
    pub initial_capital: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub ticker: String,
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub trajectory: Trajectory,
    pub summary: PerformanceSummary,
}

/// Load the holding window for one ticker, simulate the configured strategy
/// and reduce the trajectory to summary statistics.
pub fn run_backtest(
    request: &BacktestRequest,
    market_data: &dyn MarketDataRepository,
) -> Result<BacktestOutcome, String> {
    let _span = info_span!(
        "run_backtest",
        run_id = %request.run_id,
        ticker = %request.ticker,
        strategy = request.config.name()
    )
    .entered();

    let end = sell_date(request.buy_date, request.holding_period_days);

    let stage_start = Instant::now();
    let (series, report) = market_data.load_series(&SeriesQuery {
        ticker: request.ticker.clone(),
        start: Some(request.buy_date),
        end: Some(end),
    })?;
    metrics::histogram!("strata.backtest.load_series_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    tracing::debug!(
        rows = report.rows,
        duplicates = report.duplicates,
        out_of_order = report.out_of_order,
        invalid_close = report.invalid_close,
        "loaded price series"
    );

    let stage_start = Instant::now();
    let trajectory = run_strategy(&series, &request.config, request.initial_capital)
        .map_err(|err| err.to_string())?;
    let summary =
        summarize(&trajectory, request.initial_capital).map_err(|err| err.to_string())?;
    metrics::histogram!("strata.backtest.simulate_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    tracing::info!(
        bars = trajectory.len(),
        final_value = summary.final_value,
        total_return = summary.total_return,
        max_drawdown = summary.max_drawdown,
        "backtest complete"
    );

    Ok(BacktestOutcome {
        ticker: request.ticker.clone(),
        buy_date: request.buy_date,
        sell_date: end,
        trajectory,
        summary,
    })
}

/// Persist one run's outputs under `<out_dir>/<run_id>/`: the trajectory as
/// CSV and the summary (with run metadata) as JSON.
pub fn write_backtest_artifacts(
    out_dir: &Path,
    request: &BacktestRequest,
    outcome: &BacktestOutcome,
    artifacts: &dyn ArtifactWriter,
) -> Result<PathBuf, String> {
    let run_dir = out_dir.join(&request.run_id);
    artifacts.ensure_dir(&run_dir)?;

    artifacts.write_trajectory_csv(&run_dir.join("trajectory.csv"), &outcome.trajectory)?;

    let meta = json!({
        "run_id": request.run_id,
        "ticker": outcome.ticker,
        "strategy": request.config.name(),
        "buy_date": outcome.buy_date.to_string(),
        "sell_date": outcome.sell_date.to_string(),
        "initial_capital": request.initial_capital,
        "transaction_cost_pct": request.config.transaction_cost_pct(),
    });
    artifacts.write_summary_json(&run_dir.join("summary.json"), &outcome.summary, Some(&meta))?;

    Ok(run_dir)
}
