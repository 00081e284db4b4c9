use crate::backtesting::{run_backtest, BacktestRequest};
use crate::shared::{descending_nan_last, run_token};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strata_domain::repositories::artifacts::ArtifactWriter;
use strata_domain::repositories::market_data::MarketDataRepository;
use strata_domain::value_objects::config::StrategyConfig;
use strata_domain::value_objects::summary::PerformanceSummary;
use tracing::info_span;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GridSpec {
    pub grid: GridMeta,
    pub run: GridRun,
    #[serde(default)]
    pub costs: GridCosts,
    pub params: GridParams,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GridMeta {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GridRun {
    pub ticker: String,
    pub buy_date: NaiveDate,
    pub holding_period_days: u32,
    pub initial_capital: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GridCosts {
    #[serde(default)]
    pub transaction_cost_pct: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GridParams {
    pub short_windows: Vec<usize>,
    pub long_windows: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridRunEntry {
    pub run_id: String,
    pub short_window: usize,
    pub long_window: usize,
    pub status: String,
    pub error: Option<String>,
    pub summary: Option<PerformanceSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridResult {
    pub grid_id: String,
    pub grid_dir: PathBuf,
    pub ticker: String,
    pub entries: Vec<GridRunEntry>,
}

pub fn load_grid_spec(path: &Path) -> Result<GridSpec, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read grid spec {}: {err}", path.display()))?;
    let spec: GridSpec = toml::from_str(&raw)
        .map_err(|err| format!("failed to parse grid spec TOML {}: {err}", path.display()))?;
    validate_grid_spec(&spec)?;
    Ok(spec)
}

fn validate_grid_spec(spec: &GridSpec) -> Result<(), String> {
    if spec.grid.id.trim().is_empty() {
        return Err("grid id cannot be empty".to_string());
    }
    if spec.params.short_windows.is_empty() {
        return Err("params.short_windows has no values".to_string());
    }
    if spec.params.long_windows.is_empty() {
        return Err("params.long_windows has no values".to_string());
    }
    Ok(())
}

/// Run an MA crossover parameter grid over one ticker. Cells where the
/// short window does not stay below the long window are recorded as
/// skipped; a failing cell records its error and the grid continues.
pub fn run_grid(
    spec: &GridSpec,
    out_dir: &Path,
    market_data: &dyn MarketDataRepository,
    artifacts: &dyn ArtifactWriter,
) -> Result<GridResult, String> {
    let _span = info_span!("run_grid", grid_id = %spec.grid.id, ticker = %spec.run.ticker).entered();

    let grid_dir = out_dir.join("grids").join(&spec.grid.id);
    artifacts.ensure_dir(&grid_dir)?;

    let mut entries: Vec<GridRunEntry> = Vec::new();
    for &short_window in &spec.params.short_windows {
        for &long_window in &spec.params.long_windows {
            let run_id = format!(
                "{}__{}",
                spec.grid.id,
                run_token(&[
                    &spec.run.ticker,
                    &short_window.to_string(),
                    &long_window.to_string(),
                ])
            );

            if short_window >= long_window {
                entries.push(GridRunEntry {
                    run_id,
                    short_window,
                    long_window,
                    status: "skipped".to_string(),
                    error: None,
                    summary: None,
                });
                continue;
            }

            let request = BacktestRequest {
                run_id: run_id.clone(),
                ticker: spec.run.ticker.clone(),
                config: StrategyConfig::MaCrossover {
                    short_window,
                    long_window,
                    transaction_cost_pct: spec.costs.transaction_cost_pct,
                },
                buy_date: spec.run.buy_date,
                holding_period_days: spec.run.holding_period_days,
                initial_capital: spec.run.initial_capital,
            };

            match run_backtest(&request, market_data) {
                Ok(outcome) => {
                    metrics::counter!("strata.grid.cells_ok_total").increment(1);
                    entries.push(GridRunEntry {
                        run_id,
                        short_window,
                        long_window,
                        status: "ok".to_string(),
                        error: None,
                        summary: Some(outcome.summary),
                    });
                }
                Err(err) => {
                    metrics::counter!("strata.grid.cells_failed_total").increment(1);
                    tracing::warn!(run_id = %run_id, error = %err, "grid cell failed, continuing");
                    entries.push(GridRunEntry {
                        run_id,
                        short_window,
                        long_window,
                        status: "error".to_string(),
                        error: Some(err),
                        summary: None,
                    });
                }
            }
        }
    }

    let result = GridResult {
        grid_id: spec.grid.id.clone(),
        grid_dir: grid_dir.clone(),
        ticker: spec.run.ticker.clone(),
        entries,
    };

    write_manifest(&grid_dir, &result, artifacts)?;
    write_leaderboard_csv(&grid_dir, &result)?;

    Ok(result)
}

fn write_manifest(
    dir: &Path,
    result: &GridResult,
    artifacts: &dyn ArtifactWriter,
) -> Result<(), String> {
    let value = serde_json::to_value(result)
        .map_err(|err| format!("failed to serialize grid manifest: {err}"))?;
    artifacts.write_json(&dir.join("manifest.json"), &value)
}

fn write_leaderboard_csv(dir: &Path, result: &GridResult) -> Result<(), String> {
    let mut rows: Vec<&GridRunEntry> = result
        .entries
        .iter()
        .filter(|e| e.status == "ok" && e.summary.is_some())
        .collect();
    rows.sort_by(|a, b| {
        let av = a.summary.as_ref().map(|s| s.risk_adjusted()).unwrap_or(f64::NAN);
        let bv = b.summary.as_ref().map(|s| s.risk_adjusted()).unwrap_or(f64::NAN);
        descending_nan_last(av, bv)
    });

    let path = dir.join("leaderboard.csv");
    let mut wtr = csv::Writer::from_path(&path)
        .map_err(|err| format!("failed to create {}: {err}", path.display()))?;
    wtr.write_record([
        "rank",
        "run_id",
        "short_window",
        "long_window",
        "risk_adjusted",
        "annualized_return",
        "annualized_vol",
        "total_return",
        "max_drawdown",
        "final_value",
    ])
    .map_err(|err| format!("failed to write leaderboard header: {err}"))?;

    for (idx, entry) in rows.iter().enumerate() {
        let summary = entry.summary.as_ref().expect("filtered to ok entries");
        let record = vec![
            (idx + 1).to_string(),
            entry.run_id.clone(),
            entry.short_window.to_string(),
            entry.long_window.to_string(),
            format!("{}", summary.risk_adjusted()),
            format!("{}", summary.annualized_return),
            format!("{}", summary.annualized_vol),
            format!("{}", summary.total_return),
            format!("{}", summary.max_drawdown),
            format!("{}", summary.final_value),
        ];
        wtr.write_record(record)
            .map_err(|err| format!("failed to write leaderboard row: {err}"))?;
    }
    wtr.flush()
        .map_err(|err| format!("failed to flush {}: {err}", path.display()))?;
    Ok(())
}
