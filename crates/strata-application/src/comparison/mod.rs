use crate::backtesting::{run_backtest, BacktestOutcome, BacktestRequest};
use crate::shared::descending_nan_last;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use strata_domain::repositories::market_data::MarketDataRepository;
use strata_domain::value_objects::config::StrategyConfig;
use strata_domain::value_objects::snapshot::Trajectory;
use strata_domain::value_objects::summary::PerformanceSummary;
use tracing::info_span;

#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub run_id: String,
    pub tickers: Vec<String>,
    pub config: StrategyConfig,
    pub buy_date: NaiveDate,
    pub holding_period_days: u32,
    pub initial_capital: f64,
}

/// One ticker's slot in the comparison: either a simulated outcome or the
/// error that kept it out of the table. A failure here never aborts the
/// batch; partial results are preserved.
#[derive(Debug, Clone, Serialize)]
pub struct TickerReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PerformanceSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trajectory: Trajectory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Returns factors per ticker for one date. Tickers without a bar on that
/// date are simply absent; nothing is interpolated.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub factors: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    pub ticker: String,
    pub risk_adjusted: f64,
    pub annualized_return: f64,
    pub annualized_vol: f64,
    pub total_return: f64,
    pub final_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub reports: BTreeMap<String, TickerReport>,
    pub normalized: Vec<NormalizedPoint>,
    pub ranking: Vec<RankEntry>,
}

/// Run every ticker through the same strategy and capital base, then build
/// the date-aligned normalized equity matrix and the risk-adjusted ranking.
pub fn run_comparison(
    request: &ComparisonRequest,
    market_data: &dyn MarketDataRepository,
) -> Result<ComparisonResult, String> {
    if request.tickers.is_empty() {
        return Err("tickers must be a non-empty list".to_string());
    }

    let _span = info_span!(
        "run_comparison",
        run_id = %request.run_id,
        tickers = request.tickers.len()
    )
    .entered();

    let mut reports: BTreeMap<String, TickerReport> = BTreeMap::new();
    let mut outcomes: Vec<BacktestOutcome> = Vec::new();

    for ticker in &request.tickers {
        let single = BacktestRequest {
            run_id: format!("{}-{}", request.run_id, ticker),
            ticker: ticker.clone(),
            config: request.config.clone(),
            buy_date: request.buy_date,
            holding_period_days: request.holding_period_days,
            initial_capital: request.initial_capital,
        };
        match run_backtest(&single, market_data) {
            Ok(outcome) => {
                reports.insert(
                    ticker.clone(),
                    TickerReport {
                        summary: Some(outcome.summary.clone()),
                        trajectory: outcome.trajectory.clone(),
                        error: None,
                    },
                );
                outcomes.push(outcome);
            }
            Err(err) => {
                tracing::warn!(ticker = %ticker, error = %err, "ticker failed, continuing batch");
                metrics::counter!("strata.comparison.ticker_failures_total").increment(1);
                reports.insert(
                    ticker.clone(),
                    TickerReport {
                        summary: None,
                        trajectory: Vec::new(),
                        error: Some(err),
                    },
                );
            }
        }
    }

    Ok(ComparisonResult {
        normalized: normalized_matrix(&outcomes),
        ranking: ranking_table(&outcomes),
        reports,
    })
}

/// Outer join of per-ticker returns factors on date. Dates missing for a
/// ticker stay absent rather than interpolated.
fn normalized_matrix(outcomes: &[BacktestOutcome]) -> Vec<NormalizedPoint> {
    let mut all_dates: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut by_ticker: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for outcome in outcomes {
        let entry = by_ticker.entry(outcome.ticker.as_str()).or_default();
        for row in &outcome.trajectory {
            all_dates.insert(row.date);
            entry.insert(row.date, row.returns_factor);
        }
    }

    all_dates
        .into_iter()
        .map(|date| {
            let factors = by_ticker
                .iter()
                .filter_map(|(ticker, rows)| {
                    rows.get(&date).map(|factor| (ticker.to_string(), *factor))
                })
                .collect();
            NormalizedPoint { date, factors }
        })
        .collect()
}

fn ranking_table(outcomes: &[BacktestOutcome]) -> Vec<RankEntry> {
    let mut ranking: Vec<RankEntry> = outcomes
        .iter()
        .map(|outcome| RankEntry {
            ticker: outcome.ticker.clone(),
            risk_adjusted: outcome.summary.risk_adjusted(),
            annualized_return: outcome.summary.annualized_return,
            annualized_vol: outcome.summary.annualized_vol,
            total_return: outcome.summary.total_return,
            final_value: outcome.summary.final_value,
        })
        .collect();
    ranking.sort_by(|a, b| {
        descending_nan_last(a.risk_adjusted, b.risk_adjusted)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    ranking
}

#[cfg(test)]
mod tests {
    use super::{run_comparison, ComparisonRequest};
    use chrono::NaiveDate;
    use strata_domain::repositories::market_data::{MarketDataRepository, SeriesQuery};
    use strata_domain::services::series::{data_quality_from_bars, DataQualityReport};
    use strata_domain::value_objects::bar::{Bar, PriceSeries};
    use strata_domain::value_objects::config::StrategyConfig;
    use std::collections::BTreeMap;

    struct MapMarket {
        closes: BTreeMap<String, Vec<f64>>,
    }

    impl MarketDataRepository for MapMarket {
        fn load_series(
            &self,
            query: &SeriesQuery,
        ) -> Result<(PriceSeries, DataQualityReport), String> {
            let closes = self
                .closes
                .get(&query.ticker)
                .ok_or_else(|| format!("no data file for {}", query.ticker))?;
            let start = query.start.unwrap_or(NaiveDate::MIN);
            let bars: Vec<Bar> = closes
                .iter()
                .enumerate()
                .map(|(idx, close)| Bar::from_close(start + chrono::Days::new(idx as u64), *close))
                .collect();
            let report = data_quality_from_bars(&bars);
            Ok((PriceSeries::new(query.ticker.clone(), bars), report))
        }
    }

    fn request(tickers: &[&str]) -> ComparisonRequest {
        ComparisonRequest {
            run_id: "cmp".to_string(),
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            config: StrategyConfig::BuyAndHold {
                transaction_cost_pct: 0.0,
            },
            buy_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            holding_period_days: 30,
            initial_capital: 1000.0,
        }
    }

    #[test]
    fn one_failing_ticker_does_not_abort_the_batch() {
        let market = MapMarket {
            closes: BTreeMap::from([("AAPL".to_string(), vec![100.0, 110.0])]),
        };
        let result = run_comparison(&request(&["AAPL", "MISSING"]), &market).unwrap();

        assert!(result.reports["AAPL"].summary.is_some());
        assert!(result.reports["MISSING"].error.is_some());
        assert_eq!(result.ranking.len(), 1);
    }

    #[test]
    fn ranking_is_descending_by_risk_adjusted_score() {
        // Steady riser vs. choppy mover: the steady one wins on score.
        let market = MapMarket {
            closes: BTreeMap::from([
                (
                    "STEADY".to_string(),
                    vec![100.0, 101.0, 102.0, 103.0, 104.0],
                ),
                ("CHOPPY".to_string(), vec![100.0, 90.0, 105.0, 85.0, 101.0]),
            ]),
        };
        let result = run_comparison(&request(&["CHOPPY", "STEADY"]), &market).unwrap();

        assert_eq!(result.ranking[0].ticker, "STEADY");
        assert_eq!(result.ranking[1].ticker, "CHOPPY");
        assert!(result.ranking[0].risk_adjusted > result.ranking[1].risk_adjusted);
    }

    #[test]
    fn normalized_matrix_outer_joins_on_date() {
        let market = MapMarket {
            closes: BTreeMap::from([
                ("LONG".to_string(), vec![100.0, 101.0, 102.0]),
                ("SHORT".to_string(), vec![50.0, 51.0]),
            ]),
        };
        let result = run_comparison(&request(&["LONG", "SHORT"]), &market).unwrap();

        assert_eq!(result.normalized.len(), 3);
        assert_eq!(result.normalized[0].factors.len(), 2);
        // The third date exists only for the longer series.
        assert_eq!(result.normalized[2].factors.len(), 1);
        assert!(result.normalized[2].factors.contains_key("LONG"));
    }

    #[test]
    fn empty_ticker_list_is_rejected() {
        let market = MapMarket {
            closes: BTreeMap::new(),
        };
        assert!(run_comparison(&request(&[]), &market).is_err());
    }
}
