use strata_application::backtesting::BacktestOutcome;
use strata_application::comparison::RankEntry;
use strata_application::experiments::grid::GridResult;

/// NaN statistics print as `n/a`; they mean the metric is undefined for
/// this run, not that it is zero.
fn stat(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.4}")
    } else {
        "n/a".to_string()
    }
}

fn pct(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}

pub fn print_backtest(outcome: &BacktestOutcome) {
    let s = &outcome.summary;
    println!(
        "{} | {} -> {} ({} bars)",
        outcome.ticker,
        outcome.buy_date,
        outcome.sell_date,
        outcome.trajectory.len()
    );
    println!("  final value         {:.2}", s.final_value);
    println!("  total return        {}", pct(s.total_return));
    println!("  annualized return   {}", pct(s.annualized_return));
    println!("  annualized vol      {}", pct(s.annualized_vol));
    println!("  risk adjusted       {}", stat(s.risk_adjusted()));
    println!("  max drawdown        {}", pct(s.max_drawdown));
    println!("  drawdown duration   {} days", s.max_drawdown_duration_days);
}

pub fn print_ranking(ranking: &[RankEntry]) {
    println!(
        "{:<4} {:<10} {:>12} {:>12} {:>12} {:>12}",
        "rank", "ticker", "risk_adj", "ann_return", "ann_vol", "final_value"
    );
    for (idx, entry) in ranking.iter().enumerate() {
        println!(
            "{:<4} {:<10} {:>12} {:>12} {:>12} {:>12.2}",
            idx + 1,
            entry.ticker,
            stat(entry.risk_adjusted),
            pct(entry.annualized_return),
            pct(entry.annualized_vol),
            entry.final_value,
        );
    }
}

pub fn print_grid(result: &GridResult) {
    println!(
        "{:<8} {:<8} {:<8} {:>12} {:>12}",
        "short", "long", "status", "risk_adj", "total_ret"
    );
    for entry in &result.entries {
        let (risk_adjusted, total_return) = match &entry.summary {
            Some(summary) => (stat(summary.risk_adjusted()), pct(summary.total_return)),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<8} {:<8} {:<8} {:>12} {:>12}",
            entry.short_window, entry.long_window, entry.status, risk_adjusted, total_return,
        );
        if let Some(err) = &entry.error {
            println!("         {err}");
        }
    }
    println!("artifacts: {}", result.grid_dir.display());
}
