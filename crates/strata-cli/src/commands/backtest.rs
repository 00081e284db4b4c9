use crate::commands::StrategyArgs;
use crate::output;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use strata_application::backtesting::{run_backtest, write_backtest_artifacts, BacktestRequest};
use strata_application::shared::run_token;
use strata_infrastructure::artifacts::FilesystemArtifactWriter;
use strata_infrastructure::market_data::CsvMarketDataRepository;

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// Ticker symbol; prices load from `<data-dir>/<TICKER>.csv`.
    #[arg(long)]
    pub ticker: String,

    #[command(flatten)]
    pub strategy: StrategyArgs,

    /// First day of the simulation window (YYYY-MM-DD).
    #[arg(long)]
    pub buy_date: NaiveDate,

    /// Window length in calendar days; the end date is buy-date plus this.
    #[arg(long, default_value_t = 365)]
    pub holding_period_days: u32,

    /// Starting cash.
    #[arg(long, default_value_t = 10_000.0)]
    pub initial_capital: f64,

    /// Directory of daily price CSVs.
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Write trajectory.csv and summary.json under this directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: BacktestArgs) -> Result<(), String> {
    let config = args.strategy.to_config()?;
    let request = BacktestRequest {
        run_id: run_token(&[&args.ticker, config.name(), &args.buy_date.to_string()]),
        ticker: args.ticker,
        config,
        buy_date: args.buy_date,
        holding_period_days: args.holding_period_days,
        initial_capital: args.initial_capital,
    };

    let market_data = CsvMarketDataRepository::new(args.data_dir);
    let outcome = run_backtest(&request, &market_data)?;
    output::print_backtest(&outcome);

    if let Some(out) = args.out {
        let artifacts = FilesystemArtifactWriter::new();
        let run_dir = write_backtest_artifacts(&out, &request, &outcome, &artifacts)?;
        println!("artifacts: {}", run_dir.display());
    }

    Ok(())
}
