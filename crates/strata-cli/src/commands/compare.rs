use crate::commands::StrategyArgs;
use crate::output;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use strata_application::comparison::{run_comparison, ComparisonRequest};
use strata_application::shared::run_token;
use strata_domain::repositories::artifacts::ArtifactWriter;
use strata_infrastructure::artifacts::FilesystemArtifactWriter;
use strata_infrastructure::market_data::CsvMarketDataRepository;

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Tickers to compare, comma separated or repeated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub tickers: Vec<String>,

    #[command(flatten)]
    pub strategy: StrategyArgs,

    /// First day of the simulation window (YYYY-MM-DD).
    #[arg(long)]
    pub buy_date: NaiveDate,

    /// Window length in calendar days; the end date is buy-date plus this.
    #[arg(long, default_value_t = 365)]
    pub holding_period_days: u32,

    /// Starting cash, applied to every ticker independently.
    #[arg(long, default_value_t = 10_000.0)]
    pub initial_capital: f64,

    /// Directory of daily price CSVs.
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Write comparison.json under this directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: CompareArgs) -> Result<(), String> {
    let config = args.strategy.to_config()?;
    let request = ComparisonRequest {
        run_id: run_token(&[
            &args.tickers.join(","),
            config.name(),
            &args.buy_date.to_string(),
        ]),
        tickers: args.tickers,
        config,
        buy_date: args.buy_date,
        holding_period_days: args.holding_period_days,
        initial_capital: args.initial_capital,
    };

    let market_data = CsvMarketDataRepository::new(args.data_dir);
    let result = run_comparison(&request, &market_data)?;

    output::print_ranking(&result.ranking);
    for (ticker, report) in &result.reports {
        if let Some(err) = &report.error {
            println!("{ticker}: {err}");
        }
    }

    if let Some(out) = args.out {
        let artifacts = FilesystemArtifactWriter::new();
        artifacts.ensure_dir(&out)?;
        let value = serde_json::to_value(&result)
            .map_err(|err| format!("failed to serialize comparison: {err}"))?;
        let path = out.join(format!("comparison_{}.json", request.run_id));
        artifacts.write_json(&path, &value)?;
        println!("artifacts: {}", path.display());
    }

    Ok(())
}
