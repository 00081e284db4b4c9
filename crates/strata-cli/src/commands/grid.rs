use crate::output;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use strata_application::experiments::grid::{
    load_grid_spec, run_grid, GridCosts, GridMeta, GridParams, GridRun, GridSpec,
};
use strata_application::shared::run_token;
use strata_infrastructure::artifacts::FilesystemArtifactWriter;
use strata_infrastructure::market_data::CsvMarketDataRepository;

#[derive(Args, Debug)]
pub struct GridArgs {
    /// TOML grid spec. Mutually exclusive with the inline flags below.
    #[arg(long, conflicts_with_all = ["ticker", "short_windows", "long_windows"])]
    pub spec: Option<PathBuf>,

    /// Ticker symbol (inline spec).
    #[arg(long, required_unless_present = "spec")]
    pub ticker: Option<String>,

    /// Short windows to sweep, comma separated (inline spec).
    #[arg(long, value_delimiter = ',', required_unless_present = "spec")]
    pub short_windows: Vec<usize>,

    /// Long windows to sweep, comma separated (inline spec).
    #[arg(long, value_delimiter = ',', required_unless_present = "spec")]
    pub long_windows: Vec<usize>,

    /// First day of the simulation window (YYYY-MM-DD) (inline spec).
    #[arg(long, required_unless_present = "spec")]
    pub buy_date: Option<NaiveDate>,

    /// Window length in calendar days (inline spec).
    #[arg(long, default_value_t = 365)]
    pub holding_period_days: u32,

    /// Starting cash (inline spec).
    #[arg(long, default_value_t = 10_000.0)]
    pub initial_capital: f64,

    /// Proportional fee per trade (inline spec).
    #[arg(long, default_value_t = 0.0)]
    pub transaction_cost_pct: f64,

    /// Directory of daily price CSVs.
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Root directory for grid artifacts.
    #[arg(long, default_value = "runs")]
    pub out: PathBuf,
}

pub fn run(args: GridArgs) -> Result<(), String> {
    let spec = match &args.spec {
        Some(path) => load_grid_spec(path)?,
        None => inline_spec(&args)?,
    };

    let market_data = CsvMarketDataRepository::new(args.data_dir);
    let artifacts = FilesystemArtifactWriter::new();
    let result = run_grid(&spec, &args.out, &market_data, &artifacts)?;

    output::print_grid(&result);
    Ok(())
}

fn inline_spec(args: &GridArgs) -> Result<GridSpec, String> {
    // clap's required_unless_present guarantees these when --spec is absent.
    let ticker = args.ticker.clone().ok_or("--ticker is required")?;
    let buy_date = args.buy_date.ok_or("--buy-date is required")?;
    Ok(GridSpec {
        grid: GridMeta {
            id: format!(
                "grid-{}",
                run_token(&[&ticker, &buy_date.to_string()])
            ),
        },
        run: GridRun {
            ticker,
            buy_date,
            holding_period_days: args.holding_period_days,
            initial_capital: args.initial_capital,
        },
        costs: GridCosts {
            transaction_cost_pct: args.transaction_cost_pct,
        },
        params: GridParams {
            short_windows: args.short_windows.clone(),
            long_windows: args.long_windows.clone(),
        },
    })
}
