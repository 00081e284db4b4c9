mod commands;
mod obs;
mod output;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Daily-bar strategy backtester: single runs, ticker comparisons, parameter grids.", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate one strategy on one ticker and print the summary.
    Backtest(commands::backtest::BacktestArgs),
    /// Run the same strategy across several tickers and rank the results.
    Compare(commands::compare::CompareArgs),
    /// Sweep moving-average windows over one ticker and write a leaderboard.
    Grid(commands::grid::GridArgs),
}

fn main() {
    if let Err(err) = obs::init_tracing() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Backtest(args) => commands::backtest::run(args),
        Command::Compare(args) => commands::compare::run(args),
        Command::Grid(args) => commands::grid::run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
