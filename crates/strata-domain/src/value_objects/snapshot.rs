use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of a simulation trajectory. The accounting identity
/// `portfolio_value == cash + shares * price` holds on every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub price: f64,
    pub shares: u64,
    pub cash: f64,
    pub portfolio_value: f64,
    pub returns_factor: f64,
    /// 0 = flat, 1 = invested.
    pub signal: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_ma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_ma: Option<f64>,
}

/// The ordered sequence of snapshots produced by one simulation run.
pub type Trajectory = Vec<PortfolioSnapshot>;
