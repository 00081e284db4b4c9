use crate::services::series::DataQualityReport;
use crate::value_objects::bar::PriceSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct SeriesQuery {
    pub ticker: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Port for loading cleaned daily price series. Implementations guarantee
/// the returned bars are sorted by date, de-duplicated, and carry a finite
/// close on every row.
pub trait MarketDataRepository {
    fn load_series(&self, query: &SeriesQuery) -> Result<(PriceSeries, DataQualityReport), String>;
}
