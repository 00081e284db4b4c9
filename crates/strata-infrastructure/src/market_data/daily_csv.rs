use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;
use strata_domain::repositories::market_data::{MarketDataRepository, SeriesQuery};
use strata_domain::services::series::DataQualityReport;
use strata_domain::value_objects::bar::{Bar, PriceSeries};

/// One row of a daily price CSV. `date` and `close` are required; the rest
/// are tolerated as empty fields in the source files.
#[derive(Debug, Deserialize)]
struct DailyRecord {
    date: NaiveDate,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Loads `<data_dir>/<TICKER>.csv` files. Rows are canonicalized by date:
/// duplicates keep the last occurrence, out-of-order rows are sorted, and
/// rows with a missing or non-positive close are dropped and counted.
#[derive(Debug, Clone)]
pub struct CsvMarketDataRepository {
    data_dir: PathBuf,
}

impl CsvMarketDataRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn series_path(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{ticker}.csv"))
    }
}

impl MarketDataRepository for CsvMarketDataRepository {
    fn load_series(&self, query: &SeriesQuery) -> Result<(PriceSeries, DataQualityReport), String> {
        let path = self.series_path(&query.ticker);
        let started = Instant::now();
        let file = File::open(&path)
            .map_err(|err| format!("failed to open price CSV {}: {}", path.display(), err))?;
        let (bars, report) = read_daily_csv(file, query.start, query.end)?;
        metrics::histogram!("strata.market_data.load_csv_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(
            ticker = %query.ticker,
            rows = report.rows,
            invalid_close = report.invalid_close,
            "loaded daily series"
        );
        Ok((PriceSeries::new(query.ticker.clone(), bars), report))
    }
}

/// Parsing is factored over `io::Read` so tests can feed in-memory bytes.
pub fn read_daily_csv(
    source: impl Read,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(Vec<Bar>, DataQualityReport), String> {
    let mut reader = csv::Reader::from_reader(source);

    let mut bars_by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    let mut report = DataQualityReport::default();
    let mut last_seen: Option<NaiveDate> = None;

    for result in reader.deserialize::<DailyRecord>() {
        let record = result.map_err(|err| format!("failed to parse CSV row: {}", err))?;
        report.rows += 1;

        let close = match record.close {
            Some(close) if close.is_finite() && close > 0.0 => close,
            _ => {
                report.invalid_close += 1;
                continue;
            }
        };

        if let Some(prev) = last_seen {
            if record.date < prev {
                report.out_of_order += 1;
            }
        }
        last_seen = Some(record.date);

        if start.map(|s| record.date < s).unwrap_or(false)
            || end.map(|e| record.date > e).unwrap_or(false)
        {
            continue;
        }

        let replaced = bars_by_date.insert(
            record.date,
            Bar {
                date: record.date,
                open: record.open,
                high: record.high,
                low: record.low,
                close,
                volume: record.volume,
            },
        );
        if replaced.is_some() {
            report.duplicates += 1;
        }
    }

    let bars: Vec<Bar> = bars_by_date.into_values().collect();
    report.first_date = bars.first().map(|bar| bar.date);
    report.last_date = bars.last().map(|bar| bar.date);
    Ok((bars, report))
}
