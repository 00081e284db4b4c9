use crate::value_objects::bar::Bar;
use chrono::NaiveDate;

/// Row-level quality counters collected while loading a daily series.
/// Daily bars legitimately skip weekends and holidays, so no gap analysis.
#[derive(Debug, Default, Clone)]
pub struct DataQualityReport {
    pub rows: usize,
    pub duplicates: usize,
    pub out_of_order: usize,
    pub invalid_close: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

pub fn data_quality_from_bars(bars: &[Bar]) -> DataQualityReport {
    let mut report = DataQualityReport {
        rows: bars.len(),
        ..DataQualityReport::default()
    };
    if bars.is_empty() {
        return report;
    }

    report.first_date = bars.first().map(|bar| bar.date);
    report.last_date = bars.last().map(|bar| bar.date);

    let mut last_date: Option<NaiveDate> = None;
    for bar in bars {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            report.invalid_close += 1;
        }
        if let Some(prev) = last_date {
            if bar.date == prev {
                report.duplicates += 1;
            } else if bar.date < prev {
                report.out_of_order += 1;
            }
        }
        last_date = Some(bar.date);
    }

    report
}
