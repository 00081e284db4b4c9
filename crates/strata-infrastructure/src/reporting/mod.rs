use std::fs;
use std::io::Write;
use std::path::Path;
use strata_domain::value_objects::snapshot::PortfolioSnapshot;
use strata_domain::value_objects::summary::PerformanceSummary;

pub fn write_trajectory_csv(
    path: &Path,
    trajectory: &[PortfolioSnapshot],
) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path).map_err(|err| {
        format!(
            "failed to create trajectory csv {}: {}",
            path.display(),
            err
        )
    })?;
    wtr.write_record([
        "date",
        "price",
        "shares",
        "cash",
        "portfolio_value",
        "returns_factor",
        "signal",
        "short_ma",
        "long_ma",
    ])
    .map_err(|err| format!("failed to write trajectory csv header: {}", err))?;

    for row in trajectory {
        wtr.write_record([
            row.date.to_string(),
            row.price.to_string(),
            row.shares.to_string(),
            row.cash.to_string(),
            row.portfolio_value.to_string(),
            row.returns_factor.to_string(),
            row.signal.to_string(),
            row.short_ma.map(|v| v.to_string()).unwrap_or_default(),
            row.long_ma.map(|v| v.to_string()).unwrap_or_default(),
        ])
        .map_err(|err| format!("failed to write trajectory row: {}", err))?;
    }

    wtr.flush()
        .map_err(|err| format!("failed to flush trajectory csv: {}", err))
}

/// NaN statistics land as JSON `null` here; serde_json does that for any
/// non-finite f64.
pub fn write_summary_json(
    path: &Path,
    summary: &PerformanceSummary,
    meta: Option<&serde_json::Value>,
) -> Result<(), String> {
    let json = serde_json::json!({
        "meta": meta,
        "final_value": summary.final_value,
        "total_return": summary.total_return,
        "annualized_return": summary.annualized_return,
        "annualized_vol": summary.annualized_vol,
        "risk_adjusted": summary.risk_adjusted(),
        "max_drawdown": summary.max_drawdown,
        "max_drawdown_duration_days": summary.max_drawdown_duration_days,
    });
    write_json(path, &json)
}

pub fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize {}: {}", path.display(), err))?;
    let mut file = fs::File::create(path)
        .map_err(|err| format!("failed to create {}: {}", path.display(), err))?;
    file.write_all(json.as_bytes())
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))
}
