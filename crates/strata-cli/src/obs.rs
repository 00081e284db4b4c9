/// Tracing setup: filter from `STRATA_LOG` (default `info`), JSON lines
/// when `STRATA_LOG_FORMAT=json`.
pub fn init_tracing() -> Result<(), String> {
    let filter = std::env::var("STRATA_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let json = std::env::var("STRATA_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    Ok(())
}
