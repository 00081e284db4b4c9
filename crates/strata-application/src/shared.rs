use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;

/// End of a holding window: buy date plus the holding period in calendar
/// days, not trading days.
pub fn sell_date(buy_date: NaiveDate, holding_period_days: u32) -> NaiveDate {
    buy_date + chrono::Days::new(u64::from(holding_period_days))
}

/// Deterministic short run token derived from the identifying parts of a
/// run, so reruns of the same parameters land in the same artifact slot.
pub fn run_token(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\n");
    }
    let digest = hasher.finalize();
    let mut token = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        token.push_str(&format!("{byte:02x}"));
    }
    token
}

/// Descending order with NaN ranked last, for leaderboard sorts.
pub fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
