use serde::{Deserialize, Serialize};

/// Summary statistics reduced from one trajectory. NaN fields mean
/// "undefined over this window" (zero-day horizon, single-observation
/// volatility) and serialize to JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub final_value: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_vol: f64,
    pub max_drawdown: f64,
    /// Longest run of strictly negative drawdown, counted in trajectory
    /// rows. Sparse series undercount calendar time on purpose.
    pub max_drawdown_duration_days: u64,
}

impl PerformanceSummary {
    /// Annualized return over annualized volatility. Fixed convention:
    /// NaN when volatility is zero or undefined.
    pub fn risk_adjusted(&self) -> f64 {
        if self.annualized_vol == 0.0 || !self.annualized_vol.is_finite() {
            return f64::NAN;
        }
        self.annualized_return / self.annualized_vol
    }
}

#[cfg(test)]
mod tests {
    use super::PerformanceSummary;

    fn summary(ret: f64, vol: f64) -> PerformanceSummary {
        PerformanceSummary {
            final_value: 0.0,
            total_return: 0.0,
            annualized_return: ret,
            annualized_vol: vol,
            max_drawdown: 0.0,
            max_drawdown_duration_days: 0,
        }
    }

    #[test]
    fn risk_adjusted_divides_return_by_vol() {
        assert!((summary(0.20, 0.10).risk_adjusted() - 2.0).abs() < 1e-12);
        assert!((summary(0.10, 0.20).risk_adjusted() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn risk_adjusted_is_nan_for_zero_or_undefined_vol() {
        assert!(summary(0.20, 0.0).risk_adjusted().is_nan());
        assert!(summary(0.20, f64::NAN).risk_adjusted().is_nan());
    }

    #[test]
    fn nan_fields_serialize_to_null() {
        let json = serde_json::to_string(&summary(f64::NAN, f64::NAN)).unwrap();
        assert!(json.contains("\"annualized_return\":null"));
        assert!(json.contains("\"annualized_vol\":null"));
    }
}
