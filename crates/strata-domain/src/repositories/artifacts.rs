use crate::value_objects::snapshot::PortfolioSnapshot;
use crate::value_objects::summary::PerformanceSummary;
use std::path::Path;

/// Port for persisting run outputs. Dates serialize as `YYYY-MM-DD`; NaN
/// statistics serialize as JSON `null`.
pub trait ArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String>;

    fn write_trajectory_csv(
        &self,
        path: &Path,
        trajectory: &[PortfolioSnapshot],
    ) -> Result<(), String>;

    fn write_summary_json(
        &self,
        path: &Path,
        summary: &PerformanceSummary,
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String>;

    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<(), String>;
}
