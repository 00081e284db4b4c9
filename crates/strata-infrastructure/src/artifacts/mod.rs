use crate::reporting;
use std::fs;
use std::path::Path;
use std::time::Instant;
use strata_domain::repositories::artifacts::ArtifactWriter;
use strata_domain::value_objects::snapshot::PortfolioSnapshot;
use strata_domain::value_objects::summary::PerformanceSummary;

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactWriter;

impl FilesystemArtifactWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactWriter for FilesystemArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String> {
        fs::create_dir_all(path)
            .map_err(|err| format!("failed to create dir {}: {}", path.display(), err))
    }

    fn write_trajectory_csv(
        &self,
        path: &Path,
        trajectory: &[PortfolioSnapshot],
    ) -> Result<(), String> {
        let started = Instant::now();
        reporting::write_trajectory_csv(path, trajectory)?;
        metrics::histogram!("strata.artifacts.write_trajectory_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);
        Ok(())
    }

    fn write_summary_json(
        &self,
        path: &Path,
        summary: &PerformanceSummary,
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String> {
        reporting::write_summary_json(path, summary, meta)
    }

    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<(), String> {
        reporting::write_json(path, value)
    }
}
