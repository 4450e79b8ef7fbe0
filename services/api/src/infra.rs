use metrics_exporter_prometheus::PrometheusHandle;
use recruit_desk::config::AppConfig;
use recruit_desk::error::AppError;
use recruit_desk::pipeline::{
    load_seed, InMemoryApplicationStore, InMemoryTeamStore, ReviewPipeline, SortOrder,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type MemoryPipeline = ReviewPipeline<InMemoryApplicationStore, InMemoryTeamStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Populate an in-memory application store, from a seed file when one is given.
pub(crate) fn load_applications(seed: Option<&Path>) -> Result<InMemoryApplicationStore, AppError> {
    let Some(path) = seed else {
        return Ok(InMemoryApplicationStore::new());
    };

    let reader = BufReader::new(File::open(path)?);
    let records = load_seed(reader)?;
    info!(seed = %path.display(), applications = records.len(), "seed file loaded");
    Ok(InMemoryApplicationStore::from_seed(records))
}

/// Assemble the review pipeline the CLI commands and the server share. `seed` overrides the
/// configured seed file.
pub(crate) fn build_pipeline(
    config: &AppConfig,
    seed: Option<PathBuf>,
) -> Result<MemoryPipeline, AppError> {
    let seed = seed.or_else(|| config.pipeline.seed_file.clone());
    let applications = Arc::new(load_applications(seed.as_deref())?);
    let team = Arc::new(InMemoryTeamStore::new());
    Ok(ReviewPipeline::new(applications, team).with_default_sort(config.pipeline.default_sort))
}

pub(crate) fn parse_sort(raw: &str) -> Result<SortOrder, String> {
    SortOrder::parse(raw).ok_or_else(|| format!("expected 'asc' or 'desc', found '{raw}'"))
}
