use activity_analytics::ReportGenerator;
use activity_core::{AppConfig, Dataset};
use std::sync::Arc;

/// Shared application state for the server.
///
/// Everything here is read-only after startup; each request aggregates from
/// the same dataset independently.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dataset: Arc<Dataset>,
    pub generator: Arc<ReportGenerator>,
}

impl AppState {
    pub fn new(config: AppConfig, dataset: Dataset) -> activity_core::Result<Self> {
        let generator = ReportGenerator::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            dataset: Arc::new(dataset),
            generator: Arc::new(generator),
        })
    }
}
