use case_forecast::config::StorageConfig;
use case_forecast::error::AppError;
use case_forecast::forecast::{
    CaseForecastService, CategoryTable, ForecastServiceError, SqlitePredictionRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SqliteForecastService = CaseForecastService<SqlitePredictionRepository>;

/// Validate the category table and open the history store named by `storage`.
pub(crate) fn open_service(
    storage: &StorageConfig,
    database_override: Option<PathBuf>,
) -> Result<SqliteForecastService, AppError> {
    let table = Arc::new(CategoryTable::standard()?);
    let path = database_override.unwrap_or_else(|| storage.database_path.clone());
    let repository = SqlitePredictionRepository::open(&path).map_err(ForecastServiceError::from)?;

    Ok(CaseForecastService::new(Arc::new(repository), table)
        .with_history_limit(storage.history_limit))
}
