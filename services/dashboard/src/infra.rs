use employee_events::config::DataConfig;
use employee_events::error::AppError;
use employee_events::query::QueryEngine;
use employee_events::report::Dashboard;
use employee_events::scoring::LogisticModel;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the risk model and points a query engine at the event store.
///
/// The store itself is only opened per query, so a missing database shows up
/// on the first request rather than here.
pub(crate) fn load_dashboard(data: &DataConfig) -> Result<Dashboard, AppError> {
    let model = LogisticModel::load(&data.model_path)?;
    info!(
        model = %data.model_path.display(),
        database = %data.database_path.display(),
        features = ?model.features,
        "risk model loaded"
    );
    Ok(Dashboard::new(
        QueryEngine::new(&data.database_path),
        Arc::new(model),
    ))
}
