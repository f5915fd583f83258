#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use employee_events::entity::FeatureRow;
use employee_events::query::QueryEngine;
use employee_events::report::Dashboard;
use employee_events::scoring::{LogisticModel, Predictor, ScoringError};
use employee_events::seed::seed_demo_database;
use uuid::Uuid;

/// A seeded temp-file store, removed again on drop.
pub struct SeededStore {
    pub path: PathBuf,
    pub engine: QueryEngine,
}

impl Drop for SeededStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

pub async fn seeded_store() -> SeededStore {
    let path = std::env::temp_dir().join(format!("employee-events-{}.db", Uuid::new_v4()));
    seed_demo_database(&path).await.expect("seed demo store");
    SeededStore {
        engine: QueryEngine::new(&path),
        path,
    }
}

/// logit = positive * -0.5 + negative * 1.0
pub fn logistic_model() -> LogisticModel {
    LogisticModel {
        features: FeatureRow::COLUMNS.iter().map(|c| c.to_string()).collect(),
        coefficients: vec![-0.5, 1.0],
        intercept: 0.0,
    }
}

pub fn sigmoid(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

pub fn dashboard(store: &SeededStore) -> Dashboard {
    Dashboard::new(store.engine.clone(), Arc::new(logistic_model()))
}

/// Predictor that always fails, for error-path tests.
pub struct BrokenPredictor;

impl Predictor for BrokenPredictor {
    fn predict_probability(&self, _rows: &[FeatureRow]) -> Result<Vec<f64>, ScoringError> {
        Err(ScoringError::Predictor("model weights unavailable".to_string()))
    }
}
