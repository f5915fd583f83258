use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::entity::{EntityKind, EntityModel, FeatureRow};
use crate::query::QueryEngine;
use crate::report::ReportError;

/// Anything that can turn feature rows into positive-class probabilities.
///
/// Loaded once at startup and shared read-only between requests.
pub trait Predictor: Send + Sync {
    fn predict_probability(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ScoringError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("predictor returned {actual} probabilities for {expected} feature rows")]
    RowCountMismatch { expected: usize, actual: usize },
    #[error("predictor returned a non-finite probability for row {row}")]
    NonFinite { row: usize },
    #[error("predictor returned {value} for row {row}, outside [0, 1]")]
    OutOfRange { row: usize, value: f64 },
    #[error("predictor failed: {0}")]
    Predictor(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("unable to read model artifact {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model expects features {found:?}, event store provides {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("model has {features} features but {coefficients} coefficients")]
    CoefficientCount { features: usize, coefficients: usize },
}

/// A fitted logistic regression exported as JSON:
///
/// ```json
/// { "features": ["positive_events", "negative_events"],
///   "coefficients": [-0.05, 0.12],
///   "intercept": -0.4 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ModelLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&raw).map_err(|source| ModelLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate()?;
        debug!(path = %path.display(), intercept = model.intercept, "risk model loaded");
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if self.features != FeatureRow::COLUMNS {
            return Err(ModelLoadError::FeatureMismatch {
                expected: FeatureRow::COLUMNS.iter().map(|c| c.to_string()).collect(),
                found: self.features.clone(),
            });
        }
        if self.coefficients.len() != self.features.len() {
            return Err(ModelLoadError::CoefficientCount {
                features: self.features.len(),
                coefficients: self.coefficients.len(),
            });
        }
        Ok(())
    }

    fn probability(&self, row: &FeatureRow) -> f64 {
        let logit = row
            .values()
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (x, w)| acc + x * w);
        1.0 / (1.0 + (-logit).exp())
    }
}

impl Predictor for LogisticModel {
    fn predict_probability(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ScoringError> {
        Ok(rows.iter().map(|row| self.probability(row)).collect())
    }
}

/// Reduces per-row probabilities to one score: the mean for a team, the
/// single row for an employee. `None` when there is nothing to score.
pub fn risk_score(kind: EntityKind, probabilities: &[f64]) -> Option<f64> {
    match kind {
        EntityKind::Team if !probabilities.is_empty() => {
            Some(probabilities.iter().sum::<f64>() / probabilities.len() as f64)
        }
        EntityKind::Team => None,
        EntityKind::Employee => probabilities.first().copied(),
    }
}

/// Result of scoring one employee or team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub kind: EntityKind,
    pub id: i64,
    pub feature_rows: Vec<FeatureRow>,
    pub probabilities: Vec<f64>,
    pub score: Option<f64>,
}

/// Calls the predictor and checks its output before any reduction happens.
pub fn predict_checked(
    predictor: &dyn Predictor,
    rows: &[FeatureRow],
) -> Result<Vec<f64>, ScoringError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let probabilities = predictor.predict_probability(rows)?;
    if probabilities.len() != rows.len() {
        return Err(ScoringError::RowCountMismatch {
            expected: rows.len(),
            actual: probabilities.len(),
        });
    }
    for (row, value) in probabilities.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(ScoringError::NonFinite { row });
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(ScoringError::OutOfRange { row, value });
        }
    }
    Ok(probabilities)
}

pub async fn score_entity(
    engine: &QueryEngine,
    model: EntityModel,
    predictor: &dyn Predictor,
    id: i64,
) -> Result<RiskAssessment, ReportError> {
    let feature_rows = model.model_data(engine, id).await?;
    let probabilities = predict_checked(predictor, &feature_rows).map_err(|err| {
        error!(entity = model.name(), id, error = %err, "risk scoring failed");
        err
    })?;
    let score = risk_score(model.kind, &probabilities);

    debug!(
        entity = model.name(),
        id,
        rows = feature_rows.len(),
        score = ?score,
        "risk scored"
    );

    Ok(RiskAssessment {
        kind: model.kind,
        id,
        feature_rows,
        probabilities,
        score,
    })
}
