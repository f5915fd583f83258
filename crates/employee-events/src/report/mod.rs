pub mod chart;
mod component;
mod dashboard;
pub mod html;
pub mod router;

pub use component::{
    header_text, Chart, ChartKind, Component, FormGroup, Group, Radio, RenderFuture, Selector,
    TableSource,
};
pub use dashboard::{filter_selector, report_tree, Dashboard, DEFAULT_EMPLOYEE_ID};
pub use router::dashboard_router;

use crate::entity::EntityModel;
use crate::query::{QueryEngine, QueryError};
use crate::scoring::{Predictor, ScoringError};

/// Everything a component needs for one render call.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub entity_id: Option<i64>,
    pub model: EntityModel,
    pub engine: &'a QueryEngine,
    pub predictor: &'a dyn Predictor,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}
