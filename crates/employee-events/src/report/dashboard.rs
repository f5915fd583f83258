use std::sync::Arc;

use tracing::info;

use super::chart::AxisStyle;
use super::component::{
    header_text, Chart, ChartKind, Component, FormGroup, Group, Radio, Selector, TableSource,
};
use super::html;
use super::{RenderContext, ReportError};
use crate::entity::EntityKind;
use crate::query::QueryEngine;
use crate::scoring::{score_entity, Predictor, RiskAssessment};

/// Employee shown on the landing page.
pub const DEFAULT_EMPLOYEE_ID: i64 = 1;

/// The selector inside the filter form; also served alone when the profile
/// radio changes.
pub fn filter_selector() -> Component {
    Component::Selector(Selector {
        id: "selector",
        name: "user-selection",
    })
}

fn filters() -> Component {
    Component::Form(FormGroup {
        id: "top-filters",
        action: "/update_data",
        method: "POST",
        children: vec![
            Component::Radio(Radio {
                name: "profile_type",
                values: &EntityKind::ALL,
                hx_get: "/update_dropdown",
                hx_target: "#selector",
            }),
            filter_selector(),
        ],
    })
}

fn visualizations() -> Component {
    let style = AxisStyle::default();
    Component::Group(Group {
        class: Some("grid"),
        children: vec![
            Component::Chart(Chart {
                kind: ChartKind::Trend,
                style,
            }),
            Component::Chart(Chart {
                kind: ChartKind::Risk,
                style,
            }),
        ],
    })
}

/// Header, filters, charts and notes, top to bottom.
pub fn report_tree() -> Component {
    Component::Group(Group {
        class: None,
        children: vec![
            Component::Header,
            filters(),
            visualizations(),
            Component::Table(TableSource::Notes),
        ],
    })
}

/// Application state: the event store and the risk model, both read-only.
#[derive(Clone)]
pub struct Dashboard {
    engine: QueryEngine,
    predictor: Arc<dyn Predictor>,
}

impl Dashboard {
    pub fn new(engine: QueryEngine, predictor: Arc<dyn Predictor>) -> Self {
        Self { engine, predictor }
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    fn context(&self, kind: EntityKind, entity_id: Option<i64>) -> RenderContext<'_> {
        RenderContext {
            entity_id,
            model: kind.model(),
            engine: &self.engine,
            predictor: self.predictor.as_ref(),
        }
    }

    /// Full HTML page for one employee or team.
    pub async fn render_report(&self, kind: EntityKind, id: i64) -> Result<String, ReportError> {
        let ctx = self.context(kind, Some(id));
        let tree = report_tree();
        let body = tree.render(&ctx).await?;
        let username = ctx.model.display_username(&self.engine, id).await?;

        info!(entity = kind.name(), id, bytes = body.len(), "report rendered");
        Ok(html::document(
            &format!("{}: {username}", header_text(ctx.model)),
            &body,
        ))
    }

    /// Selector fragment for `kind` with nothing selected.
    pub async fn render_selector(&self, kind: EntityKind) -> Result<String, ReportError> {
        let ctx = self.context(kind, None);
        filter_selector().render(&ctx).await
    }

    pub async fn assess(&self, kind: EntityKind, id: i64) -> Result<RiskAssessment, ReportError> {
        score_entity(&self.engine, kind.model(), self.predictor.as_ref(), id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tree_orders_sections() {
        let Component::Group(root) = report_tree() else {
            panic!("root must be a group");
        };
        assert_eq!(root.children.len(), 4);
        assert_eq!(root.children[0], Component::Header);
        assert!(matches!(root.children[1], Component::Form(_)));
        assert!(matches!(root.children[2], Component::Group(_)));
        assert_eq!(root.children[3], Component::Table(TableSource::Notes));
    }

    #[test]
    fn filters_post_to_update_route_and_reuse_selector() {
        let Component::Form(form) = filters() else {
            panic!("filters must be a form");
        };
        assert_eq!(form.id, "top-filters");
        assert_eq!(form.action, "/update_data");
        assert_eq!(form.method, "POST");
        assert_eq!(form.children[1], filter_selector());

        let Component::Radio(radio) = &form.children[0] else {
            panic!("first filter must be the profile radio");
        };
        assert_eq!(radio.values, &EntityKind::ALL);
        assert_eq!(radio.hx_target, "#selector");
    }

    #[test]
    fn visualizations_share_axis_style() {
        let Component::Group(group) = visualizations() else {
            panic!("visualizations must be a group");
        };
        assert_eq!(group.class, Some("grid"));
        let styles: Vec<AxisStyle> = group
            .children
            .iter()
            .filter_map(|child| match child {
                Component::Chart(chart) => Some(chart.style),
                _ => None,
            })
            .collect();
        assert_eq!(styles, vec![AxisStyle::default(); 2]);
    }
}
