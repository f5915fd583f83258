use std::fmt::Write;
use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use super::chart::{cumulative_series, risk_chart, trend_chart, AxisStyle};
use super::html::escape;
use super::{RenderContext, ReportError};
use crate::entity::{EntityKind, EntityModel};
use crate::scoring::score_entity;

pub type RenderFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ReportError>> + Send + 'a>>;

/// A node in the report tree. Leaves fetch their own data through the
/// context's entity model; groups render their children in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Header,
    Selector(Selector),
    Radio(Radio),
    Chart(Chart),
    Table(TableSource),
    Group(Group),
    Form(FormGroup),
}

/// Dropdown of every entity of the active kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub id: &'static str,
    pub name: &'static str,
}

/// Mutually exclusive profile choices that re-fetch the selector on change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Radio {
    pub name: &'static str,
    pub values: &'static [EntityKind],
    pub hx_get: &'static str,
    pub hx_target: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Trend,
    Risk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chart {
    pub kind: ChartKind,
    pub style: AxisStyle,
}

impl Chart {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            style: AxisStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Notes,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub class: Option<&'static str>,
    pub children: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormGroup {
    pub id: &'static str,
    pub action: &'static str,
    pub method: &'static str,
    pub children: Vec<Component>,
}

/// Page heading, e.g. "Team Performance".
pub fn header_text(model: EntityModel) -> String {
    format!("{} Performance", model.kind.label())
}

impl Component {
    pub fn render<'a>(&'a self, ctx: &'a RenderContext<'a>) -> RenderFuture<'a> {
        Box::pin(async move {
            match self {
                Component::Header => Ok(format!("<h1>{}</h1>", escape(&header_text(ctx.model)))),
                Component::Selector(selector) => selector.render(ctx).await,
                Component::Radio(radio) => Ok(radio.render(ctx)),
                Component::Chart(chart) => chart.render(ctx).await,
                Component::Table(source) => source.render(ctx).await,
                Component::Group(group) => {
                    let inner = render_children(&group.children, ctx).await?;
                    Ok(match group.class {
                        Some(class) => format!(r#"<div class="{}">{inner}</div>"#, escape(class)),
                        None => format!("<div>{inner}</div>"),
                    })
                }
                Component::Form(form) => {
                    let inner = render_children(&form.children, ctx).await?;
                    Ok(format!(
                        r#"<form id="{id}" action="{action}" method="{method}">{inner}<button type="submit">Submit</button></form>"#,
                        id = escape(form.id),
                        action = escape(form.action),
                        method = escape(&form.method.to_ascii_lowercase()),
                    ))
                }
            }
        })
    }
}

async fn render_children(
    children: &[Component],
    ctx: &RenderContext<'_>,
) -> Result<String, ReportError> {
    let mut out = String::new();
    for child in children {
        out.push_str(&child.render(ctx).await?);
    }
    Ok(out)
}

impl Selector {
    async fn render(&self, ctx: &RenderContext<'_>) -> Result<String, ReportError> {
        let names = ctx.model.names(ctx.engine).await?;
        debug!(entity = ctx.model.name(), options = names.len(), "rendering selector");

        let mut options = String::new();
        for (label, id) in names {
            let selected = if ctx.entity_id == Some(id) {
                " selected"
            } else {
                ""
            };
            let _ = write!(
                options,
                r#"<option value="{id}"{selected}>{}</option>"#,
                escape(&label)
            );
        }

        Ok(format!(
            r#"<div id="{id}"><label for="{id}-input">{label}</label><select id="{id}-input" name="{name}">{options}</select></div>"#,
            id = escape(self.id),
            label = escape(ctx.model.name()),
            name = escape(self.name),
        ))
    }
}

impl Radio {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::from("<fieldset>");
        for kind in self.values {
            let checked = if *kind == ctx.model.kind {
                " checked"
            } else {
                ""
            };
            let _ = write!(
                out,
                r#"<label><input type="radio" name="{name}" value="{value}" hx-get="{get}" hx-target="{target}" hx-swap="outerHTML"{checked}>{value}</label>"#,
                name = escape(self.name),
                value = kind.label(),
                get = escape(self.hx_get),
                target = escape(self.hx_target),
            );
        }
        out.push_str("</fieldset>");
        out
    }
}

impl Chart {
    async fn render(&self, ctx: &RenderContext<'_>) -> Result<String, ReportError> {
        let figure = match (self.kind, ctx.entity_id) {
            (ChartKind::Trend, Some(id)) => {
                let counts = ctx.model.event_counts(ctx.engine, id).await?;
                trend_chart(&cumulative_series(&counts), self.style)
            }
            (ChartKind::Trend, None) => trend_chart(&[], self.style),
            (ChartKind::Risk, Some(id)) => {
                let assessment = score_entity(ctx.engine, ctx.model, ctx.predictor, id).await?;
                risk_chart(assessment.score, self.style)
            }
            (ChartKind::Risk, None) => risk_chart(None, self.style),
        };
        Ok(format!("<figure>{figure}</figure>"))
    }
}

impl TableSource {
    async fn render(&self, ctx: &RenderContext<'_>) -> Result<String, ReportError> {
        let table = match (self, ctx.entity_id) {
            (TableSource::Notes, Some(id)) => ctx.model.notes(ctx.engine, id).await?,
            (TableSource::Notes, None) => Default::default(),
        };

        let mut out = String::from("<table><thead><tr>");
        for column in &table.columns {
            let _ = write!(out, "<th>{}</th>", escape(column));
        }
        out.push_str("</tr></thead><tbody>");
        for row in &table.rows {
            out.push_str("<tr>");
            for cell in row {
                let _ = write!(out, "<td>{}</td>", escape(&cell.to_string()));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
        Ok(out)
    }
}
