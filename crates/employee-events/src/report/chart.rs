use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use tracing::warn;

use super::html::escape;
use crate::entity::EventCount;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 360.0;
const LEFT: f64 = 64.0;
const RIGHT: f64 = 24.0;
const TOP: f64 = 48.0;
const BOTTOM: f64 = 56.0;

/// Longest first-to-last span that still gets one point per calendar day.
pub const MAX_FILLED_DAYS: i64 = 3_660;

const POSITIVE_COLOR: &str = "#1f77b4";
const NEGATIVE_COLOR: &str = "#ff7f0e";
const BAR_COLOR: &str = "#1f77b4";

/// Border and label colors shared by every figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisStyle {
    pub border_color: &'static str,
    pub font_color: &'static str,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            border_color: "black",
            font_color: "black",
        }
    }
}

/// Running totals on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub positive: i64,
    pub negative: i64,
}

/// Null counts read as zero, days between the first and last event are
/// filled with zero rows, then both columns are summed cumulatively.
///
/// Spans longer than [`MAX_FILLED_DAYS`] keep only the event days.
pub fn cumulative_series(counts: &[EventCount]) -> Vec<CumulativePoint> {
    let mut daily: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for count in counts {
        let entry = daily.entry(count.event_date).or_default();
        entry.0 += count.positive_events.unwrap_or(0);
        entry.1 += count.negative_events.unwrap_or(0);
    }

    let (Some(first), Some(last)) = (
        daily.keys().next().copied(),
        daily.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let span = (last - first).num_days();
    let days: Vec<NaiveDate> = if span > MAX_FILLED_DAYS {
        warn!(%first, %last, span, "event dates too far apart, skipping gap fill");
        daily.keys().copied().collect()
    } else {
        first.iter_days().take_while(|date| *date <= last).collect()
    };

    let mut positive = 0;
    let mut negative = 0;
    days.into_iter()
        .map(|date| {
            let (day_positive, day_negative) = daily.get(&date).copied().unwrap_or_default();
            positive += day_positive;
            negative += day_negative;
            CumulativePoint {
                date,
                positive,
                negative,
            }
        })
        .collect()
}

fn plot_width() -> f64 {
    WIDTH - LEFT - RIGHT
}

fn plot_height() -> f64 {
    HEIGHT - TOP - BOTTOM
}

fn text(out: &mut String, x: f64, y: f64, anchor: &str, size: u32, color: &str, content: &str) {
    let _ = write!(
        out,
        r#"<text x="{x:.1}" y="{y:.1}" text-anchor="{anchor}" font-size="{size}" fill="{color}">{}</text>"#,
        escape(content)
    );
}

fn open_figure(out: &mut String, class: &str, title: &str, title_size: u32, style: AxisStyle) {
    let _ = write!(
        out,
        r#"<svg class="{class}" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{label}">"#,
        label = escape(title),
    );
    text(out, WIDTH / 2.0, TOP / 2.0 + 6.0, "middle", title_size, style.font_color, title);
}

fn axes(out: &mut String, style: AxisStyle) {
    let _ = write!(
        out,
        r#"<rect x="{LEFT}" y="{TOP}" width="{w:.1}" height="{h:.1}" fill="none" stroke="{color}" stroke-width="1"/>"#,
        w = plot_width(),
        h = plot_height(),
        color = style.border_color,
    );
}

fn no_data(out: &mut String, style: AxisStyle) {
    text(
        out,
        LEFT + plot_width() / 2.0,
        TOP + plot_height() / 2.0,
        "middle",
        14,
        style.font_color,
        "no data",
    );
}

/// Two-series cumulative line chart.
pub fn trend_chart(points: &[CumulativePoint], style: AxisStyle) -> String {
    let mut out = String::new();
    open_figure(&mut out, "trend-chart", "Cumulative Performance", 16, style);
    axes(&mut out, style);

    let bottom = TOP + plot_height();
    text(&mut out, LEFT + plot_width() / 2.0, HEIGHT - 12.0, "middle", 12, style.font_color, "Day");
    let _ = write!(
        out,
        r#"<text x="16" y="{y:.1}" text-anchor="middle" font-size="12" fill="{color}" transform="rotate(-90 16 {y:.1})">Events</text>"#,
        y = TOP + plot_height() / 2.0,
        color = style.font_color,
    );

    if points.is_empty() {
        no_data(&mut out, style);
        out.push_str("</svg>");
        return out;
    }

    let max = points
        .iter()
        .map(|point| point.positive.max(point.negative))
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    let step = if points.len() > 1 {
        plot_width() / (points.len() - 1) as f64
    } else {
        0.0
    };
    let x_at = |index: usize| {
        if points.len() > 1 {
            LEFT + step * index as f64
        } else {
            LEFT + plot_width() / 2.0
        }
    };
    let y_at = |value: i64| bottom - (value as f64 / max) * plot_height();

    text(&mut out, LEFT - 8.0, bottom + 4.0, "end", 11, style.font_color, "0");
    text(&mut out, LEFT - 8.0, TOP + 4.0, "end", 11, style.font_color, &format!("{max}"));
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let first_label = first.date.to_string();
        let last_label = last.date.to_string();
        text(&mut out, x_at(0), bottom + 18.0, "middle", 11, style.font_color, &first_label);
        if points.len() > 1 {
            text(
                &mut out,
                x_at(points.len() - 1),
                bottom + 18.0,
                "middle",
                11,
                style.font_color,
                &last_label,
            );
        }
    }

    let lines: [(&str, &str, fn(&CumulativePoint) -> i64); 2] = [
        ("Positive", POSITIVE_COLOR, |point| point.positive),
        ("Negative", NEGATIVE_COLOR, |point| point.negative),
    ];
    for (label, color, select) in lines {
        let coordinates = points
            .iter()
            .enumerate()
            .map(|(index, point)| format!("{:.1},{:.1}", x_at(index), y_at(select(point))))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            out,
            r#"<polyline class="series" data-series="{label}" points="{coordinates}" fill="none" stroke="{color}" stroke-width="2"/>"#,
        );
    }

    for (row, (label, color)) in [("Positive", POSITIVE_COLOR), ("Negative", NEGATIVE_COLOR)]
        .into_iter()
        .enumerate()
    {
        let y = TOP + 14.0 + row as f64 * 16.0;
        let x = LEFT + 12.0;
        let _ = write!(
            out,
            r#"<line x1="{x:.1}" y1="{y0:.1}" x2="{x1:.1}" y2="{y0:.1}" stroke="{color}" stroke-width="2"/>"#,
            y0 = y - 4.0,
            x1 = x + 18.0,
        );
        text(&mut out, x + 24.0, y, "start", 12, style.font_color, label);
    }

    out.push_str("</svg>");
    out
}

/// Single horizontal bar on a fixed [0, 1] axis.
pub fn risk_chart(score: Option<f64>, style: AxisStyle) -> String {
    let mut out = String::new();
    open_figure(&mut out, "risk-chart", "Predicted Recruitment Risk", 20, style);
    axes(&mut out, style);

    let bottom = TOP + plot_height();
    for tick in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let x = LEFT + tick * plot_width();
        let _ = write!(
            out,
            r#"<line x1="{x:.1}" y1="{bottom:.1}" x2="{x:.1}" y2="{y2:.1}" stroke="{color}"/>"#,
            y2 = bottom + 5.0,
            color = style.border_color,
        );
        text(&mut out, x, bottom + 20.0, "middle", 11, style.font_color, &format!("{tick:.2}"));
    }

    match score {
        Some(score) => {
            let score = score.clamp(0.0, 1.0);
            let bar_height = plot_height() * 0.5;
            let y = TOP + (plot_height() - bar_height) / 2.0;
            let width = score * plot_width();
            let _ = write!(
                out,
                r#"<rect class="risk-bar" data-score="{score:.4}" x="{LEFT}" y="{y:.1}" width="{width:.1}" height="{bar_height:.1}" fill="{BAR_COLOR}"/>"#,
            );
            text(
                &mut out,
                (LEFT + width + 6.0).min(WIDTH - RIGHT - 4.0),
                y + bar_height / 2.0 + 4.0,
                if score > 0.9 { "end" } else { "start" },
                12,
                style.font_color,
                &format!("{score:.2}"),
            );
        }
        None => no_data(&mut out, style),
    }

    out.push_str("</svg>");
    out
}
