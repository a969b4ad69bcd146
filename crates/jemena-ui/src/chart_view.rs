//! Draws a [`ChartSpec`] with ratatui's `Chart` widget.
//!
//! Layout: four header lines, the panels side by side, one footer line.
//! Step series are expanded with [`step_path`]; dashed series become Braille
//! scatter points from [`dash_points`]; stacked bars are drawn back to front.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::chart_spec::{dash_points, step_path, AxisSpec, ChartSpec, Panel, SeriesStyle};
use crate::components::header::Header;
use crate::themes::Theme;

const HEADER_HEIGHT: u16 = 4;
const FOOTER_TEXT: &str = "Press Enter or q to quit";

/// Render the whole chart window into `area`.
pub fn render_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, theme: &Theme) {
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let header = Header::new(&spec.title, &spec.summary, theme);
    frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

    if spec.is_empty() {
        render_no_data(frame, body_area, theme);
    } else {
        let n = spec.panels.len() as u32;
        let columns = Layout::horizontal(spec.panels.iter().map(|_| Constraint::Ratio(1, n)))
            .split(body_area);
        for (panel, rect) in spec.panels.iter().zip(columns.iter()) {
            render_panel(frame, *rect, panel, theme);
        }
    }

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(FOOTER_TEXT, theme.dim))),
        footer_area,
    );
}

/// Placeholder shown when there is nothing to plot.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No usage data", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check the start date, or run `jemena update` to fetch a fresh CSV.",
            theme.dim,
        )),
        Line::from(Span::styled(FOOTER_TEXT, theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border)
                .title(" Jemena "),
        ),
        area,
    );
}

/// Keep every k-th label so that at most `max` remain, choosing k so the
/// kept labels stay evenly spaced and include both ends.
pub fn thin_labels(labels: &[String], max: usize) -> Vec<String> {
    let max = max.max(2);
    if labels.len() <= max {
        return labels.to_vec();
    }
    let intervals = labels.len() - 1;
    let step = (1..=intervals)
        .find(|k| intervals % k == 0 && intervals / k < max)
        .unwrap_or(intervals);
    labels.iter().step_by(step).cloned().collect()
}

// ── Panels ────────────────────────────────────────────────────────────────────

fn render_panel(frame: &mut Frame, area: Rect, panel: &Panel, theme: &Theme) {
    // Owned point buffers; datasets borrow from them.
    let drawn: Vec<(usize, Vec<(f64, f64)>)> = panel
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let points = match s.style {
                SeriesStyle::Line | SeriesStyle::Bar => s.points.clone(),
                SeriesStyle::Step => step_path(&s.points),
                SeriesStyle::DashedStep => dash_points(
                    &step_path(&s.points),
                    panel.x_axis.bounds,
                    panel.y_axis.bounds,
                ),
            };
            (i, points)
        })
        .collect();

    let mut order: Vec<&(usize, Vec<(f64, f64)>)> = drawn.iter().collect();
    if panel.stacked {
        order.reverse();
    }

    let datasets: Vec<Dataset> = order
        .into_iter()
        .map(|(i, points)| {
            let series = &panel.series[*i];
            let graph_type = match series.style {
                SeriesStyle::Line | SeriesStyle::Step => GraphType::Line,
                SeriesStyle::DashedStep => GraphType::Scatter,
                SeriesStyle::Bar => GraphType::Bar,
            };
            let dataset = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(graph_type)
                .style(theme.series_style(*i))
                .data(points);
            if panel.show_legend {
                dataset.name(series.name.clone())
            } else {
                dataset
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border)
        .title(Span::styled(format!(" {} ", panel.title), theme.panel_title));

    let inner_width = area.width.saturating_sub(2);
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(axis(&panel.x_axis, inner_width, theme))
        .y_axis(axis(&panel.y_axis, u16::MAX, theme))
        .legend_position(panel.show_legend.then_some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    frame.render_widget(chart, area);
}

fn axis<'a>(spec: &'a AxisSpec, width: u16, theme: &Theme) -> Axis<'a> {
    let widest = spec.labels.iter().map(|l| l.chars().count()).max().unwrap_or(1);
    let max_labels = usize::from(width) / (widest + 2);
    let labels: Vec<Span> = thin_labels(&spec.labels, max_labels)
        .into_iter()
        .map(|l| Span::styled(l, theme.label))
        .collect();

    Axis::default()
        .title(Span::styled(spec.title.as_str(), theme.axis_title))
        .style(theme.axis)
        .bounds(spec.bounds)
        .labels(labels)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
