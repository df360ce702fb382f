use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Row, Table},
};

use fleetscope_query::format_sample_time;
use fleetscope_types::MetricTable;

use crate::{
    app::AppState,
    ui::{Layout, Theme, components::TabBar},
};

use super::{render_status_bar, slot_status, truncate};

/// Metric chart and table screen
pub struct MetricsScreen;

impl MetricsScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let (header_area, content_area, status_area) = Layout::main(frame.area());

        let metric = state.selected_metric.as_deref().unwrap_or("no metric");
        let header = TabBar::new(state.current_screen).context([
            Span::styled(metric.to_string(), Theme::text_highlight()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(format!("⏱ {}", state.time_window.label()), Theme::title()),
        ]);
        frame.render_widget(header, header_area);

        Self::render_content(frame, content_area, state);

        let hints = [("m", "Metric"), ("w/W", "Window"), ("r", "Refresh")];
        let right = if state.selected_metric.is_some() {
            slot_status(&state.metric_table).content.into_owned()
        } else {
            slot_status(&state.metric_names).content.into_owned()
        };
        render_status_bar(frame, status_area, state, &hints, right);
    }

    fn render_content(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let block = |title: &'static str| {
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(title, Theme::title()))
        };

        let placeholder = if state.selected_metric.is_none() {
            let names = state.metric_names.data().map_or(0, Vec::len);
            Some(match state.metric_names.error() {
                Some(err) => Span::styled(
                    format!("Error loading metric names: {}", err),
                    Theme::error(),
                ),
                None => Span::styled(
                    format!("Press [m] to pick one of {} metrics", names),
                    Theme::text_dim(),
                ),
            })
        } else {
            match (state.metric_table.data(), state.metric_table.error()) {
                (Some(table), _) if !table.is_empty() => None,
                (_, Some(err)) => Some(Span::styled(
                    format!("Error loading metric: {}", err),
                    Theme::error(),
                )),
                (Some(_), None) => Some(Span::styled(
                    "No data in this window",
                    Theme::text_dim(),
                )),
                (None, None) => Some(Span::styled("Loading…", Theme::text_dim())),
            }
        };

        if let Some(message) = placeholder {
            frame.render_widget(
                Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .block(block(" Metrics ")),
                area,
            );
            return;
        }

        let Some(table) = state.metric_table.data() else {
            return;
        };
        let (chart_area, table_area) = Layout::chart_and_table(area, 60);
        Self::render_chart(frame, chart_area, table, block(" Chart "));

        let visible = table_area.height.saturating_sub(3) as usize;
        let max_scroll = table.rows.len().saturating_sub(visible);
        let scroll = state.ui_state.metric_scroll.min(max_scroll);
        let data_table =
            Self::build_table(table, scroll, visible, table_area.width, block(" Data "));
        frame.render_widget(data_table, table_area);

        state.ui_state.metric_scroll = scroll;
        state.ui_state.page_size = visible.max(1);
    }

    fn render_chart(frame: &mut Frame, area: Rect, table: &MetricTable, block: Block) {
        let series: Vec<(String, Vec<(f64, f64)>)> = table
            .columns
            .iter()
            .map(|c| (c.clone(), table.points(c)))
            .collect();

        let (x_min, x_max) = bounds(series.iter().flat_map(|(_, p)| p.iter().map(|(x, _)| *x)));
        let (y_min, y_max) = bounds(series.iter().flat_map(|(_, p)| p.iter().map(|(_, y)| *y)));
        // Flat lines still need a visible y range
        let pad = if y_max > y_min { (y_max - y_min) * 0.05 } else { 1.0 };
        let (y_min, y_max) = (y_min - pad, y_max + pad);

        let datasets: Vec<Dataset> = series
            .iter()
            .enumerate()
            .map(|(i, (name, points))| {
                Dataset::default()
                    .name(name.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Theme::series(i)))
                    .data(points)
            })
            .collect();

        let x_labels = [x_min, (x_min + x_max) / 2.0, x_max]
            .into_iter()
            .map(|x| Span::styled(format_sample_time(x), Theme::text_dim()))
            .collect::<Vec<_>>();
        let y_labels = [y_min, (y_min + y_max) / 2.0, y_max]
            .into_iter()
            .map(|y| Span::styled(format_value(y), Theme::text_dim()))
            .collect::<Vec<_>>();

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Theme::text_dim())
                    .bounds([x_min, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Theme::text_dim())
                    .bounds([y_min, y_max])
                    .labels(y_labels),
            );

        frame.render_widget(chart, area);
    }

    fn build_table<'a>(
        table: &MetricTable,
        scroll: usize,
        visible: usize,
        width: u16,
        block: Block<'a>,
    ) -> Table<'a> {
        let column_width = (width.saturating_sub(10) as usize / table.columns.len().max(1)).max(6);

        let header = std::iter::once("Time".to_string())
            .chain(table.columns.iter().map(|c| truncate(c, column_width)));

        let rows: Vec<Row> = table
            .rows
            .iter()
            .skip(scroll)
            .take(visible)
            .map(|row| {
                // Columns without a sample at this timestamp stay blank
                let values = table
                    .columns
                    .iter()
                    .map(|c| row.values.get(c).map(|v| format_value(*v)).unwrap_or_default());
                let cells = std::iter::once(row.time.clone()).chain(values);
                Row::new(cells.collect::<Vec<_>>())
            })
            .collect();

        let widths = std::iter::once(Constraint::Length(7))
            .chain(table.columns.iter().map(|_| Constraint::Min(column_width as u16)));

        Table::new(rows, widths)
            .header(Row::new(header.collect::<Vec<_>>()).style(Theme::table_header()))
            .block(block)
    }
}

/// Min and max of finite values; `(0, 1)` when there are none
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min.is_finite() { (min, max) } else { (0.0, 1.0) }
}

/// Compact number rendering for cells and axis labels
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else if value.abs() >= 1000.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.3}", value)
    }
}
