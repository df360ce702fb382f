use ratatui::{
    Frame,
    layout::{Alignment, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use fleetscope_query::{SearchHighlighter, format_log_time};
use fleetscope_types::LogEntry;

use crate::{
    app::{AppState, InputMode, format_instant},
    ui::{Layout, Theme, components::TabBar},
};

use super::{render_status_bar, slot_status, truncate};

/// Log viewer screen
pub struct LogsScreen;

impl LogsScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let (header_area, content_area, status_area) = Layout::main(frame.area());
        let (filter_area, logs_area) = Layout::with_bar(content_area, 3);

        let count = state.logs.data().map_or(0, Vec::len);
        let header = TabBar::new(state.current_screen)
            .context([Span::styled(format!("{} lines", count), Theme::text())]);
        frame.render_widget(header, header_area);

        Self::render_filter_bar(frame, filter_area, state);
        Self::render_logs(frame, logs_area, state);

        let hints = [
            ("/", "Search"),
            ("l", "Level"),
            ("s/p", "Service/Pod"),
            ("S/E", "Start/End"),
            ("x", "Clear"),
        ];
        let right = slot_status(&state.logs).content.into_owned();
        render_status_bar(frame, status_area, state, &hints, right);
    }

    fn render_filter_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let filter = &state.log_filter;
        let mode = state.ui_state.input_mode;
        let mut spans = Vec::new();

        // Search
        spans.push(Span::styled(" /", Theme::text_highlight()));
        spans.push(Span::styled(filter.search.clone(), Theme::text()));
        if mode == InputMode::Search {
            spans.push(Span::styled("█", Theme::cursor()));
        }

        // Level
        spans.push(Span::styled("  Level: ", Theme::text_dim()));
        match filter.level {
            Some(level) => spans.push(Span::styled(
                level.as_query(),
                Style::default()
                    .fg(level.color())
                    .add_modifier(Modifier::BOLD),
            )),
            None => spans.push(Span::styled("All", Theme::text())),
        }

        // Labels
        for (name, value) in [("Service", &filter.service), ("Pod", &filter.pod)] {
            spans.push(Span::styled(format!("  {}: ", name), Theme::text_dim()));
            spans.push(Self::value_span(value));
        }

        // Time bounds
        for (name, bound, editing) in [
            ("Start", filter.start(), mode == InputMode::Start),
            ("End", filter.end(), mode == InputMode::End),
        ] {
            spans.push(Span::styled(format!("  {}: ", name), Theme::text_dim()));
            if editing {
                spans.push(Span::styled(state.ui_state.input.clone(), Theme::text_highlight()));
                spans.push(Span::styled("█", Theme::cursor()));
            } else {
                let text = bound.map(format_instant).unwrap_or_default();
                spans.push(Self::value_span(&text));
            }
        }

        if let Some(err) = &state.ui_state.input_error {
            spans.push(Span::styled(format!("  ⚠ {}", err), Theme::error()));
        }

        let border_style = match mode {
            InputMode::Normal if state.ui_state.input_error.is_some() => Theme::error(),
            InputMode::Normal => Theme::border(),
            _ => Theme::border_input(),
        };

        let filter_bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Filters ", Theme::title())),
        );
        frame.render_widget(filter_bar, area);
    }

    fn value_span(value: &str) -> Span<'static> {
        if value.is_empty() {
            Span::styled("None", Theme::text_dim())
        } else {
            Span::styled(value.to_string(), Theme::text())
        }
    }

    fn render_logs(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let inner_height = area.height.saturating_sub(2) as usize;
        state.ui_state.page_size = inner_height.max(1);

        let title = match state.logs.data() {
            Some(entries) => format!(" Logs ({}) ", entries.len()),
            None => " Logs ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(title, Theme::title()));

        let Some(entries) = state.logs.data() else {
            let message = match state.logs.error() {
                Some(err) => Span::styled(format!("Error loading logs: {}", err), Theme::error()),
                None => Span::styled("Loading logs…", Theme::text_dim()),
            };
            frame.render_widget(
                Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .block(block),
                area,
            );
            return;
        };

        if entries.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("No logs found", Theme::text_dim()))
                    .alignment(Alignment::Center)
                    .block(block),
                area,
            );
            return;
        }

        let total = entries.len();
        let max_scroll = total.saturating_sub(inner_height);
        let scroll = state.ui_state.log_scroll.min(max_scroll);

        // 2 for borders, 1 for scrollbar
        let inner_width = area.width.saturating_sub(3) as usize;
        let lines: Vec<Line> = entries
            .iter()
            .skip(scroll)
            .take(inner_height)
            .map(|entry| Self::format_line(entry, state.highlighter.as_ref(), inner_width))
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
        state.ui_state.log_scroll = scroll;

        if total > inner_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(scroll);
            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    /// `time LVL │ message`, with search matches highlighted in the message
    fn format_line(
        entry: &LogEntry,
        highlighter: Option<&SearchHighlighter>,
        available_width: usize,
    ) -> Line<'static> {
        let time = format_log_time(entry);
        let prefix_width = time.chars().count() + 4 + 3;

        let mut spans = vec![
            Span::styled(time, Theme::text_dim()),
            Span::styled(
                format!(" {:>3}", entry.level.as_str()),
                Style::default()
                    .fg(entry.level.color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Theme::text_dim()),
        ];

        let message = truncate(&entry.message, available_width.saturating_sub(prefix_width));
        let base_style = Style::default().fg(entry.level.color());
        let matches = highlighter.map(|h| h.find_matches(&message)).unwrap_or_default();

        let mut last_end = 0;
        for (start, end) in matches {
            if start > last_end {
                spans.push(Span::styled(message[last_end..start].to_string(), base_style));
            }
            spans.push(Span::styled(message[start..end].to_string(), Theme::search_match()));
            last_end = end;
        }
        if last_end < message.len() {
            spans.push(Span::styled(message[last_end..].to_string(), base_style));
        }

        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_format_line_highlights_matches() {
        let entry = LogEntry::new(
            "1704067200000000000".to_string(),
            "request timeout after timeout".to_string(),
        );
        let highlighter = SearchHighlighter::new("timeout").unwrap();
        let line = LogsScreen::format_line(&entry, Some(&highlighter), 200);

        let highlighted: Vec<&str> = line
            .spans
            .iter()
            .filter(|s| s.style == Theme::search_match())
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(highlighted, vec!["timeout", "timeout"]);
        assert!(text(&line).ends_with("request timeout after timeout"));
    }

    #[test]
    fn test_format_line_truncates_message() {
        let entry = LogEntry::new("bad-ts".to_string(), "x".repeat(100));
        let line = LogsScreen::format_line(&entry, None, 30);
        // Raw timestamp kept when it can't be parsed
        assert!(text(&line).starts_with("bad-ts"));
        assert!(text(&line).ends_with('…'));
        assert!(text(&line).chars().count() <= 30);
    }
}
