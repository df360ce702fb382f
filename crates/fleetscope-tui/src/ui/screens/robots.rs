use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::{
    app::AppState,
    ui::{Layout, Theme, components::TabBar},
};

use super::{render_status_bar, slot_status};

/// Robot registry screen
pub struct RobotsScreen;

impl RobotsScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let (header_area, content_area, status_area) = Layout::main(frame.area());

        let count = state.robots.data().map_or(0, Vec::len);
        let header = TabBar::new(state.current_screen).context([
            Span::styled(format!("{} robots", count), Theme::text()),
        ]);
        frame.render_widget(header, header_area);

        Self::render_table(frame, content_area, state);

        let hints = [("a", "Add"), ("u", "Update"), ("r", "Refresh")];
        let right = slot_status(&state.robots).content.into_owned();
        render_status_bar(frame, status_area, state, &hints, right);
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(" Robots ", Theme::title()));

        let Some(robots) = state.robots.data() else {
            let message = match state.robots.error() {
                Some(err) => Span::styled(format!("Error loading robots: {}", err), Theme::error()),
                None => Span::styled("Loading robots…", Theme::text_dim()),
            };
            frame.render_widget(
                Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .block(block),
                area,
            );
            return;
        };

        if robots.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No robots registered. Press [a] to add one.",
                    Theme::text_dim(),
                ))
                .alignment(Alignment::Center)
                .block(block),
                area,
            );
            return;
        }

        let rows: Vec<Row> = robots
            .iter()
            .map(|robot| {
                Row::new(vec![
                    Cell::from(robot.id.clone()),
                    Cell::from(robot.name.clone()),
                    Cell::from(robot.kind.clone()),
                    Cell::from(Span::styled(
                        robot.status.clone(),
                        Style::default().fg(robot.status_color()),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(25),
                Constraint::Percentage(35),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ],
        )
        .header(Row::new(vec!["ID", "Name", "Type", "Status"]).style(Theme::table_header()))
        .block(block)
        .row_highlight_style(Theme::list_item_selected())
        .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut state.ui_state.robot_table);
    }
}
