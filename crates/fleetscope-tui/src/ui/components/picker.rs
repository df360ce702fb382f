use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::PickerState;
use crate::ui::{Layout, Theme};

/// Type-to-filter selection popup
pub struct Picker;

impl Picker {
    pub fn render(frame: &mut Frame, state: &mut PickerState) {
        let popup_area = Layout::popup(frame.area(), 60, 18);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search input
                Constraint::Min(1),    // Item list
            ])
            .split(popup_area);

        let search_text = if state.search_input.is_empty() {
            vec![Span::styled("Type to filter...", Theme::text_dim())]
        } else {
            vec![
                Span::styled(state.search_input.clone(), Theme::text()),
                Span::styled("█", Style::default().fg(Color::Yellow)),
            ]
        };

        let search_widget = Paragraph::new(Line::from(search_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_input())
                .title(Span::styled(state.kind.title(), Theme::text_highlight())),
        );
        frame.render_widget(search_widget, chunks[0]);

        let items: Vec<ListItem> = state
            .filtered_indices
            .iter()
            .map(|&idx| {
                let value = &state.items()[idx];
                let style = if value.is_empty() {
                    Theme::text_dim()
                } else {
                    Theme::list_item()
                };
                ListItem::new(Line::from(Span::styled(
                    PickerState::display(value).to_string(),
                    style,
                )))
            })
            .collect();

        let title = if items.is_empty() {
            " No matches "
        } else {
            ""
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
                    .border_style(Theme::border_input())
                    .title(Span::styled(title, Theme::text_dim())),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Yellow)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        frame.render_stateful_widget(list, chunks[1], &mut state.list_state);
    }
}
