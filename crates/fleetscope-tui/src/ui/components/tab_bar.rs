use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::Screen;
use crate::ui::Theme;

/// Header with the app name, screen tabs, and optional context on the right
pub struct TabBar<'a> {
    current: Screen,
    context: Vec<Span<'a>>,
}

impl<'a> TabBar<'a> {
    pub fn new(current: Screen) -> Self {
        Self {
            current,
            context: Vec::new(),
        }
    }

    /// Extra spans shown after the tabs
    pub fn context<I>(mut self, spans: I) -> Self
    where
        I: IntoIterator<Item = Span<'a>>,
    {
        self.context = spans.into_iter().collect();
        self
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled("fleetscope", Theme::title())];

        for screen in Screen::ALL {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            let label = format!("{} {}", screen.index() + 1, screen.title());
            let style = if screen == self.current {
                Theme::tab_active()
            } else {
                Theme::tab()
            };
            spans.push(Span::styled(label, style));
        }

        if !self.context.is_empty() {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.extend(self.context);
        }

        Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            )
            .render(area, buf);
    }
}
