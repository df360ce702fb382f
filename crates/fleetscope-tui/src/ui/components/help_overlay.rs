use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::Screen;
use crate::ui::Layout;

/// Help overlay showing keybindings for the current screen
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame, screen: Screen) {
        let popup_area = Layout::popup(frame.area(), 52, 26);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let mut help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Global"),
            Self::key_line("1/2/3", "Robots / Logs / Metrics"),
            Self::key_line("Tab", "Next screen"),
            Self::key_line("j/k", "Move down / up"),
            Self::key_line("g/G", "Top / bottom"),
            Self::key_line("r", "Refresh"),
            Self::key_line("Esc", "Dismiss error"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("q", "Quit"),
            Line::from(""),
        ];

        help_text.extend(match screen {
            Screen::Robots => vec![
                Self::section("Robots"),
                Self::key_line("a", "Add robot"),
                Self::key_line("u", "Update selected robot"),
                Self::key_line("Tab", "Next field (in form)"),
                Self::key_line("←/→", "Change status (in form)"),
                Self::key_line("Enter", "Submit form"),
            ],
            Screen::Logs => vec![
                Self::section("Logs"),
                Self::key_line("/", "Search (applies as you type)"),
                Self::key_line("l/L", "Cycle level filter"),
                Self::key_line("s", "Pick service"),
                Self::key_line("p", "Pick pod"),
                Self::key_line("S/E", "Edit start / end time"),
                Self::key_line("x", "Clear all filters"),
                Self::key_line("Ctrl+d/u", "Page down / up"),
            ],
            Screen::Metrics => vec![
                Self::section("Metrics"),
                Self::key_line("m", "Pick metric"),
                Self::key_line("w/W", "Cycle time window"),
            ],
        });

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(name: &str) -> Line<'_> {
        Line::from(Span::styled(name, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
