use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Create the main layout with header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Split content into a fixed-height bar above the remaining area
    pub fn with_bar(area: Rect, bar_height: u16) -> (Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(bar_height), Constraint::Min(1)])
            .split(area);

        (chunks[0], chunks[1])
    }

    /// Chart on top, table below, split by percentage
    pub fn chart_and_table(area: Rect, chart_percent: u16) -> (Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(chart_percent),
                Constraint::Percentage(100 - chart_percent),
            ])
            .split(area);

        (chunks[0], chunks[1])
    }

    /// Fixed-size popup centered in `area`, shrunk to fit
    pub fn popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_layout() {
        let (header, content, status) = Layout::main(Rect::new(0, 0, 80, 24));
        assert_eq!(header.height, 3);
        assert_eq!(status.height, 1);
        assert_eq!(content.height, 20);
        assert_eq!(status.y, 23);
    }

    #[test]
    fn test_popup_centered_and_clamped() {
        let popup = Layout::popup(Rect::new(0, 0, 100, 40), 60, 16);
        assert_eq!(popup, Rect::new(20, 12, 60, 16));

        let small = Layout::popup(Rect::new(0, 0, 30, 10), 60, 16);
        assert_eq!(small.width, 26);
        assert_eq!(small.height, 6);
    }
}
