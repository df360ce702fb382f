mod logs;
mod metrics;
mod robots;

pub use logs::LogsScreen;
pub use metrics::MetricsScreen;
pub use robots::RobotsScreen;

use chrono::Local;
use fleetscope_query::QuerySlot;
use ratatui::{Frame, layout::Rect, text::Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::AppState;
use crate::ui::Theme;
use crate::ui::components::{StatusBar, global_hints};

/// Status bar with screen hints, or the pending error when there is one
fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    hints: &[(&'static str, &'static str)],
    right: String,
) {
    let status = match &state.ui_state.error_message {
        Some(err) => StatusBar::new()
            .hints([("Esc", "Dismiss")])
            .right(format!("⚠ {}", err)),
        None => StatusBar::new()
            .hints(hints.iter().copied().chain(global_hints()))
            .right(right),
    };
    frame.render_widget(status, area);
}

/// Freshness of a query: loading, failed, or when it last landed
fn slot_status<T>(slot: &QuerySlot<T>) -> Span<'static> {
    if let Some(err) = slot.error() {
        return Span::styled(format!("⚠ {}", err), Theme::error());
    }
    if slot.is_loading() {
        return Span::styled("loading…", Theme::text_dim());
    }
    match slot.last_fetched_at() {
        Some(at) => Span::styled(
            format!("updated {}", at.with_timezone(&Local).format("%H:%M:%S")),
            Theme::text_dim(),
        ),
        None => Span::styled("", Theme::text_dim()),
    }
}

/// Cut `text` to at most `max_width` terminal columns, marking the cut with `…`
fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width - 1 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
        // Wide characters take two columns each
        assert_eq!(truncate("日本語テキスト", 7), "日本語…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_slot_status() {
        let mut slot: QuerySlot<u8> = QuerySlot::new();
        assert_eq!(slot_status(&slot).content, "");

        let generation = slot.begin();
        assert_eq!(slot_status(&slot).content, "loading…");

        slot.resolve(generation, Err("boom".to_string()), Utc::now());
        assert_eq!(slot_status(&slot).content, "⚠ boom");
    }
}
