use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{FormField, FormKind, RobotForm};
use crate::ui::{Layout, Theme};

/// Modal dialog for the add/update robot forms
pub struct FormDialog;

impl FormDialog {
    pub fn render(frame: &mut Frame, form: &RobotForm) {
        let fields = form.fields();
        // One bordered row per field plus the footer
        let height = fields.len() as u16 * 3 + 6;
        let popup_area = Layout::popup(frame.area(), 56, height);

        frame.render_widget(Clear, popup_area);

        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(form.kind.title(), Theme::title()));
        let inner = outer.inner(popup_area);
        frame.render_widget(outer, popup_area);

        let mut constraints: Vec<Constraint> =
            fields.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(2));
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in fields.iter().enumerate() {
            let focused = i == form.focus;
            frame.render_widget(Self::field_widget(form, *field, focused), chunks[i]);
        }

        frame.render_widget(Self::footer(form), chunks[fields.len()]);
    }

    fn field_widget(form: &RobotForm, field: FormField, focused: bool) -> Paragraph<'static> {
        let mut spans = match field {
            FormField::Status => {
                let (text, style) = match form.status {
                    Some(status) => (
                        status.label().to_string(),
                        Style::default().fg(status.color()),
                    ),
                    None => ("None".to_string(), Theme::text_dim()),
                };
                vec![
                    Span::styled("◂ ", Theme::text_dim()),
                    Span::styled(text, style),
                    Span::styled(" ▸", Theme::text_dim()),
                ]
            }
            FormField::Id | FormField::Name | FormField::Type => {
                let value = match field {
                    FormField::Id => &form.id,
                    FormField::Name => &form.name,
                    _ => &form.robot_type,
                };
                vec![Span::styled(value.clone(), Theme::text())]
            }
        };
        if focused && field != FormField::Status {
            spans.push(Span::styled("█", Theme::cursor()));
        }

        let required = match (form.kind, field) {
            (_, FormField::Id) => true,
            (FormKind::Add, FormField::Name | FormField::Type) => true,
            _ => false,
        };
        let title = if required {
            format!(" {} * ", field.label())
        } else {
            format!(" {} ", field.label())
        };

        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if focused {
                    Theme::border_input()
                } else {
                    Theme::border()
                })
                .title(Span::styled(title, Theme::text_dim())),
        )
    }

    fn footer(form: &RobotForm) -> Paragraph<'static> {
        let submit_style = if form.can_submit() {
            Theme::status_bar_key()
        } else {
            Theme::text_dim().add_modifier(Modifier::CROSSED_OUT)
        };
        let submit_label = if form.submitting {
            "[Saving...]"
        } else {
            "[Enter] Submit"
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(submit_label, submit_style),
            Span::styled("  [Esc] Cancel  [Tab] Next field", Theme::text_dim()),
        ])];
        if let Some(err) = &form.error {
            lines.push(Line::from(Span::styled(format!("⚠ {}", err), Theme::error())));
        }

        Paragraph::new(lines).wrap(Wrap { trim: true })
    }
}
