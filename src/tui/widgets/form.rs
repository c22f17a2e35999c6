//! Form Widget
//!
//! Renders a `FormState`: one labelled row per field, the focused row
//! highlighted, secrets masked, and the hint line underneath.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::tui::theme::Theme;
use crate::ui_backend::FormState;

pub struct FormWidget<'a> {
    form: &'a FormState,
    theme: &'a Theme,
}

impl<'a> FormWidget<'a> {
    pub fn new(form: &'a FormState, theme: &'a Theme) -> Self {
        Self { form, theme }
    }

    fn field_lines(&self) -> Vec<Line<'a>> {
        let label_width = self
            .form
            .fields
            .iter()
            .map(|f| f.label.len())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        for (index, field) in self.form.fields.iter().enumerate() {
            let focused = index == self.form.focus;
            let marker = if focused { "▶ " } else { "  " };
            let label_style = if focused {
                Style::default()
                    .fg(self.theme.blue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.text_secondary)
            };

            let value = if field.secret {
                "•".repeat(field.value.chars().count())
            } else {
                field.value.clone()
            };
            let value_span = if value.is_empty() && !focused {
                Span::styled(field.placeholder.to_string(), self.theme.muted())
            } else {
                Span::styled(value, Style::default().fg(self.theme.text_primary))
            };

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(self.theme.blue)),
                Span::styled(format!("{:<width$}  ", field.label, width = label_width), label_style),
                value_span,
            ];
            if focused {
                spans.push(Span::styled("▏", Style::default().fg(self.theme.blue)));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

impl Widget for FormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = self.field_lines();
        lines.push(Line::default());

        if self.form.submitting {
            lines.push(Line::from(Span::styled(
                "Submitting...",
                Style::default().fg(self.theme.yellow),
            )));
        } else if let Some(hint) = &self.form.hint {
            for text in hint.lines() {
                lines.push(Line::from(Span::styled(
                    text.to_string(),
                    Style::default().fg(self.theme.yellow),
                )));
            }
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
