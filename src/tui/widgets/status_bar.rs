//! Status Bar Widget
//!
//! Server URL, in-flight request count, the last status message and the
//! help hint

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

use super::fit_width;

pub struct StatusBar<'a> {
    server: &'a str,
    message: Option<&'a str>,
    pending: usize,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            server: "",
            message: None,
            pending: 0,
            theme,
        }
    }

    pub fn server(mut self, url: &'a str) -> Self {
        self.server = url;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    /// Number of requests still in flight
    pub fn pending(mut self, count: usize) -> Self {
        self.pending = count;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let [server_area, pending_area, message_area, help_area] = Layout::horizontal([
            Constraint::Length(32),
            Constraint::Length(14),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .areas(area);

        let base = Style::default().bg(self.theme.bg_dark);

        Paragraph::new(Line::from(Span::styled(
            fit_width(&format!(" ⇄ {}", self.server), server_area.width as usize),
            Style::default().fg(self.theme.blue),
        )))
        .style(base)
        .render(server_area, buf);

        let pending = if self.pending > 0 {
            Span::styled(
                format!("⏳ {} loading", self.pending),
                Style::default().fg(self.theme.yellow),
            )
        } else {
            Span::styled("● idle", Style::default().fg(self.theme.green))
        };
        Paragraph::new(Line::from(pending))
            .style(base)
            .render(pending_area, buf);

        Paragraph::new(Line::from(Span::styled(
            fit_width(self.message.unwrap_or_default(), message_area.width as usize),
            Style::default().fg(self.theme.text_secondary),
        )))
        .style(base)
        .render(message_area, buf);

        Paragraph::new(Line::from(Span::styled(
            "? help ",
            Style::default()
                .fg(self.theme.text_muted)
                .add_modifier(Modifier::ITALIC),
        )))
        .style(base)
        .alignment(ratatui::layout::Alignment::Right)
        .render(help_area, buf);
    }
}
