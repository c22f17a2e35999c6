//! Modal Widget
//!
//! Centered bordered box drawn over the dashboard

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::tui::theme::Theme;

/// Rect of `percent_x` x `percent_y` centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x.min(100) / 100;
    let height = area.height * percent_y.min(100) / 100;
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

/// A modal dialog that renders centered on screen
pub struct ModalFrame<'a> {
    title: &'a str,
    content: Vec<Line<'a>>,
    footer: Option<&'a str>,
    theme: &'a Theme,
    width_percent: u16,
    height_percent: u16,
}

impl<'a> ModalFrame<'a> {
    pub fn new(title: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            content: Vec::new(),
            footer: None,
            theme,
            width_percent: 60,
            height_percent: 50,
        }
    }

    pub fn content(mut self, content: Vec<Line<'a>>) -> Self {
        self.content = content;
        self
    }

    /// Key hints on the bottom border
    pub fn footer(mut self, footer: &'a str) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn width(mut self, percent: u16) -> Self {
        self.width_percent = percent;
        self
    }

    pub fn height(mut self, percent: u16) -> Self {
        self.height_percent = percent;
        self
    }

    /// Area the frame will occupy inside `area`
    pub fn area(&self, area: Rect) -> Rect {
        centered_rect(self.width_percent, self.height_percent, area)
    }

    /// Draw the border and return the inner area for custom content
    pub fn render_frame(&self, area: Rect, buf: &mut Buffer) -> Rect {
        let modal_area = self.area(area);
        Clear.render(modal_area, buf);

        let mut block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(self.theme.blue)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused))
            .style(Style::default().bg(self.theme.bg_dark));
        if let Some(footer) = self.footer {
            block = block.title_bottom(Span::styled(
                format!(" {} ", footer),
                Style::default().fg(self.theme.text_muted),
            ));
        }

        let inner = block.inner(modal_area);
        block.render(modal_area, buf);
        inner
    }
}

impl Widget for ModalFrame<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = self.render_frame(area, buf);
        Paragraph::new(self.content)
            .style(Style::default().fg(self.theme.text_primary))
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

/// Keyboard reference shown by `?`
pub fn help_lines(theme: &Theme) -> Vec<Line<'static>> {
    let shortcuts: [(&str, &str); 16] = [
        ("Tab / Shift+Tab", "Next / previous panel"),
        ("1-5", "Jump to panel"),
        ("r", "Reload panel"),
        ("Up / Down", "Move selection"),
        ("n", "New project / account / Coder connection"),
        ("e / Enter", "Edit project, rename account"),
        ("m", "Edit account models"),
        ("d", "Delete account / disconnect Coder"),
        ("b", "Browse workspace folders"),
        ("g", "Connect GitHub"),
        ("c / o", "Connect Coder with token / OAuth"),
        ("Left / Right", "Switch Coder list focus"),
        ("Ctrl+P", "PM assistant settings"),
        ("L", "Sign out"),
        ("Esc", "Close dialog / clear chat input"),
        ("q / Ctrl+C", "Quit"),
    ];
    shortcuts
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<18}", key),
                    Style::default()
                        .fg(theme.yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(action.to_string(), Style::default().fg(theme.text_secondary)),
            ])
        })
        .collect()
}
