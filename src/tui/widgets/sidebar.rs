//! Navigation sidebar
//!
//! Panel list with the active entry highlighted, plus the chat assistant's
//! current account and model underneath.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::theme::Theme;
use crate::ui_backend::Panel;

use super::fit_width;

pub struct NavSidebar<'a> {
    active: Panel,
    llm_status: &'a str,
    pm_account: Option<&'a str>,
    pm_model: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> NavSidebar<'a> {
    pub fn new(active: Panel, theme: &'a Theme) -> Self {
        Self {
            active,
            llm_status: "",
            pm_account: None,
            pm_model: None,
            theme,
        }
    }

    pub fn llm_status(mut self, status: &'a str) -> Self {
        self.llm_status = status;
        self
    }

    pub fn pm(mut self, account: Option<&'a str>, model: Option<&'a str>) -> Self {
        self.pm_account = account;
        self.pm_model = model;
        self
    }
}

impl Widget for NavSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                " Fulcrum ",
                Style::default()
                    .fg(self.theme.purple)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(self.theme.block_style(false));
        let inner = block.inner(area);
        block.render(area, buf);

        let width = inner.width as usize;
        let mut lines: Vec<Line> = Panel::ALL
            .iter()
            .enumerate()
            .map(|(i, panel)| {
                let label = fit_width(&format!(" {} {}", i + 1, panel.title()), width);
                if *panel == self.active {
                    Line::from(Span::styled(
                        format!("{:<width$}", label, width = width),
                        self.theme.selected(),
                    ))
                } else {
                    Line::from(Span::styled(
                        label,
                        Style::default().fg(self.theme.text_secondary),
                    ))
                }
            })
            .collect();

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(" LLM", self.theme.muted())));
        lines.push(Line::from(Span::styled(
            fit_width(&format!(" {}", self.llm_status), width),
            Style::default().fg(self.theme.cyan),
        )));
        lines.push(Line::from(Span::styled(" PM assistant", self.theme.muted())));
        let pm = match (self.pm_account, self.pm_model) {
            (Some(account), Some(model)) => format!(" {} · {}", account, model),
            (Some(account), None) => format!(" {} · default", account),
            _ => " not set (Ctrl+P)".to_string(),
        };
        lines.push(Line::from(Span::styled(
            fit_width(&pm, width),
            Style::default().fg(self.theme.green),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}
