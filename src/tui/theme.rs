//! Color schemes for the dashboard

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    // Background colors
    pub bg_main: Color,
    pub bg_dark: Color,
    pub bg_highlight: Color,

    // Border colors
    pub border: Color,
    pub border_focused: Color,

    // Text colors
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    // Accent colors
    pub cyan: Color,
    pub blue: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    pub purple: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

impl Theme {
    /// Preset by config name; unknown names fall back to the default
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "nord" => Self::nord(),
            "catppuccin-mocha" | "catppuccin" | "" => Self::catppuccin_mocha(),
            other => {
                tracing::warn!("Unknown theme '{}', using catppuccin-mocha", other);
                Self::catppuccin_mocha()
            }
        }
    }

    /// Catppuccin Mocha theme (default)
    pub fn catppuccin_mocha() -> Self {
        Self {
            bg_main: Color::Rgb(30, 30, 46),
            bg_dark: Color::Rgb(24, 24, 37),
            bg_highlight: Color::Rgb(49, 50, 68),

            border: Color::Rgb(69, 71, 90),
            border_focused: Color::Rgb(137, 180, 250),

            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(166, 173, 200),
            text_muted: Color::Rgb(108, 112, 134),

            cyan: Color::Rgb(148, 226, 213),
            blue: Color::Rgb(137, 180, 250),
            green: Color::Rgb(166, 227, 161),
            yellow: Color::Rgb(249, 226, 175),
            red: Color::Rgb(243, 139, 168),
            purple: Color::Rgb(203, 166, 247),
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            bg_main: Color::Rgb(46, 52, 64),
            bg_dark: Color::Rgb(40, 44, 52),
            bg_highlight: Color::Rgb(59, 66, 82),

            border: Color::Rgb(76, 86, 106),
            border_focused: Color::Rgb(136, 192, 208),

            text_primary: Color::Rgb(236, 239, 244),
            text_secondary: Color::Rgb(216, 222, 233),
            text_muted: Color::Rgb(129, 161, 193),

            cyan: Color::Rgb(143, 188, 187),
            blue: Color::Rgb(129, 161, 193),
            green: Color::Rgb(163, 190, 140),
            yellow: Color::Rgb(235, 203, 139),
            red: Color::Rgb(191, 97, 106),
            purple: Color::Rgb(180, 142, 173),
        }
    }

    pub fn block_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.bg_highlight)
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.red)
    }
}
