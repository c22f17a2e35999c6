//! Dashboard widgets

pub mod form;
pub mod modal;
pub mod panels;
pub mod sidebar;
pub mod status_bar;

pub use form::FormWidget;
pub use modal::{centered_rect, ModalFrame};
pub use sidebar::NavSidebar;
pub use status_bar::StatusBar;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`
pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
