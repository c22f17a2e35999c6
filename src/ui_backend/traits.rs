//! UI Renderer Trait

use anyhow::Result;

use super::commands::Command;
use super::state::AppState;

/// Interface a dashboard frontend implements
pub trait UiRenderer {
    /// Draw the current state
    fn render(&mut self, state: &AppState) -> Result<()>;

    /// Wait up to `timeout` for user input and translate it into a command
    fn poll_command(&mut self, state: &AppState, timeout: std::time::Duration)
        -> Result<Option<Command>>;

    /// Current (width, height)
    fn get_size(&self) -> (u16, u16);
}
