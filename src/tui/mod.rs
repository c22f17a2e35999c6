//! Terminal dashboard
//!
//! ratatui/crossterm frontend over `ui_backend`. `run_dashboard` sets up the
//! terminal, runs the controller loop and restores the terminal on the way
//! out, including on error.

mod controller;
mod renderer;
pub mod theme;
pub mod widgets;

pub use controller::TuiController;
pub use renderer::{draw, key_to_command, TuiRenderer};
pub use theme::Theme;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::FulcrumClient;
use crate::config::Config;
use crate::storage::LocalStore;
use crate::ui_backend::{AppService, AppState};

/// Run the interactive dashboard until the user quits
pub async fn run_dashboard(config: &Config, store: LocalStore) -> Result<()> {
    if !crossterm::tty::IsTty::is_tty(&stdout()) {
        anyhow::bail!("The dashboard requires a real terminal (TTY).");
    }

    let client = FulcrumClient::new(
        &config.server.base_url,
        Duration::from_secs(config.server.timeout_secs),
    )?;
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let state = AppState::new(
        store.token().is_some(),
        store.pm_preference(),
        config.browser.clone(),
    );
    let service = AppService::new(client, store, event_tx);
    tracing::info!("Starting dashboard against {}", config.server.base_url);

    enable_raw_mode().context("Failed to enable terminal raw mode")?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let result = async {
        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).context("Failed to create terminal backend")?;
        let renderer = TuiRenderer::new(
            terminal,
            Theme::from_name(&config.tui.theme),
            config.server.base_url.clone(),
        );
        let mut controller = TuiController::new(
            state,
            service,
            renderer,
            event_rx,
            Duration::from_millis(config.tui.tick_rate_ms.max(10)),
        );
        controller.run().await
    }
    .await;

    disable_raw_mode().ok();
    execute!(stdout(), LeaveAlternateScreen, crossterm::cursor::Show).ok();
    result
}
