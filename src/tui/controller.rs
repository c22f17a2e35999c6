//! TUI Controller - Orchestrates AppService and TuiRenderer
//!
//! The controller owns the state, the service that runs effects and the
//! renderer, and moves Commands and AppEvents between them.

use anyhow::Result;
use ratatui::backend::Backend;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::ui_backend::{AppEvent, AppService, AppState, Command, UiRenderer};

use super::renderer::TuiRenderer;

/// TUI Controller
///
/// Main loop:
/// 1. Render the current state
/// 2. Wait up to one tick for input and apply the resulting command
/// 3. Apply every request result that has arrived
/// 4. Stop once the state asks to quit
pub struct TuiController<B: Backend> {
    state: AppState,
    service: AppService,
    renderer: TuiRenderer<B>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
}

impl<B: Backend> TuiController<B> {
    pub fn new(
        state: AppState,
        service: AppService,
        renderer: TuiRenderer<B>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        tick_rate: Duration,
    ) -> Self {
        Self {
            state,
            service,
            renderer,
            event_rx,
            tick_rate,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let effects = self.state.start();
        self.service.run_all(effects)?;

        loop {
            self.renderer.render(&self.state)?;

            if let Some(command) = self.renderer.poll_command(&self.state, self.tick_rate)? {
                self.handle_command(command)?;
            }

            self.poll_events()?;

            if self.state.should_quit {
                break;
            }

            // let spawned requests make progress between input polls
            tokio::task::yield_now().await;
        }

        tracing::info!("Dashboard closed");
        Ok(())
    }

    fn handle_command(&mut self, command: Command) -> Result<()> {
        tracing::trace!("Command: {:?}", command);
        let effects = self.state.handle_command(command);
        self.service.run_all(effects)
    }

    /// Apply every event that is ready without waiting
    fn poll_events(&mut self) -> Result<()> {
        while let Ok(event) = self.event_rx.try_recv() {
            let effects = self.state.apply(event);
            self.service.run_all(effects)?;
        }
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn renderer(&self) -> &TuiRenderer<B> {
        &self.renderer
    }
}
