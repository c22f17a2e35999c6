//! UI Backend - state, commands and effects behind the dashboard
//!
//! ## Architecture
//!
//! - **Command**: user actions mapped from keybindings
//! - **AppState**: everything on screen; `handle_command` and `apply` are
//!   its only mutators and both return `Effect`s
//! - **AppService**: runs effects (HTTP as tokio tasks, local storage inline)
//! - **AppEvent**: request results flowing back over an mpsc channel
//! - **UiRenderer**: trait that frontends implement

mod commands;
mod effects;
mod events;
mod forms;
mod reducer;
mod service;
mod state;
mod traits;

pub use commands::Command;
pub use effects::{Effect, Fetch, Mutation};
pub use events::{AppEvent, GithubView, Loaded, Mutated};
pub use forms::{FormField, FormKind, FormState};
pub use service::AppService;
pub use state::{
    AppState, BrowserModal, ChatMessage, ChatRole, ChatState, ConfirmAction, IntegrationFocus,
    IntegrationsState, LoadState, Modal, ModelPickerModal, Panel, PmField, PmSettingsModal,
    Screen, NO_LLM_REPLY,
};
pub use traits::UiRenderer;
