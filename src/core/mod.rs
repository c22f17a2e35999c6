//! Core domain logic
//!
//! UI-independent rules shared by the dashboard and the CLI: model
//! allow-lists, chat assistant preference sync, the workspace path browser
//! and request supersession.

pub mod models;
pub mod path_browser;
pub mod pm_sync;
pub mod requests;

pub use models::ModelAllowList;
pub use path_browser::{BrowseState, FolderSource, PathBrowser, StartLocation, WorkspaceTarget};
pub use pm_sync::{ModelSelector, ModelSource, PmPreference, PmSettings};
pub use requests::{RequestSlot, RequestToken, RequestTracker};
