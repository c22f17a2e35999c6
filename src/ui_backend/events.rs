//! Application Events
//!
//! Results sent from spawned request tasks back to the event loop over an
//! unbounded mpsc channel.

use crate::api::{
    Account, ApiError, AuthorizeUrl, ChatReply, CoderAccount, CoderWorkspace, FolderListing,
    GithubRepo, GithubStatus, Overview, Project, TokenResponse,
};
use crate::core::RequestToken;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A read request finished; dropped unless `token` is still current
    Loaded { token: RequestToken, data: Loaded },
    /// A write request finished
    Mutated(Mutated),
}

/// GitHub panel payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GithubView {
    pub status: GithubStatus,
    pub repos: Vec<GithubRepo>,
}

#[derive(Debug, Clone)]
pub enum Loaded {
    Overview(Result<Overview, ApiError>),
    Projects(Result<Vec<Project>, ApiError>),
    Accounts(Result<Vec<Account>, ApiError>),
    PmAccounts(Result<Vec<Account>, ApiError>),
    PmModels(Result<Vec<String>, ApiError>),
    AccountModels(Result<Vec<String>, ApiError>),
    ProviderModels(Result<Vec<String>, ApiError>),
    Chat(Result<ChatReply, ApiError>),
    Github(Result<GithubView, ApiError>),
    CoderAccounts(Result<Vec<CoderAccount>, ApiError>),
    Workspaces(Result<Vec<CoderWorkspace>, ApiError>),
    Folders(Result<FolderListing, ApiError>),
}

impl Loaded {
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Loaded::Overview(r) => r.as_ref().err(),
            Loaded::Projects(r) => r.as_ref().err(),
            Loaded::Accounts(r) | Loaded::PmAccounts(r) => r.as_ref().err(),
            Loaded::PmModels(r) | Loaded::AccountModels(r) | Loaded::ProviderModels(r) => {
                r.as_ref().err()
            }
            Loaded::Chat(r) => r.as_ref().err(),
            Loaded::Github(r) => r.as_ref().err(),
            Loaded::CoderAccounts(r) => r.as_ref().err(),
            Loaded::Workspaces(r) => r.as_ref().err(),
            Loaded::Folders(r) => r.as_ref().err(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mutated {
    SignedIn(Result<TokenResponse, ApiError>),
    ProjectCreated(Result<Project, ApiError>),
    ProjectUpdated(Result<Project, ApiError>),
    AccountCreated(Result<Account, ApiError>),
    AccountUpdated(Result<Account, ApiError>),
    AccountDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    /// OAuth authorization URL for `provider` ("GitHub" or "Coder")
    AuthorizeUrl {
        provider: &'static str,
        result: Result<AuthorizeUrl, ApiError>,
    },
    CoderConnected(Result<(), ApiError>),
    CoderAccountDeleted(Result<(), ApiError>),
}

impl Mutated {
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Mutated::SignedIn(r) => r.as_ref().err(),
            Mutated::ProjectCreated(r) | Mutated::ProjectUpdated(r) => r.as_ref().err(),
            Mutated::AccountCreated(r) | Mutated::AccountUpdated(r) => r.as_ref().err(),
            Mutated::AccountDeleted { result, .. } => result.as_ref().err(),
            Mutated::AuthorizeUrl { result, .. } => result.as_ref().err(),
            Mutated::CoderConnected(r) | Mutated::CoderAccountDeleted(r) => r.as_ref().err(),
        }
    }
}
