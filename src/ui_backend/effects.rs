//! Side effects requested by the state reducer
//!
//! `AppState` never performs I/O. It returns effects and `AppService` runs
//! them: network calls as tokio tasks, storage writes inline.

use crate::api::{
    AccountPatch, ChatRequest, CoderConnect, NewAccount, ProjectDraft, ProjectPatch,
    ProviderModelsRequest, RegisterRequest,
};
use crate::core::{PmPreference, RequestSlot, RequestToken, StartLocation, WorkspaceTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read request whose response populates one UI slot
    Fetch { token: RequestToken, fetch: Fetch },
    /// Write request; the response is always applied
    Mutate(Mutation),
    SaveToken(String),
    /// Drop the token and abort every in-flight request
    ClearToken,
    SavePmPreference(PmPreference),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    Overview,
    Projects,
    Accounts,
    /// Accounts for the PM settings modal
    PmAccounts,
    /// Chat models of the account picked in the PM settings modal
    PmModels { account_id: String },
    /// Provider models for the allow-list editor
    AccountModels { account_id: String },
    ProviderModels(ProviderModelsRequest),
    Chat(ChatRequest),
    /// GitHub status, plus repositories when connected
    Github,
    CoderAccounts,
    Workspaces { account_id: String },
    Folders {
        target: WorkspaceTarget,
        start: StartLocation,
    },
}

impl Fetch {
    /// UI slot the response populates
    pub fn slot(&self) -> RequestSlot {
        match self {
            Fetch::Overview => RequestSlot::Overview,
            Fetch::Projects => RequestSlot::Projects,
            Fetch::Accounts => RequestSlot::Accounts,
            Fetch::PmAccounts => RequestSlot::PmAccounts,
            Fetch::PmModels { .. } => RequestSlot::PmModels,
            Fetch::AccountModels { .. } => RequestSlot::AccountModels,
            Fetch::ProviderModels(_) => RequestSlot::ProviderModels,
            Fetch::Chat(_) => RequestSlot::Chat,
            Fetch::Github => RequestSlot::Github,
            Fetch::CoderAccounts => RequestSlot::CoderAccounts,
            Fetch::Workspaces { .. } => RequestSlot::Workspaces,
            Fetch::Folders { .. } => RequestSlot::Browser,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Login { email: String, password: String },
    Register(RegisterRequest),
    CreateProject(ProjectDraft),
    UpdateProject { id: String, patch: ProjectPatch },
    CreateAccount(NewAccount),
    UpdateAccount { id: String, patch: AccountPatch },
    DeleteAccount { id: String },
    GithubLogin,
    CoderConnect { request: CoderConnect, exchange: bool },
    CoderOAuthLogin,
    DeleteCoderAccount { id: String },
}

impl Mutation {
    /// Short label for logs and the status bar
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::Login { .. } => "sign in",
            Mutation::Register(_) => "register",
            Mutation::CreateProject(_) => "create project",
            Mutation::UpdateProject { .. } => "update project",
            Mutation::CreateAccount(_) => "create account",
            Mutation::UpdateAccount { .. } => "update account",
            Mutation::DeleteAccount { .. } => "delete account",
            Mutation::GithubLogin => "connect GitHub",
            Mutation::CoderConnect { .. } => "connect Coder",
            Mutation::CoderOAuthLogin => "Coder OAuth",
            Mutation::DeleteCoderAccount { .. } => "delete Coder account",
        }
    }
}
