//! Wire types for the Fulcrum REST API
//!
//! These mirror the server's JSON. Most fields are optional because the server
//! grew them over several migrations and older rows return `null`.

use serde::{Deserialize, Serialize};

use crate::core::models::{self, ModelAllowList};

/// Overview status string the server uses when no LLM account is usable
pub const NO_LLM_STATUS: &str = "No LLM configured";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub source_type: Option<String>,
    pub remote_url: Option<String>,
    pub github_repo: Option<String>,
    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    pub workspace_path: Option<String>,
    pub workspace_ref: Option<String>,
    pub coder_account_id: Option<String>,
    pub production_url: Option<String>,
    pub testing_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl Project {
    /// First eight characters of the id, as shown on project cards
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    pub fn has_workspace(&self) -> bool {
        self.workspace_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Body for `POST /projects/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDraft {
    pub name: String,
    pub description: Option<String>,
    pub source_type: String,
    pub remote_url: Option<String>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            source_type: "local".to_string(),
            remote_url: None,
        }
    }
}

/// Body for `PATCH /projects/{id}`; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coder_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testing_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProjectPatch::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overview {
    pub llm_status: String,
    pub project_count: usize,
    pub projects: Vec<Project>,
}

impl Overview {
    /// Whether the chat assistant has an account to talk through
    pub fn has_llm(&self) -> bool {
        !self.llm_status.is_empty() && self.llm_status != NO_LLM_STATUS
    }
}

/// LLM provider credentials as returned by `/accounts/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub id: String,
    pub provider: String,
    pub name: Option<String>,
    #[serde(alias = "endpoint")]
    pub api_endpoint: Option<String>,
    pub model_name: Option<String>,
    pub enabled_models: Option<Vec<String>>,
    pub is_global: bool,
}

impl Account {
    /// Label shown in lists: the name, else the upper-cased provider
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.provider.to_uppercase(),
        }
    }

    pub fn endpoint_label(&self) -> &str {
        self.api_endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or("Default endpoint")
    }

    pub fn allow_list(&self) -> ModelAllowList {
        ModelAllowList::from_enabled(self.enabled_models.as_deref())
    }

    /// Model the assistant uses when nothing else is chosen, constrained to the allow-list
    pub fn default_model(&self) -> Option<String> {
        let preferred = self
            .model_name
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| models::provider_default_model(&self.provider));
        self.allow_list().default_model(Some(preferred))
    }
}

/// Body for `POST /accounts/llm`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    pub provider: String,
    pub name: Option<String>,
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_models: Option<Vec<String>>,
    pub is_global: bool,
}

impl NewAccount {
    /// Build a request the way the account form does: blank strings become
    /// null and the endpoint falls back to the provider default.
    pub fn from_form(
        provider: &str,
        name: &str,
        api_key: &str,
        endpoint: &str,
        is_global: bool,
    ) -> Self {
        let provider = provider.trim();
        let provider = if provider.is_empty() { "openai" } else { provider };
        Self {
            provider: provider.to_string(),
            name: non_empty(name),
            api_key: non_empty(api_key),
            api_endpoint: models::default_endpoint(provider, endpoint),
            model_name: None,
            enabled_models: None,
            is_global,
        }
    }
}

/// Body for `PATCH /accounts/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_models: Option<Vec<String>>,
}

impl AccountPatch {
    /// Rename; a blank name clears it so the provider label shows instead
    pub fn rename(name: &str) -> Self {
        Self {
            name: Some(non_empty(name)),
            ..Default::default()
        }
    }
}

/// Body for `POST /accounts/llm/models` (probe a provider before saving)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderModelsRequest {
    pub provider: String,
    pub api_key: Option<String>,
    pub api_endpoint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelList {
    pub models: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    pub response: String,
    pub model_used: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubStatus {
    pub connected: bool,
    pub configured: bool,
    pub username: Option<String>,
}

/// Authorization URL returned by the OAuth `login` endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeUrl {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubRepo {
    pub id: Option<u64>,
    pub full_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ReposEnvelope {
    pub repos: Vec<GithubRepo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoderAccount {
    pub id: String,
    pub name: Option<String>,
    pub api_endpoint: Option<String>,
}

impl CoderAccount {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.api_endpoint.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CoderAccountsEnvelope {
    pub accounts: Vec<CoderAccount>,
}

/// Body for `POST /integrations/coder/connect` and `/exchange`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoderConnect {
    pub name: Option<String>,
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoderWorkspace {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub owner_name: Option<String>,
    pub workspace_ref: Option<String>,
}

impl CoderWorkspace {
    pub fn display_name(&self) -> &str {
        self.workspace_ref
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WorkspacesEnvelope {
    pub workspaces: Vec<CoderWorkspace>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Folder {
    pub name: String,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderListing {
    pub path: String,
    pub folders: Vec<Folder>,
}

/// Trimmed value, or `None` when blank
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
