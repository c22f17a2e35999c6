//! HTTP client for the Fulcrum REST API

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::error::ApiError;
use super::types::*;

/// Thin typed wrapper over `reqwest` for every endpoint the dashboard uses
#[derive(Debug, Clone)]
pub struct FulcrumClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl FulcrumClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = parse_base_url(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", base_url, e))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fulcrum-dash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        join_base_url(&self.base_url, path)
            .map_err(|e| ApiError::Network(format!("Invalid request path '{}': {}", path, e)))
    }

    /// Request without credentials (login, register)
    fn public(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.http.request(method, self.url(path)?))
    }

    /// Request carrying the bearer token
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
        Ok(self.http.request(method, self.url(path)?).bearer_auth(token))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
        builder.send().await.map_err(ApiError::from_network_error)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ApiError::from_network_error)?;
        if !status.is_success() {
            tracing::debug!("HTTP {} body: {}", status, body);
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!("GET {}", path);
        Self::decode(Self::send(self.authed(Method::GET, path)?).await?).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!("{} {}", method, path);
        Self::decode(Self::send(self.authed(method, path)?.json(body)).await?).await
    }

    // ========== Auth ==========

    /// `POST /auth/login` with a form-encoded body; a 401 here is a wrong
    /// password, not an expired session, so it is reported as an application error
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let form = [("username", email), ("password", password)];
        let response = Self::send(self.public(Method::POST, "/auth/login")?.form(&form)).await?;
        Self::decode(response).await.map_err(demote_unauthorized)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse, ApiError> {
        let response =
            Self::send(self.public(Method::POST, "/auth/register")?.json(request)).await?;
        Self::decode(response).await.map_err(demote_unauthorized)
    }

    // ========== Projects ==========

    pub async fn overview(&self) -> Result<Overview, ApiError> {
        self.get("/projects/overview").await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get("/projects/").await
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.send_json(Method::POST, "/projects/", draft).await
    }

    pub async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project, ApiError> {
        self.send_json(Method::PATCH, &format!("/projects/{}", id), patch)
            .await
    }

    // ========== LLM accounts ==========

    pub async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.get("/accounts/").await
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<Account, ApiError> {
        self.send_json(Method::POST, "/accounts/llm", account).await
    }

    pub async fn update_account(&self, id: &str, patch: &AccountPatch) -> Result<Account, ApiError> {
        self.send_json(Method::PATCH, &format!("/accounts/{}", id), patch)
            .await
    }

    pub async fn delete_account(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.authed(Method::DELETE, &format!("/accounts/{}", id))?;
        let _: serde_json::Value = Self::decode(Self::send(builder).await?).await?;
        Ok(())
    }

    /// Models the provider behind a stored account offers
    pub async fn account_models(&self, id: &str) -> Result<Vec<String>, ApiError> {
        let list: ModelList = self.get(&format!("/accounts/{}/models", id)).await?;
        Ok(list.models)
    }

    /// Ask the server to list a provider's models before the account exists
    pub async fn probe_provider_models(
        &self,
        request: &ProviderModelsRequest,
    ) -> Result<Vec<String>, ApiError> {
        let list: ModelList = self
            .send_json(Method::POST, "/accounts/llm/models", request)
            .await?;
        Ok(list.models)
    }

    // ========== Chat ==========

    /// Models the chat assistant may use through an account (allow-list applied server-side)
    pub async fn chat_models(&self, account_id: &str) -> Result<Vec<String>, ApiError> {
        let list: ModelList = self.get(&format!("/chat/models/{}", account_id)).await?;
        Ok(list.models)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.send_json(Method::POST, "/chat/pm", request).await
    }

    // ========== GitHub ==========

    pub async fn github_status(&self) -> Result<GithubStatus, ApiError> {
        self.get("/integrations/github/status").await
    }

    pub async fn github_login(&self) -> Result<AuthorizeUrl, ApiError> {
        self.get("/integrations/github/login").await
    }

    pub async fn github_repos(&self) -> Result<Vec<GithubRepo>, ApiError> {
        let envelope: ReposEnvelope = self.get("/integrations/github/repos").await?;
        Ok(envelope.repos)
    }

    // ========== Coder ==========

    pub async fn coder_accounts(&self) -> Result<Vec<CoderAccount>, ApiError> {
        let envelope: CoderAccountsEnvelope = self.get("/integrations/coder/accounts").await?;
        Ok(envelope.accounts)
    }

    pub async fn coder_connect(&self, request: &CoderConnect) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .send_json(Method::POST, "/integrations/coder/connect", request)
            .await?;
        Ok(())
    }

    /// Trade a short-lived session token for a long-lived API token
    pub async fn coder_exchange(&self, request: &CoderConnect) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .send_json(Method::POST, "/integrations/coder/exchange", request)
            .await?;
        Ok(())
    }

    pub async fn coder_oauth_login(&self) -> Result<AuthorizeUrl, ApiError> {
        self.send_json(
            Method::POST,
            "/integrations/coder/oauth/login",
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn coder_delete_account(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.authed(
            Method::DELETE,
            &format!("/integrations/coder/accounts/{}", id),
        )?;
        let _: serde_json::Value = Self::decode(Self::send(builder).await?).await?;
        Ok(())
    }

    pub async fn coder_workspaces(&self, account_id: &str) -> Result<Vec<CoderWorkspace>, ApiError> {
        let builder = self
            .authed(Method::GET, "/integrations/coder/workspaces")?
            .query(&[("account_id", account_id)]);
        let envelope: WorkspacesEnvelope = Self::decode(Self::send(builder).await?).await?;
        Ok(envelope.workspaces)
    }

    pub async fn coder_workspace_files(
        &self,
        account_id: &str,
        workspace_id: &str,
        workspace_ref: Option<&str>,
        path: &str,
    ) -> Result<FolderListing, ApiError> {
        let mut query = vec![
            ("account_id", account_id),
            ("workspace_id", workspace_id),
            ("path", path),
        ];
        if let Some(reference) = workspace_ref.filter(|r| !r.is_empty()) {
            query.push(("workspace_ref", reference));
        }
        let builder = self
            .authed(Method::GET, "/integrations/coder/workspaces/files")?
            .query(&query);
        Self::decode(Self::send(builder).await?).await
    }
}

/// Parse a server URL so that joining keeps any path prefix (`/fulcrum`)
pub fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    // Url::join drops the last segment unless the base ends with '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve an absolute request path below `base` instead of the host root
pub fn join_base_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    base.join(path.trim_start_matches('/'))
}

fn demote_unauthorized(err: ApiError) -> ApiError {
    match err {
        ApiError::Unauthorized(detail) => ApiError::Application {
            status: 401,
            detail,
        },
        other => other,
    }
}
