//! In-process stand-in for the Fulcrum server used by integration tests

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";

/// Server-side data the handlers read and mutate
#[derive(Debug, Default)]
pub struct Backend {
    pub projects: Vec<Value>,
    pub accounts: Vec<Value>,
    /// Models each provider account offers, by account id
    pub provider_models: HashMap<String, Vec<String>>,
    pub llm_status: String,
    pub chat_requests: Vec<Value>,
    pub github_connected: bool,
    pub coder_accounts: Vec<Value>,
    pub workspaces: Vec<Value>,
    /// Folder names by absolute path inside the workspace
    pub folders: HashMap<String, Vec<String>>,
    pub workspace_running: bool,
    /// Every authenticated request answers 401
    pub revoked: bool,
    next_id: usize,
}

impl Backend {
    pub fn new() -> Self {
        Self {
            llm_status: "Using user credentials".to_string(),
            workspace_running: true,
            ..Default::default()
        }
    }

    pub fn with_folder(mut self, path: &str, names: &[&str]) -> Self {
        self.folders.insert(
            path.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn with_account(mut self, id: &str, provider: &str, models: &[&str]) -> Self {
        self.accounts.push(json!({
            "id": id,
            "provider": provider,
            "name": null,
            "api_endpoint": "https://api.openai.com/v1",
            "model_name": null,
            "enabled_models": null,
            "is_global": false,
        }));
        self.provider_models
            .insert(id.to_string(), models.iter().map(|m| m.to_string()).collect());
        self
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn allowed_models(&self, account_id: &str) -> Option<Vec<String>> {
        let account = self.accounts.iter().find(|a| a["id"] == account_id)?;
        let available = self.provider_models.get(account_id).cloned().unwrap_or_default();
        let enabled: Vec<String> = account["enabled_models"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        if enabled.is_empty() || enabled.iter().any(|m| m == "*") {
            Some(available)
        } else {
            Some(available.into_iter().filter(|m| enabled.contains(m)).collect())
        }
    }
}

pub type Shared = Arc<Mutex<Backend>>;

pub struct FakeServer {
    pub url: String,
    pub backend: Shared,
}

impl FakeServer {
    pub fn backend(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.backend.lock().unwrap()
    }
}

/// Bind on an ephemeral port and serve in the current runtime
pub async fn spawn(backend: Backend) -> FakeServer {
    let backend = Arc::new(Mutex::new(backend));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(backend.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    FakeServer {
        url: format!("http://{}", addr),
        backend,
    }
}

/// Address of a port nothing listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn authorize(headers: &HeaderMap, backend: &Backend) -> Result<(), Response> {
    let expected = format!("Bearer {}", TOKEN);
    let sent = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if backend.revoked || sent != expected {
        return Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"));
    }
    Ok(())
}

macro_rules! authed {
    ($state:expr, $headers:expr) => {{
        let guard = $state.lock().unwrap();
        if let Err(response) = authorize(&$headers, &guard) {
            return response;
        }
        guard
    }};
}

pub fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/projects/overview", get(overview))
        .route("/projects/", get(list_projects).post(create_project))
        .route("/projects/:id", patch(update_project))
        .route("/accounts/", get(list_accounts))
        .route("/accounts/llm", post(create_account))
        .route("/accounts/llm/models", post(probe_models))
        .route("/accounts/:id", patch(update_account).delete(delete_account))
        .route("/accounts/:id/models", get(account_models))
        .route("/chat/models/:id", get(chat_models))
        .route("/chat/pm", post(chat))
        .route("/integrations/github/status", get(github_status))
        .route("/integrations/github/login", get(github_login))
        .route("/integrations/github/repos", get(github_repos))
        .route("/integrations/coder/accounts", get(coder_accounts))
        .route("/integrations/coder/accounts/:id", delete(coder_delete))
        .route("/integrations/coder/connect", post(coder_connect))
        .route("/integrations/coder/exchange", post(coder_connect))
        .route("/integrations/coder/oauth/login", post(coder_oauth))
        .route("/integrations/coder/workspaces", get(coder_workspaces))
        .route("/integrations/coder/workspaces/files", get(workspace_files))
        .with_state(state)
}

async fn login(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("password").map(String::as_str) == Some(PASSWORD) {
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect email or password")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"].as_str() == Some("taken@example.com") {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
}

async fn overview(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = authed!(state, headers);
    Json(json!({
        "llm_status": backend.llm_status,
        "project_count": backend.projects.len(),
        "projects": backend.projects,
    }))
    .into_response()
}

async fn list_projects(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = authed!(state, headers);
    Json(json!(backend.projects)).into_response()
}

async fn create_project(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = authed!(state, headers);
    let mut project = body;
    project["id"] = json!(backend.next_id("project"));
    backend.projects.push(project.clone());
    Json(project).into_response()
}

async fn update_project(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = authed!(state, headers);
    let Some(project) = backend.projects.iter_mut().find(|p| p["id"] == id.as_str()) else {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    };
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            project[key] = value.clone();
        }
    }
    Json(project.clone()).into_response()
}

async fn list_accounts(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = authed!(state, headers);
    Json(json!(backend.accounts)).into_response()
}

async fn create_account(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = authed!(state, headers);
    let mut account = body;
    let id = backend.next_id("account");
    account["id"] = json!(id);
    if let Some(map) = account.as_object_mut() {
        map.remove("api_key");
    }
    backend.accounts.push(account.clone());
    backend
        .provider_models
        .insert(id, vec!["gpt-4".to_string(), "gpt-4o".to_string()]);
    Json(account).into_response()
}

async fn update_account(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = authed!(state, headers);
    let Some(account) = backend.accounts.iter_mut().find(|a| a["id"] == id.as_str()) else {
        return detail(StatusCode::NOT_FOUND, "Account not found");
    };
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            account[key] = value.clone();
        }
    }
    Json(account.clone()).into_response()
}

async fn delete_account(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut backend = authed!(state, headers);
    let before = backend.accounts.len();
    backend.accounts.retain(|a| a["id"] != id.as_str());
    if backend.accounts.len() == before {
        return detail(StatusCode::NOT_FOUND, "Account not found");
    }
    Json(json!({ "ok": true })).into_response()
}

async fn account_models(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let backend = authed!(state, headers);
    match backend.provider_models.get(&id) {
        Some(models) => Json(json!({ "models": models })).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Account not found"),
    }
}

async fn probe_models(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let _backend = authed!(state, headers);
    if body["api_key"].is_null() && body["provider"] == "openai" {
        return detail(StatusCode::BAD_REQUEST, "API key required");
    }
    Json(json!({ "models": ["gpt-4", "gpt-4o", "gpt-4o-mini"] })).into_response()
}

async fn chat_models(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let backend = authed!(state, headers);
    match backend.allowed_models(&id) {
        Some(models) => Json(json!({ "models": models })).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Account not found"),
    }
}

async fn chat(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut backend = authed!(state, headers);
    backend.chat_requests.push(body.clone());
    let model = body["model_name"].as_str().unwrap_or("gpt-4").to_string();
    Json(json!({
        "response": format!("echo: {}", body["message"].as_str().unwrap_or_default()),
        "model_used": model,
    }))
    .into_response()
}

async fn github_status(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = authed!(state, headers);
    Json(json!({
        "connected": backend.github_connected,
        "configured": true,
        "username": if backend.github_connected { json!("octo") } else { json!(null) },
    }))
    .into_response()
}

async fn github_login(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let _backend = authed!(state, headers);
    Json(json!({ "url": "https://github.com/login/oauth/authorize?client_id=x" })).into_response()
}

async fn github_repos(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let _backend = authed!(state, headers);
    Json(json!({ "repos": [{ "id": 1, "full_name": "octo/fulcrum", "description": null }] }))
        .into_response()
}

async fn coder_accounts(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let backend = authed!(state, headers);
    Json(json!({ "accounts": backend.coder_accounts })).into_response()
}

async fn coder_connect(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = authed!(state, headers);
    if body["token"].as_str() == Some("bad") {
        return detail(StatusCode::BAD_REQUEST, "Invalid Coder token");
    }
    let id = backend.next_id("coder");
    backend.coder_accounts.push(json!({
        "id": id,
        "name": body["name"],
        "api_endpoint": body["url"],
    }));
    Json(json!({ "ok": true })).into_response()
}

async fn coder_oauth(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let _backend = authed!(state, headers);
    Json(json!({ "url": "https://coder.example.com/oauth2/authorize" })).into_response()
}

async fn coder_delete(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut backend = authed!(state, headers);
    backend.coder_accounts.retain(|a| a["id"] != id.as_str());
    Json(json!({ "ok": true })).into_response()
}

async fn coder_workspaces(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let backend = authed!(state, headers);
    if query.get("account_id").map_or(true, String::is_empty) {
        return detail(StatusCode::BAD_REQUEST, "account_id is required");
    }
    Json(json!({ "workspaces": backend.workspaces })).into_response()
}

async fn workspace_files(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let backend = authed!(state, headers);
    if !backend.workspace_running {
        return detail(
            StatusCode::CONFLICT,
            "Workspace is not running. Start it and try again.",
        );
    }
    let path = query.get("path").cloned().unwrap_or_else(|| "/".to_string());
    match backend.folders.get(&path) {
        Some(names) => {
            let folders: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
            Json(json!({ "path": path, "folders": folders })).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "No such directory"),
    }
}
