//! REST client against the in-process fake server

mod common;

use std::time::Duration;

use common::{Backend, PASSWORD, TOKEN};
use fulcrum_dash::api::{
    AccountPatch, ApiError, ChatRequest, CoderConnect, FulcrumClient, NewAccount, ProjectDraft,
    ProjectPatch, RegisterRequest,
};

fn client(url: &str, token: Option<&str>) -> FulcrumClient {
    FulcrumClient::new(url, Duration::from_secs(5))
        .unwrap()
        .with_token(token.map(str::to_string))
}

#[tokio::test]
async fn test_login_returns_token() {
    let server = common::spawn(Backend::new()).await;
    let token = client(&server.url, None)
        .login("me@example.com", PASSWORD)
        .await
        .unwrap();
    assert_eq!(token.access_token, TOKEN);
}

#[tokio::test]
async fn test_wrong_password_is_not_a_session_expiry() {
    let server = common::spawn(Backend::new()).await;
    let err = client(&server.url, None)
        .login("me@example.com", "nope")
        .await
        .unwrap_err();
    assert!(!err.is_unauthorized());
    assert_eq!(err.to_string(), "Incorrect email or password");
}

#[tokio::test]
async fn test_register_error_detail() {
    let server = common::spawn(Backend::new()).await;
    let err = client(&server.url, None)
        .register(&RegisterRequest {
            email: "taken@example.com".into(),
            password: "pw".into(),
            full_name: None,
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Application {
            status: 400,
            detail: "Email already registered".into()
        }
    );
}

#[tokio::test]
async fn test_missing_token_fails_before_sending() {
    let server = common::spawn(Backend::new()).await;
    let err = client(&server.url, None).overview().await.unwrap_err();
    assert_eq!(err, ApiError::MissingToken);
}

#[tokio::test]
async fn test_revoked_token_is_unauthorized() {
    let mut backend = Backend::new();
    backend.revoked = true;
    let server = common::spawn(backend).await;
    let err = client(&server.url, Some(TOKEN)).list_projects().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let url = common::closed_port_url().await;
    let err = client(&url, Some(TOKEN)).overview().await.unwrap_err();
    assert!(err.is_network(), "got {:?}", err);
}

#[tokio::test]
async fn test_project_create_and_patch() {
    let server = common::spawn(Backend::new()).await;
    let api = client(&server.url, Some(TOKEN));

    let mut draft = ProjectDraft::new("Fulcrum");
    draft.description = Some("dashboard".into());
    let created = api.create_project(&draft).await.unwrap();
    assert_eq!(created.name, "Fulcrum");
    assert_eq!(created.source_type.as_deref(), Some("local"));

    let patch = ProjectPatch {
        workspace_path: Some("/home/coder/fulcrum".into()),
        ..Default::default()
    };
    let updated = api.update_project(&created.id, &patch).await.unwrap();
    assert_eq!(updated.workspace_path.as_deref(), Some("/home/coder/fulcrum"));
    assert_eq!(updated.description.as_deref(), Some("dashboard"));

    let overview = api.overview().await.unwrap();
    assert_eq!(overview.project_count, 1);
    assert!(overview.has_llm());
}

#[tokio::test]
async fn test_account_lifecycle() {
    let server = common::spawn(Backend::new()).await;
    let api = client(&server.url, Some(TOKEN));

    let account = api
        .create_account(&NewAccount::from_form("openai", "Work", "sk-1", "", false))
        .await
        .unwrap();
    assert_eq!(account.display_name(), "Work");
    assert_eq!(account.endpoint_label(), "https://api.openai.com/v1");

    let renamed = api
        .update_account(&account.id, &AccountPatch::rename(""))
        .await
        .unwrap();
    assert_eq!(renamed.name, None);
    assert_eq!(renamed.display_name(), "OPENAI");

    assert_eq!(
        api.account_models(&account.id).await.unwrap(),
        vec!["gpt-4", "gpt-4o"]
    );

    api.delete_account(&account.id).await.unwrap();
    assert!(api.list_accounts().await.unwrap().is_empty());
    let err = api.delete_account(&account.id).await.unwrap_err();
    assert_eq!(err.detail(), "Account not found");
}

#[tokio::test]
async fn test_chat_models_follow_allow_list() {
    let server = common::spawn(Backend::new().with_account("a1", "openai", &["gpt-4", "gpt-4o"])).await;
    let api = client(&server.url, Some(TOKEN));

    assert_eq!(api.chat_models("a1").await.unwrap(), vec!["gpt-4", "gpt-4o"]);

    let patch = AccountPatch {
        enabled_models: Some(vec!["gpt-4o".into()]),
        ..Default::default()
    };
    api.update_account("a1", &patch).await.unwrap();
    assert_eq!(api.chat_models("a1").await.unwrap(), vec!["gpt-4o"]);
}

#[tokio::test]
async fn test_chat_sends_preference() {
    let server = common::spawn(Backend::new()).await;
    let api = client(&server.url, Some(TOKEN));

    let reply = api
        .chat(&ChatRequest {
            message: "status?".into(),
            account_id: Some("a1".into()),
            model_name: Some("gpt-4o".into()),
        })
        .await
        .unwrap();
    assert_eq!(reply.response, "echo: status?");
    assert_eq!(reply.model_used.as_deref(), Some("gpt-4o"));

    let sent = server.backend().chat_requests[0].clone();
    assert_eq!(sent["account_id"], "a1");
    assert_eq!(sent["model_name"], "gpt-4o");
}

#[tokio::test]
async fn test_github_and_coder_integrations() {
    let mut backend = Backend::new();
    backend.github_connected = true;
    let server = common::spawn(backend).await;
    let api = client(&server.url, Some(TOKEN));

    let status = api.github_status().await.unwrap();
    assert!(status.connected);
    assert_eq!(status.username.as_deref(), Some("octo"));
    let repos = api.github_repos().await.unwrap();
    assert_eq!(repos[0].full_name.as_deref(), Some("octo/fulcrum"));
    assert!(api.github_login().await.unwrap().url.contains("github.com"));

    let request = CoderConnect {
        name: Some("lab".into()),
        url: "https://coder.example.com".into(),
        token: "tok".into(),
    };
    api.coder_connect(&request).await.unwrap();
    let accounts = api.coder_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].display_name(), "lab");

    let bad = CoderConnect {
        token: "bad".into(),
        ..request
    };
    assert_eq!(
        api.coder_exchange(&bad).await.unwrap_err().detail(),
        "Invalid Coder token"
    );

    api.coder_delete_account(&accounts[0].id).await.unwrap();
    assert!(api.coder_accounts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stopped_workspace_is_conflict() {
    let mut backend = Backend::new();
    backend.workspace_running = false;
    let server = common::spawn(backend).await;
    let err = client(&server.url, Some(TOKEN))
        .coder_workspace_files("c1", "w1", None, "/")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.detail(), "Workspace is not running. Start it and try again.");
}
