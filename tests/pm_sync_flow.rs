//! Chat assistant preference sync against the fake server and local storage

mod common;

use std::time::Duration;

use common::{Backend, TOKEN};
use fulcrum_dash::api::{AccountPatch, FulcrumClient, NewAccount};
use fulcrum_dash::core::models::ModelAllowList;
use fulcrum_dash::core::pm_sync::{
    self, load_pm_settings, ModelSelector, PmPreference,
};
use fulcrum_dash::LocalStore;
use tempfile::TempDir;

fn client(url: &str) -> FulcrumClient {
    FulcrumClient::new(url, Duration::from_secs(5))
        .unwrap()
        .with_token(Some(TOKEN.to_string()))
}

#[tokio::test]
async fn test_first_account_becomes_pm_account() {
    let server = common::spawn(Backend::new()).await;
    let api = client(&server.url);
    let dir = TempDir::new().unwrap();
    let mut store = LocalStore::open(dir.path().join("local_storage.json")).unwrap();

    let first = api
        .create_account(&NewAccount::from_form("openai", "", "sk-1", "", false))
        .await
        .unwrap();
    let pref = pm_sync::preference_for_new_account(&store.pm_preference(), &first).unwrap();
    store.set_pm_preference(&pref).unwrap();

    let second = api
        .create_account(&NewAccount::from_form("anthropic", "", "sk-2", "", false))
        .await
        .unwrap();
    assert!(pm_sync::preference_for_new_account(&store.pm_preference(), &second).is_none());

    let reopened = LocalStore::open(dir.path().join("local_storage.json")).unwrap();
    assert_eq!(
        reopened.pm_preference(),
        PmPreference::new(first.id.clone(), Some("gpt-4".to_string()))
    );
}

#[tokio::test]
async fn test_saved_preference_resolves_against_server() {
    let server =
        common::spawn(Backend::new().with_account("a1", "openai", &["gpt-4", "gpt-4o"])).await;
    let api = client(&server.url);
    let accounts = api.list_accounts().await.unwrap();

    let saved = PmPreference::new("a1", Some("gpt-4o".to_string()));
    let settings = load_pm_settings(&api, accounts.clone(), &saved).await.unwrap();
    assert_eq!(settings.account_id.as_deref(), Some("a1"));
    assert_eq!(settings.model.as_deref(), Some("gpt-4o"));
    assert_eq!(
        settings.selector,
        ModelSelector::Ready {
            models: vec!["gpt-4".into(), "gpt-4o".into()]
        }
    );

    // deleted account: nothing selected, no model request
    let stale = PmPreference::new("gone", Some("gpt-4o".to_string()));
    let settings = load_pm_settings(&api, accounts, &stale).await.unwrap();
    assert_eq!(settings.account_id, None);
    assert_eq!(settings.selector, ModelSelector::AwaitingAccount);
}

#[tokio::test]
async fn test_narrowed_allow_list_moves_pm_model() {
    let server =
        common::spawn(Backend::new().with_account("a1", "openai", &["gpt-4", "gpt-4o"])).await;
    let api = client(&server.url);
    let pref = PmPreference::new("a1", Some("gpt-4".to_string()));

    let patch = AccountPatch {
        enabled_models: Some(ModelAllowList::parse("gpt-4o").to_enabled()),
        ..Default::default()
    };
    let updated = api.update_account("a1", &patch).await.unwrap();
    let reconciled = pm_sync::reconcile_after_edit(&pref, &updated).unwrap();
    assert_eq!(reconciled.model.as_deref(), Some("gpt-4o"));

    let accounts = api.list_accounts().await.unwrap();
    let settings = load_pm_settings(&api, accounts, &pref).await.unwrap();
    // the saved model is no longer offered
    assert_eq!(settings.model, None);
    assert_eq!(settings.selector.models(), ["gpt-4o".to_string()]);
}

#[tokio::test]
async fn test_wildcard_allow_list_keeps_model() {
    let server =
        common::spawn(Backend::new().with_account("a1", "openai", &["gpt-4", "gpt-4o"])).await;
    let api = client(&server.url);
    let pref = PmPreference::new("a1", Some("gpt-4".to_string()));

    let patch = AccountPatch {
        enabled_models: Some(ModelAllowList::parse("*").to_enabled()),
        ..Default::default()
    };
    let updated = api.update_account("a1", &patch).await.unwrap();
    assert!(updated.allow_list().is_all());
    assert!(pm_sync::reconcile_after_edit(&pref, &updated).is_none());
    assert_eq!(api.chat_models("a1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_expired_session_surfaces_from_model_load() {
    let server =
        common::spawn(Backend::new().with_account("a1", "openai", &["gpt-4"])).await;
    let api = client(&server.url);
    let accounts = api.list_accounts().await.unwrap();
    server.backend().revoked = true;

    let saved = PmPreference::new("a1", None);
    let err = load_pm_settings(&api, accounts, &saved).await.unwrap_err();
    assert!(err.is_unauthorized());
}
