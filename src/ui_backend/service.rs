//! Application Service - runs effects
//!
//! Owns the API client and local storage. Network effects run as tokio tasks
//! that report back through the event channel; starting a fetch on a slot
//! aborts the task still running there.

use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::api::FulcrumClient;
use crate::core::path_browser::{probe_candidates, FolderSource, StartLocation};
use crate::core::{RequestSlot, RequestToken};
use crate::storage::LocalStore;

use super::effects::{Effect, Fetch, Mutation};
use super::events::{AppEvent, GithubView, Loaded, Mutated};

pub struct AppService {
    client: FulcrumClient,
    store: LocalStore,
    /// Event channel for async updates to the UI
    event_tx: mpsc::UnboundedSender<AppEvent>,
    tasks: HashMap<RequestSlot, AbortHandle>,
    /// Mutations still running; aborted on sign-out
    mutations: Vec<AbortHandle>,
}

impl std::fmt::Debug for AppService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppService")
            .field("base_url", &self.client.base_url().as_str())
            .field("signed_in", &self.client.token().is_some())
            .field("store", &self.store.path())
            .field("in_flight", &(self.tasks.len() + self.mutations.len()))
            .finish()
    }
}

impl AppService {
    pub fn new(
        client: FulcrumClient,
        store: LocalStore,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let token = store.token().map(str::to_string);
        Self {
            client: client.with_token(token),
            store,
            event_tx,
            tasks: HashMap::new(),
            mutations: Vec::new(),
        }
    }

    pub fn client(&self) -> &FulcrumClient {
        &self.client
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Run one effect. Only storage failures are returned.
    pub fn run(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::Fetch { token, fetch } => self.spawn_fetch(token, fetch),
            Effect::Mutate(mutation) => self.spawn_mutation(mutation),
            Effect::SaveToken(token) => {
                self.store.set_token(&token)?;
                self.client.set_token(Some(token));
            }
            Effect::ClearToken => {
                self.abort_all();
                self.client.set_token(None);
                self.store.clear_token()?;
            }
            Effect::SavePmPreference(pref) => {
                tracing::debug!("Saving PM preference {:?}", pref);
                self.store.set_pm_preference(&pref)?;
            }
            Effect::Quit => self.abort_all(),
        }
        Ok(())
    }

    pub fn run_all(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            self.run(effect)?;
        }
        Ok(())
    }

    fn abort_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
        for handle in self.mutations.drain(..) {
            handle.abort();
        }
    }

    fn spawn_fetch(&mut self, token: RequestToken, fetch: Fetch) {
        if let Some(previous) = self.tasks.remove(&token.slot) {
            tracing::debug!("Aborting superseded {:?} request", token.slot);
            previous.abort();
        }
        self.tasks.retain(|_, handle| !handle.is_finished());

        let client = self.client.clone();
        let tx = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            let data = run_fetch(&client, fetch).await;
            tx.send(AppEvent::Loaded { token, data }).ok();
        });
        self.tasks.insert(token.slot, handle.abort_handle());
    }

    fn spawn_mutation(&mut self, mutation: Mutation) {
        tracing::debug!("Running {}", mutation.label());
        self.mutations.retain(|handle| !handle.is_finished());

        let client = self.client.clone();
        let tx = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            let result = run_mutation(&client, mutation).await;
            tx.send(AppEvent::Mutated(result)).ok();
        });
        self.mutations.push(handle.abort_handle());
    }
}

async fn run_fetch(client: &FulcrumClient, fetch: Fetch) -> Loaded {
    match fetch {
        Fetch::Overview => Loaded::Overview(client.overview().await),
        Fetch::Projects => Loaded::Projects(client.list_projects().await),
        Fetch::Accounts => Loaded::Accounts(client.list_accounts().await),
        Fetch::PmAccounts => Loaded::PmAccounts(client.list_accounts().await),
        Fetch::PmModels { account_id } => Loaded::PmModels(client.chat_models(&account_id).await),
        Fetch::AccountModels { account_id } => {
            Loaded::AccountModels(client.account_models(&account_id).await)
        }
        Fetch::ProviderModels(request) => {
            Loaded::ProviderModels(client.probe_provider_models(&request).await)
        }
        Fetch::Chat(request) => Loaded::Chat(client.chat(&request).await),
        Fetch::Github => Loaded::Github(load_github(client).await),
        Fetch::CoderAccounts => Loaded::CoderAccounts(client.coder_accounts().await),
        Fetch::Workspaces { account_id } => {
            Loaded::Workspaces(client.coder_workspaces(&account_id).await)
        }
        Fetch::Folders { target, start } => {
            let result = match start {
                StartLocation::Exact(path) => client.list_folders(&target, &path).await,
                StartLocation::Probe(candidates) => {
                    probe_candidates(client, &target, &candidates).await
                }
            };
            Loaded::Folders(result)
        }
    }
}

async fn load_github(client: &FulcrumClient) -> Result<GithubView, crate::api::ApiError> {
    let status = client.github_status().await?;
    let repos = if status.connected {
        client.github_repos().await?
    } else {
        Vec::new()
    };
    Ok(GithubView { status, repos })
}

async fn run_mutation(client: &FulcrumClient, mutation: Mutation) -> Mutated {
    match mutation {
        Mutation::Login { email, password } => {
            Mutated::SignedIn(client.login(&email, &password).await)
        }
        Mutation::Register(request) => Mutated::SignedIn(client.register(&request).await),
        Mutation::CreateProject(draft) => {
            Mutated::ProjectCreated(client.create_project(&draft).await)
        }
        Mutation::UpdateProject { id, patch } => {
            Mutated::ProjectUpdated(client.update_project(&id, &patch).await)
        }
        Mutation::CreateAccount(account) => {
            Mutated::AccountCreated(client.create_account(&account).await)
        }
        Mutation::UpdateAccount { id, patch } => {
            Mutated::AccountUpdated(client.update_account(&id, &patch).await)
        }
        Mutation::DeleteAccount { id } => {
            let result = client.delete_account(&id).await;
            Mutated::AccountDeleted { id, result }
        }
        Mutation::GithubLogin => Mutated::AuthorizeUrl {
            provider: "GitHub",
            result: client.github_login().await,
        },
        Mutation::CoderConnect { request, exchange } => {
            let result = if exchange {
                client.coder_exchange(&request).await
            } else {
                client.coder_connect(&request).await
            };
            Mutated::CoderConnected(result)
        }
        Mutation::CoderOAuthLogin => Mutated::AuthorizeUrl {
            provider: "Coder",
            result: client.coder_oauth_login().await,
        },
        Mutation::DeleteCoderAccount { id } => {
            Mutated::CoderAccountDeleted(client.coder_delete_account(&id).await)
        }
    }
}
