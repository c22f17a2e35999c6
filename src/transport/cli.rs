//! CLI transport for direct terminal interaction
//!
//! One-shot subcommands over the same client and local storage the
//! dashboard uses. Results print as tables; failures surface as a non-zero
//! exit with the server's message.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

use crate::api::{
    Account, AccountPatch, ApiError, ChatRequest, CoderConnect, FulcrumClient, NewAccount,
    ProjectDraft, ProjectPatch, ProviderModelsRequest, RegisterRequest,
};
use crate::config::Config;
use crate::core::models::{self, ModelAllowList};
use crate::core::path_browser::{
    probe_candidates, starting_location, BrowseState, FolderSource, StartLocation, WorkspaceTarget,
};
use crate::core::pm_sync::{self, ModelSelector, PmPreference};
use crate::core::PathBrowser;
use crate::storage::LocalStore;
use crate::ui_backend::NO_LLM_REPLY;

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects
    List,
    /// Create a local project
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Git remote to clone from
        #[arg(long)]
        remote: Option<String>,
    },
    /// Change project fields; only the given ones are sent
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        github_repo: Option<String>,
        #[arg(long)]
        workspace_path: Option<String>,
        #[arg(long)]
        production_url: Option<String>,
        #[arg(long)]
        testing_url: Option<String>,
    },
    /// List folders in the project's Coder workspace
    Browse {
        id: String,
        /// Start here instead of the saved path
        #[arg(long)]
        path: Option<String>,
        /// Save the listed folder as the project's workspace path
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountsCommand {
    /// List AI accounts
    List,
    /// Add provider credentials
    Create {
        /// openai, anthropic, gemini, openrouter, ollama-local, ...
        provider: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        /// Defaults to the provider's public endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Share with every user
        #[arg(long)]
        global: bool,
    },
    /// Rename an account; an empty name clears it
    Rename { id: String, name: String },
    /// Models the provider offers, marked against the allow-list
    Models { id: String },
    /// Replace the allow-list and default model
    SetModels {
        id: String,
        /// Comma-separated model names, or `*` for all
        #[arg(long)]
        models: String,
        #[arg(long)]
        default: Option<String>,
    },
    /// Delete an account
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Ask a provider for its models before saving credentials
    Probe {
        provider: String,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PmCommand {
    /// Show the saved chat assistant account and model
    Show,
    /// Choose the account (and optionally model) the assistant uses
    Set {
        account_id: String,
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GithubCommand {
    Status,
    /// Print the authorization URL
    Connect,
    Repos,
}

#[derive(Subcommand, Debug)]
pub enum CoderCommand {
    /// List connected Coder deployments
    Accounts,
    /// Connect with an API token (or a session token with --session)
    Connect {
        url: String,
        token: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        session: bool,
    },
    /// Print the OAuth authorization URL
    Login,
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// List workspaces of an account (default: the first one)
    Workspaces { account_id: Option<String> },
    /// List folders in a workspace
    Browse {
        account_id: String,
        workspace_id: String,
        #[arg(long)]
        path: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write the default configuration file
    Init {
        #[arg(long)]
        force: bool,
    },
}

/// Client plus local storage for one CLI invocation
pub struct CliSession {
    pub config: Config,
    pub store: LocalStore,
    client: FulcrumClient,
}

impl CliSession {
    pub fn open(config: Config) -> Result<Self> {
        let store = LocalStore::open_default()?;
        let client = FulcrumClient::new(
            &config.server.base_url,
            Duration::from_secs(config.server.timeout_secs),
        )?
        .with_token(store.token().map(str::to_string));
        Ok(Self {
            config,
            store,
            client,
        })
    }

    pub fn client(&self) -> &FulcrumClient {
        &self.client
    }

    /// Turn an API result into an application error; a 401 also signs out
    fn check<T>(&mut self, result: Result<T, ApiError>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(ApiError::Unauthorized(_)) => {
                tracing::info!("Token rejected, clearing it");
                self.store.clear_token()?;
                self.client.set_token(None);
                anyhow::bail!("Session expired. Please sign in again with `fulcrum login`.")
            }
            Err(e) => Err(anyhow::anyhow!(e.to_string())),
        }
    }

    fn save_token(&mut self, token: &str) -> Result<()> {
        self.store.set_token(token)?;
        self.client.set_token(Some(token.to_string()));
        Ok(())
    }

    // ========== Auth ==========

    pub async fn login(&mut self, email: &str, password: Option<String>) -> Result<()> {
        let password = match password {
            Some(p) => p,
            None => prompt("Password: ")?,
        };
        let result = self.client.login(email, &password).await;
        let token = self.check(result)?;
        self.save_token(&token.access_token)?;
        println!("{} Signed in as {}", "✓".green(), email.bold());
        Ok(())
    }

    pub async fn register(
        &mut self,
        email: &str,
        password: Option<String>,
        full_name: Option<String>,
    ) -> Result<()> {
        let password = match password {
            Some(p) => p,
            None => prompt("Password: ")?,
        };
        let request = RegisterRequest {
            email: email.trim().to_string(),
            password,
            full_name: full_name.as_deref().and_then(crate::api::non_empty),
        };
        let result = self.client.register(&request).await;
        let token = self.check(result)?;
        self.save_token(&token.access_token)?;
        println!("{} Registered and signed in as {}", "✓".green(), email.bold());
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.store.clear_token()?;
        self.client.set_token(None);
        println!("{} Signed out", "✓".green());
        Ok(())
    }

    // ========== Projects ==========

    pub async fn overview(&mut self) -> Result<()> {
        let result = self.client.overview().await;
        let overview = self.check(result)?;
        let status = if overview.has_llm() {
            overview.llm_status.green()
        } else {
            overview.llm_status.yellow()
        };
        println!("{} {}", "LLM:".bold(), status);
        println!("{} {}", "Projects:".bold(), overview.project_count);
        for project in &overview.projects {
            println!("  • {} {}", project.name, format!("#{}", project.short_id()).dimmed());
        }
        Ok(())
    }

    pub async fn projects(&mut self, command: ProjectsCommand) -> Result<()> {
        match command {
            ProjectsCommand::List => {
                let result = self.client.list_projects().await;
                let projects = self.check(result)?;
                if projects.is_empty() {
                    println!("No projects yet. Create one with `fulcrum projects create <name>`.");
                    return Ok(());
                }

                #[derive(Tabled)]
                struct ProjectRow {
                    #[tabled(rename = "ID")]
                    id: String,
                    #[tabled(rename = "Name")]
                    name: String,
                    #[tabled(rename = "Source")]
                    source: String,
                    #[tabled(rename = "Workspace")]
                    workspace: String,
                    #[tabled(rename = "Path")]
                    path: String,
                }

                let rows = projects.iter().map(|p| ProjectRow {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    source: p.source_type.clone().unwrap_or_else(|| "local".to_string()),
                    workspace: p.workspace_name.clone().unwrap_or_default(),
                    path: p.workspace_path.clone().unwrap_or_default(),
                });
                print_table(rows);
            }
            ProjectsCommand::Create {
                name,
                description,
                remote,
            } => {
                let name = crate::api::non_empty(&name).context("Project name is required")?;
                let mut draft = ProjectDraft::new(name);
                draft.description = description.as_deref().and_then(crate::api::non_empty);
                draft.remote_url = remote.as_deref().and_then(crate::api::non_empty);
                let result = self.client.create_project(&draft).await;
                let project = self.check(result)?;
                println!("{} Created {} ({})", "✓".green(), project.name.bold(), project.id);
            }
            ProjectsCommand::Edit {
                id,
                name,
                description,
                github_repo,
                workspace_path,
                production_url,
                testing_url,
            } => {
                let patch = ProjectPatch {
                    name,
                    description,
                    github_repo,
                    workspace_path,
                    production_url,
                    testing_url,
                    ..Default::default()
                };
                if patch.is_empty() {
                    anyhow::bail!("Nothing to change. Pass at least one field option.");
                }
                let result = self.client.update_project(&id, &patch).await;
                let project = self.check(result)?;
                println!("{} Updated {}", "✓".green(), project.name.bold());
            }
            ProjectsCommand::Browse { id, path, save } => {
                self.browse_project(&id, path, save).await?;
            }
        }
        Ok(())
    }

    async fn browse_project(&mut self, id: &str, path: Option<String>, save: bool) -> Result<()> {
        let result = self.client.list_projects().await;
        let projects = self.check(result)?;
        let project = projects
            .into_iter()
            .find(|p| p.id == id)
            .with_context(|| format!("No project with id {}", id))?;

        let result = self.client.coder_accounts().await;
        let coder_accounts = self.check(result)?;
        let fallback = coder_accounts.first().map(|a| a.id.as_str());
        let home = self.config.browser.home_dir.clone();
        let target = WorkspaceTarget::for_project(&project, fallback, &home)
            .context("Project has no linked Coder workspace")?;

        let start = match path {
            Some(path) => StartLocation::Exact(path),
            None => starting_location(
                project.workspace_path.as_deref(),
                &self.config.browser.preferred_paths,
                &home,
            ),
        };
        let browser = self.browse(target, start).await?;

        if save {
            let patch = ProjectPatch {
                workspace_path: Some(browser.current_path.clone()),
                ..Default::default()
            };
            let result = self.client.update_project(id, &patch).await;
            self.check(result)?;
            println!(
                "{} Saved {} as the workspace path of {}",
                "✓".green(),
                browser.current_path.bold(),
                project.name
            );
        }
        Ok(())
    }

    /// List one location and print it. Fails unless a listing came back.
    async fn browse(&mut self, target: WorkspaceTarget, start: StartLocation) -> Result<PathBrowser> {
        let mut browser = PathBrowser::new(target);
        let result = match start {
            StartLocation::Exact(path) => {
                let path = browser.begin(&path);
                self.client.list_folders(&browser.target, &path).await
            }
            StartLocation::Probe(candidates) => {
                probe_candidates(&self.client, &browser.target, &candidates).await
            }
        };
        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.check::<()>(Err(e.clone()))?;
            }
        }
        browser.apply(result);

        match &browser.state {
            BrowseState::Listing(listing) => {
                println!("{}", listing.path.bold());
                if listing.folders.is_empty() {
                    println!("  {}", "(no subfolders)".dimmed());
                }
                for folder in &listing.folders {
                    println!("  {} {}", "▸".cyan(), browser.child_path(folder));
                }
                Ok(browser)
            }
            BrowseState::Unreachable { message, start_url } => {
                println!("{} {}", "Workspace is not reachable:".yellow().bold(), message);
                if let Some(url) = start_url {
                    println!("Start it at {}", url.underline());
                }
                anyhow::bail!("Workspace is not running")
            }
            BrowseState::Failed { message } => anyhow::bail!("{}", message),
            BrowseState::Idle | BrowseState::Loading { .. } => {
                anyhow::bail!("Folder listing did not complete")
            }
        }
    }

    // ========== Accounts ==========

    async fn find_account(&mut self, id: &str) -> Result<Account> {
        let result = self.client.list_accounts().await;
        let accounts = self.check(result)?;
        accounts
            .into_iter()
            .find(|a| a.id == id)
            .with_context(|| format!("No AI account with id {}", id))
    }

    fn save_pm_preference(&mut self, pref: &PmPreference) -> Result<()> {
        self.store.set_pm_preference(pref)
    }

    pub async fn accounts(&mut self, command: AccountsCommand) -> Result<()> {
        match command {
            AccountsCommand::List => {
                let result = self.client.list_accounts().await;
                let accounts = self.check(result)?;
                if accounts.is_empty() {
                    println!("No AI accounts. Add one with `fulcrum accounts create <provider>`.");
                    return Ok(());
                }
                let pm = self.store.pm_preference();

                #[derive(Tabled)]
                struct AccountRow {
                    #[tabled(rename = "ID")]
                    id: String,
                    #[tabled(rename = "Name")]
                    name: String,
                    #[tabled(rename = "Provider")]
                    provider: String,
                    #[tabled(rename = "Endpoint")]
                    endpoint: String,
                    #[tabled(rename = "Default model")]
                    model: String,
                    #[tabled(rename = "Allowed")]
                    allowed: String,
                    #[tabled(rename = "Global")]
                    global: String,
                    #[tabled(rename = "PM")]
                    pm: String,
                }

                let rows = accounts.iter().map(|a| AccountRow {
                    id: a.id.clone(),
                    name: a.display_name(),
                    provider: a.provider.clone(),
                    endpoint: a.endpoint_label().to_string(),
                    model: a.default_model().unwrap_or_default(),
                    allowed: a.allow_list().to_string(),
                    global: if a.is_global { "yes" } else { "" }.to_string(),
                    pm: if pm.account_id.as_deref() == Some(a.id.as_str()) {
                        "★".to_string()
                    } else {
                        String::new()
                    },
                });
                print_table(rows);
            }
            AccountsCommand::Create {
                provider,
                name,
                api_key,
                endpoint,
                global,
            } => {
                let request = NewAccount::from_form(
                    &provider,
                    name.as_deref().unwrap_or_default(),
                    api_key.as_deref().unwrap_or_default(),
                    endpoint.as_deref().unwrap_or_default(),
                    global,
                );
                let result = self.client.create_account(&request).await;
                let account = self.check(result)?;
                println!(
                    "{} Added {} ({})",
                    "✓".green(),
                    account.display_name().bold(),
                    account.id
                );
                let existing = self.store.pm_preference();
                if let Some(pref) = pm_sync::preference_for_new_account(&existing, &account) {
                    self.save_pm_preference(&pref)?;
                    println!("  PM assistant now uses {}", account.display_name());
                }
            }
            AccountsCommand::Rename { id, name } => {
                let result = self.client.update_account(&id, &AccountPatch::rename(&name)).await;
                let account = self.check(result)?;
                println!("{} Renamed to {}", "✓".green(), account.display_name().bold());
            }
            AccountsCommand::Models { id } => {
                let account = self.find_account(&id).await?;
                let result = self.client.account_models(&id).await;
                let available = self.check(result)?;
                let allow = account.allow_list();
                let default = account.default_model();
                println!(
                    "{} {}  {}",
                    account.display_name().bold(),
                    format!("({})", allow).dimmed(),
                    format!("default: {}", default.as_deref().unwrap_or("-")).dimmed()
                );
                if available.is_empty() {
                    println!("  {}", "The provider reported no models".dimmed());
                }
                for model in &available {
                    let mark = if allow.permits(model) {
                        "[x]".green()
                    } else {
                        "[ ]".normal()
                    };
                    let star = if default.as_deref() == Some(model.as_str()) {
                        " ★"
                    } else {
                        ""
                    };
                    println!("  {} {}{}", mark, model, star);
                }
            }
            AccountsCommand::SetModels {
                id,
                models,
                default,
            } => {
                let allow = ModelAllowList::parse(&models);
                if let ModelAllowList::Only(list) = &allow {
                    if list.is_empty() {
                        anyhow::bail!("Select at least one model, or pass `*` to allow all");
                    }
                }
                let account = self.find_account(&id).await?;
                let preferred = default.or(account.model_name.clone());
                let patch = AccountPatch {
                    enabled_models: Some(allow.to_enabled()),
                    model_name: allow.default_model(preferred.as_deref()),
                    ..Default::default()
                };
                let result = self.client.update_account(&id, &patch).await;
                let account = self.check(result)?;
                println!(
                    "{} {} now allows {}",
                    "✓".green(),
                    account.display_name().bold(),
                    account.allow_list()
                );
                let pref = self.store.pm_preference();
                if let Some(pref) = pm_sync::reconcile_after_edit(&pref, &account) {
                    self.save_pm_preference(&pref)?;
                    println!(
                        "  PM model switched to {}",
                        pref.model.as_deref().unwrap_or("default")
                    );
                }
            }
            AccountsCommand::Delete { id, yes } => {
                if !yes && !confirm(&format!("Delete AI account {}?", id))? {
                    println!("Cancelled");
                    return Ok(());
                }
                let result = self.client.delete_account(&id).await;
                self.check(result)?;
                println!("{} Deleted {}", "✓".green(), id);
            }
            AccountsCommand::Probe {
                provider,
                api_key,
                endpoint,
            } => {
                let request = ProviderModelsRequest {
                    provider: provider.trim().to_string(),
                    api_key: api_key.as_deref().and_then(crate::api::non_empty),
                    api_endpoint: models::default_endpoint(
                        provider.trim(),
                        endpoint.as_deref().unwrap_or_default(),
                    ),
                };
                let result = self.client.probe_provider_models(&request).await;
                let found = self.check(result)?;
                if found.is_empty() {
                    println!("No models found at {}", request.api_endpoint);
                }
                for model in found {
                    println!("{}", model);
                }
            }
        }
        Ok(())
    }

    // ========== PM assistant ==========

    pub async fn pm(&mut self, command: PmCommand) -> Result<()> {
        match command {
            PmCommand::Show => {
                let result = self.client.list_accounts().await;
                let accounts = self.check(result)?;
                let saved = self.store.pm_preference();
                let result = pm_sync::load_pm_settings(&self.client, accounts, &saved).await;
                let settings = self.check(result)?;

                match settings.selected_account() {
                    Some(account) => {
                        println!("{} {}", "Account:".bold(), account.display_name());
                        let model = settings.model.as_deref().unwrap_or("default");
                        println!("{} {}", "Model:".bold(), model);
                    }
                    None => println!("PM assistant is not configured. Use `fulcrum pm set`."),
                }
                if let ModelSelector::Failed { message } = &settings.selector {
                    println!("{}", message.yellow());
                }
            }
            PmCommand::Set { account_id, model } => {
                let account = self.find_account(&account_id).await?;
                let result = self.client.chat_models(&account_id).await;
                let available = self.check(result)?;
                let model = match model {
                    Some(model) if !available.is_empty() && !available.contains(&model) => {
                        anyhow::bail!(
                            "{} is not available for {}. Choose one of: {}",
                            model,
                            account.display_name(),
                            available.join(", ")
                        )
                    }
                    Some(model) => Some(model),
                    None => account.default_model(),
                };
                let pref = PmPreference::new(account.id.clone(), model);
                self.save_pm_preference(&pref)?;
                println!(
                    "{} PM Settings saved! {} · {}",
                    "✓".green(),
                    account.display_name().bold(),
                    pref.model.as_deref().unwrap_or("default")
                );
            }
        }
        Ok(())
    }

    pub async fn chat(&mut self, message: &str) -> Result<()> {
        let message = message.trim();
        if message.is_empty() {
            anyhow::bail!("Message is empty");
        }
        let result = self.client.overview().await;
        let overview = self.check(result)?;
        if !overview.has_llm() {
            println!("{}", NO_LLM_REPLY.yellow());
            return Ok(());
        }

        let pref = self.store.pm_preference();
        let request = ChatRequest {
            message: message.to_string(),
            account_id: pref.account_id,
            model_name: pref.model,
        };
        let result = self.client.chat(&request).await;
        let reply = self.check(result)?;
        println!("{}", reply.response);
        if let Some(model) = reply.model_used {
            println!("{}", format!("({})", model).dimmed());
        }
        Ok(())
    }

    // ========== Integrations ==========

    pub async fn github(&mut self, command: GithubCommand) -> Result<()> {
        match command {
            GithubCommand::Status => {
                let result = self.client.github_status().await;
                let status = self.check(result)?;
                if status.connected {
                    println!(
                        "{} Connected as {}",
                        "✓".green(),
                        status.username.as_deref().unwrap_or("unknown").bold()
                    );
                } else if !status.configured {
                    println!("{}", "GitHub OAuth is not configured on the server".yellow());
                } else {
                    println!("Not connected. Run `fulcrum github connect`.");
                }
            }
            GithubCommand::Connect => {
                let result = self.client.github_login().await;
                let url = self.check(result)?;
                println!("Open this URL to authorize GitHub:\n{}", url.url.underline());
            }
            GithubCommand::Repos => {
                let result = self.client.github_repos().await;
                let repos = self.check(result)?;

                #[derive(Tabled)]
                struct RepoRow {
                    #[tabled(rename = "Repository")]
                    name: String,
                    #[tabled(rename = "Description")]
                    description: String,
                }

                print_table(repos.into_iter().map(|r| RepoRow {
                    name: r.full_name.unwrap_or_default(),
                    description: r.description.unwrap_or_default(),
                }));
            }
        }
        Ok(())
    }

    pub async fn coder(&mut self, command: CoderCommand) -> Result<()> {
        match command {
            CoderCommand::Accounts => {
                let result = self.client.coder_accounts().await;
                let accounts = self.check(result)?;
                if accounts.is_empty() {
                    println!("No Coder accounts. Connect one with `fulcrum coder connect`.");
                    return Ok(());
                }

                #[derive(Tabled)]
                struct CoderRow {
                    #[tabled(rename = "ID")]
                    id: String,
                    #[tabled(rename = "Name")]
                    name: String,
                    #[tabled(rename = "URL")]
                    url: String,
                }

                print_table(accounts.iter().map(|a| CoderRow {
                    id: a.id.clone(),
                    name: a.display_name().to_string(),
                    url: a.api_endpoint.clone().unwrap_or_default(),
                }));
            }
            CoderCommand::Connect {
                url,
                token,
                name,
                session,
            } => {
                let request = CoderConnect {
                    name: name.as_deref().and_then(crate::api::non_empty),
                    url: url.trim().trim_end_matches('/').to_string(),
                    token: token.trim().to_string(),
                };
                let result = if session {
                    self.client.coder_exchange(&request).await
                } else {
                    self.client.coder_connect(&request).await
                };
                self.check(result)?;
                println!("{} Connected {}", "✓".green(), request.url.bold());
            }
            CoderCommand::Login => {
                let result = self.client.coder_oauth_login().await;
                let url = self.check(result)?;
                println!("Open this URL to authorize Coder:\n{}", url.url.underline());
            }
            CoderCommand::Delete { id, yes } => {
                if !yes && !confirm(&format!("Disconnect Coder account {}?", id))? {
                    println!("Cancelled");
                    return Ok(());
                }
                let result = self.client.coder_delete_account(&id).await;
                self.check(result)?;
                println!("{} Disconnected {}", "✓".green(), id);
            }
            CoderCommand::Workspaces { account_id } => {
                let account_id = match account_id {
                    Some(id) => id,
                    None => {
                        let result = self.client.coder_accounts().await;
                        let accounts = self.check(result)?;
                        accounts
                            .into_iter()
                            .next()
                            .map(|a| a.id)
                            .context("No Coder accounts connected")?
                    }
                };
                let result = self.client.coder_workspaces(&account_id).await;
                let workspaces = self.check(result)?;

                #[derive(Tabled)]
                struct WorkspaceRow {
                    #[tabled(rename = "ID")]
                    id: String,
                    #[tabled(rename = "Workspace")]
                    name: String,
                    #[tabled(rename = "Owner")]
                    owner: String,
                    #[tabled(rename = "Status")]
                    status: String,
                }

                print_table(workspaces.iter().map(|w| WorkspaceRow {
                    id: w.id.clone(),
                    name: w.display_name().to_string(),
                    owner: w.owner_name.clone().unwrap_or_default(),
                    status: w.status.clone().unwrap_or_default(),
                }));
            }
            CoderCommand::Browse {
                account_id,
                workspace_id,
                path,
            } => {
                let home = self.config.browser.home_dir.clone();
                let result = self.client.coder_workspaces(&account_id).await;
                let workspaces = self.check(result)?;
                let result = self.client.coder_accounts().await;
                let accounts = self.check(result)?;
                let base = accounts
                    .iter()
                    .find(|a| a.id == account_id)
                    .and_then(|a| a.api_endpoint.clone());

                let target = match workspaces.iter().find(|w| w.id == workspace_id) {
                    Some(workspace) => {
                        WorkspaceTarget::for_workspace(&account_id, workspace, base.as_deref(), &home)
                    }
                    None => WorkspaceTarget::new(account_id.clone(), workspace_id.clone(), &home),
                };
                let start = match path {
                    Some(path) => StartLocation::Exact(path),
                    None => starting_location(None, &self.config.browser.preferred_paths, &home),
                };
                self.browse(target, start).await?;
            }
        }
        Ok(())
    }
}

// ========== Config ==========

pub fn config_command(config: &Config, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommand::Path => {
            println!("{}", Config::config_path()?.display());
        }
        ConfigCommand::Init { force } => {
            let path = Config::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Pass --force to overwrite it.",
                    path.display()
                );
            }
            let path = Config::default().save()?;
            println!("{} Wrote {}", "✓".green(), path.display());
        }
    }
    Ok(())
}

// ========== Output helpers ==========

fn print_table<T: Tabled>(rows: impl IntoIterator<Item = T>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
