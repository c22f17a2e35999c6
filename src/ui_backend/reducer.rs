//! State transitions
//!
//! `handle_command` reacts to user input, `apply` to request results. Both
//! return the effects `AppService` should run next.

use crate::api::{AccountPatch, ApiError, ChatRequest, ProjectPatch};
use crate::core::path_browser::{starting_location, StartLocation, WorkspaceTarget};
use crate::core::pm_sync::{self, model_load_failure, ModelSelector};
use crate::core::{PathBrowser, PmSettings};

use super::commands::Command;
use super::effects::{Effect, Fetch, Mutation};
use super::events::{AppEvent, Loaded, Mutated};
use super::forms::{FormKind, FormState};
use super::state::{
    clamp_cursor, move_cursor, AppState, BrowserModal, ChatMessage, ConfirmAction,
    IntegrationFocus, LoadState, Modal, ModelPickerModal, Panel, PmField, PmSettingsModal, Screen,
    NO_LLM_REPLY,
};

const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";

impl AppState {
    /// Effects to run once at startup
    pub fn start(&mut self) -> Vec<Effect> {
        match self.screen {
            Screen::Auth => Vec::new(),
            Screen::Dashboard => self.load_panel(self.panel),
        }
    }

    fn fetch(&mut self, fetch: Fetch) -> Effect {
        let token = self.requests.begin(fetch.slot());
        Effect::Fetch { token, fetch }
    }

    /// Start the loads a panel needs when it becomes visible
    fn load_panel(&mut self, panel: Panel) -> Vec<Effect> {
        match panel {
            Panel::Overview => {
                self.overview = LoadState::Loading;
                vec![self.fetch(Fetch::Overview)]
            }
            Panel::Projects => {
                self.projects = LoadState::Loading;
                let mut effects = vec![self.fetch(Fetch::Projects)];
                // the folder browser falls back to the first Coder account
                if self.integrations.coder_accounts.is_idle() {
                    self.integrations.coder_accounts = LoadState::Loading;
                    effects.push(self.fetch(Fetch::CoderAccounts));
                }
                effects
            }
            Panel::Accounts => {
                self.accounts = LoadState::Loading;
                vec![self.fetch(Fetch::Accounts)]
            }
            Panel::Chat => {
                if self.overview.loaded().is_some() {
                    Vec::new()
                } else {
                    self.overview = LoadState::Loading;
                    vec![self.fetch(Fetch::Overview)]
                }
            }
            Panel::Integrations => {
                self.integrations.github = LoadState::Loading;
                self.integrations.coder_accounts = LoadState::Loading;
                vec![self.fetch(Fetch::Github), self.fetch(Fetch::CoderAccounts)]
            }
        }
    }

    fn switch_panel(&mut self, panel: Panel) -> Vec<Effect> {
        self.panel = panel;
        self.status = None;
        self.load_panel(panel)
    }

    fn sign_out(&mut self, hint: Option<String>) -> Vec<Effect> {
        tracing::info!("Signing out");
        self.reset_session(hint);
        vec![Effect::ClearToken]
    }

    // ========== Commands ==========

    pub fn handle_command(&mut self, command: Command) -> Vec<Effect> {
        if command == Command::Quit {
            self.should_quit = true;
            return vec![Effect::Quit];
        }
        match self.screen {
            Screen::Auth => self.handle_auth_command(command),
            Screen::Dashboard if !self.modals.is_empty() => self.handle_modal_command(command),
            Screen::Dashboard => self.handle_panel_command(command),
        }
    }

    fn handle_auth_command(&mut self, command: Command) -> Vec<Effect> {
        let form = &mut self.auth_form;
        match command {
            Command::InsertChar(c) => form.insert_char(c),
            Command::DeleteCharBefore => form.delete_char(),
            Command::ClearInput => form.clear_field(),
            Command::NextField | Command::CursorDown => form.next_field(),
            Command::PrevField | Command::CursorUp => form.prev_field(),
            Command::ToggleAuthMode => {
                *form = match form.kind {
                    FormKind::Login => FormState::register(),
                    _ => FormState::login(),
                };
            }
            Command::Submit if !form.submitting => match form.submit() {
                Ok(mutation) => {
                    form.submitting = true;
                    form.hint = None;
                    return vec![Effect::Mutate(mutation)];
                }
                Err(message) => form.hint = Some(message),
            },
            _ => {}
        }
        Vec::new()
    }

    fn handle_panel_command(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::ToggleHelp => {
                self.modals.push(Modal::Help);
                Vec::new()
            }
            Command::Logout => self.sign_out(None),
            Command::NextPanel => self.switch_panel(self.panel.next()),
            Command::PrevPanel => self.switch_panel(self.panel.prev()),
            Command::ShowPanel(panel) => self.switch_panel(panel),
            Command::Reload => self.load_panel(self.panel),
            Command::OpenPmSettings => self.open_pm_settings(),
            _ => match self.panel {
                Panel::Overview => Vec::new(),
                Panel::Projects => self.handle_projects_command(command),
                Panel::Accounts => self.handle_accounts_command(command),
                Panel::Chat => self.handle_chat_command(command),
                Panel::Integrations => self.handle_integrations_command(command),
            },
        }
    }

    fn handle_projects_command(&mut self, command: Command) -> Vec<Effect> {
        let len = self.projects.loaded().map_or(0, Vec::len);
        match command {
            Command::CursorUp => move_cursor(&mut self.project_cursor, len, false),
            Command::CursorDown => move_cursor(&mut self.project_cursor, len, true),
            Command::NewItem => self.modals.push(Modal::Form(FormState::new_project())),
            Command::EditItem | Command::Submit => {
                if let Some(project) = self.selected_project() {
                    let form = FormState::edit_project(project);
                    self.modals.push(Modal::Form(form));
                }
            }
            Command::BrowseWorkspace => return self.open_project_browser(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_accounts_command(&mut self, command: Command) -> Vec<Effect> {
        let len = self.accounts.loaded().map_or(0, Vec::len);
        match command {
            Command::CursorUp => move_cursor(&mut self.account_cursor, len, false),
            Command::CursorDown => move_cursor(&mut self.account_cursor, len, true),
            Command::NewItem => self.modals.push(Modal::Form(FormState::new_account())),
            Command::RenameItem | Command::EditItem => {
                if let Some(account) = self.selected_account() {
                    let form = FormState::rename_account(account);
                    self.modals.push(Modal::Form(form));
                }
            }
            Command::EditModels | Command::Submit => {
                if let Some(account) = self.selected_account().cloned() {
                    let account_id = account.id.clone();
                    self.modals.push(Modal::Models(ModelPickerModal::new(account)));
                    return vec![self.fetch(Fetch::AccountModels { account_id })];
                }
            }
            Command::DeleteItem => {
                if let Some(account) = self.selected_account() {
                    let modal = Modal::Confirm {
                        message: format!("Delete AI account '{}'?", account.display_name()),
                        action: ConfirmAction::DeleteAccount {
                            id: account.id.clone(),
                        },
                    };
                    self.modals.push(modal);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_chat_command(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::InsertChar(c) => self.chat.input.push(c),
            Command::DeleteCharBefore => {
                self.chat.input.pop();
            }
            Command::ClearInput => self.chat.input.clear(),
            Command::Submit => return self.send_chat(),
            _ => {}
        }
        Vec::new()
    }

    fn send_chat(&mut self) -> Vec<Effect> {
        let message = self.chat.input.trim().to_string();
        if message.is_empty() || self.chat.pending {
            return Vec::new();
        }
        self.chat.input.clear();
        self.chat.messages.push(ChatMessage::user(message.clone()));

        if !self.has_llm() {
            self.chat
                .messages
                .push(ChatMessage::assistant(NO_LLM_REPLY, None));
            return Vec::new();
        }

        self.chat.pending = true;
        let request = ChatRequest {
            message,
            account_id: self.pm_pref.account_id.clone(),
            model_name: self.pm_pref.model.clone(),
        };
        vec![self.fetch(Fetch::Chat(request))]
    }

    fn handle_integrations_command(&mut self, command: Command) -> Vec<Effect> {
        let integrations = &mut self.integrations;
        match command {
            Command::FocusLeft => integrations.focus = IntegrationFocus::CoderAccounts,
            Command::FocusRight => integrations.focus = IntegrationFocus::Workspaces,
            Command::CursorUp | Command::CursorDown => {
                let down = command == Command::CursorDown;
                match integrations.focus {
                    IntegrationFocus::CoderAccounts => {
                        let len = integrations.coder_accounts.loaded().map_or(0, Vec::len);
                        let before = integrations.coder_cursor;
                        move_cursor(&mut integrations.coder_cursor, len, down);
                        if integrations.coder_cursor != before {
                            return self.load_workspaces();
                        }
                    }
                    IntegrationFocus::Workspaces => {
                        let len = integrations.workspaces.loaded().map_or(0, Vec::len);
                        move_cursor(&mut integrations.workspace_cursor, len, down);
                    }
                }
            }
            Command::ConnectGithub => return vec![Effect::Mutate(Mutation::GithubLogin)],
            Command::ConnectCoder | Command::NewItem => {
                self.modals.push(Modal::Form(FormState::connect_coder()))
            }
            Command::CoderOAuth => return vec![Effect::Mutate(Mutation::CoderOAuthLogin)],
            Command::DeleteItem => {
                if let Some(account) = integrations.selected_coder_account() {
                    let modal = Modal::Confirm {
                        message: format!("Disconnect Coder account '{}'?", account.display_name()),
                        action: ConfirmAction::DeleteCoderAccount {
                            id: account.id.clone(),
                        },
                    };
                    self.modals.push(modal);
                }
            }
            Command::BrowseWorkspace | Command::Submit => {
                if integrations.focus == IntegrationFocus::Workspaces {
                    return self.open_workspace_browser();
                }
                integrations.focus = IntegrationFocus::Workspaces;
            }
            _ => {}
        }
        Vec::new()
    }

    fn load_workspaces(&mut self) -> Vec<Effect> {
        let Some(account_id) = self
            .integrations
            .selected_coder_account()
            .map(|a| a.id.clone())
        else {
            self.requests.cancel(crate::core::RequestSlot::Workspaces);
            self.integrations.workspaces = LoadState::Idle;
            return Vec::new();
        };
        self.integrations.workspaces = LoadState::Loading;
        self.integrations.workspace_cursor = 0;
        vec![self.fetch(Fetch::Workspaces { account_id })]
    }

    // ========== PM settings ==========

    fn open_pm_settings(&mut self) -> Vec<Effect> {
        self.modals.push(Modal::PmSettings(PmSettingsModal {
            settings: LoadState::Loading,
            wanted_model: self.pm_pref.model.clone(),
            focus: PmField::Account,
            hint: None,
        }));
        vec![self.fetch(Fetch::PmAccounts)]
    }

    /// Cycle the PM account or model dropdown
    fn cycle_pm_selection(&mut self, down: bool) -> Vec<Effect> {
        let saved = self.pm_pref.clone();
        let Some(Modal::PmSettings(modal)) = self.modals.last_mut() else {
            return Vec::new();
        };
        let Some(settings) = modal.settings.loaded_mut() else {
            return Vec::new();
        };
        modal.hint = None;

        match modal.focus {
            PmField::Account => {
                // slot 0 is "none selected"
                let mut options: Vec<Option<String>> = vec![None];
                options.extend(settings.accounts.iter().map(|a| Some(a.id.clone())));
                let current = options
                    .iter()
                    .position(|o| *o == settings.account_id)
                    .unwrap_or(0);
                let mut index = current;
                move_cursor(&mut index, options.len(), down);
                let choice = options.swap_remove(index);
                settings.select_account(choice);

                let Some(account) = settings.selected_account() else {
                    self.requests.cancel(crate::core::RequestSlot::PmModels);
                    return Vec::new();
                };
                modal.wanted_model = if saved.account_id.as_deref() == Some(account.id.as_str()) {
                    saved.model.clone()
                } else {
                    account.default_model()
                };
                let account_id = account.id.clone();
                vec![self.fetch(Fetch::PmModels { account_id })]
            }
            PmField::Model => {
                let models = settings.selector.models().to_vec();
                if models.is_empty() {
                    return Vec::new();
                }
                let current = settings
                    .model
                    .as_ref()
                    .and_then(|m| models.iter().position(|x| x == m));
                let index = match current {
                    None if down => 0,
                    None => models.len() - 1,
                    Some(mut i) => {
                        move_cursor(&mut i, models.len(), down);
                        i
                    }
                };
                settings.select_model(models.get(index).cloned());
                Vec::new()
            }
        }
    }

    fn save_pm_settings(&mut self) -> Vec<Effect> {
        let Some(Modal::PmSettings(modal)) = self.modals.last_mut() else {
            return Vec::new();
        };
        let Some(settings) = modal.settings.loaded() else {
            return Vec::new();
        };
        // a half-filled selection would erase the saved pair
        let pref = match settings.to_preference() {
            Ok(pref) => pref,
            Err(message) => {
                modal.hint = Some(message);
                return Vec::new();
            }
        };
        self.pm_pref = pref.clone();
        self.modals.pop();
        self.requests.cancel(crate::core::RequestSlot::PmModels);
        self.modals.push(Modal::notice("PM Settings", "PM Settings saved!"));
        vec![Effect::SavePmPreference(pref)]
    }

    // ========== Folder browser ==========

    fn open_project_browser(&mut self) -> Vec<Effect> {
        let Some(project) = self.selected_project().cloned() else {
            return Vec::new();
        };
        let home = self.browser_config.home_dir.clone();
        let fallback = self
            .integrations
            .coder_accounts
            .loaded()
            .and_then(|accounts| accounts.first())
            .map(|a| a.id.clone());
        let Some(mut target) = WorkspaceTarget::for_project(&project, fallback.as_deref(), &home)
        else {
            self.modals.push(Modal::notice(
                "Workspace",
                "Link this project to a Coder workspace and connect a Coder account first.",
            ));
            return Vec::new();
        };

        // start link is only known when the workspace list is loaded
        if let Some(workspace) = self
            .integrations
            .workspaces
            .loaded()
            .and_then(|ws| ws.iter().find(|w| w.id == target.workspace_id))
        {
            let base = self
                .integrations
                .coder_accounts
                .loaded()
                .and_then(|accounts| accounts.iter().find(|a| a.id == target.account_id))
                .and_then(|a| a.api_endpoint.clone());
            target.start_url =
                WorkspaceTarget::for_workspace(&target.account_id, workspace, base.as_deref(), &home)
                    .start_url;
        }

        let start = starting_location(
            project.workspace_path.as_deref(),
            &self.browser_config.preferred_paths,
            &home,
        );
        self.open_browser(target, Some(project.id), start)
    }

    fn open_workspace_browser(&mut self) -> Vec<Effect> {
        let Some(account) = self.integrations.selected_coder_account().cloned() else {
            return Vec::new();
        };
        let Some(workspace) = self.integrations.selected_workspace().cloned() else {
            return Vec::new();
        };
        let home = self.browser_config.home_dir.clone();
        let target = WorkspaceTarget::for_workspace(
            &account.id,
            &workspace,
            account.api_endpoint.as_deref(),
            &home,
        );
        let start = starting_location(None, &self.browser_config.preferred_paths, &home);
        self.open_browser(target, None, start)
    }

    fn open_browser(
        &mut self,
        target: WorkspaceTarget,
        project_id: Option<String>,
        start: StartLocation,
    ) -> Vec<Effect> {
        let mut browser = PathBrowser::new(target.clone());
        match &start {
            StartLocation::Exact(path) => {
                browser.begin(path);
            }
            StartLocation::Probe(candidates) => {
                browser.begin(candidates.first().map(String::as_str).unwrap_or("/"));
            }
        }
        self.modals
            .push(Modal::Browser(BrowserModal { browser, project_id }));
        vec![self.fetch(Fetch::Folders { target, start })]
    }

    fn browse_to(&mut self, path: Option<String>) -> Vec<Effect> {
        let Some(Modal::Browser(modal)) = self.modals.last_mut() else {
            return Vec::new();
        };
        let Some(path) = path else {
            return Vec::new();
        };
        let path = modal.browser.begin(&path);
        let target = modal.browser.target.clone();
        vec![self.fetch(Fetch::Folders {
            target,
            start: StartLocation::Exact(path),
        })]
    }

    // ========== Modals ==========

    fn close_modal(&mut self) {
        if let Some(modal) = self.modals.pop() {
            self.release_modal(modal);
        }
    }

    /// Close the topmost modal `owns` accepts, wherever it sits in the stack
    fn close_owned_modal(&mut self, owns: impl Fn(&Modal) -> bool) {
        if let Some(index) = self.modals.iter().rposition(|modal| owns(modal)) {
            let modal = self.modals.remove(index);
            self.release_modal(modal);
        }
    }

    /// Cancel the requests that only fed `modal`
    fn release_modal(&mut self, modal: Modal) {
        use crate::core::RequestSlot;
        match modal {
            Modal::PmSettings(_) => {
                self.requests.cancel(RequestSlot::PmAccounts);
                self.requests.cancel(RequestSlot::PmModels);
            }
            Modal::Models(_) => self.requests.cancel(RequestSlot::AccountModels),
            Modal::Browser(_) => self.requests.cancel(RequestSlot::Browser),
            Modal::Form(form) if form.kind == FormKind::NewAccount => {
                self.requests.cancel(RequestSlot::ProviderModels)
            }
            _ => {}
        }
    }

    fn handle_modal_command(&mut self, command: Command) -> Vec<Effect> {
        let Some(modal) = self.modals.last_mut() else {
            return Vec::new();
        };
        if command == Command::CloseModal {
            self.close_modal();
            return Vec::new();
        }

        match modal {
            Modal::Notice { .. } | Modal::Help => {
                if matches!(command, Command::Submit | Command::ToggleHelp) {
                    self.modals.pop();
                }
            }
            Modal::Confirm { action, .. } => match command {
                Command::Submit | Command::InsertChar('y') => {
                    let mutation = match action.clone() {
                        ConfirmAction::DeleteAccount { id } => Mutation::DeleteAccount { id },
                        ConfirmAction::DeleteCoderAccount { id } => {
                            Mutation::DeleteCoderAccount { id }
                        }
                    };
                    self.modals.pop();
                    return vec![Effect::Mutate(mutation)];
                }
                Command::InsertChar('n') => {
                    self.modals.pop();
                }
                _ => {}
            },
            Modal::Form(form) => match command {
                Command::InsertChar(c) => form.insert_char(c),
                Command::DeleteCharBefore => form.delete_char(),
                Command::ClearInput => form.clear_field(),
                Command::NextField | Command::CursorDown => form.next_field(),
                Command::PrevField | Command::CursorUp => form.prev_field(),
                Command::FetchProviderModels => {
                    if let Some(request) = form.provider_models_request() {
                        form.hint = Some("Loading models...".to_string());
                        return vec![self.fetch(Fetch::ProviderModels(request))];
                    }
                }
                Command::Submit if !form.submitting => match form.submit() {
                    Ok(mutation) => {
                        form.submitting = true;
                        form.hint = None;
                        return vec![Effect::Mutate(mutation)];
                    }
                    Err(message) => form.hint = Some(message),
                },
                _ => {}
            },
            Modal::PmSettings(pm) => match command {
                Command::NextField | Command::PrevField | Command::FocusLeft | Command::FocusRight => {
                    pm.focus = match pm.focus {
                        PmField::Account => PmField::Model,
                        PmField::Model => PmField::Account,
                    };
                }
                Command::CursorUp => return self.cycle_pm_selection(false),
                Command::CursorDown => return self.cycle_pm_selection(true),
                Command::Submit => return self.save_pm_settings(),
                _ => {}
            },
            Modal::Models(picker) => match command {
                Command::CursorUp | Command::CursorDown => {
                    let len = picker.models().len();
                    move_cursor(&mut picker.cursor, len, command == Command::CursorDown);
                }
                Command::ToggleItem => picker.toggle_highlighted(),
                Command::ToggleAll => picker.toggle_all(),
                Command::SetDefault => picker.set_default_highlighted(),
                Command::Submit => match picker.selection() {
                    Ok((allow, default_model)) => {
                        picker.hint = Some("Saving...".to_string());
                        let patch = AccountPatch {
                            enabled_models: Some(allow.to_enabled()),
                            model_name: default_model,
                            ..Default::default()
                        };
                        let id = picker.account.id.clone();
                        return vec![Effect::Mutate(Mutation::UpdateAccount { id, patch })];
                    }
                    Err(message) => picker.hint = Some(message),
                },
                _ => {}
            },
            Modal::Browser(modal) => match command {
                Command::CursorUp => modal.browser.select_prev(),
                Command::CursorDown => modal.browser.select_next(),
                Command::Submit => {
                    let child = modal.browser.selected_child();
                    return self.browse_to(child);
                }
                Command::BrowseParent | Command::DeleteCharBefore => {
                    let parent = modal.browser.parent();
                    return self.browse_to(Some(parent));
                }
                Command::Reload => {
                    let current = modal.browser.current_path.clone();
                    return self.browse_to(Some(current));
                }
                Command::SaveSelection => {
                    let path = match modal.browser.saveable_path() {
                        Ok(path) => path.to_string(),
                        Err(message) => {
                            self.status = Some(format!("Nothing to save: {}", message));
                            return Vec::new();
                        }
                    };
                    let Some(id) = modal.project_id.clone() else {
                        self.status = Some(format!("Selected {}", path));
                        return Vec::new();
                    };
                    let patch = ProjectPatch {
                        workspace_path: Some(path),
                        ..Default::default()
                    };
                    return vec![Effect::Mutate(Mutation::UpdateProject { id, patch })];
                }
                _ => {}
            },
        }
        Vec::new()
    }

    // ========== Events ==========

    pub fn apply(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Loaded { token, data } => {
                if !self.requests.complete(token) {
                    return Vec::new();
                }
                if data.error().is_some_and(ApiError::is_unauthorized) {
                    return self.sign_out(Some(SESSION_EXPIRED.to_string()));
                }
                self.apply_loaded(data)
            }
            AppEvent::Mutated(result) => {
                if self.screen == Screen::Auth && !matches!(result, Mutated::SignedIn(_)) {
                    return Vec::new();
                }
                if let Some(err) = result.error() {
                    if err.is_unauthorized() && !matches!(result, Mutated::SignedIn(_)) {
                        return self.sign_out(Some(SESSION_EXPIRED.to_string()));
                    }
                }
                self.apply_mutated(result)
            }
        }
    }

    fn apply_loaded(&mut self, data: Loaded) -> Vec<Effect> {
        match data {
            Loaded::Overview(result) => {
                self.overview = to_load_state(result);
            }
            Loaded::Projects(result) => {
                self.projects = to_load_state(result);
                let len = self.projects.loaded().map_or(0, Vec::len);
                clamp_cursor(&mut self.project_cursor, len);
            }
            Loaded::Accounts(result) => {
                self.accounts = to_load_state(result);
                let len = self.accounts.loaded().map_or(0, Vec::len);
                clamp_cursor(&mut self.account_cursor, len);
            }
            Loaded::PmAccounts(result) => {
                let saved = self.pm_pref.clone();
                let Some(modal) = self.pm_settings_modal_mut() else {
                    return Vec::new();
                };
                match result {
                    Ok(accounts) => {
                        let settings = PmSettings::new(accounts, &saved);
                        let account_id = settings.account_id.clone();
                        modal.settings = LoadState::Loaded(settings);
                        if let Some(account_id) = account_id {
                            return vec![self.fetch(Fetch::PmModels { account_id })];
                        }
                    }
                    Err(err) => modal.settings = LoadState::Failed(err.to_string()),
                }
            }
            Loaded::PmModels(result) => {
                if let Some(modal) = self.pm_settings_modal_mut() {
                    let wanted = modal.wanted_model.clone();
                    if let Some(settings) = modal.settings.loaded_mut() {
                        settings.apply_models(result, wanted.as_deref());
                    }
                }
            }
            Loaded::AccountModels(result) => {
                if let Some(picker) = self.model_picker_mut() {
                    picker.available = match result {
                        Ok(models) => LoadState::Loaded(models),
                        Err(err) => LoadState::Failed(model_load_failure(&err)),
                    };
                    picker.cursor = 0;
                }
            }
            Loaded::ProviderModels(result) => {
                if let Some(form) = self.new_account_form_mut() {
                    form.hint = Some(match ModelSelector::from_result(result) {
                        ModelSelector::Ready { models } if models.is_empty() => {
                            "The provider returned no models".to_string()
                        }
                        ModelSelector::Ready { models } => {
                            format!("{} models available: {}", models.len(), preview(&models))
                        }
                        ModelSelector::Failed { message } => message,
                        _ => String::new(),
                    });
                }
            }
            Loaded::Chat(result) => {
                self.chat.pending = false;
                let message = match result {
                    Ok(reply) => ChatMessage::assistant(reply.response, reply.model_used),
                    Err(err) if err.is_network() => {
                        ChatMessage::assistant("Network error. Please try again.", None)
                    }
                    Err(err) => ChatMessage::assistant(format!("Error: {}", err.detail()), None),
                };
                self.chat.messages.push(message);
            }
            Loaded::Github(result) => {
                self.integrations.github = to_load_state(result);
            }
            Loaded::CoderAccounts(result) => {
                self.integrations.coder_accounts = to_load_state(result);
                let len = self
                    .integrations
                    .coder_accounts
                    .loaded()
                    .map_or(0, Vec::len);
                clamp_cursor(&mut self.integrations.coder_cursor, len);
                if self.panel == Panel::Integrations {
                    return self.load_workspaces();
                }
            }
            Loaded::Workspaces(result) => {
                self.integrations.workspaces = to_load_state(result);
                let len = self.integrations.workspaces.loaded().map_or(0, Vec::len);
                clamp_cursor(&mut self.integrations.workspace_cursor, len);
            }
            Loaded::Folders(result) => {
                if let Some(modal) = self.browser_modal_mut() {
                    modal.browser.apply(result);
                }
            }
        }
        Vec::new()
    }

    fn apply_mutated(&mut self, result: Mutated) -> Vec<Effect> {
        match result {
            Mutated::SignedIn(Ok(token)) => {
                tracing::info!("Signed in");
                self.screen = Screen::Dashboard;
                self.auth_form = FormState::login();
                self.panel = Panel::Overview;
                let mut effects = vec![Effect::SaveToken(token.access_token)];
                effects.extend(self.load_panel(Panel::Overview));
                effects
            }
            Mutated::SignedIn(Err(err)) => {
                self.auth_form.submitting = false;
                self.auth_form.hint = Some(err.to_string());
                Vec::new()
            }
            Mutated::ProjectCreated(Ok(project)) => {
                self.close_owned_modal(|m| is_form(m, &FormKind::NewProject));
                self.status = Some(format!("Created project {}", project.name));
                let mut effects = self.load_panel(Panel::Projects);
                effects.push(self.fetch(Fetch::Overview));
                effects
            }
            Mutated::ProjectUpdated(Ok(project)) => {
                let id = project.id.clone();
                self.close_owned_modal(|m| match m {
                    Modal::Form(form) => form.kind == FormKind::EditProject { id: id.clone() },
                    Modal::Browser(browser) => browser.project_id.as_deref() == Some(id.as_str()),
                    _ => false,
                });
                self.status = Some(format!("Saved project {}", project.name));
                if let Some(projects) = self.projects.loaded_mut() {
                    if let Some(slot) = projects.iter_mut().find(|p| p.id == project.id) {
                        *slot = project;
                    }
                }
                Vec::new()
            }
            Mutated::AccountCreated(Ok(account)) => {
                self.close_owned_modal(|m| is_form(m, &FormKind::NewAccount));
                self.status = Some(format!("Added {}", account.display_name()));
                let mut effects = Vec::new();
                if let Some(pref) = pm_sync::preference_for_new_account(&self.pm_pref, &account) {
                    tracing::info!("Using new account {} for the PM assistant", account.id);
                    self.pm_pref = pref.clone();
                    effects.push(Effect::SavePmPreference(pref));
                }
                effects.extend(self.load_panel(Panel::Accounts));
                effects.push(self.fetch(Fetch::Overview));
                effects
            }
            Mutated::AccountUpdated(Ok(account)) => {
                let id = account.id.clone();
                self.close_owned_modal(|m| match m {
                    Modal::Form(form) => form.kind == FormKind::RenameAccount { id: id.clone() },
                    Modal::Models(picker) => picker.account.id == id,
                    _ => false,
                });
                self.status = Some(format!("Updated {}", account.display_name()));
                let mut effects = Vec::new();
                if let Some(pref) = pm_sync::reconcile_after_edit(&self.pm_pref, &account) {
                    tracing::info!("PM model no longer allowed, now {:?}", pref.model);
                    self.pm_pref = pref.clone();
                    effects.push(Effect::SavePmPreference(pref));
                }
                effects.extend(self.load_panel(Panel::Accounts));
                effects
            }
            Mutated::AccountDeleted { id, result: Ok(()) } => {
                self.status = Some("Account deleted".to_string());
                if let Some(accounts) = self.accounts.loaded_mut() {
                    accounts.retain(|a| a.id != id);
                }
                let mut effects = self.load_panel(Panel::Accounts);
                effects.push(self.fetch(Fetch::Overview));
                effects
            }
            Mutated::AuthorizeUrl {
                provider,
                result: Ok(url),
            } => {
                self.modals.push(Modal::notice(
                    format!("Connect {}", provider),
                    format!("Open this URL in your browser to authorize:\n\n{}", url.url),
                ));
                Vec::new()
            }
            Mutated::CoderConnected(Ok(())) => {
                self.close_owned_modal(|m| is_form(m, &FormKind::ConnectCoder));
                self.status = Some("Coder account connected".to_string());
                self.integrations.coder_accounts = LoadState::Loading;
                vec![self.fetch(Fetch::CoderAccounts)]
            }
            Mutated::CoderAccountDeleted(Ok(())) => {
                self.status = Some("Coder account disconnected".to_string());
                self.integrations.coder_accounts = LoadState::Loading;
                vec![self.fetch(Fetch::CoderAccounts)]
            }
            failed => {
                let message = failed
                    .error()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "Request failed".to_string());
                tracing::warn!("Request failed: {}", message);
                for modal in &mut self.modals {
                    match modal {
                        Modal::Form(form) => form.submitting = false,
                        Modal::Models(picker) => picker.hint = None,
                        _ => {}
                    }
                }
                self.modals.push(Modal::notice("Error", message));
                Vec::new()
            }
        }
    }

}

fn is_form(modal: &Modal, kind: &FormKind) -> bool {
    matches!(modal, Modal::Form(form) if form.kind == *kind)
}

fn to_load_state<T>(result: Result<T, ApiError>) -> LoadState<T> {
    match result {
        Ok(value) => LoadState::Loaded(value),
        Err(err) => LoadState::Failed(err.to_string()),
    }
}

fn preview(models: &[String]) -> String {
    const SHOWN: usize = 5;
    let mut text = models
        .iter()
        .take(SHOWN)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if models.len() > SHOWN {
        text.push_str(", ...");
    }
    text
}
