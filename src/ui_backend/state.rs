//! Application State
//!
//! Everything the dashboard shows lives here and is owned by the event loop.
//! The renderer reads it; only `AppState::handle_command` and
//! `AppState::apply` change it.

use chrono::{DateTime, Local};

use crate::api::{Account, CoderAccount, CoderWorkspace, Overview, Project, NO_LLM_STATUS};
use crate::config::BrowserConfig;
use crate::core::{ModelAllowList, PathBrowser, PmPreference, PmSettings, RequestTracker};

use super::events::GithubView;
use super::forms::{FormKind, FormState};

/// Reply shown when the overview reports no usable LLM account
pub const NO_LLM_REPLY: &str = "I don't have an AI account configured yet. Please go to AI Accounts and add your credentials so I can process your requests!";

/// Dashboard panels in navigation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Overview,
    Projects,
    Accounts,
    Chat,
    Integrations,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::Overview,
        Panel::Projects,
        Panel::Accounts,
        Panel::Chat,
        Panel::Integrations,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Overview => "Overview",
            Panel::Projects => "Projects",
            Panel::Accounts => "AI Accounts",
            Panel::Chat => "PM Chat",
            Panel::Integrations => "Integrations",
        }
    }

    pub fn index(&self) -> usize {
        Panel::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Panel> {
        Panel::ALL.get(index).copied()
    }

    pub fn next(&self) -> Panel {
        Panel::ALL[(self.index() + 1) % Panel::ALL.len()]
    }

    pub fn prev(&self) -> Panel {
        Panel::ALL[(self.index() + Panel::ALL.len() - 1) % Panel::ALL.len()]
    }
}

/// Data state of one panel section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// Model that produced an assistant reply
    pub model: Option<String>,
    pub at: DateTime<Local>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            model: None,
            at: Local::now(),
        }
    }

    pub fn assistant(text: impl Into<String>, model: Option<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            model,
            at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub pending: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegrationFocus {
    #[default]
    CoderAccounts,
    Workspaces,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationsState {
    pub github: LoadState<GithubView>,
    pub coder_accounts: LoadState<Vec<CoderAccount>>,
    pub workspaces: LoadState<Vec<CoderWorkspace>>,
    pub coder_cursor: usize,
    pub workspace_cursor: usize,
    pub focus: IntegrationFocus,
}

impl IntegrationsState {
    pub fn selected_coder_account(&self) -> Option<&CoderAccount> {
        self.coder_accounts.loaded()?.get(self.coder_cursor)
    }

    pub fn selected_workspace(&self) -> Option<&CoderWorkspace> {
        self.workspaces.loaded()?.get(self.workspace_cursor)
    }
}

/// Which dropdown of the PM settings modal has focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PmField {
    #[default]
    Account,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmSettingsModal {
    pub settings: LoadState<PmSettings>,
    /// Model to preselect once the model list arrives
    pub wanted_model: Option<String>,
    pub focus: PmField,
    /// Why the last save was refused
    pub hint: Option<String>,
}

/// Allow-list editor for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPickerModal {
    pub account: Account,
    pub available: LoadState<Vec<String>>,
    pub allow: ModelAllowList,
    pub default_model: Option<String>,
    pub cursor: usize,
    pub hint: Option<String>,
}

impl ModelPickerModal {
    pub fn new(account: Account) -> Self {
        let allow = account.allow_list();
        let default_model = account.model_name.clone().filter(|m| !m.is_empty());
        Self {
            account,
            available: LoadState::Loading,
            allow,
            default_model,
            cursor: 0,
            hint: None,
        }
    }

    pub fn models(&self) -> &[String] {
        self.available.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn highlighted(&self) -> Option<&String> {
        self.models().get(self.cursor)
    }

    /// Flip the highlighted model in or out of the allow-list
    pub fn toggle_highlighted(&mut self) {
        let Some(model) = self.highlighted().cloned() else {
            return;
        };
        let mut enabled = match &self.allow {
            ModelAllowList::All => self.models().to_vec(),
            ModelAllowList::Only(models) => models.clone(),
        };
        if let Some(pos) = enabled.iter().position(|m| *m == model) {
            enabled.remove(pos);
        } else {
            enabled.push(model);
        }
        self.allow = ModelAllowList::Only(enabled);
        self.hint = None;
    }

    pub fn toggle_all(&mut self) {
        self.allow = if self.allow.is_all() {
            ModelAllowList::Only(Vec::new())
        } else {
            ModelAllowList::All
        };
        self.hint = None;
    }

    pub fn set_default_highlighted(&mut self) {
        if let Some(model) = self.highlighted().cloned() {
            self.default_model = Some(model);
        }
    }

    /// Allow-list and default to send, or a validation message
    pub fn selection(&self) -> Result<(ModelAllowList, Option<String>), String> {
        if let ModelAllowList::Only(models) = &self.allow {
            if models.is_empty() {
                return Err("Select at least one model, or press 'a' to allow all".to_string());
            }
        }
        let default = self.allow.default_model(self.default_model.as_deref());
        Ok((self.allow.clone(), default))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserModal {
    pub browser: PathBrowser,
    /// Project whose `workspace_path` the selection is saved into
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteAccount { id: String },
    DeleteCoderAccount { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Blocking message that must be dismissed
    Notice { title: String, message: String },
    Form(FormState),
    PmSettings(PmSettingsModal),
    Models(ModelPickerModal),
    Browser(BrowserModal),
    Confirm {
        message: String,
        action: ConfirmAction,
    },
    Help,
}

impl Modal {
    pub fn notice(title: impl Into<String>, message: impl Into<String>) -> Self {
        Modal::Notice {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Complete dashboard state
#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub auth_form: FormState,
    pub panel: Panel,
    pub overview: LoadState<Overview>,
    pub projects: LoadState<Vec<Project>>,
    pub project_cursor: usize,
    pub accounts: LoadState<Vec<Account>>,
    pub account_cursor: usize,
    pub chat: ChatState,
    pub integrations: IntegrationsState,
    /// Modal stack; the last entry receives input
    pub modals: Vec<Modal>,
    pub status: Option<String>,
    /// Mirror of the saved chat assistant preference
    pub pm_pref: PmPreference,
    pub requests: RequestTracker,
    pub browser_config: BrowserConfig,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(signed_in: bool, pm_pref: PmPreference, browser_config: BrowserConfig) -> Self {
        Self {
            screen: if signed_in {
                Screen::Dashboard
            } else {
                Screen::Auth
            },
            auth_form: FormState::login(),
            panel: Panel::Overview,
            overview: LoadState::Idle,
            projects: LoadState::Idle,
            project_cursor: 0,
            accounts: LoadState::Idle,
            account_cursor: 0,
            chat: ChatState::default(),
            integrations: IntegrationsState::default(),
            modals: Vec::new(),
            status: None,
            pm_pref,
            requests: RequestTracker::new(),
            browser_config,
            should_quit: false,
        }
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modals.last()
    }

    pub fn modal_mut(&mut self) -> Option<&mut Modal> {
        self.modals.last_mut()
    }

    // Results land in their modal even when a notice is stacked on top

    pub fn pm_settings_modal_mut(&mut self) -> Option<&mut PmSettingsModal> {
        self.modals.iter_mut().rev().find_map(|modal| match modal {
            Modal::PmSettings(pm) => Some(pm),
            _ => None,
        })
    }

    pub fn model_picker_mut(&mut self) -> Option<&mut ModelPickerModal> {
        self.modals.iter_mut().rev().find_map(|modal| match modal {
            Modal::Models(picker) => Some(picker),
            _ => None,
        })
    }

    pub fn browser_modal_mut(&mut self) -> Option<&mut BrowserModal> {
        self.modals.iter_mut().rev().find_map(|modal| match modal {
            Modal::Browser(browser) => Some(browser),
            _ => None,
        })
    }

    /// Open "new account" form, which owns provider model probes
    pub fn new_account_form_mut(&mut self) -> Option<&mut FormState> {
        self.modals.iter_mut().rev().find_map(|modal| match modal {
            Modal::Form(form) if form.kind == FormKind::NewAccount => Some(form),
            _ => None,
        })
    }

    /// Whether the chat assistant can answer. Unknown until the overview loads.
    pub fn has_llm(&self) -> bool {
        match &self.overview {
            LoadState::Loaded(overview) => overview.has_llm(),
            _ => true,
        }
    }

    pub fn llm_status(&self) -> &str {
        match &self.overview {
            LoadState::Loaded(overview) if !overview.llm_status.is_empty() => &overview.llm_status,
            LoadState::Loaded(_) => NO_LLM_STATUS,
            _ => "…",
        }
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.loaded()?.get(self.project_cursor)
    }

    pub fn selected_account(&self) -> Option<&Account> {
        self.accounts.loaded()?.get(self.account_cursor)
    }

    /// Whether typed characters go into a text field instead of shortcuts
    pub fn is_text_entry(&self) -> bool {
        match (self.screen, self.modal()) {
            (Screen::Auth, _) => true,
            (_, Some(Modal::Form(_))) => true,
            (_, Some(_)) => false,
            (_, None) => self.panel == Panel::Chat,
        }
    }

    /// Drop every cached panel and return to the sign-in screen
    pub(super) fn reset_session(&mut self, hint: Option<String>) {
        let pm_pref = std::mem::take(&mut self.pm_pref);
        let browser_config = std::mem::take(&mut self.browser_config);
        // sequence numbers keep counting so late responses stay stale
        let mut requests = std::mem::take(&mut self.requests);
        requests.reset();
        *self = AppState::new(false, pm_pref, browser_config);
        self.requests = requests;
        self.auth_form.hint = hint;
    }
}

/// Keep a list cursor inside `len`
pub(super) fn clamp_cursor(cursor: &mut usize, len: usize) {
    if len == 0 {
        *cursor = 0;
    } else if *cursor >= len {
        *cursor = len - 1;
    }
}

pub(super) fn move_cursor(cursor: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *cursor = 0;
    } else if down {
        *cursor = (*cursor + 1) % len;
    } else {
        *cursor = (*cursor + len - 1) % len;
    }
}
