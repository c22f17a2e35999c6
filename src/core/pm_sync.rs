//! Chat assistant (PM) account and model selection
//!
//! The saved preference is two independent local keys, so it can drift from
//! the server: accounts get deleted, allow-lists get narrowed. Everything here
//! reconciles the saved pair against what the server currently reports.

use async_trait::async_trait;

use crate::api::{Account, ApiError};

/// Locally saved chat assistant selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PmPreference {
    pub account_id: Option<String>,
    pub model: Option<String>,
}

impl PmPreference {
    pub fn new(account_id: impl Into<String>, model: Option<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            model,
        }
    }

    /// Neither key is stored
    pub fn is_empty(&self) -> bool {
        self.account_id.is_none() && self.model.is_none()
    }

    /// Exactly one of the two keys is stored
    pub fn is_partial(&self) -> bool {
        self.account_id.is_some() != self.model.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.account_id.is_some() && self.model.is_some()
    }
}

/// State of the model dropdown in the settings modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelector {
    /// No account picked yet
    AwaitingAccount,
    Loading,
    Ready { models: Vec<String> },
    /// Disabled with a message; dependent UI keeps working
    Failed { message: String },
}

impl ModelSelector {
    pub fn from_result(result: Result<Vec<String>, ApiError>) -> Self {
        match result {
            Ok(models) => ModelSelector::Ready { models },
            Err(err) => ModelSelector::Failed {
                message: model_load_failure(&err),
            },
        }
    }

    pub fn models(&self) -> &[String] {
        match self {
            ModelSelector::Ready { models } => models,
            _ => &[],
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ModelSelector::Ready { models } if !models.is_empty())
    }
}

/// User-visible text for a failed model list fetch
pub fn model_load_failure(err: &ApiError) -> String {
    if err.is_network() {
        "Network error loading models. Please check your connection and try again.".to_string()
    } else {
        format!(
            "Could not load models: {}\n\nPlease verify your API endpoint and credentials are correct.",
            err.detail()
        )
    }
}

/// Saved account id, if the server still knows it
pub fn resolve_saved_account(accounts: &[Account], saved: Option<&str>) -> Option<String> {
    let saved = saved?;
    accounts
        .iter()
        .find(|a| a.id == saved)
        .map(|a| a.id.clone())
}

/// Saved model, if it is still offered
pub fn resolve_saved_model(models: &[String], saved: Option<&str>) -> Option<String> {
    let saved = saved?;
    models.iter().find(|m| *m == saved).cloned()
}

/// Preference to store after an account is created. Only the first account
/// created without any saved preference becomes the assistant's account.
pub fn preference_for_new_account(existing: &PmPreference, account: &Account) -> Option<PmPreference> {
    if !existing.is_empty() || account.id.is_empty() {
        return None;
    }
    Some(PmPreference::new(account.id.clone(), account.default_model()))
}

/// Preference to store after an account's allow-list or default model
/// changed. Returns `None` when the saved pair is still valid.
pub fn reconcile_after_edit(pref: &PmPreference, account: &Account) -> Option<PmPreference> {
    if pref.account_id.as_deref() != Some(account.id.as_str()) {
        return None;
    }
    let allow = account.allow_list();
    match pref.model.as_deref() {
        Some(model) if allow.permits(model) => None,
        _ => {
            let replacement = account.default_model();
            if replacement == pref.model {
                return None;
            }
            Some(PmPreference {
                account_id: pref.account_id.clone(),
                model: replacement,
            })
        }
    }
}

/// Anything that can list the models the assistant may use through an account
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn models_for(&self, account_id: &str) -> Result<Vec<String>, ApiError>;
}

/// Contents of the PM settings modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmSettings {
    pub accounts: Vec<Account>,
    pub account_id: Option<String>,
    pub selector: ModelSelector,
    pub model: Option<String>,
}

impl PmSettings {
    /// Settings with the saved account resolved; models still to be fetched
    pub fn new(accounts: Vec<Account>, saved: &PmPreference) -> Self {
        let account_id = resolve_saved_account(&accounts, saved.account_id.as_deref());
        let selector = if account_id.is_some() {
            ModelSelector::Loading
        } else {
            ModelSelector::AwaitingAccount
        };
        Self {
            accounts,
            account_id,
            selector,
            model: None,
        }
    }

    /// Pick a different account; the model list has to be refetched
    pub fn select_account(&mut self, account_id: Option<String>) {
        self.account_id = account_id.filter(|id| self.accounts.iter().any(|a| &a.id == id));
        self.model = None;
        self.selector = if self.account_id.is_some() {
            ModelSelector::Loading
        } else {
            ModelSelector::AwaitingAccount
        };
    }

    /// Store fetched models and keep `wanted` only if it is offered
    pub fn apply_models(&mut self, result: Result<Vec<String>, ApiError>, wanted: Option<&str>) {
        self.selector = ModelSelector::from_result(result);
        self.model = resolve_saved_model(self.selector.models(), wanted);
    }

    pub fn select_model(&mut self, model: Option<String>) {
        self.model = model.filter(|m| self.selector.models().contains(m));
    }

    pub fn selected_account(&self) -> Option<&Account> {
        let id = self.account_id.as_deref()?;
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Preference to save; both the account and the model must be chosen
    pub fn to_preference(&self) -> Result<PmPreference, String> {
        match (&self.account_id, &self.model) {
            (Some(account_id), Some(model)) => Ok(PmPreference {
                account_id: Some(account_id.clone()),
                model: Some(model.clone()),
            }),
            (None, _) => Err("Select an account first".to_string()),
            (Some(_), None) => Err(match &self.selector {
                ModelSelector::Loading => "Wait for the model list to load".to_string(),
                ModelSelector::Failed { message } => message.clone(),
                _ => "Select a model first".to_string(),
            }),
        }
    }
}

/// Resolve the saved preference against the server. Only an authorization
/// failure is returned as an error; model fetch failures degrade the selector.
pub async fn load_pm_settings<S>(
    source: &S,
    accounts: Vec<Account>,
    saved: &PmPreference,
) -> Result<PmSettings, ApiError>
where
    S: ModelSource + ?Sized,
{
    let mut settings = PmSettings::new(accounts, saved);
    let Some(account_id) = settings.account_id.clone() else {
        tracing::debug!("No saved PM account matches the server's accounts");
        return Ok(settings);
    };

    let result = source.models_for(&account_id).await;
    if let Err(err) = &result {
        if err.is_unauthorized() {
            return Err(err.clone());
        }
        tracing::warn!("Failed to load models for {}: {}", account_id, err);
    }
    settings.apply_models(result, saved.model.as_deref());
    Ok(settings)
}
