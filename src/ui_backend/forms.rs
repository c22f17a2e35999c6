//! Text forms (auth, project, account, Coder connection)

use crate::api::{
    non_empty, Account, AccountPatch, CoderConnect, NewAccount, Project, ProjectDraft,
    ProjectPatch, ProviderModelsRequest, RegisterRequest,
};
use crate::core::models;

use super::effects::Mutation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
    NewProject,
    EditProject { id: String },
    NewAccount,
    RenameAccount { id: String },
    ConnectCoder,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Login => "Sign in",
            FormKind::Register => "Create account",
            FormKind::NewProject => "New project",
            FormKind::EditProject { .. } => "Edit project",
            FormKind::NewAccount => "Add AI account",
            FormKind::RenameAccount { .. } => "Rename account",
            FormKind::ConnectCoder => "Connect Coder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    /// Value the form opened with; edits send only changed fields
    pub initial: String,
    pub placeholder: &'static str,
    pub secret: bool,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            initial: String::new(),
            placeholder: "",
            secret: false,
        }
    }

    fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = text;
        self
    }

    fn value(mut self, value: Option<&str>) -> Self {
        let value = value.unwrap_or_default().to_string();
        self.initial = value.clone();
        self.value = value;
        self
    }

    fn changed(&self) -> Option<String> {
        if self.value.trim() == self.initial.trim() {
            None
        } else {
            Some(self.value.trim().to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    /// Validation message or probe result shown under the fields
    pub hint: Option<String>,
    pub submitting: bool,
}

impl FormState {
    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            hint: None,
            submitting: false,
        }
    }

    pub fn login() -> Self {
        Self::new(
            FormKind::Login,
            vec![FormField::new("Email"), FormField::new("Password").secret()],
        )
    }

    pub fn register() -> Self {
        Self::new(
            FormKind::Register,
            vec![
                FormField::new("Full name").placeholder("optional"),
                FormField::new("Email"),
                FormField::new("Password").secret(),
            ],
        )
    }

    pub fn new_project() -> Self {
        Self::new(
            FormKind::NewProject,
            vec![
                FormField::new("Name"),
                FormField::new("Description").placeholder("optional"),
                FormField::new("Remote URL").placeholder("optional git remote"),
            ],
        )
    }

    pub fn edit_project(project: &Project) -> Self {
        Self::new(
            FormKind::EditProject {
                id: project.id.clone(),
            },
            vec![
                FormField::new("Name").value(Some(project.name.as_str())),
                FormField::new("Description").value(project.description.as_deref()),
                FormField::new("Remote URL").value(project.remote_url.as_deref()),
                FormField::new("GitHub repo")
                    .placeholder("owner/name")
                    .value(project.github_repo.as_deref()),
                FormField::new("Production URL").value(project.production_url.as_deref()),
                FormField::new("Testing URL").value(project.testing_url.as_deref()),
                FormField::new("Workspace path").value(project.workspace_path.as_deref()),
            ],
        )
    }

    pub fn new_account() -> Self {
        Self::new(
            FormKind::NewAccount,
            vec![
                FormField::new("Provider")
                    .placeholder("openai, azure, anthropic, ollama, ollama-local")
                    .value(Some("openai")),
                FormField::new("Name").placeholder("optional"),
                FormField::new("API key").secret(),
                FormField::new("Endpoint").placeholder(models::OPENAI_ENDPOINT),
                FormField::new("Global (y/N)"),
            ],
        )
    }

    pub fn rename_account(account: &Account) -> Self {
        Self::new(
            FormKind::RenameAccount {
                id: account.id.clone(),
            },
            vec![FormField::new("Name")
                .placeholder("blank shows the provider")
                .value(account.name.as_deref())],
        )
    }

    pub fn connect_coder() -> Self {
        Self::new(
            FormKind::ConnectCoder,
            vec![
                FormField::new("Name").placeholder("optional"),
                FormField::new("Coder URL").placeholder("https://coder.example.com"),
                FormField::new("Token").secret(),
                FormField::new("Session token? (y/N)"),
            ],
        )
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.value.as_str())
            .unwrap_or_default()
    }

    fn yes(&self, index: usize) -> bool {
        matches!(
            self.value(index).trim().to_lowercase().as_str(),
            "y" | "yes" | "true" | "1"
        )
    }

    pub fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.clear();
        }
    }

    /// Request for probing a provider's models from the new account form
    pub fn provider_models_request(&self) -> Option<ProviderModelsRequest> {
        if self.kind != FormKind::NewAccount {
            return None;
        }
        let account = NewAccount::from_form(
            self.value(0),
            self.value(1),
            self.value(2),
            self.value(3),
            false,
        );
        Some(ProviderModelsRequest {
            provider: account.provider,
            api_key: account.api_key,
            api_endpoint: account.api_endpoint,
        })
    }

    /// Validate and turn the form into a write request
    pub fn submit(&self) -> Result<Mutation, String> {
        match &self.kind {
            FormKind::Login => {
                let email = required(self.value(0), "Email")?;
                let password = required(self.value(1), "Password")?;
                Ok(Mutation::Login { email, password })
            }
            FormKind::Register => {
                let email = required(self.value(1), "Email")?;
                let password = required(self.value(2), "Password")?;
                Ok(Mutation::Register(RegisterRequest {
                    email,
                    password,
                    full_name: non_empty(self.value(0)),
                }))
            }
            FormKind::NewProject => {
                let mut draft = ProjectDraft::new(required(self.value(0), "Name")?);
                draft.description = non_empty(self.value(1));
                draft.remote_url = non_empty(self.value(2));
                Ok(Mutation::CreateProject(draft))
            }
            FormKind::EditProject { id } => {
                required(self.value(0), "Name")?;
                let changed = |i: usize| self.fields.get(i).and_then(FormField::changed);
                let patch = ProjectPatch {
                    name: changed(0),
                    description: changed(1),
                    remote_url: changed(2),
                    github_repo: changed(3),
                    production_url: changed(4),
                    testing_url: changed(5),
                    workspace_path: changed(6),
                    ..Default::default()
                };
                if patch.is_empty() {
                    return Err("Nothing changed".to_string());
                }
                Ok(Mutation::UpdateProject {
                    id: id.clone(),
                    patch,
                })
            }
            FormKind::NewAccount => {
                let account = NewAccount::from_form(
                    self.value(0),
                    self.value(1),
                    self.value(2),
                    self.value(3),
                    self.yes(4),
                );
                Ok(Mutation::CreateAccount(account))
            }
            FormKind::RenameAccount { id } => Ok(Mutation::UpdateAccount {
                id: id.clone(),
                patch: AccountPatch::rename(self.value(0)),
            }),
            FormKind::ConnectCoder => {
                let url = required(self.value(1), "Coder URL")?;
                let token = required(self.value(2), "Token")?;
                Ok(Mutation::CoderConnect {
                    request: CoderConnect {
                        name: non_empty(self.value(0)),
                        url: url.trim_end_matches('/').to_string(),
                        token,
                    },
                    exchange: self.yes(3),
                })
            }
        }
    }
}

fn required(value: &str, label: &str) -> Result<String, String> {
    non_empty(value).ok_or_else(|| format!("{} is required", label))
}
