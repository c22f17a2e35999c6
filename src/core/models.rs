//! Model allow-lists and provider defaults

/// Wildcard entry meaning "every model the provider offers"
pub const ALL_MODELS: &str = "*";

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const OLLAMA_LOCAL_ENDPOINT: &str = "http://localhost:11434/v1";

/// Which models an account may use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelAllowList {
    All,
    Only(Vec<String>),
}

impl ModelAllowList {
    /// Interpret an account's `enabled_models`. Missing, empty or wildcard lists
    /// permit everything.
    pub fn from_enabled(enabled: Option<&[String]>) -> Self {
        let Some(list) = enabled else {
            return ModelAllowList::All;
        };
        let models: Vec<String> = list
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        if models.is_empty() || models.iter().any(|m| m == ALL_MODELS) {
            ModelAllowList::All
        } else {
            let mut unique = Vec::with_capacity(models.len());
            for model in models {
                if !unique.contains(&model) {
                    unique.push(model);
                }
            }
            ModelAllowList::Only(unique)
        }
    }

    /// Parse a comma separated list as typed on the command line
    pub fn parse(input: &str) -> Self {
        let parts: Vec<String> = input.split(',').map(str::to_string).collect();
        Self::from_enabled(Some(&parts))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ModelAllowList::All)
    }

    pub fn permits(&self, model: &str) -> bool {
        match self {
            ModelAllowList::All => true,
            ModelAllowList::Only(models) => models.iter().any(|m| m == model),
        }
    }

    /// Keep only the available models this list permits, in server order
    pub fn restrict(&self, available: &[String]) -> Vec<String> {
        available
            .iter()
            .filter(|m| self.permits(m))
            .cloned()
            .collect()
    }

    /// Effective default: `preferred` when permitted, else the first allowed model
    pub fn default_model(&self, preferred: Option<&str>) -> Option<String> {
        let preferred = preferred.map(str::trim).filter(|m| !m.is_empty());
        match self {
            ModelAllowList::All => preferred.map(str::to_string),
            ModelAllowList::Only(models) => match preferred {
                Some(model) if self.permits(model) => Some(model.to_string()),
                _ => models.first().cloned(),
            },
        }
    }

    /// Value for `enabled_models` in a PATCH body
    pub fn to_enabled(&self) -> Vec<String> {
        match self {
            ModelAllowList::All => vec![ALL_MODELS.to_string()],
            ModelAllowList::Only(models) => models.clone(),
        }
    }
}

impl std::fmt::Display for ModelAllowList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelAllowList::All => write!(f, "all models"),
            ModelAllowList::Only(models) => write!(f, "{}", models.join(", ")),
        }
    }
}

/// Model an account falls back to when it has no `model_name`
pub fn provider_default_model(provider: &str) -> &'static str {
    match provider.trim().to_lowercase().as_str() {
        "openai" | "azure" => "gpt-4",
        "anthropic" => "claude-3-5-sonnet-20241022",
        "ollama" | "ollama-local" => "llama3.2",
        _ => "gpt-4",
    }
}

/// Endpoint to store for a new account: the typed value, else the provider default
pub fn default_endpoint(provider: &str, input: &str) -> String {
    let input = input.trim();
    if !input.is_empty() {
        return input.trim_end_matches('/').to_string();
    }
    match provider.trim() {
        "ollama-local" => OLLAMA_LOCAL_ENDPOINT.to_string(),
        _ => OPENAI_ENDPOINT.to_string(),
    }
}
