//! Typed errors for Fulcrum API calls
//!
//! Callers need to tell apart the failures the dashboard reacts to differently:
//! - `Unauthorized` (401 on an authenticated call) forces a logout
//! - `Conflict` (409) means a remote workspace is not running
//! - `Application` is any other non-2xx with the server's `detail` text
//! - `Network` means the request never got a response

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, ...
    #[error("Network error: {0}")]
    Network(String),

    /// Bearer token expired or invalid (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Target resource is not in a usable state (HTTP 409)
    #[error("{0}")]
    Conflict(String),

    /// Non-2xx response with a server-provided message
    #[error("{detail}")]
    Application { status: u16, detail: String },

    /// 2xx response whose body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// An authenticated call was attempted without a stored token
    #[error("Not signed in. Run `fulcrum login` first.")]
    MissingToken,
}

/// FastAPI error body: `detail` is a string, or a list for validation errors
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl ApiError {
    /// Map a non-2xx status and raw body into a typed error
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = extract_detail(body).unwrap_or_else(|| default_detail(status));
        match status {
            401 => ApiError::Unauthorized(detail),
            409 => ApiError::Conflict(detail),
            _ => ApiError::Application { status, detail },
        }
    }

    /// Convert transport failures into `Network`
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            ApiError::Network(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// True for failures that must end the session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::MissingToken)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Server detail text without the variant prefix
    pub fn detail(&self) -> String {
        match self {
            ApiError::Network(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Conflict(msg)
            | ApiError::Decode(msg) => msg.clone(),
            ApiError::Application { detail, .. } => detail.clone(),
            ApiError::MissingToken => self.to_string(),
        }
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn default_detail(status: u16) -> String {
    match status {
        401 => "Not authenticated".to_string(),
        404 => "Not found".to_string(),
        409 => "Conflict".to_string(),
        500..=599 => "Internal error".to_string(),
        _ => format!("HTTP {}", status),
    }
}
