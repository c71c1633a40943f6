use serde::Deserialize;
use std::fmt;

use crate::policy::Capability;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    AuthenticationFailure(String),
    AuthorizationDenied { capability: Capability, reason: String },
    /// The server refused an action the local policy allowed.
    Forbidden(String),
    TransientGateway(String),
    StaleSession(String),
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    Storage(String),
    Config(String),
}

/// Error body returned by the remote services. Spring endpoints answer with
/// `message`, the gateway with `error`.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|msg| !msg.trim().is_empty())
    }
}

impl AppError {
    pub fn denied(capability: Capability, reason: impl Into<String>) -> Self {
        AppError::AuthorizationDenied {
            capability,
            reason: reason.into(),
        }
    }

    /// Transient gateway failures are the only ones worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientGateway(_))
    }

    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AppError::StaleSession(_))
    }

    /// Message without the category prefix, suitable for inline display.
    pub fn message(&self) -> String {
        match self {
            AppError::AuthenticationFailure(msg)
            | AppError::TransientGateway(msg)
            | AppError::StaleSession(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::Storage(msg)
            | AppError::Config(msg) => msg.clone(),
            AppError::AuthorizationDenied { reason, .. } => reason.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::AuthenticationFailure(msg) => write!(f, "Authentication Failed: {}", msg),
            AppError::AuthorizationDenied { capability, reason } => {
                write!(f, "Not Authorized ({}): {}", capability, reason)
            }
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::TransientGateway(msg) => write!(f, "Gateway Error: {}", msg),
            AppError::StaleSession(msg) => write!(f, "Session Expired: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::TransientGateway(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("Malformed stored credentials: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
