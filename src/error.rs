// src/error.rs

use std::fmt;

/// Shown whenever the server could not be reached or answered with garbage.
pub const NETWORK_ERROR_MESSAGE: &str = "Terjadi kesalahan saat menghubungi server";

/// Shown for failures the user cannot act on.
pub const GENERIC_ERROR_MESSAGE: &str = "Terjadi kesalahan";

pub const SESSION_EXPIRED_MESSAGE: &str = "Sesi tidak ditemukan, silakan masuk kembali";

/// Global Application Error Enum.
/// Every screen action resolves to `Result<_, AppError>`; the UI turns the error
/// into a toast via [`AppError::user_message`].
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    // Missing or malformed environment configuration
    Config(String),

    // Timeout, connection failure or unreadable response
    Network(String),

    // Business error reported by the server (`status: "error"` or non-200)
    Api(String),

    // Login accepted the credentials but the e-mail is not verified yet
    VerificationRequired { email: String, message: String },

    // Local input validation failed
    Validation(String),

    // Action not allowed in the current screen state
    InvalidState(String),

    // No stored session; the UI routes to sign-in
    Unauthenticated,

    // Secure storage read/write failure
    Storage(String),

    // Anything unexpected
    Internal(String),
}

impl AppError {
    /// Text suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            AppError::Api(msg)
            | AppError::Validation(msg)
            | AppError::InvalidState(msg)
            | AppError::Config(msg) => msg.clone(),
            AppError::VerificationRequired { message, .. } => message.clone(),
            AppError::Unauthenticated => SESSION_EXPIRED_MESSAGE.to_string(),
            AppError::Storage(_) | AppError::Internal(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "configuration error: {}", msg),
            AppError::Network(msg) => write!(f, "network error: {}", msg),
            AppError::Api(msg) => write!(f, "api error: {}", msg),
            AppError::VerificationRequired { email, .. } => {
                write!(f, "email verification required for {}", email)
            }
            AppError::Validation(msg) => write!(f, "validation error: {}", msg),
            AppError::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            AppError::Unauthenticated => write!(f, "no active session"),
            AppError::Storage(msg) => write!(f, "storage error: {}", msg),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// A stored record or payload that does not parse is treated as unexpected.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {}", err);
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage I/O error: {}", err);
        AppError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("invalid URL: {}", err))
    }
}

/// Reports the first failing field's message, which is what a form shows.
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()));

        AppError::Validation(first.unwrap_or_else(|| errors.to_string()))
    }
}
