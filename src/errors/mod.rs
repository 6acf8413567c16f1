//! Error handling module for the favorites engine.
//!
//! Provides a centralized error type so the controller can tell user-actionable
//! failures (re-authenticate) apart from retryable ones (network, server).

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const AUTH_REQUIRED: &str = "AUTH_REQUIRED";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Authentication missing or expired; the user must re-authenticate
    AuthRequired(String),
    /// Transport-level failure (DNS, connect, timeout); retryable
    Network(String),
    /// Server returned a non-success status; retryable
    Server(String),
    /// Response body could not be decoded
    Decode(String),
    /// Resource not found (per-id tip lookup)
    NotFound(String),
    /// Durable storage unavailable; absorbed at the store layer, never shown
    Storage(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::AuthRequired(_) => codes::AUTH_REQUIRED,
            AppError::Network(_) => codes::NETWORK_ERROR,
            AppError::Server(_) => codes::SERVER_ERROR,
            AppError::Decode(_) => codes::DECODE_ERROR,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Storage(_) => codes::STORAGE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::AuthRequired(msg) => msg.clone(),
            AppError::Network(msg) => msg.clone(),
            AppError::Server(msg) => msg.clone(),
            AppError::Decode(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
        }
    }

    /// Whether this error should prompt re-authentication rather than a retry.
    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::AuthRequired(_))
    }

    /// Whether a plain retry is a sensible affordance for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Server(_))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            tracing::error!("Response decode error: {:?}", err);
            return AppError::Decode(format!("Decode error: {}", err));
        }
        tracing::error!("Network error: {:?}", err);
        AppError::Network(format!("Network error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Decode(format!("JSON error: {}", err))
    }
}
