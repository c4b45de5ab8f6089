// src/errors.rs

use thiserror::Error;

/// Failures of a single call against the GLTCH Cloud API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The server answered 401. The stored token has already been cleared.
    #[error("Session expired, login required")]
    AuthExpired,

    #[error("Request failed ({status}): {detail}")]
    RequestFailed { status: u16, detail: String },

    #[error("API unreachable: {0}")]
    Unreachable(String),

    #[error("Failed to decode API response: {0}")]
    Decode(String),

    /// No client was bound to the chat panel.
    #[error("No API client configured")]
    NotConfigured,
}

impl ApiError {
    pub fn request_failed(status: u16, detail: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            detail: detail.into(),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}

/// Reasons a chat send was not issued, plus features the panel does not offer yet.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatError {
    #[error("Empty input")]
    EmptyInput,

    #[error("A request is already in flight")]
    Busy,

    #[error("Loading session history is not implemented")]
    HistoryNotImplemented,
}

#[derive(Error, Debug)]
pub enum GltchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl GltchError {
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }
}

impl From<std::io::Error> for GltchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GltchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<flexi_logger::FlexiLoggerError> for GltchError {
    fn from(err: flexi_logger::FlexiLoggerError) -> Self {
        Self::Logging(err.to_string())
    }
}

pub type GltchResult<T> = Result<T, GltchError>;
