use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. The platform shell matches on
// these, never on the human-readable message string.

/// Stable error code constants.
pub mod error_code {
    pub const NETWORK: &str = "NETWORK";
    pub const PARSE: &str = "PARSE";
    pub const REJECTED: &str = "REJECTED";
    pub const CAPTCHA_REQUIRED: &str = "CAPTCHA_REQUIRED";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const CONFIG: &str = "CONFIG";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ClientError ─────────────────────────────────────────────────────

/// Unified client error type shared by the repositories and stores.
///
/// Display is just the message, so a view-model can hand `to_string()`
/// straight to a toast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport failure (no response, timeout, non-2xx).
    #[error("{0}")]
    Network(String),

    /// Response arrived but could not be decoded.
    #[error("{0}")]
    Parse(String),

    /// The backend answered with an explicit error message.
    #[error("{0}")]
    Rejected(String),

    /// The backend wants a captcha before accepting the request.
    #[error("{0}")]
    CaptchaRequired(String),

    /// Local persistence failure.
    #[error("{0}")]
    Storage(String),

    /// Configuration could not be read or parsed.
    #[error("{0}")]
    Config(String),

    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

impl ClientError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Network(_) => error_code::NETWORK,
            ClientError::Parse(_) => error_code::PARSE,
            ClientError::Rejected(_) => error_code::REJECTED,
            ClientError::CaptchaRequired(_) => error_code::CAPTCHA_REQUIRED,
            ClientError::Storage(_) => error_code::STORAGE_ERROR,
            ClientError::Config(_) => error_code::CONFIG,
            ClientError::Internal(_) => error_code::INTERNAL,
        }
    }
}
