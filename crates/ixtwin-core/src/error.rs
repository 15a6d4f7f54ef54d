// ── Core error types ──
//
// User-facing errors from ixtwin-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<ixtwin_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// Three kinds reach callers: the call did not complete (`ConnectionFailed`,
/// `Timeout`, `Backend`, `Internal`), a local precondition rejected the
/// request before anything was sent (`Validation`, `Busy`), or the call
/// completed but reported a logical failure (`CommandFailed`).
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport / backend ──────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend error: {message}")]
    Backend {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local preconditions ──────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Cannot {operation}: {reason}")]
    Busy {
        operation: &'static str,
        reason: String,
    },

    // ── Logical failures ─────────────────────────────────────────────
    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    /// The owning component was torn down, or its session closed, before
    /// the result arrived.
    #[error("Component shut down")]
    ShutDown,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn busy(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Busy {
            operation,
            reason: reason.into(),
        }
    }

    /// The message to show a user. Backend details, validation messages,
    /// and command errors are shown verbatim; anything else falls back
    /// to `fallback`.
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            Self::Backend { message, .. }
            | Self::Validation { message }
            | Self::CommandFailed { message }
                if !message.is_empty() =>
            {
                message.clone()
            }
            Self::Busy { .. } => self.to_string(),
            _ => fallback.to_owned(),
        }
    }

    /// Returns `true` for failures raised before any request was issued.
    pub fn is_rejected_locally(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Busy { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ixtwin_api::Error> for CoreError {
    fn from(err: ixtwin_api::Error) -> Self {
        match err {
            ixtwin_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Backend {
                        message: String::new(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ixtwin_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ixtwin_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ixtwin_api::Error::Api { status, message } => CoreError::Backend {
                message,
                status: Some(status),
            },
            ixtwin_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
