//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ixtwin_config::ConfigError;
use ixtwin_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(ixtwin::connection_failed),
        help(
            "Check that the digital twin backend is running and reachable.\n\
             Override the URL with --backend or IXTWIN_BACKEND."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(ixtwin::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Backend ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(ixtwin::not_found))]
    NotFound { message: String },

    #[error("Backend error: {message}")]
    #[diagnostic(code(ixtwin::backend))]
    Backend { message: String },

    #[error("{message}")]
    #[diagnostic(code(ixtwin::command_failed))]
    CommandFailed { message: String },

    /// Another operation is already running against the twin.
    #[error("{message}")]
    #[diagnostic(
        code(ixtwin::busy),
        help("Wait for the current operation to finish, then retry.")
    )]
    Busy { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ixtwin::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ixtwin::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ixtwin config init --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Profile '{name}' already exists")]
    #[diagnostic(
        code(ixtwin::profile_exists),
        help("Pass --force to overwrite it.")
    )]
    ProfileExists { name: String },

    #[error(transparent)]
    #[diagnostic(code(ixtwin::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(ixtwin::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Operation cancelled")]
    #[diagnostic(code(ixtwin::cancelled))]
    Cancelled,

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(ixtwin::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Busy { .. } | Self::ProfileExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Backend {
                message,
                status: Some(404),
            } => CliError::NotFound { message },

            CoreError::Backend { message, status } => CliError::Backend {
                message: if message.is_empty() {
                    status.map_or_else(|| "request failed".into(), |s| format!("HTTP {s}"))
                } else {
                    message
                },
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            err @ CoreError::Busy { .. } => CliError::Busy {
                message: err.to_string(),
            },

            CoreError::CommandFailed { message } => CliError::CommandFailed { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::ShutDown => CliError::Cancelled,

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_maps_to_conflict() {
        let err: CliError = CoreError::Busy {
            operation: "start",
            reason: "digital twin is already running".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(
            err.to_string(),
            "Cannot start: digital twin is already running"
        );
    }

    #[test]
    fn missing_resource_maps_to_not_found() {
        let err: CliError = CoreError::Backend {
            message: "File not found".into(),
            status: Some(404),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn backend_without_detail_names_the_status() {
        let err: CliError = CoreError::Backend {
            message: String::new(),
            status: Some(502),
        }
        .into();
        assert_eq!(err.to_string(), "Backend error: HTTP 502");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
