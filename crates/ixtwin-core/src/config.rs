// ── Runtime backend configuration ──
//
// Describes how to reach the control backend and how often to poll it.
// Core never reads config files: the CLI builds a `TwinConfig` from its
// profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use ixtwin_api::{TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy for HTTPS backends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab backends).
    DangerAcceptInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwinConfig {
    /// Backend base URL (e.g., `http://localhost:8000`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Status poll period.
    pub poll_interval: Duration,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl TwinConfig {
    pub fn with_url(url: Url) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                message: format!("unsupported URL scheme '{}'", self.url.scheme()),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(CoreError::Config {
                message: "poll interval must be greater than zero".into(),
            });
        }
        if self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "request timeout must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
