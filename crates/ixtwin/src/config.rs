//! CLI configuration: a thin wrapper around `ixtwin_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--backend, --timeout, etc.).

use std::path::PathBuf;
use std::time::Duration;

use ixtwin_core::{TlsVerification, TwinConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ixtwin_config::{
    Config, ConfigError, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// Everything a backend-bound command needs from configuration.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub twin: TwinConfig,
    pub download_dir: Option<PathBuf>,
}

/// Resolve the active profile and layer flag overrides on top.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let (profile_name, profile) = cfg
        .resolve_profile(global.profile.as_deref())
        .map_err(|e| match e {
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
            },
            other => other.into(),
        })?;

    let mut twin = profile.to_twin_config(&cfg.defaults)?;

    // 1. Backend URL (flag > env > profile)
    if let Some(ref url_str) = global.backend {
        twin.url = url_str.parse().map_err(|_| CliError::Validation {
            field: "backend".into(),
            reason: format!("invalid URL: {url_str}"),
        })?;
    }

    // 2. TLS verification
    if global.insecure {
        twin.tls = TlsVerification::DangerAcceptInvalid;
    }

    // 3. Timeout
    if let Some(secs) = global.timeout {
        twin.timeout = Duration::from_secs(secs);
    }

    Ok(Resolved {
        profile_name,
        twin,
        download_dir: profile.download_dir,
    })
}

/// Comma-separated profile names, for help text.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
