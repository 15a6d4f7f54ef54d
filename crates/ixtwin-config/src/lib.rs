//! Shared configuration for the ixtwin tools.
//!
//! TOML profiles with environment overrides, and translation to
//! `ixtwin_core::TwinConfig`. The CLI layers its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ixtwin_core::config::{DEFAULT_BACKEND_URL, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use ixtwin_core::{TlsVerification, TwinConfig};

pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Status poll period in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://localhost:8000").
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override status poll period (seconds).
    pub poll_interval_secs: Option<u64>,

    /// Where `rib download` writes dumps when `--out-dir` is not given.
    pub download_dir: Option<PathBuf>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            timeout: None,
            poll_interval_secs: None,
            download_dir: None,
            ca_cert: None,
            insecure: None,
        }
    }
}

fn default_backend() -> String {
    DEFAULT_BACKEND_URL.into()
}

impl Config {
    /// Resolve the profile to use.
    ///
    /// An explicitly requested profile must exist. Otherwise the
    /// configured default is used, falling back to built-in defaults when
    /// no such profile is defined.
    pub fn resolve_profile(&self, requested: Option<&str>) -> Result<(String, Profile), ConfigError> {
        if let Some(name) = requested {
            return self
                .profiles
                .get(name)
                .cloned()
                .map(|p| (name.to_owned(), p))
                .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() });
        }

        let name = self
            .default_profile
            .clone()
            .unwrap_or_else(|| DEFAULT_PROFILE.into());
        let profile = self.profiles.get(&name).cloned().unwrap_or_default();
        Ok((name, profile))
    }
}

impl Profile {
    /// Build a `TwinConfig` from this profile and the global defaults.
    pub fn to_twin_config(&self, defaults: &Defaults) -> Result<TwinConfig, ConfigError> {
        let url: url::Url = self.backend.parse().map_err(|_| ConfigError::Validation {
            field: "backend".into(),
            reason: format!("invalid URL: {}", self.backend),
        })?;

        let tls = if self.insecure.unwrap_or(false) {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let poll_secs = self.poll_interval_secs.unwrap_or(defaults.poll_interval_secs);
        if poll_secs == 0 {
            return Err(ConfigError::Validation {
                field: "poll_interval_secs".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(TwinConfig {
            url,
            tls,
            timeout: Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)),
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ixtwin", "ixtwin").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ixtwin");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + `IXTWIN_`-prefixed environment. Nested keys are
/// separated by a double underscore (`IXTWIN_DEFAULTS__TIMEOUT=10`).
/// A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("IXTWIN_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.defaults.poll_interval_secs, 3);
        assert_eq!(config.defaults.timeout, 30);

        let (name, profile) = config.resolve_profile(None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.backend, "http://localhost:8000");
    }

    #[test]
    fn profiles_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
timeout = 10

[profiles.lab]
backend = "http://twin.lab:8000"
poll_interval_secs = 5
download_dir = "/tmp/ribs"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        let (name, profile) = config.resolve_profile(None).unwrap();
        assert_eq!(name, "lab");

        let twin = profile.to_twin_config(&config.defaults).unwrap();
        assert_eq!(twin.url.as_str(), "http://twin.lab:8000/");
        assert_eq!(twin.timeout, Duration::from_secs(10));
        assert_eq!(twin.poll_interval, Duration::from_secs(5));
        assert_eq!(twin.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.resolve_profile(Some("prod")),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn invalid_backend_url_is_rejected() {
        let profile = Profile {
            backend: "not a url".into(),
            ..Profile::default()
        };
        assert!(matches!(
            profile.to_twin_config(&Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let profile = Profile {
            insecure: Some(true),
            ca_cert: Some("/etc/ssl/lab.pem".into()),
            ..Profile::default()
        };
        let twin = profile.to_twin_config(&Defaults::default()).unwrap();
        assert_eq!(twin.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                backend: "http://10.0.0.9:8000".into(),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles, config.profiles);
    }
}
