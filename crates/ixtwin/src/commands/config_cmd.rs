//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;
use serde::Serialize;
use tabled::Tabled;

use ixtwin_config::DEFAULT_PROFILE;
use ixtwin_core::config::DEFAULT_BACKEND_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unable to render config: {e}"))
}

fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.into())
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, expect: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expect}"),
    })
}

/// Apply `key = value` to `profile`.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "backend" | "url" => {
            url::Url::parse(&value).map_err(|_| CliError::Validation {
                field: "backend".into(),
                reason: format!("invalid URL: {value}"),
            })?;
            profile.backend = value;
        }
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number (seconds)")?),
        "poll_interval_secs" | "poll-interval" => {
            let secs: u64 = parse_value(key, &value, "a number (seconds)")?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: key.into(),
                    reason: "must be at least 1".into(),
                });
            }
            profile.poll_interval_secs = Some(secs);
        }
        "download_dir" | "download-dir" => profile.download_dir = Some(value.into()),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: backend, timeout, \
                     poll_interval_secs, download_dir, ca_cert, insecure"
                ),
            });
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ProfileEntry {
    name: String,
    backend: String,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Backend")]
    backend: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { name, url, force } => {
            let mut cfg = config::load_config()?;
            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::ProfileExists { name });
            }

            let backend = match url {
                Some(url) => url,
                None if std::io::stdin().is_terminal() => Input::new()
                    .with_prompt("Backend URL")
                    .default(DEFAULT_BACKEND_URL.to_owned())
                    .interact_text()
                    .map_err(prompt_err)?,
                None => DEFAULT_BACKEND_URL.to_owned(),
            };

            let mut profile = Profile::default();
            set_profile_key(&mut profile, "backend", backend)?;

            if cfg.profiles.is_empty() {
                cfg.default_profile = Some(name.clone());
            }
            cfg.profiles.insert(name.clone(), profile);
            let path = config::save_config(&cfg)?;

            output::print_note(
                &format!("✓ Profile '{name}' written to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config, format_config);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, value)?;

            save_config(&cfg)?;
            output::print_note(&format!("✓ Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                output::print_note("No profiles configured. Run: ixtwin config init", global.quiet);
                return Ok(());
            }
            let default = cfg.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE);
            let entries: Vec<ProfileEntry> = cfg
                .profiles
                .iter()
                .map(|(name, p)| ProfileEntry {
                    name: name.clone(),
                    backend: p.backend.clone(),
                    default: name == default,
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &entries,
                |e| ProfileRow {
                    name: e.name.clone(),
                    backend: e.backend.clone(),
                    default: if e.default { "*" } else { "" },
                },
                |e| e.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::print_note(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
