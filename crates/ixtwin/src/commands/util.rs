//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Run `fut` behind a spinner on interactive table output.
pub async fn with_spinner<F, T>(message: &str, global: &GlobalOpts, fut: F) -> T
where
    F: Future<Output = T>,
{
    let interactive = !global.quiet
        && matches!(global.output, OutputFormat::Table)
        && std::io::stderr().is_terminal();
    if !interactive {
        return fut.await;
    }

    let spinner = ProgressBar::new_spinner().with_message(message.to_owned());
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    spinner.finish_and_clear();
    out
}

/// Join trailing command words back into one command line.
pub fn join_command(words: &[String]) -> String {
    words.join(" ")
}
