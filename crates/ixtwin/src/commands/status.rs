//! Status command handler.

use std::fmt::Write as _;

use ixtwin_core::{Status, Twin};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output::{self, Tone};

/// Short state word, most transient first.
pub fn state_label(status: &Status) -> &'static str {
    if status.stopping {
        "stopping"
    } else if status.starting {
        "starting"
    } else if status.running {
        "running"
    } else {
        "stopped"
    }
}

fn state_tone(status: &Status) -> Tone {
    match state_label(status) {
        "running" => Tone::Good,
        "starting" | "stopping" => Tone::Pending,
        _ => Tone::Dim,
    }
}

fn detail(status: &Status, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "State:    {}",
        output::paint(state_label(status), state_tone(status), color)
    );
    let devices = status
        .devices_count
        .map_or_else(|| "-".to_owned(), |n| n.to_string());
    let _ = write!(out, "Devices:  {devices}");
    if let Some(ref error) = status.error {
        let _ = write!(out, "\nError:    {}", output::paint(error, Tone::Bad, color));
    }
    out
}

fn render(status: &Status, global: &GlobalOpts) -> String {
    let color = output::should_color(&global.color);
    output::render_single(
        &global.output,
        status,
        |s| detail(s, color),
        |s| state_label(s).to_owned(),
    )
}

pub async fn handle(twin: &Twin, args: &StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !args.watch {
        let status = twin.poller().try_refresh().await?;
        output::print_output(&render(&status, global), global.quiet);
        return Ok(());
    }

    // Watch mode: every poll failure is already merged into the status
    // shown, so only the first fetch decides whether the backend exists.
    let first = twin.poller().try_refresh().await?;
    output::print_output(&render(&first, global), global.quiet);
    let mut updates = twin.poller().subscribe();
    twin.poller().start().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = updates.changed() => match next {
                Some(status) => output::print_output(&render(&status, global), global.quiet),
                None => break,
            },
        }
    }

    twin.poller().stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_states_win_over_running() {
        let stopping = Status {
            running: true,
            stopping: true,
            ..Status::default()
        };
        assert_eq!(state_label(&stopping), "stopping");
        assert_eq!(state_label(&Status::default()), "stopped");
    }

    #[test]
    fn detail_lists_error_last() {
        let status = Status {
            running: true,
            devices_count: Some(12),
            error: Some("Failed to connect to backend".into()),
            ..Status::default()
        };
        assert_eq!(
            detail(&status, false),
            "State:    running\nDevices:  12\nError:    Failed to connect to backend"
        );
    }
}
