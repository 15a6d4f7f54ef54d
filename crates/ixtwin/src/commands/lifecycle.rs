//! Start, stop, and reload handlers.
//!
//! Each refreshes the status first so the controller judges the request
//! against the backend's current state, not the default snapshot.

use ixtwin_core::{LifecycleRequest, Twin};

use crate::cli::{GlobalOpts, ReloadArgs, StartArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn start(twin: &Twin, args: &StartArgs, global: &GlobalOpts) -> Result<(), CliError> {
    submit(
        twin,
        LifecycleRequest::Start {
            max_devices: args.max_devices,
        },
        "Starting digital twin...",
        global,
    )
    .await
}

pub async fn stop(twin: &Twin, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm("Stop the digital twin?", "stop", global.yes)? {
        return Ok(());
    }
    submit(twin, LifecycleRequest::Stop, "Stopping digital twin...", global).await
}

pub async fn reload(twin: &Twin, args: &ReloadArgs, global: &GlobalOpts) -> Result<(), CliError> {
    submit(
        twin,
        LifecycleRequest::Reload {
            rs_only: args.rs_only,
            max_devices: args.max_devices,
        },
        "Reloading digital twin...",
        global,
    )
    .await
}

async fn submit(
    twin: &Twin,
    request: LifecycleRequest,
    progress: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    twin.poller().try_refresh().await?;

    let ack = util::with_spinner(progress, global, twin.lifecycle().submit(request)).await?;

    // The controller's notice carries the fallback wording for an empty ack.
    let message = twin
        .lifecycle()
        .state()
        .notice
        .map_or_else(|| ack.message.clone(), |n| n.message);
    let rendered = output::render_single(
        &global.output,
        &ack,
        |_| message.clone(),
        |_| message.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
