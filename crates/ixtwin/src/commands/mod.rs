//! Command dispatch: bridges CLI args -> core components -> output formatting.

pub mod config_cmd;
pub mod exec;
pub mod files;
pub mod lifecycle;
pub mod machines;
pub mod rib;
pub mod status;
pub mod util;

use ixtwin_core::Twin;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    twin: &Twin,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(twin, &args, global).await,
        Command::Start(args) => lifecycle::start(twin, &args, global).await,
        Command::Stop => lifecycle::stop(twin, global).await,
        Command::Reload(args) => lifecycle::reload(twin, &args, global).await,
        Command::Files(args) => files::handle(twin, args, global).await,
        Command::Rib(args) => rib::handle(twin, args, resolved, global).await,
        Command::Exec(args) => exec::handle(twin, &args, global).await,
        Command::Machines => machines::handle(twin, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
