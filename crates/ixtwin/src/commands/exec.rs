//! Machine command execution handler.

use ixtwin_core::Twin;

use crate::cli::{ExecArgs, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(twin: &Twin, args: &ExecArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = twin.session();
    session.open(&args.machine)?;

    let command = util::join_command(&args.command);
    let execution = session.execute(&command).await;
    session.close();
    let execution = execution?;

    let out = output::render_single(
        &global.output,
        &execution,
        |e| e.output.clone().unwrap_or_default(),
        |e| e.output.clone().unwrap_or_default(),
    );
    output::print_output(out.trim_end(), global.quiet);
    Ok(())
}
