// ── Machine command session ──
//
// Interactive command execution against one machine at a time. Each
// open/close starts a new generation; a reply that arrives for an older
// generation is dropped instead of landing in the wrong session.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::gateway::RemoteControlGateway;
use crate::model::{CommandExecution, CommandReply};
use crate::stream::StateStream;

const EXEC_FAILURE: &str = "Failed to execute command";
const COMMAND_FAILED: &str = "Command failed";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// The machine commands run against. `None` when closed.
    pub target: Option<String>,
    /// The latest execution in this session, pending or complete.
    pub execution: Option<CommandExecution>,
    pub executing: bool,
    #[serde(skip)]
    generation: u64,
}

impl SessionState {
    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }
}

pub struct MachineCommandSession<G: RemoteControlGateway> {
    inner: Arc<SessionInner<G>>,
}

struct SessionInner<G> {
    gateway: Arc<G>,
    state: watch::Sender<SessionState>,
    teardown: CancellationToken,
}

impl<G: RemoteControlGateway> Clone for MachineCommandSession<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears `executing` when the request ends, unless the session has
/// since been reopened or closed.
struct ExecSlot<'a> {
    state: &'a watch::Sender<SessionState>,
    generation: u64,
}

impl Drop for ExecSlot<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            if s.generation == self.generation && s.executing {
                s.executing = false;
                true
            } else {
                false
            }
        });
    }
}

impl<G: RemoteControlGateway> MachineCommandSession<G> {
    pub fn new(gateway: Arc<G>, teardown: CancellationToken) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(SessionInner {
                gateway,
                state,
                teardown,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<SessionState> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Open a session on `target`, discarding any previous session and
    /// whatever it still had in flight.
    pub fn open(&self, target: &str) -> Result<(), CoreError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(CoreError::validation("No machine selected"));
        }
        self.inner.state.send_modify(|s| {
            s.generation = s.generation.wrapping_add(1);
            s.target = Some(target.to_owned());
            s.execution = None;
            s.executing = false;
        });
        debug!(machine = target, "command session opened");
        Ok(())
    }

    pub fn close(&self) {
        let was_open = self.inner.state.send_if_modified(|s| {
            let was_open = s.target.is_some() || s.executing;
            s.generation = s.generation.wrapping_add(1);
            s.target = None;
            s.execution = None;
            s.executing = false;
            was_open
        });
        if was_open {
            debug!("command session closed");
        }
    }

    /// Run `command` in the open session's machine.
    ///
    /// The completed execution also replaces the session's latest
    /// execution. A command the machine reports as failed comes back as
    /// [`CoreError::CommandFailed`].
    pub async fn execute(&self, command: &str) -> Result<CommandExecution, CoreError> {
        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }
        let command = command.trim();
        if command.is_empty() {
            return Err(CoreError::validation("Command must not be empty"));
        }

        let (slot, target) = self.begin(command)?;

        info!(machine = %target, command, "executing command");
        let reply = self.inner.gateway.execute_command(&target, command).await;
        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        let mut execution = CommandExecution::pending(&target, command);
        let failure = match reply {
            Ok(CommandReply::Success { output }) => {
                execution.output = Some(output);
                None
            }
            Ok(CommandReply::Failure { error }) => {
                let message = error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| COMMAND_FAILED.into());
                execution.error = Some(message.clone());
                Some(CoreError::CommandFailed { message })
            }
            Err(e) => {
                warn!(machine = %target, error = %e, "command execution failed");
                execution.error = Some(e.user_message_or(EXEC_FAILURE));
                Some(e)
            }
        };

        let applied = self.inner.state.send_if_modified(|s| {
            if s.generation == slot.generation {
                s.executing = false;
                s.execution = Some(execution.clone());
                true
            } else {
                false
            }
        });
        if !applied {
            debug!(machine = %target, "discarding reply for a closed session");
            return Err(CoreError::ShutDown);
        }

        match failure {
            None => Ok(execution),
            Some(err) => Err(err),
        }
    }

    fn begin(&self, command: &str) -> Result<(ExecSlot<'_>, String), CoreError> {
        let mut outcome = Err(CoreError::busy("execute", "no machine selected"));
        self.inner.state.send_if_modified(|s| {
            let Some(target) = s.target.clone() else {
                return false;
            };
            if s.executing {
                outcome = Err(CoreError::busy("execute", "a command is already running"));
                return false;
            }
            s.executing = true;
            s.execution = Some(CommandExecution::pending(&target, command));
            outcome = Ok((s.generation, target));
            true
        });
        let (generation, target) = outcome?;
        Ok((
            ExecSlot {
                state: &self.inner.state,
                generation,
            },
            target,
        ))
    }
}
