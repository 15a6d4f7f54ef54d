use serde::Serialize;

/// Gateway reply to a command execution. A completed call may still
/// carry a logical failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Success { output: String },
    Failure { error: Option<String> },
}

/// A command run inside one machine within an open session.
///
/// Once complete, exactly one of `output` / `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandExecution {
    pub target: String,
    pub command: String,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl CommandExecution {
    pub(crate) fn pending(target: &str, command: &str) -> Self {
        Self {
            target: target.to_owned(),
            command: command.to_owned(),
            output: None,
            error: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.output.is_some() || self.error.is_some()
    }

    pub fn succeeded(&self) -> bool {
        self.output.is_some()
    }
}
