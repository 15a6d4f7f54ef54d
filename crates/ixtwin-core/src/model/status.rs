use serde::{Deserialize, Serialize};

/// The backend's view of the emulation, replaced wholesale on every poll.
///
/// `running` implies `!starting`, and at most one of `starting` /
/// `stopping` is set. Both are guaranteed by the backend, not checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub running: bool,
    pub starting: bool,
    pub stopping: bool,
    pub devices_count: Option<u32>,
    pub error: Option<String>,
}

impl Status {
    /// Merge rule for a failed poll: every field of the last good status
    /// is kept except `error`, which takes the failure's message.
    pub fn after_failed_poll(&self, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..self.clone()
        }
    }

    /// Whether there is anything for `stop` to act on.
    pub fn is_active(&self) -> bool {
        self.running || self.starting
    }
}
