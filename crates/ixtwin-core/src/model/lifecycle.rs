use serde::Serialize;
use strum::{Display, IntoStaticStr};

/// A user intent against the emulation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifecycleRequest {
    Start { max_devices: Option<u32> },
    Stop,
    Reload { rs_only: bool, max_devices: Option<u32> },
}

impl LifecycleRequest {
    /// The phase the controller occupies while this request is in flight.
    pub fn phase(self) -> LifecyclePhase {
        match self {
            Self::Start { .. } => LifecyclePhase::Starting,
            Self::Stop => LifecyclePhase::Stopping,
            Self::Reload { .. } => LifecyclePhase::Reloading,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Stop => "stop",
            Self::Reload { .. } => "reload",
        }
    }

    /// The message shown when the backend failed without a detail.
    pub(crate) fn failure_fallback(self) -> &'static str {
        match self {
            Self::Start { .. } => "Failed to start digital twin",
            Self::Stop => "Failed to stop digital twin",
            Self::Reload { .. } => "Failed to reload digital twin",
        }
    }
}

/// Which lifecycle request, if any, is currently in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LifecyclePhase {
    #[default]
    Idle,
    Starting,
    Stopping,
    Reloading,
}

impl LifecyclePhase {
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// The last user-visible outcome of a lifecycle request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Acknowledgement of a mutating call. Acceptance only: the emulation's
/// actual state is whatever the next poll reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleAck {
    pub message: String,
    pub devices_count: Option<u32>,
}
