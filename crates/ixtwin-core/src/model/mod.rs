// ── Domain model ──
//
// Canonical types for the orchestration core, independent of the
// backend's wire format. Conversions from `ixtwin_api` live in `convert`.

pub mod command;
pub mod lifecycle;
pub mod machine;
pub mod resource;
pub mod rib;
pub mod status;

pub use command::{CommandExecution, CommandReply};
pub use lifecycle::{LifecycleAck, LifecyclePhase, LifecycleRequest, Notice, NoticeLevel};
pub use machine::MachineStats;
pub use resource::{ResourceFile, ResourceKind, ResourceSet};
pub use rib::{ComparisonResult, LiveRibDump, RouteServer, RouteServerKind};
pub use status::Status;
