// ixtwin-core: Orchestration layer between ixtwin-api and its consumers (CLI).

pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod model;
pub mod poller;
pub mod rib;
pub mod session;
pub mod stream;
pub mod twin;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{CatalogState, ResourceCatalog};
pub use config::{TlsVerification, TwinConfig};
pub use error::CoreError;
pub use gateway::RemoteControlGateway;
pub use lifecycle::{LifecycleController, LifecycleState};
pub use poller::StatusPoller;
pub use rib::{RibActivity, RibComparisonWorkflow, RibState};
pub use session::{MachineCommandSession, SessionState};
pub use stream::{StateStream, StateWatchStream};
pub use twin::Twin;

pub use ixtwin_api::{TwinClient, UploadFile};

pub use model::{
    CommandExecution, CommandReply, ComparisonResult, LifecycleAck, LifecyclePhase,
    LifecycleRequest, LiveRibDump, MachineStats, Notice, NoticeLevel, ResourceFile, ResourceKind,
    ResourceSet, RouteServer, RouteServerKind, Status,
};
