// ixtwin-api: Async Rust client for the IXP digital twin control backend

pub mod client;
pub mod error;
pub mod lifecycle;
pub mod machines;
pub mod models;
pub mod resources;
pub mod rib;
pub mod transport;

pub use client::TwinClient;
pub use error::Error;
pub use models::{
    ActionResponse, ExecResponse, MachineStatsEntry, ResourceEntry, ResourceEntryKind,
    RibCompareResponse, StatusResponse, UploadFile, UploadResponse,
};
pub use transport::{TlsMode, TransportConfig};
