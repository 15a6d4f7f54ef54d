// Wire types for the digital twin backend.
//
// Field names follow the backend's snake_case JSON. Optional fields are
// defaulted so older backends that omit them still decode.

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

// ── Lifecycle ────────────────────────────────────────────────────────

/// `GET /status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    #[serde(default)]
    pub starting: bool,
    #[serde(default)]
    pub stopping: bool,
    #[serde(default)]
    pub devices_count: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /start`. `max_devices: null` means all devices.
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub max_devices: Option<u32>,
}

/// `POST /reload`
#[derive(Debug, Clone, Serialize)]
pub struct ReloadRequest {
    pub rs_only: bool,
    pub max_devices: Option<u32>,
}

/// Generic `{status, message, ...}` acknowledgement from a mutating call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub devices_count: Option<u32>,
}

// ── Resources ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceEntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceEntryKind,
}

/// `GET /resources/files`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ResourceFilesResponse {
    #[serde(default)]
    pub files: Vec<ResourceEntry>,
}

/// `GET /resources/rib-dumps`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RibDumpsResponse {
    #[serde(default)]
    pub rib_dumps: Vec<String>,
}

/// `POST /resources/upload` and `/resources/upload-directory`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub files_count: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One file to upload. For directory uploads `file_name` carries the
/// relative path (`dir/sub/file`), which the backend recreates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub contents: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }
}

// ── Machines ─────────────────────────────────────────────────────────

/// `POST /machines/exec`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ExecRequest<'a> {
    pub machine_name: &'a str,
    pub command: &'a str,
}

/// Command execution reply. HTTP 200 does not mean the command worked:
/// `status` is the logical discriminator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecResponse {
    pub status: String,
    #[serde(default)]
    pub machine_name: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// One entry of `GET /machines/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineStatsEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cpu_usage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub memory_usage: Option<f64>,
    #[serde(default)]
    pub pids: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MachineStatsResponse {
    #[serde(default)]
    pub machines: HashMap<String, MachineStatsEntry>,
}

// ── RIB ──────────────────────────────────────────────────────────────

/// `POST /rib/compare`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RibCompareRequest<'a> {
    pub route_server: &'a str,
    pub resource_file: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RibCompareResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub route_server: Option<String>,
    #[serde(default)]
    pub resource_file: Option<String>,
    pub live_rib_lines: u64,
    pub uploaded_rib_lines: u64,
    #[serde(default)]
    pub only_in_live: Vec<String>,
    #[serde(default)]
    pub only_in_uploaded: Vec<String>,
    pub differences_count: u64,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Container runtimes report usage as either a number or a numeric string.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrText {
        Num(f64),
        Text(String),
    }

    Ok(match Option::<NumOrText>::deserialize(deserializer)? {
        Some(NumOrText::Num(n)) => Some(n),
        Some(NumOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
