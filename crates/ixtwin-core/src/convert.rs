// ── Wire → domain conversions ──
//
// Translates `ixtwin_api` response types into the core model.

use std::collections::HashMap;

use ixtwin_api::{
    ActionResponse, ExecResponse, MachineStatsEntry, ResourceEntry, ResourceEntryKind,
    RibCompareResponse, StatusResponse,
};

use crate::model::{
    CommandReply, ComparisonResult, LifecycleAck, MachineStats, ResourceFile, ResourceKind, Status,
};

impl From<StatusResponse> for Status {
    fn from(s: StatusResponse) -> Self {
        Self {
            running: s.running,
            starting: s.starting,
            stopping: s.stopping,
            devices_count: s.devices_count,
            error: s.error,
        }
    }
}

impl From<ActionResponse> for LifecycleAck {
    fn from(r: ActionResponse) -> Self {
        Self {
            message: r.message.or(r.status).unwrap_or_default(),
            devices_count: r.devices_count,
        }
    }
}

impl From<ResourceEntry> for ResourceFile {
    fn from(e: ResourceEntry) -> Self {
        let kind = match e.kind {
            ResourceEntryKind::File => ResourceKind::File,
            ResourceEntryKind::Directory => ResourceKind::Directory,
        };
        Self { name: e.name, kind }
    }
}

impl From<ExecResponse> for CommandReply {
    fn from(r: ExecResponse) -> Self {
        if r.is_success() {
            Self::Success {
                output: r.output.unwrap_or_default(),
            }
        } else {
            Self::Failure { error: r.error }
        }
    }
}

impl From<RibCompareResponse> for ComparisonResult {
    fn from(r: RibCompareResponse) -> Self {
        Self {
            live_rib_lines: r.live_rib_lines,
            uploaded_rib_lines: r.uploaded_rib_lines,
            differences_count: r.differences_count,
            only_in_live: r.only_in_live,
            only_in_uploaded: r.only_in_uploaded,
            message: r.message.unwrap_or_default(),
        }
    }
}

/// Flatten the stats map, sorted case-insensitively by display name.
pub(crate) fn machine_stats_from(raw: HashMap<String, MachineStatsEntry>) -> Vec<MachineStats> {
    let mut out: Vec<MachineStats> = raw
        .into_iter()
        .map(|(id, e)| MachineStats {
            name: e.name.unwrap_or_else(|| id.clone()),
            id,
            status: e.status.unwrap_or_else(|| "unknown".into()),
            image: e.image.unwrap_or_default(),
            cpu_usage_pct: e.cpu_usage,
            memory_usage_mb: e.memory_usage,
            pids: e.pids,
        })
        .collect();
    out.sort_by_cached_key(|m| m.name.to_lowercase());
    out
}
