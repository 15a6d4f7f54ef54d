use serde::Serialize;

/// Resource usage of one emulated machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineStats {
    pub id: String,
    pub name: String,
    pub status: String,
    pub image: String,
    pub cpu_usage_pct: Option<f64>,
    pub memory_usage_mb: Option<f64>,
    pub pids: Option<u64>,
}

impl MachineStats {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}
