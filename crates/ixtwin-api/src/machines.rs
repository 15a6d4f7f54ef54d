// Machine endpoints
//
// Command execution inside emulated machines and per-container stats.

use std::collections::HashMap;

use tracing::debug;

use crate::client::TwinClient;
use crate::error::Error;
use crate::models::{ExecRequest, ExecResponse, MachineStatsEntry, MachineStatsResponse};

impl TwinClient {
    /// Run a shell command inside `machine`.
    ///
    /// A logical failure is reported with HTTP 200 and `status != "success"`;
    /// inspect [`ExecResponse::is_success`].
    ///
    /// `POST /machines/exec`
    pub async fn execute_command(
        &self,
        machine: &str,
        command: &str,
    ) -> Result<ExecResponse, Error> {
        debug!(machine, command, "executing machine command");
        self.post(
            "machines/exec",
            &ExecRequest {
                machine_name: machine,
                command,
            },
        )
        .await
    }

    /// Container statistics keyed by machine id.
    ///
    /// `GET /machines/stats`
    pub async fn machine_stats(&self) -> Result<HashMap<String, MachineStatsEntry>, Error> {
        let resp: MachineStatsResponse = self.get("machines/stats").await?;
        Ok(resp.machines)
    }
}
