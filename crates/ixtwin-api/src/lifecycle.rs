// Lifecycle endpoints
//
// Status polling, start/stop/reload, and the topology config document.

use tracing::debug;

use crate::client::TwinClient;
use crate::error::Error;
use crate::models::{ActionResponse, ReloadRequest, StartRequest, StatusResponse};

impl TwinClient {
    /// Fetch the backend's view of the emulation.
    ///
    /// `GET /status`
    pub async fn get_status(&self) -> Result<StatusResponse, Error> {
        self.get("status").await
    }

    /// Request a deployment, optionally limited to the first `max_devices`.
    ///
    /// `POST /start`
    pub async fn start(&self, max_devices: Option<u32>) -> Result<ActionResponse, Error> {
        debug!(?max_devices, "requesting start");
        self.post("start", &StartRequest { max_devices }).await
    }

    /// Request teardown of the running emulation.
    ///
    /// `POST /stop`
    pub async fn stop(&self) -> Result<ActionResponse, Error> {
        debug!("requesting stop");
        self.post_empty("stop").await
    }

    /// Re-apply configuration without a full restart. `rs_only` limits the
    /// reload to route-server configs.
    ///
    /// `POST /reload`
    pub async fn reload(
        &self,
        rs_only: bool,
        max_devices: Option<u32>,
    ) -> Result<ActionResponse, Error> {
        debug!(rs_only, ?max_devices, "requesting reload");
        self.post(
            "reload",
            &ReloadRequest {
                rs_only,
                max_devices,
            },
        )
        .await
    }

    /// Fetch the IXP topology config. An empty object means no config file
    /// is present on the backend.
    ///
    /// `GET /config/ixp`
    pub async fn get_ixp_config(&self) -> Result<serde_json::Value, Error> {
        self.get("config/ixp").await
    }
}
