// ── Remote control gateway ──
//
// The capability the orchestration core depends on. Every call resolves
// to a value or a classified `CoreError`; nothing panics through it.
// `TwinClient` is the production implementation, tests supply their own.

use std::future::Future;

use ixtwin_api::{TwinClient, UploadFile};

use crate::convert::machine_stats_from;
use crate::error::CoreError;
use crate::model::{
    CommandReply, ComparisonResult, LifecycleAck, MachineStats, ResourceFile, Status,
};

/// Request/response access to the remote emulation.
///
/// These are the only suspension points in the core.
pub trait RemoteControlGateway: Send + Sync + 'static {
    fn get_status(&self) -> impl Future<Output = Result<Status, CoreError>> + Send;

    fn start(
        &self,
        max_devices: Option<u32>,
    ) -> impl Future<Output = Result<LifecycleAck, CoreError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<LifecycleAck, CoreError>> + Send;

    fn reload(
        &self,
        rs_only: bool,
        max_devices: Option<u32>,
    ) -> impl Future<Output = Result<LifecycleAck, CoreError>> + Send;

    fn list_resource_files(
        &self,
    ) -> impl Future<Output = Result<Vec<ResourceFile>, CoreError>> + Send;

    fn upload_resource_file(
        &self,
        file: UploadFile,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;

    fn upload_resource_directory(
        &self,
        files: Vec<UploadFile>,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;

    fn execute_command(
        &self,
        target: &str,
        command: &str,
    ) -> impl Future<Output = Result<CommandReply, CoreError>> + Send;

    fn compare_rib(
        &self,
        target: &str,
        file: &str,
    ) -> impl Future<Output = Result<ComparisonResult, CoreError>> + Send;

    fn machine_stats(&self) -> impl Future<Output = Result<Vec<MachineStats>, CoreError>> + Send;

    /// The topology config, opaque to the core apart from `route_servers`.
    fn ixp_config(&self) -> impl Future<Output = Result<serde_json::Value, CoreError>> + Send;
}

impl RemoteControlGateway for TwinClient {
    async fn get_status(&self) -> Result<Status, CoreError> {
        Ok(TwinClient::get_status(self).await?.into())
    }

    async fn start(&self, max_devices: Option<u32>) -> Result<LifecycleAck, CoreError> {
        Ok(TwinClient::start(self, max_devices).await?.into())
    }

    async fn stop(&self) -> Result<LifecycleAck, CoreError> {
        Ok(TwinClient::stop(self).await?.into())
    }

    async fn reload(
        &self,
        rs_only: bool,
        max_devices: Option<u32>,
    ) -> Result<LifecycleAck, CoreError> {
        Ok(TwinClient::reload(self, rs_only, max_devices).await?.into())
    }

    async fn list_resource_files(&self) -> Result<Vec<ResourceFile>, CoreError> {
        let entries = TwinClient::list_resource_files(self).await?;
        Ok(entries.into_iter().map(ResourceFile::from).collect())
    }

    async fn upload_resource_file(&self, file: UploadFile) -> Result<String, CoreError> {
        let resp = TwinClient::upload_resource_file(self, file).await?;
        Ok(resp.message.unwrap_or_default())
    }

    async fn upload_resource_directory(&self, files: Vec<UploadFile>) -> Result<String, CoreError> {
        let resp = TwinClient::upload_resource_directory(self, files).await?;
        Ok(resp.message.unwrap_or_default())
    }

    async fn execute_command(&self, target: &str, command: &str) -> Result<CommandReply, CoreError> {
        Ok(TwinClient::execute_command(self, target, command).await?.into())
    }

    async fn compare_rib(&self, target: &str, file: &str) -> Result<ComparisonResult, CoreError> {
        Ok(TwinClient::compare_rib(self, target, file).await?.into())
    }

    async fn machine_stats(&self) -> Result<Vec<MachineStats>, CoreError> {
        Ok(machine_stats_from(TwinClient::machine_stats(self).await?))
    }

    async fn ixp_config(&self) -> Result<serde_json::Value, CoreError> {
        Ok(TwinClient::get_ixp_config(self).await?)
    }
}
