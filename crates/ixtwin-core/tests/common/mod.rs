// Scripted in-memory gateway shared by the orchestration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use ixtwin_core::{
    CommandReply, ComparisonResult, CoreError, LifecycleAck, MachineStats, RemoteControlGateway,
    ResourceFile, Status, Twin, TwinConfig, UploadFile,
};
use tokio::sync::Semaphore;

// ── Verb ────────────────────────────────────────────────────────────

/// One scripted gateway operation.
///
/// Replies are taken from the script in order, then from the fallback.
/// While held, calls park until released one at a time.
pub struct Verb<T> {
    script: Mutex<VecDeque<Result<T, CoreError>>>,
    fallback: Mutex<T>,
    args: Mutex<Vec<String>>,
    held: AtomicBool,
    release: Semaphore,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<T: Clone + Send> Verb<T> {
    fn new(fallback: T) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            args: Mutex::new(Vec::new()),
            held: AtomicBool::new(false),
            release: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn push_ok(&self, value: T) {
        self.script.lock().unwrap().push_back(Ok(value));
    }

    pub fn push_err(&self, err: CoreError) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    pub fn set_fallback(&self, value: T) {
        *self.fallback.lock().unwrap() = value;
    }

    /// Park subsequent calls until released.
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Let one parked (or future) call through.
    pub fn release_one(&self) {
        self.release.add_permits(1);
    }

    /// Stop parking and let every parked call through.
    pub fn release_all(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.release.add_permits(64);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn args(&self) -> Vec<String> {
        self.args.lock().unwrap().clone()
    }

    async fn call(&self, arg: String) -> Result<T, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.args.lock().unwrap().push(arg);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        if self.held.load(Ordering::SeqCst) {
            self.release.acquire().await.unwrap().forget();
        }

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.lock().unwrap().clone()))
    }
}

// ── FakeGateway ─────────────────────────────────────────────────────

pub struct FakeGateway {
    pub status: Verb<Status>,
    pub start: Verb<LifecycleAck>,
    pub stop: Verb<LifecycleAck>,
    pub reload: Verb<LifecycleAck>,
    pub list: Verb<Vec<ResourceFile>>,
    pub upload: Verb<String>,
    pub upload_dir: Verb<String>,
    pub exec: Verb<CommandReply>,
    pub compare: Verb<ComparisonResult>,
    pub stats: Verb<Vec<MachineStats>>,
    pub ixp: Verb<serde_json::Value>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            status: Verb::new(Status::default()),
            start: Verb::new(ack("Digital twin starting")),
            stop: Verb::new(ack("Digital twin stopping")),
            reload: Verb::new(ack("Digital twin reloading")),
            list: Verb::new(Vec::new()),
            upload: Verb::new("File uploaded".into()),
            upload_dir: Verb::new("Directory uploaded".into()),
            exec: Verb::new(CommandReply::Success {
                output: String::new(),
            }),
            compare: Verb::new(ComparisonResult::default()),
            stats: Verb::new(Vec::new()),
            ixp: Verb::new(serde_json::json!({})),
        }
    }
}

impl RemoteControlGateway for FakeGateway {
    async fn get_status(&self) -> Result<Status, CoreError> {
        self.status.call(String::new()).await
    }

    async fn start(&self, max_devices: Option<u32>) -> Result<LifecycleAck, CoreError> {
        self.start.call(format!("{max_devices:?}")).await
    }

    async fn stop(&self) -> Result<LifecycleAck, CoreError> {
        self.stop.call(String::new()).await
    }

    async fn reload(
        &self,
        rs_only: bool,
        max_devices: Option<u32>,
    ) -> Result<LifecycleAck, CoreError> {
        self.reload.call(format!("{rs_only} {max_devices:?}")).await
    }

    async fn list_resource_files(&self) -> Result<Vec<ResourceFile>, CoreError> {
        self.list.call(String::new()).await
    }

    async fn upload_resource_file(&self, file: UploadFile) -> Result<String, CoreError> {
        self.upload.call(file.file_name).await
    }

    async fn upload_resource_directory(&self, files: Vec<UploadFile>) -> Result<String, CoreError> {
        let names: Vec<_> = files.into_iter().map(|f| f.file_name).collect();
        self.upload_dir.call(names.join(",")).await
    }

    async fn execute_command(&self, target: &str, command: &str) -> Result<CommandReply, CoreError> {
        self.exec.call(format!("{target}: {command}")).await
    }

    async fn compare_rib(&self, target: &str, file: &str) -> Result<ComparisonResult, CoreError> {
        self.compare.call(format!("{target} {file}")).await
    }

    async fn machine_stats(&self) -> Result<Vec<MachineStats>, CoreError> {
        self.stats.call(String::new()).await
    }

    async fn ixp_config(&self) -> Result<serde_json::Value, CoreError> {
        self.ixp.call(String::new()).await
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

pub fn twin() -> Twin<FakeGateway> {
    twin_with(FakeGateway::default())
}

pub fn twin_with(gateway: FakeGateway) -> Twin<FakeGateway> {
    let config = TwinConfig {
        poll_interval: Duration::from_secs(3),
        ..TwinConfig::default()
    };
    Twin::new(gateway, config)
}

pub fn ack(message: &str) -> LifecycleAck {
    LifecycleAck {
        message: message.into(),
        devices_count: None,
    }
}

pub fn running(devices: u32) -> Status {
    Status {
        running: true,
        devices_count: Some(devices),
        ..Status::default()
    }
}

pub fn backend_error(message: &str) -> CoreError {
    CoreError::Backend {
        message: message.into(),
        status: Some(500),
    }
}

pub fn connection_refused() -> CoreError {
    CoreError::ConnectionFailed {
        url: "http://localhost:8000/status".into(),
        reason: "connection refused".into(),
    }
}

/// Let spawned tasks run until they park on a gateway call.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
