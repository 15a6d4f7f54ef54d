// ── Twin context ──
//
// Owns one gateway and every component built on it. All components
// share a root cancellation token: `shutdown()` stops the poller and
// makes every late result a no-op.

use std::sync::Arc;

use ixtwin_api::TwinClient;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::ResourceCatalog;
use crate::config::TwinConfig;
use crate::error::CoreError;
use crate::gateway::RemoteControlGateway;
use crate::lifecycle::LifecycleController;
use crate::model::{MachineStats, Status};
use crate::poller::StatusPoller;
use crate::rib::RibComparisonWorkflow;
use crate::session::MachineCommandSession;

/// The digital twin client context.
///
/// Cheaply cloneable via `Arc`. Construct with [`Twin::from_config`] for
/// the HTTP backend or [`Twin::new`] with any gateway.
pub struct Twin<G: RemoteControlGateway = TwinClient> {
    inner: Arc<TwinInner<G>>,
}

struct TwinInner<G: RemoteControlGateway> {
    config: TwinConfig,
    gateway: Arc<G>,
    cancel: CancellationToken,
    poller: StatusPoller<G>,
    lifecycle: LifecycleController<G>,
    catalog: ResourceCatalog<G>,
    rib: RibComparisonWorkflow<G>,
    session: MachineCommandSession<G>,
}

impl<G: RemoteControlGateway> Clone for Twin<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Twin<TwinClient> {
    /// Build a context talking HTTP to `config.url`.
    pub fn from_config(config: TwinConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = TwinClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::new(client, config))
    }
}

impl<G: RemoteControlGateway> Twin<G> {
    pub fn new(gateway: G, config: TwinConfig) -> Self {
        let gateway = Arc::new(gateway);
        let cancel = CancellationToken::new();

        let poller = StatusPoller::new(Arc::clone(&gateway), config.poll_interval, cancel.clone());
        let lifecycle =
            LifecycleController::new(Arc::clone(&gateway), poller.clone(), cancel.clone());
        let catalog = ResourceCatalog::new(Arc::clone(&gateway), cancel.clone());
        let rib = RibComparisonWorkflow::new(Arc::clone(&gateway), cancel.clone());
        let session = MachineCommandSession::new(Arc::clone(&gateway), cancel.clone());

        Self {
            inner: Arc::new(TwinInner {
                config,
                gateway,
                cancel,
                poller,
                lifecycle,
                catalog,
                rib,
                session,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &TwinConfig {
        &self.inner.config
    }

    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    pub fn poller(&self) -> &StatusPoller<G> {
        &self.inner.poller
    }

    pub fn lifecycle(&self) -> &LifecycleController<G> {
        &self.inner.lifecycle
    }

    pub fn catalog(&self) -> &ResourceCatalog<G> {
        &self.inner.catalog
    }

    pub fn rib(&self) -> &RibComparisonWorkflow<G> {
        &self.inner.rib
    }

    pub fn session(&self) -> &MachineCommandSession<G> {
        &self.inner.session
    }

    pub fn status(&self) -> Status {
        self.inner.poller.current()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Fetch the initial status, resource listing, and route servers,
    /// then begin background polling.
    ///
    /// Listing and topology failures are not fatal: they are logged and
    /// left on the owning component's state.
    pub async fn connect(&self) -> Result<Status, CoreError> {
        if self.is_shut_down() {
            return Err(CoreError::ShutDown);
        }

        let (status, files, servers) = tokio::join!(
            self.inner.poller.refresh(),
            self.inner.catalog.refresh(),
            self.inner.rib.load_route_servers(),
        );
        if let Err(e) = files {
            warn!(error = %e, "initial resource listing failed");
        }
        if let Err(e) = servers {
            warn!(error = %e, "route servers unavailable");
        }

        self.inner.poller.start().await;
        info!(url = %self.inner.config.url, running = status.running, "twin context connected");
        Ok(status)
    }

    /// Tear the context down. Idempotent.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.poller.stop().await;
        self.inner.session.close();
        debug!("twin context shut down");
    }

    // ── One-shot queries ─────────────────────────────────────────────

    /// Per-machine resource usage, sorted by name.
    pub async fn machine_stats(&self) -> Result<Vec<MachineStats>, CoreError> {
        let stats = self.inner.gateway.machine_stats().await?;
        if self.is_shut_down() {
            return Err(CoreError::ShutDown);
        }
        Ok(stats)
    }

    /// The raw topology configuration.
    pub async fn ixp_config(&self) -> Result<serde_json::Value, CoreError> {
        let config = self.inner.gateway.ixp_config().await?;
        if self.is_shut_down() {
            return Err(CoreError::ShutDown);
        }
        Ok(config)
    }
}
