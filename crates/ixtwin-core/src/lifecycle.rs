// ── Lifecycle controller ──
//
// Start / stop / reload submission. At most one lifecycle request is in
// flight; the status poller is refreshed before the slot is released so
// guards never evaluate against a status that predates the last request.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::gateway::RemoteControlGateway;
use crate::model::{LifecycleAck, LifecyclePhase, LifecycleRequest, Notice, Status};
use crate::poller::StatusPoller;
use crate::stream::StateStream;

/// Observable controller state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleState {
    pub phase: LifecyclePhase,
    /// Outcome of the most recent request, cleared when a new one begins.
    pub notice: Option<Notice>,
}

pub struct LifecycleController<G: RemoteControlGateway> {
    inner: Arc<LifecycleInner<G>>,
}

struct LifecycleInner<G: RemoteControlGateway> {
    gateway: Arc<G>,
    poller: StatusPoller<G>,
    state: watch::Sender<LifecycleState>,
    teardown: CancellationToken,
}

impl<G: RemoteControlGateway> Clone for LifecycleController<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Returns the phase to idle when dropped, whichever way the request ends.
struct PhaseSlot<'a> {
    state: &'a watch::Sender<LifecycleState>,
}

impl Drop for PhaseSlot<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.phase = LifecyclePhase::Idle);
    }
}

impl<G: RemoteControlGateway> LifecycleController<G> {
    pub fn new(gateway: Arc<G>, poller: StatusPoller<G>, teardown: CancellationToken) -> Self {
        let (state, _) = watch::channel(LifecycleState::default());
        Self {
            inner: Arc::new(LifecycleInner {
                gateway,
                poller,
                state,
                teardown,
            }),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.inner.state.borrow().phase
    }

    pub fn subscribe(&self) -> StateStream<LifecycleState> {
        StateStream::new(self.inner.state.subscribe())
    }

    pub fn dismiss_notice(&self) {
        self.inner.state.send_if_modified(|s| s.notice.take().is_some());
    }

    // ── Requests ─────────────────────────────────────────────────────

    pub async fn start(&self, max_devices: Option<u32>) -> Result<LifecycleAck, CoreError> {
        self.submit(LifecycleRequest::Start { max_devices }).await
    }

    pub async fn stop(&self) -> Result<LifecycleAck, CoreError> {
        self.submit(LifecycleRequest::Stop).await
    }

    pub async fn reload(
        &self,
        rs_only: bool,
        max_devices: Option<u32>,
    ) -> Result<LifecycleAck, CoreError> {
        self.submit(LifecycleRequest::Reload {
            rs_only,
            max_devices,
        })
        .await
    }

    /// Submit a lifecycle request.
    ///
    /// Rejected with [`CoreError::Busy`] when another request is in
    /// flight or the last known status makes the request meaningless
    /// (start while running or starting, stop while nothing runs).
    /// Rejections issue no gateway call and leave the state untouched.
    pub async fn submit(&self, request: LifecycleRequest) -> Result<LifecycleAck, CoreError> {
        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        if let Err(e) = validate(request) {
            self.inner
                .state
                .send_modify(|s| s.notice = Some(Notice::error(e.user_message_or(""))));
            return Err(e);
        }

        check_status(request, &self.inner.poller.current())?;
        let slot = self.occupy(request)?;

        info!(request = request.verb(), "submitting lifecycle request");
        let result = match request {
            LifecycleRequest::Start { max_devices } => self.inner.gateway.start(max_devices).await,
            LifecycleRequest::Stop => self.inner.gateway.stop().await,
            LifecycleRequest::Reload {
                rs_only,
                max_devices,
            } => self.inner.gateway.reload(rs_only, max_devices).await,
        };

        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        let notice = match &result {
            Ok(ack) if ack.message.is_empty() => Notice::info(format!("{} accepted", request.verb())),
            Ok(ack) => Notice::info(&ack.message),
            Err(e) => {
                warn!(request = request.verb(), error = %e, "lifecycle request failed");
                Notice::error(e.user_message_or(request.failure_fallback()))
            }
        };
        self.inner.state.send_modify(|s| s.notice = Some(notice));

        // Still holding the slot: the next request must see post-request status.
        self.inner.poller.refresh().await;
        drop(slot);

        result
    }

    fn occupy(&self, request: LifecycleRequest) -> Result<PhaseSlot<'_>, CoreError> {
        let mut held_by = LifecyclePhase::Idle;
        let acquired = self.inner.state.send_if_modified(|s| {
            if s.phase.is_idle() {
                s.phase = request.phase();
                s.notice = None;
                true
            } else {
                held_by = s.phase;
                false
            }
        });

        if acquired {
            Ok(PhaseSlot {
                state: &self.inner.state,
            })
        } else {
            Err(CoreError::busy(
                request.verb(),
                format!("another request is in flight ({held_by})"),
            ))
        }
    }
}

fn validate(request: LifecycleRequest) -> Result<(), CoreError> {
    let max_devices = match request {
        LifecycleRequest::Start { max_devices } | LifecycleRequest::Reload { max_devices, .. } => {
            max_devices
        }
        LifecycleRequest::Stop => None,
    };
    if max_devices == Some(0) {
        return Err(CoreError::validation("max devices must be at least 1"));
    }
    Ok(())
}

fn check_status(request: LifecycleRequest, status: &Status) -> Result<(), CoreError> {
    let verb = request.verb();
    match request {
        LifecycleRequest::Start { .. } if status.running => {
            Err(CoreError::busy(verb, "digital twin is already running"))
        }
        LifecycleRequest::Start { .. } if status.starting => {
            Err(CoreError::busy(verb, "digital twin is already starting"))
        }
        LifecycleRequest::Start { .. } | LifecycleRequest::Stop if status.stopping => {
            Err(CoreError::busy(verb, "digital twin is stopping"))
        }
        LifecycleRequest::Stop if !status.is_active() => {
            Err(CoreError::busy(verb, "digital twin is not running"))
        }
        _ => Ok(()),
    }
}
