// ── Status poller ──
//
// Fixed-period background refresh of the emulation status. One timer at
// most; at most one `get_status` outstanding at any instant.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::gateway::RemoteControlGateway;
use crate::model::Status;
use crate::stream::StateStream;

const POLL_FAILURE: &str = "Failed to connect to backend";

/// Owns the latest [`Status`] and keeps it fresh.
///
/// Cheaply cloneable. Ticks that fire while a request is still
/// outstanding are skipped, never queued. [`refresh()`](Self::refresh)
/// instead waits for the outstanding request and then issues a new one,
/// so its result always postdates the call.
pub struct StatusPoller<G: RemoteControlGateway> {
    inner: Arc<PollerInner<G>>,
}

struct PollerInner<G> {
    gateway: Arc<G>,
    period: Duration,
    status: watch::Sender<Status>,
    /// Held for the duration of each `get_status` call.
    in_flight: Mutex<()>,
    /// Cancelled when the owning context is torn down. Results that
    /// arrive afterwards are dropped.
    teardown: CancellationToken,
    timer: Mutex<Option<Timer>>,
}

struct Timer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<G: RemoteControlGateway> Clone for StatusPoller<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: RemoteControlGateway> StatusPoller<G> {
    pub fn new(gateway: Arc<G>, period: Duration, teardown: CancellationToken) -> Self {
        let (status, _) = watch::channel(Status::default());
        Self {
            inner: Arc::new(PollerInner {
                gateway,
                period,
                status,
                in_flight: Mutex::new(()),
                teardown,
                timer: Mutex::new(None),
            }),
        }
    }

    /// The latest known status. Stopped-without-error until the first
    /// response arrives.
    pub fn current(&self) -> Status {
        self.inner.status.borrow().clone()
    }

    /// Subscribe to status changes. Only polls that change the status notify.
    pub fn subscribe(&self) -> StateStream<Status> {
        StateStream::new(self.inner.status.subscribe())
    }

    pub fn period(&self) -> Duration {
        self.inner.period
    }

    pub async fn is_polling(&self) -> bool {
        self.inner.timer.lock().await.is_some()
    }

    // ── Timer lifecycle ──────────────────────────────────────────────

    /// Begin polling. The first request is issued immediately. Calling
    /// `start` while already polling is a no-op.
    pub async fn start(&self) {
        if self.inner.teardown.is_cancelled() {
            warn!("status poller already torn down; not starting");
            return;
        }
        if self.inner.period.is_zero() {
            warn!("status poll interval is zero; background polling disabled");
            return;
        }

        let mut timer = self.inner.timer.lock().await;
        if timer.is_some() {
            debug!("status poller already running");
            return;
        }

        let cancel = self.inner.teardown.child_token();
        let handle = tokio::spawn(poll_task(self.clone(), cancel.clone()));
        *timer = Some(Timer { cancel, handle });
        debug!(period = ?self.inner.period, "status poller started");
    }

    /// Cancel the timer and wait for the task to exit. An in-flight
    /// request is abandoned.
    pub async fn stop(&self) {
        let timer = self.inner.timer.lock().await.take();
        if let Some(timer) = timer {
            timer.cancel.cancel();
            let _ = timer.handle.await;
            debug!("status poller stopped");
        }
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Poll now, waiting behind any outstanding request, and return the
    /// resulting status.
    pub async fn refresh(&self) -> Status {
        self.try_refresh().await.unwrap_or_else(|_| self.current())
    }

    /// Like [`refresh()`](Self::refresh), but also reports why the poll
    /// failed. The failure has already been merged into the status.
    pub async fn try_refresh(&self) -> Result<Status, CoreError> {
        let _slot = self.inner.in_flight.lock().await;
        self.poll_once().await
    }

    /// One timer tick. Returns `false` if skipped because a request was
    /// already outstanding.
    async fn tick(&self) -> bool {
        let Ok(_slot) = self.inner.in_flight.try_lock() else {
            debug!("status request still outstanding; skipping tick");
            return false;
        };
        let _ = self.poll_once().await;
        true
    }

    /// Must be called with the `in_flight` slot held.
    async fn poll_once(&self) -> Result<Status, CoreError> {
        let result = self.inner.gateway.get_status().await;

        if self.inner.teardown.is_cancelled() {
            debug!("discarding status received after teardown");
            return Err(CoreError::ShutDown);
        }

        match result {
            Ok(status) => {
                self.apply(status);
                Ok(self.current())
            }
            Err(e) => {
                self.apply_failure(&e);
                Err(e)
            }
        }
    }

    fn apply(&self, next: Status) {
        self.inner.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                debug!(
                    running = next.running,
                    starting = next.starting,
                    devices = ?next.devices_count,
                    "status changed"
                );
                *current = next;
                true
            }
        });
    }

    fn apply_failure(&self, err: &CoreError) {
        warn!(error = %err, "status poll failed");
        let message = err.user_message_or(POLL_FAILURE);
        self.inner.status.send_if_modified(|current| {
            let merged = current.after_failed_poll(message);
            if *current == merged {
                false
            } else {
                *current = merged;
                true
            }
        });
    }
}

/// Drive ticks until cancelled. Missed ticks are skipped, so a slow
/// backend never produces a burst of catch-up requests.
async fn poll_task<G: RemoteControlGateway>(poller: StatusPoller<G>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(poller.inner.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = poller.tick() => {}
                }
            }
        }
    }
}
