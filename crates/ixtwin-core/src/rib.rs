// ── RIB comparison workflow ──
//
// Select a route server and a resource file, compare the live RIB
// against the uploaded dump, or capture the live RIB for download.
// Selection is frozen while a request is in flight.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::gateway::RemoteControlGateway;
use crate::model::{CommandReply, ComparisonResult, LiveRibDump, RouteServer};
use crate::stream::StateStream;

const COMPARE_FAILURE: &str = "Failed to compare RIB";
const DOWNLOAD_FAILURE: &str = "Failed to download RIB";
const CONFIG_FAILURE: &str = "Failed to load IXP configuration";

const NEED_TARGET_AND_FILE: &str = "Please select both a route server and a resource file";
const NEED_TARGET: &str = "Please select a route server";
const UNKNOWN_TARGET: &str = "Route server not found";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RibActivity {
    #[default]
    Idle,
    Comparing,
    DownloadingLive,
}

impl RibActivity {
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

/// Observable workflow state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RibState {
    pub route_servers: Arc<Vec<RouteServer>>,
    /// The topology config could not be loaded or names no route servers.
    pub config_missing: bool,
    pub target: Option<String>,
    pub file: Option<String>,
    pub activity: RibActivity,
    /// Last successful comparison. Kept when a later comparison fails.
    pub result: Option<Arc<ComparisonResult>>,
    pub error: Option<String>,
    pub show_details: bool,
}

pub struct RibComparisonWorkflow<G: RemoteControlGateway> {
    inner: Arc<RibInner<G>>,
}

struct RibInner<G> {
    gateway: Arc<G>,
    state: watch::Sender<RibState>,
    teardown: CancellationToken,
}

impl<G: RemoteControlGateway> Clone for RibComparisonWorkflow<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ActivitySlot<'a> {
    state: &'a watch::Sender<RibState>,
}

impl Drop for ActivitySlot<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.activity = RibActivity::Idle);
    }
}

/// What a request captured from the state when it was admitted.
struct Admitted<'a> {
    _slot: ActivitySlot<'a>,
    target: String,
    file: Option<String>,
}

impl<G: RemoteControlGateway> RibComparisonWorkflow<G> {
    pub fn new(gateway: Arc<G>, teardown: CancellationToken) -> Self {
        let (state, _) = watch::channel(RibState::default());
        Self {
            inner: Arc::new(RibInner {
                gateway,
                state,
                teardown,
            }),
        }
    }

    pub fn state(&self) -> RibState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<RibState> {
        StateStream::new(self.inner.state.subscribe())
    }

    // ── Route servers ────────────────────────────────────────────────

    /// Load the route server list from the topology config.
    pub async fn load_route_servers(&self) -> Result<Arc<Vec<RouteServer>>, CoreError> {
        let result = self.inner.gateway.ixp_config().await;
        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        match result {
            Ok(config) => {
                let servers = RouteServer::from_ixp_config(&config);
                debug!(count = servers.len(), "route servers loaded");
                Ok(self.set_route_servers(servers))
            }
            Err(e) => {
                warn!(error = %e, "loading IXP configuration failed");
                let message = e.user_message_or(CONFIG_FAILURE);
                self.inner.state.send_modify(|s| {
                    s.config_missing = true;
                    s.error = Some(message);
                });
                Err(e)
            }
        }
    }

    pub fn set_route_servers(&self, servers: Vec<RouteServer>) -> Arc<Vec<RouteServer>> {
        let servers = Arc::new(servers);
        self.inner.state.send_modify(|s| {
            s.config_missing = servers.is_empty();
            s.route_servers = Arc::clone(&servers);
        });
        servers
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select the route server. A blank name clears the selection.
    pub fn select_target(&self, target: impl Into<String>) -> Result<(), CoreError> {
        let target = non_blank(target.into());
        self.update_selection("select route server", |s| s.target = target)
    }

    /// Select the uploaded dump to compare against. A blank name clears
    /// the selection.
    pub fn select_file(&self, file: impl Into<String>) -> Result<(), CoreError> {
        let file = non_blank(file.into());
        self.update_selection("select resource file", |s| s.file = file)
    }

    pub fn toggle_details(&self) -> bool {
        let mut shown = false;
        self.inner.state.send_modify(|s| {
            s.show_details = !s.show_details;
            shown = s.show_details;
        });
        shown
    }

    pub fn dismiss_error(&self) {
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }

    fn update_selection(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut RibState),
    ) -> Result<(), CoreError> {
        let mut busy = None;
        self.inner.state.send_if_modified(|s| {
            if s.activity.is_idle() {
                apply(s);
                true
            } else {
                busy = Some(s.activity);
                false
            }
        });
        match busy {
            None => Ok(()),
            Some(activity) => Err(CoreError::busy(operation, format!("{activity} in progress"))),
        }
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Compare the selected route server's live RIB against the selected
    /// file. On success the result is replaced wholesale and details are
    /// collapsed.
    pub async fn compare(&self) -> Result<Arc<ComparisonResult>, CoreError> {
        let admitted = self.admit(RibActivity::Comparing)?;
        let Some(file) = admitted.file.as_deref() else {
            return Err(CoreError::Internal("comparison admitted without a file".into()));
        };

        info!(route_server = %admitted.target, file, "comparing RIB");
        let result = self.inner.gateway.compare_rib(&admitted.target, file).await;
        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        match result {
            Ok(comparison) => {
                let comparison = Arc::new(comparison);
                debug!(differences = comparison.differences_count, "RIB comparison finished");
                self.inner.state.send_modify(|s| {
                    s.result = Some(Arc::clone(&comparison));
                    s.error = None;
                    s.show_details = false;
                });
                Ok(comparison)
            }
            Err(e) => {
                warn!(error = %e, "RIB comparison failed");
                self.record_error(e.user_message_or(COMPARE_FAILURE));
                Err(e)
            }
        }
    }

    /// Capture the selected route server's live RIB. The comparison
    /// result is left untouched.
    pub async fn download_live_rib(&self) -> Result<LiveRibDump, CoreError> {
        let admitted = self.admit(RibActivity::DownloadingLive)?;

        let kind = self
            .inner
            .state
            .borrow()
            .route_servers
            .iter()
            .find(|rs| rs.name == admitted.target)
            .map(|rs| rs.kind);
        let Some(kind) = kind else {
            self.record_error(UNKNOWN_TARGET.into());
            return Err(CoreError::validation(UNKNOWN_TARGET));
        };

        info!(route_server = %admitted.target, daemon = %kind, "downloading live RIB");
        let reply = self
            .inner
            .gateway
            .execute_command(&admitted.target, kind.rib_dump_command())
            .await;
        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        match reply {
            Ok(CommandReply::Success { output }) => Ok(LiveRibDump {
                file_name: LiveRibDump::file_name_for(&admitted.target, Utc::now().date_naive()),
                contents: output,
            }),
            Ok(CommandReply::Failure { error }) => {
                let message = error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| DOWNLOAD_FAILURE.into());
                warn!(route_server = %admitted.target, error = %message, "live RIB command failed");
                self.record_error(message.clone());
                Err(CoreError::CommandFailed { message })
            }
            Err(e) => {
                warn!(error = %e, "live RIB download failed");
                self.record_error(e.user_message_or(DOWNLOAD_FAILURE));
                Err(e)
            }
        }
    }

    /// Check selection and claim the activity slot in one step.
    /// Missing selections are recorded as the workflow error.
    fn admit(&self, activity: RibActivity) -> Result<Admitted<'_>, CoreError> {
        let mut outcome: Result<(String, Option<String>), CoreError> =
            Err(CoreError::Internal("admission not evaluated".into()));

        self.inner.state.send_if_modified(|s| {
            if !s.activity.is_idle() {
                outcome = Err(CoreError::busy(
                    activity_verb(activity),
                    format!("{} in progress", s.activity),
                ));
                return false;
            }
            match required_selection(activity, s) {
                Ok(selection) => {
                    s.activity = activity;
                    s.error = None;
                    outcome = Ok(selection);
                }
                Err(message) => {
                    s.error = Some(message.into());
                    outcome = Err(CoreError::validation(message));
                }
            }
            true
        });

        let (target, file) = outcome?;
        Ok(Admitted {
            _slot: ActivitySlot {
                state: &self.inner.state,
            },
            target,
            file,
        })
    }

    fn record_error(&self, message: String) {
        self.inner.state.send_modify(|s| s.error = Some(message));
    }
}

fn required_selection(
    activity: RibActivity,
    state: &RibState,
) -> Result<(String, Option<String>), &'static str> {
    match (activity, &state.target, &state.file) {
        (RibActivity::Comparing, Some(target), Some(file)) => {
            Ok((target.clone(), Some(file.clone())))
        }
        (RibActivity::Comparing, ..) => Err(NEED_TARGET_AND_FILE),
        (_, Some(target), _) => Ok((target.clone(), None)),
        (_, None, _) => Err(NEED_TARGET),
    }
}

fn activity_verb(activity: RibActivity) -> &'static str {
    match activity {
        RibActivity::Comparing => "compare RIB",
        RibActivity::DownloadingLive | RibActivity::Idle => "download RIB",
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}
