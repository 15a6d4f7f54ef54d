// ── Resource catalog ──
//
// The set of uploaded resource files, and the upload operations that
// change it. One upload at a time; a successful upload is always
// followed by a new listing.

use std::sync::Arc;

use ixtwin_api::UploadFile;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::gateway::RemoteControlGateway;
use crate::model::ResourceSet;
use crate::stream::StateStream;

const LIST_FAILURE: &str = "Failed to list resource files";
const UPLOAD_FAILURE: &str = "Failed to upload file";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogState {
    pub files: Arc<ResourceSet>,
    pub uploading: bool,
    pub error: Option<String>,
}

pub struct ResourceCatalog<G: RemoteControlGateway> {
    inner: Arc<CatalogInner<G>>,
}

struct CatalogInner<G> {
    gateway: Arc<G>,
    state: watch::Sender<CatalogState>,
    /// Serializes listings so they are applied in the order issued.
    listing: Mutex<()>,
    teardown: CancellationToken,
}

impl<G: RemoteControlGateway> Clone for ResourceCatalog<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct UploadSlot<'a> {
    state: &'a watch::Sender<CatalogState>,
}

impl Drop for UploadSlot<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.uploading = false);
    }
}

impl<G: RemoteControlGateway> ResourceCatalog<G> {
    pub fn new(gateway: Arc<G>, teardown: CancellationToken) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        Self {
            inner: Arc::new(CatalogInner {
                gateway,
                state,
                listing: Mutex::new(()),
                teardown,
            }),
        }
    }

    pub fn state(&self) -> CatalogState {
        self.inner.state.borrow().clone()
    }

    /// The most recently fetched listing.
    pub fn snapshot(&self) -> Arc<ResourceSet> {
        Arc::clone(&self.inner.state.borrow().files)
    }

    pub fn is_uploading(&self) -> bool {
        self.inner.state.borrow().uploading
    }

    pub fn subscribe(&self) -> StateStream<CatalogState> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Replace the catalog with the backend's current listing.
    pub async fn refresh(&self) -> Result<Arc<ResourceSet>, CoreError> {
        let _listing = self.inner.listing.lock().await;
        let result = self.inner.gateway.list_resource_files().await;

        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        match result {
            Ok(files) => {
                let files: Arc<ResourceSet> = Arc::new(files.into_iter().collect());
                debug!(count = files.len(), "resource catalog refreshed");
                self.inner.state.send_modify(|s| {
                    s.files = Arc::clone(&files);
                    s.error = None;
                });
                Ok(files)
            }
            Err(e) => {
                warn!(error = %e, "resource listing failed");
                self.record_error(&e, LIST_FAILURE);
                Err(e)
            }
        }
    }

    /// Upload one file, then refresh. Returns the backend's message.
    pub async fn upload(&self, file: UploadFile) -> Result<String, CoreError> {
        if file.file_name.trim().is_empty() {
            return Err(self.reject(CoreError::validation("No file selected")));
        }
        let slot = self.begin_upload()?;

        info!(file = %file.file_name, bytes = file.contents.len(), "uploading resource file");
        let message = self.finish_upload(self.inner.gateway.upload_resource_file(file).await)?;
        self.refresh_after_upload().await;
        drop(slot);
        Ok(message)
    }

    /// Upload a directory tree in one request. Each file's name carries
    /// its path relative to the directory's parent.
    pub async fn upload_directory(&self, files: Vec<UploadFile>) -> Result<String, CoreError> {
        if files.is_empty() {
            return Err(self.reject(CoreError::validation("No files selected")));
        }
        let slot = self.begin_upload()?;

        info!(files = files.len(), "uploading resource directory");
        let message =
            self.finish_upload(self.inner.gateway.upload_resource_directory(files).await)?;
        self.refresh_after_upload().await;
        drop(slot);
        Ok(message)
    }

    /// The upload already succeeded; a failed listing stays on
    /// `CatalogState::error` instead of failing the upload.
    async fn refresh_after_upload(&self) {
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "listing after upload failed");
        }
    }

    pub fn dismiss_error(&self) {
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }

    fn begin_upload(&self) -> Result<UploadSlot<'_>, CoreError> {
        let acquired = self.inner.state.send_if_modified(|s| {
            if s.uploading {
                false
            } else {
                s.uploading = true;
                s.error = None;
                true
            }
        });
        if acquired {
            Ok(UploadSlot {
                state: &self.inner.state,
            })
        } else {
            Err(CoreError::busy("upload", "another upload is in progress"))
        }
    }

    fn finish_upload(&self, result: Result<String, CoreError>) -> Result<String, CoreError> {
        if self.inner.teardown.is_cancelled() {
            return Err(CoreError::ShutDown);
        }
        result.inspect_err(|e| {
            warn!(error = %e, "upload failed");
            self.record_error(e, UPLOAD_FAILURE);
        })
    }

    fn reject(&self, err: CoreError) -> CoreError {
        self.record_error(&err, UPLOAD_FAILURE);
        err
    }

    fn record_error(&self, err: &CoreError, fallback: &str) {
        let message = err.user_message_or(fallback);
        self.inner.state.send_modify(|s| s.error = Some(message));
    }
}
