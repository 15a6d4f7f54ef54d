// Backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining and FastAPI-style error
// unwrapping. Endpoint groups (lifecycle, resources, machines, rib) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW: usize = 200;

/// Raw HTTP client for the digital twin backend.
///
/// Every method returns the decoded JSON payload. Non-success responses
/// are converted to [`Error::Api`] carrying the backend's `detail`.
#[derive(Debug, Clone)]
pub struct TwinClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TwinClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://localhost:8000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a backend path: `{base}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        parse_response(resp).await
    }

    /// POST without a request body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST (multipart) {}", url);

        let resp = self.http.post(url).multipart(form).send().await?;
        parse_response(resp).await
    }
}

/// Decode a successful JSON body, or turn a failure status into `Error::Api`.
///
/// The backend reports errors as `{"detail": "..."}`; request validation
/// failures carry a structured `detail` array, which is rendered as JSON.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;
    trace!(%status, len = body.len(), "response received");

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: extract_detail(&body)
                .unwrap_or_else(|| format!("HTTP {status}: {}", preview(&body))),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_detail_reads_string_detail() {
        assert_eq!(
            extract_detail(r#"{"detail":"Digital twin is not running"}"#).as_deref(),
            Some("Digital twin is not running")
        );
    }

    #[test]
    fn extract_detail_renders_structured_detail() {
        let detail = extract_detail(r#"{"detail":[{"loc":["body"],"msg":"field required"}]}"#)
            .expect("structured detail");
        assert!(detail.contains("field required"));
    }

    #[test]
    fn extract_detail_ignores_non_json() {
        assert!(extract_detail("Internal Server Error").is_none());
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = TwinClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://localhost:8000/").expect("valid url"),
        );
        assert_eq!(
            client.url("/status").expect("url").as_str(),
            "http://localhost:8000/status"
        );
    }
}
