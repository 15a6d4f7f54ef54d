use tracing::debug;

use crate::client::TwinClient;
use crate::error::Error;
use crate::models::{RibCompareRequest, RibCompareResponse};

impl TwinClient {
    /// Diff a route server's live RIB against an uploaded dump.
    ///
    /// `POST /rib/compare`
    pub async fn compare_rib(
        &self,
        route_server: &str,
        resource_file: &str,
    ) -> Result<RibCompareResponse, Error> {
        debug!(route_server, resource_file, "comparing RIB");
        self.post(
            "rib/compare",
            &RibCompareRequest {
                route_server,
                resource_file,
            },
        )
        .await
    }
}
