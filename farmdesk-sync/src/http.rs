//! HTTP replication transport.
//!
//! Posts the snapshot as a JSON body shaped
//! `{harvests, workRecords, orders, expenses}`. The receiving endpoint is
//! opaque (typically a spreadsheet script), so the response status and
//! body are logged but never treated as failure.

use crate::error::{SyncError, SyncResult};
use crate::transport::ReplicationTransport;
use async_trait::async_trait;
use farmdesk_types::FarmSnapshot;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// HTTP transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    /// Per-request deadline in seconds. `None` leaves the request bounded
    /// only by the connection's own limits.
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: format!("farmdesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Replication over a single HTTP POST.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpTransportConfig) -> SyncResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

/// Accepts only absolute `http`/`https` URLs.
fn parse_endpoint(endpoint: &str) -> SyncResult<Url> {
    let url = Url::parse(endpoint.trim()).map_err(|e| SyncError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SyncError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

#[async_trait]
impl ReplicationTransport for HttpTransport {
    async fn replicate(&self, endpoint: &str, snapshot: &FarmSnapshot) -> SyncResult<()> {
        let url = parse_endpoint(endpoint)?;
        let body = serde_json::to_vec(snapshot)?;
        debug!(
            host = url.host_str().unwrap_or_default(),
            bytes = body.len(),
            records = snapshot.record_count(),
            "posting snapshot"
        );

        let resp = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        debug!(status = %resp.status(), "replication endpoint responded");
        Ok(())
    }
}
