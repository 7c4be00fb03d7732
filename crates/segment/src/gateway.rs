//! Outbound submission of a [`SegmentPayload`].
//!
//! [`SegmentGateway`] is the seam the shell depends on; [`HttpGateway`] is the
//! reqwest-backed implementation that POSTs the payload as JSON. Failures are
//! returned as-is, there is no retry.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::payload::SegmentPayload;

/// Successful reply of the segment endpoint. The body is not interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerResponse {
    pub status: u16,
    pub body: Value,
}

impl ServerResponse {
    /// JSON bodies are parsed, anything else is kept as a string. An empty
    /// body becomes `null`.
    pub fn from_body(status: u16, body: &str) -> Self {
        let body = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
        };
        Self { status, body }
    }
}

#[async_trait]
pub trait SegmentGateway: Send + Sync {
    async fn submit(&self, payload: &SegmentPayload) -> Result<ServerResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    endpoint: Url,
}

impl HttpGateway {
    pub fn new(endpoint: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(headers).build()?;
        Self::with_client(client, endpoint)
    }

    /// Use a preconfigured client (proxies, timeouts, TLS roots, ...).
    pub fn with_client(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}

#[async_trait]
impl SegmentGateway for HttpGateway {
    async fn submit(&self, payload: &SegmentPayload) -> Result<ServerResponse> {
        info!(
            endpoint = %self.endpoint,
            segment = %payload.segment_name,
            fields = payload.schema.len(),
            "submitting segment"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // the status is the error; a body that fails to arrive is dropped
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "segment endpoint rejected submission");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;

        debug!(status = status.as_u16(), bytes = body.len(), "segment saved");
        Ok(ServerResponse::from_body(status.as_u16(), &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_http_endpoints() {
        assert!(matches!(
            HttpGateway::new("ftp://example.com/hook"),
            Err(Error::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            HttpGateway::new("not a url"),
            Err(Error::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn accepts_https_endpoint() {
        let gw = HttpGateway::new(" https://hooks.example.com/segment ").unwrap();
        assert_eq!(gw.endpoint().as_str(), "https://hooks.example.com/segment");
    }

    #[test]
    fn response_body_parsing() {
        assert_eq!(ServerResponse::from_body(204, "").body, Value::Null);
        assert_eq!(
            ServerResponse::from_body(200, r#"{"ok":true}"#).body,
            json!({ "ok": true })
        );
        assert_eq!(
            ServerResponse::from_body(200, "accepted").body,
            Value::String("accepted".into())
        );
    }
}
