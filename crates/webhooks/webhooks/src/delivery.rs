//! Delivery attempt execution and audit records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// JSON body delivered to the receiving endpoint.
///
/// This is the wire contract third parties implement against; field names
/// and shapes must not change. The HMAC signature covers the exact
/// serialized bytes of this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Event type, e.g. `card.created`.
    pub event: String,
    /// ISO-8601 UTC timestamp of the firing.
    pub timestamp: String,
    /// Tenant the event occurred in.
    #[serde(rename = "orgId")]
    pub org_id: String,
    /// Event-specific data.
    pub data: Value,
}

/// Result of a single delivery attempt. Drives the retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 2xx response.
    Success {
        /// Status code returned by the destination.
        status: u16,
    },
    /// 5xx response or network-level failure (`status: None`).
    Retryable {
        /// Status code, if the destination was reached at all.
        status: Option<u16>,
    },
    /// Any other status: the destination actively rejected the request,
    /// retrying will not help.
    Terminal {
        /// Status code returned by the destination.
        status: u16,
    },
}

/// Classifies an HTTP response status into a delivery outcome.
pub fn classify_status(status: u16) -> DeliveryOutcome {
    match status {
        200..=299 => DeliveryOutcome::Success { status },
        500..=599 => DeliveryOutcome::Retryable {
            status: Some(status),
        },
        _ => DeliveryOutcome::Terminal { status },
    }
}

/// Network-level delivery failure (connect error, timeout, TLS).
#[derive(Debug, Clone, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// HTTP transport seam, injectable for network-free tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs exactly one POST of the signed payload and returns the
    /// response status. The response body is drained and discarded, never
    /// interpreted.
    async fn post_json(&self, url: &str, body: &[u8], signature: &str)
        -> Result<u16, TransportError>;
}

/// Production transport backed by reqwest with a bounded timeout.
#[cfg(feature = "http-client")]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http-client")]
impl ReqwestTransport {
    /// Creates a transport with the default 10 second timeout.
    pub fn new() -> Self {
        Self::with_timeout(std::time::Duration::from_secs(10))
    }

    /// Creates a transport with a custom connect+response timeout.
    pub fn with_timeout(timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[cfg(feature = "http-client")]
impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http-client")]
#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &[u8],
        signature: &str,
    ) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header(crate::signature::SIGNATURE_HEADER, signature)
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        // Drain the body so the connection can be reused.
        let _ = response.bytes().await;
        Ok(status)
    }
}

/// Audit row for one finished delivery pipeline.
///
/// Exactly one is written per subscription per `fire_webhooks` call, after
/// retries are exhausted or a terminal outcome is reached. `status_code`
/// of `None` means the destination was never contacted (SSRF block) or the
/// last failure was at the network level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    /// Subscription this delivery was for.
    pub webhook_id: String,
    /// Event type that fired.
    pub event_type: String,
    /// Payload that was (or would have been) sent.
    pub payload: WebhookPayload,
    /// Whether delivery succeeded.
    pub success: bool,
    /// Final HTTP status, if the destination was contacted.
    pub status_code: Option<u16>,
    /// When the pipeline finished.
    pub attempted_at: DateTime<Utc>,
}

impl DeliveryAttempt {
    /// Creates a successful delivery record.
    pub fn succeeded(
        webhook_id: &str,
        payload: WebhookPayload,
        status: u16,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            webhook_id: webhook_id.to_string(),
            event_type: payload.event.clone(),
            payload,
            success: true,
            status_code: Some(status),
            attempted_at,
        }
    }

    /// Creates a failed delivery record.
    pub fn failed(
        webhook_id: &str,
        payload: WebhookPayload,
        status_code: Option<u16>,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            webhook_id: webhook_id.to_string(),
            event_type: payload.event.clone(),
            payload,
            success: false,
            status_code,
            attempted_at,
        }
    }
}
