//! Webhook error types.

use thiserror::Error;

/// Result type for webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Error type for webhook operations.
///
/// None of these ever cross the dispatcher boundary: `fire_webhooks` logs
/// and swallows every failure, and encodes delivery outcomes into the
/// persisted [`DeliveryAttempt`](crate::DeliveryAttempt) audit trail.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Destination failed SSRF validation.
    #[error("Destination blocked: {0}")]
    ValidationBlocked(String),

    /// Transient network-level failure (connect error, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Destination returned a 5xx status.
    #[error("Destination returned server error {0}")]
    Server(u16),

    /// Destination actively rejected the request (non-5xx error status).
    #[error("Destination rejected delivery with status {0}")]
    ClientRejection(u16),

    /// Subscription load or delivery-record write failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid payload.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::InvalidPayload(err.to_string())
    }
}
