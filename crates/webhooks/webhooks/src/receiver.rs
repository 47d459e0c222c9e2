//! Receiver-side signature verification.
//!
//! Receiving endpoints authenticate deliveries by recomputing the HMAC
//! over the exact raw body bytes and comparing in constant time. This
//! module is the reference for what a receiver should implement; the
//! delivery path itself only signs.

use crate::signature;

/// Verifies the `X-Nexus-Signature-256` header of an inbound webhook.
///
/// `raw_body` must be the body exactly as received, before any JSON
/// parsing or re-serialization. Returns `false` for malformed headers;
/// never panics.
///
/// ```
/// use nexus_webhooks::{sign_payload, verify_webhook_signature};
///
/// let body = r#"{"event":"card.created","timestamp":"2026-08-30T12:00:00+00:00","orgId":"org_1","data":{}}"#;
/// let header = sign_payload(body.as_bytes(), "whsec_example");
///
/// assert!(verify_webhook_signature(body, "whsec_example", &header));
/// assert!(!verify_webhook_signature(body, "wrong_secret", &header));
/// assert!(!verify_webhook_signature(body, "whsec_example", "invalid"));
/// ```
pub fn verify_webhook_signature(raw_body: &str, secret: &str, signature_header: &str) -> bool {
    signature::verify_signature(raw_body.as_bytes(), secret, signature_header)
}
