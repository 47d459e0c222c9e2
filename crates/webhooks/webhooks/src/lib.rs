//! # Nexus Webhooks
//!
//! Outbound webhook delivery engine for Nexus providing:
//! - SSRF-safe destination validation (private-network classification,
//!   static blocklist, fail-closed DNS resolution)
//! - HMAC-SHA256 payload signing with constant-time verification
//! - Bounded-retry delivery with exponential backoff
//! - A durable audit row per delivery via the collaborator store
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nexus_webhooks::WebhookDispatcher;
//!
//! let dispatcher = WebhookDispatcher::new(store);
//!
//! // Fire-and-forget: never fails the caller's transaction.
//! dispatcher
//!     .fire_webhooks("org_1", "card.created", serde_json::json!({"cardId": "c1"}))
//!     .await;
//! ```

mod clock;
mod delivery;
mod dispatcher;
mod error;
pub mod net;
mod receiver;
mod retry;
mod signature;
mod store;
mod subscription;
mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use delivery::{
    classify_status, DeliveryAttempt, DeliveryOutcome, HttpTransport, TransportError,
    WebhookPayload,
};
#[cfg(feature = "http-client")]
pub use delivery::ReqwestTransport;
pub use dispatcher::{DispatcherConfig, WebhookDispatcher};
pub use error::{WebhookError, WebhookResult};
pub use receiver::verify_webhook_signature;
pub use retry::{ExponentialBackoff, NoopScheduler, RetryStrategy, Scheduler, TokioScheduler};
pub use signature::{sign_payload, verify_signature, SIGNATURE_HEADER, SIGNATURE_PREFIX};
pub use store::{InMemoryWebhookStore, WebhookStore};
pub use subscription::WebhookSubscription;
pub use validation::{
    validate_destination, Resolver, TokioResolver, ValidationResult, HOST_BLOCKLIST,
};
