//! Webhook dispatcher - the fire-and-forget entry point.
//!
//! `fire_webhooks` is the sole public delivery operation. It never
//! returns an error: webhook delivery is best-effort infrastructure and
//! must not be able to fail the business transaction that triggered the
//! event. Every internal failure is either encoded into the persisted
//! [`DeliveryAttempt`] or logged and discarded.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::delivery::{
    classify_status, DeliveryAttempt, DeliveryOutcome, HttpTransport, WebhookPayload,
};
use crate::retry::{ExponentialBackoff, RetryStrategy, Scheduler};
use crate::signature::sign_payload;
use crate::store::WebhookStore;
use crate::subscription::WebhookSubscription;
use crate::validation::{validate_destination, Resolver, ValidationResult};

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum delivery attempts per subscription.
    pub max_attempts: u32,
    /// Base backoff delay, doubled per attempt.
    pub base_delay: Duration,
    /// Backoff delay cap.
    pub max_delay: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl DispatcherConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempts.
    pub fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Sets the base backoff delay.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the backoff delay cap.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}

/// Outbound webhook dispatcher.
///
/// Fans out one independent delivery pipeline per matching subscription:
/// validate the destination, run the bounded retry loop, record exactly
/// one audit row. Pipelines share no mutable state.
pub struct WebhookDispatcher {
    config: DispatcherConfig,
    strategy: ExponentialBackoff,
    store: Arc<dyn WebhookStore>,
    resolver: Arc<dyn Resolver>,
    transport: Arc<dyn HttpTransport>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
}

impl WebhookDispatcher {
    /// Creates a dispatcher with production collaborators: system DNS,
    /// reqwest transport, tokio timer, system clock.
    #[cfg(feature = "http-client")]
    pub fn new(store: Arc<dyn WebhookStore>) -> Self {
        Self::with_collaborators(
            DispatcherConfig::default(),
            store,
            Arc::new(crate::validation::TokioResolver),
            Arc::new(crate::delivery::ReqwestTransport::new()),
            Arc::new(crate::retry::TokioScheduler),
            Arc::new(crate::clock::SystemClock),
        )
    }

    /// Creates a dispatcher with explicit collaborators. Tests inject
    /// deterministic doubles here.
    pub fn with_collaborators(
        config: DispatcherConfig,
        store: Arc<dyn WebhookStore>,
        resolver: Arc<dyn Resolver>,
        transport: Arc<dyn HttpTransport>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let strategy = ExponentialBackoff::new()
            .base(config.base_delay)
            .max_delay(config.max_delay)
            .max_attempts(config.max_attempts);

        Self {
            config,
            strategy,
            store,
            resolver,
            transport,
            scheduler,
            clock,
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Fires all enabled webhooks for a tenant event.
    ///
    /// Never returns an error and never panics. A failed subscription
    /// load, a blocked destination, an unreachable endpoint, or a failed
    /// audit write each degrade to a log line and, where a pipeline ran,
    /// a `DeliveryAttempt` row.
    pub async fn fire_webhooks(&self, org_id: &str, event_type: &str, data: Value) {
        let subscriptions = match self
            .store
            .list_enabled_subscriptions(org_id, event_type)
            .await
        {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                warn!(org_id, event_type, error = %e, "failed to load webhook subscriptions");
                return;
            }
        };

        if subscriptions.is_empty() {
            debug!(org_id, event_type, "no enabled webhook subscriptions");
            return;
        }

        for subscription in &subscriptions {
            if !subscription.should_receive(event_type) {
                continue;
            }

            // Timestamps may differ per subscription; each pipeline is
            // independent.
            let payload = WebhookPayload {
                event: event_type.to_string(),
                timestamp: self.clock.now().to_rfc3339(),
                org_id: org_id.to_string(),
                data: data.clone(),
            };

            let attempt = self.deliver(subscription, payload).await;

            if let Err(e) = self.store.record_delivery_attempt(&attempt).await {
                warn!(
                    webhook_id = %subscription.id,
                    error = %e,
                    "failed to record webhook delivery attempt"
                );
            }
        }
    }

    /// Runs one subscription's delivery pipeline to a terminal state and
    /// produces its audit row.
    async fn deliver(
        &self,
        subscription: &WebhookSubscription,
        payload: WebhookPayload,
    ) -> DeliveryAttempt {
        match validate_destination(&subscription.destination_url, self.resolver.as_ref()).await {
            ValidationResult::Blocked { reason } => {
                warn!(
                    webhook_id = %subscription.id,
                    url = %subscription.destination_url,
                    %reason,
                    "webhook destination blocked"
                );
                return DeliveryAttempt::failed(&subscription.id, payload, None, self.clock.now());
            }
            ValidationResult::Allowed { .. } => {}
        }

        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                warn!(webhook_id = %subscription.id, error = %e, "failed to serialize webhook payload");
                return DeliveryAttempt::failed(&subscription.id, payload, None, self.clock.now());
            }
        };
        let signature = sign_payload(&body, &subscription.secret);

        let mut last_status: Option<u16> = None;
        let mut succeeded = false;
        let mut attempts_made = 0;

        for attempt_no in 1..=self.config.max_attempts {
            attempts_made = attempt_no;
            let outcome = match self
                .transport
                .post_json(&subscription.destination_url, &body, &signature)
                .await
            {
                Ok(status) => classify_status(status),
                Err(e) => {
                    debug!(
                        webhook_id = %subscription.id,
                        attempt = attempt_no,
                        error = %e,
                        "webhook delivery attempt failed at network level"
                    );
                    DeliveryOutcome::Retryable { status: None }
                }
            };

            match outcome {
                DeliveryOutcome::Success { status } => {
                    debug!(webhook_id = %subscription.id, attempt = attempt_no, status, "webhook delivered");
                    last_status = Some(status);
                    succeeded = true;
                    break;
                }
                DeliveryOutcome::Terminal { status } => {
                    warn!(
                        webhook_id = %subscription.id,
                        attempt = attempt_no,
                        status,
                        "webhook destination rejected delivery"
                    );
                    last_status = Some(status);
                    break;
                }
                DeliveryOutcome::Retryable { status } => {
                    last_status = status;
                    if let Some(delay) = self.strategy.next_delay(attempt_no) {
                        self.scheduler.sleep(delay).await;
                    }
                }
            }
        }

        if succeeded {
            DeliveryAttempt::succeeded(
                &subscription.id,
                payload,
                last_status.unwrap_or_default(),
                self.clock.now(),
            )
        } else {
            warn!(
                webhook_id = %subscription.id,
                status = ?last_status,
                "webhook delivery failed after {attempts_made} attempt(s)"
            );
            DeliveryAttempt::failed(&subscription.id, payload, last_status, self.clock.now())
        }
    }
}
