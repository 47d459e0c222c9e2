//! Collaborator store seam: subscription reads and audit writes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::delivery::DeliveryAttempt;
use crate::error::WebhookResult;
use crate::subscription::WebhookSubscription;

/// Trait for the relational store backing webhook delivery.
///
/// The store is the only shared resource in this subsystem. Both
/// operations may fail; the dispatcher tolerates either failure without
/// propagating it.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    /// Lists enabled subscriptions for a tenant that include the given
    /// event type.
    async fn list_enabled_subscriptions(
        &self,
        org_id: &str,
        event_type: &str,
    ) -> WebhookResult<Vec<WebhookSubscription>>;

    /// Persists one audit row for a finished delivery pipeline.
    async fn record_delivery_attempt(&self, attempt: &DeliveryAttempt) -> WebhookResult<()>;
}

/// In-memory webhook store for testing.
pub struct InMemoryWebhookStore {
    subscriptions: RwLock<HashMap<String, Vec<WebhookSubscription>>>,
    attempts: RwLock<Vec<DeliveryAttempt>>,
}

impl InMemoryWebhookStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            attempts: RwLock::new(Vec::new()),
        }
    }

    /// Registers a subscription under a tenant.
    pub async fn add_subscription(&self, org_id: &str, subscription: WebhookSubscription) {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions
            .entry(org_id.to_string())
            .or_default()
            .push(subscription);
    }

    /// Returns every recorded delivery attempt, in write order.
    pub async fn recorded_attempts(&self) -> Vec<DeliveryAttempt> {
        let attempts = self.attempts.read().await;
        attempts.clone()
    }

    /// Returns recorded attempts for one subscription.
    pub async fn attempts_for(&self, webhook_id: &str) -> Vec<DeliveryAttempt> {
        let attempts = self.attempts.read().await;
        attempts
            .iter()
            .filter(|a| a.webhook_id == webhook_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryWebhookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookStore for InMemoryWebhookStore {
    async fn list_enabled_subscriptions(
        &self,
        org_id: &str,
        event_type: &str,
    ) -> WebhookResult<Vec<WebhookSubscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .get(org_id)
            .map(|subs| {
                subs.iter()
                    .filter(|s| s.should_receive(event_type))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn record_delivery_attempt(&self, attempt: &DeliveryAttempt) -> WebhookResult<()> {
        let mut attempts = self.attempts.write().await;
        attempts.push(attempt.clone());
        Ok(())
    }
}
