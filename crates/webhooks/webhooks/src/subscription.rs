//! Webhook subscription model.
//!
//! Subscriptions are owned by the collaborator store; this component only
//! reads them. Creation and revocation live in the settings layer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A tenant's registration of a third-party endpoint for domain events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSubscription {
    /// Unique identifier.
    pub id: String,
    /// Target URL.
    pub destination_url: String,
    /// Shared secret for signing payloads.
    pub secret: String,
    /// Event types this subscription receives.
    pub subscribed_event_types: HashSet<String>,
    /// Whether this subscription is enabled.
    pub enabled: bool,
}

impl WebhookSubscription {
    /// Creates a new enabled subscription with no event types.
    pub fn new(destination_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            destination_url: destination_url.into(),
            secret: secret.into(),
            subscribed_event_types: HashSet::new(),
            enabled: true,
        }
    }

    /// Subscribes to the given event types.
    pub fn events(mut self, events: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.subscribed_event_types = events.into_iter().map(|e| e.into()).collect();
        self
    }

    /// Disables the subscription.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Checks whether this subscription should receive an event.
    pub fn should_receive(&self, event_type: &str) -> bool {
        self.enabled && self.subscribed_event_types.contains(event_type)
    }
}
