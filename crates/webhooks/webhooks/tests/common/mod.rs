//! Shared test doubles for webhook dispatcher integration tests.
//!
//! Every collaborator of the dispatcher is replaced here: DNS, the HTTP
//! transport, the backoff scheduler, the clock, and the store. No test in
//! this suite touches the network or sleeps.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use nexus_webhooks::{
    DeliveryAttempt, DispatcherConfig, FixedClock, HttpTransport, InMemoryWebhookStore,
    NoopScheduler, Resolver, Scheduler, TransportError, WebhookDispatcher, WebhookError,
    WebhookResult, WebhookStore, WebhookSubscription,
};

pub const ORG_1: &str = "org_1";
pub const SECRET_1: &str = "whsec_test_secret_key_12345";

/// The instant every test clock is pinned to.
pub fn test_instant() -> DateTime<Utc> {
    "2026-08-30T12:00:00Z".parse().unwrap()
}

// ---------------------------------------------------------------------------
// MockResolver
// ---------------------------------------------------------------------------

/// Resolver answering from a fixed table. Unknown hosts fail resolution.
pub struct MockResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            hosts: HashMap::new(),
        }
    }

    pub fn with_host(mut self, host: &str, ips: &[&str]) -> Self {
        let addrs = ips.iter().map(|ip| ip.parse().unwrap()).collect();
        self.hosts.insert(host.to_string(), addrs);
        self
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.hosts
            .get(host)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such host"))
    }
}

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// One captured outbound request.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub url: String,
    pub body: Vec<u8>,
    pub signature: String,
}

/// Transport replaying a scripted sequence of results, then a fallback.
/// Captures every request for inspection.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<u16, TransportError>>>,
    fallback: Result<u16, TransportError>,
    requests: Mutex<Vec<SentRequest>>,
}

impl MockTransport {
    /// Always responds with the given status.
    pub fn always(status: u16) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(status),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always fails at the network level.
    pub fn network_error() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(TransportError("connection refused".to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replays the given results in order, then responds 200.
    pub fn sequence(results: Vec<Result<u16, TransportError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            fallback: Ok(200),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<SentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &[u8],
        signature: &str,
    ) -> Result<u16, TransportError> {
        self.requests.lock().unwrap().push(SentRequest {
            url: url.to_string(),
            body: body.to_vec(),
            signature: signature.to_string(),
        });

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

// ---------------------------------------------------------------------------
// RecordingScheduler
// ---------------------------------------------------------------------------

/// Scheduler that records requested delays and returns immediately.
pub struct RecordingScheduler {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self {
            delays: Mutex::new(Vec::new()),
        }
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

// ---------------------------------------------------------------------------
// Failing stores
// ---------------------------------------------------------------------------

/// Store whose subscription query always fails.
pub struct FailingListStore;

#[async_trait]
impl WebhookStore for FailingListStore {
    async fn list_enabled_subscriptions(
        &self,
        _org_id: &str,
        _event_type: &str,
    ) -> WebhookResult<Vec<WebhookSubscription>> {
        Err(WebhookError::Store("connection pool exhausted".to_string()))
    }

    async fn record_delivery_attempt(&self, _attempt: &DeliveryAttempt) -> WebhookResult<()> {
        Ok(())
    }
}

/// Store that serves subscriptions but fails every audit write, counting
/// the write attempts it rejected.
pub struct FailingRecordStore {
    inner: InMemoryWebhookStore,
    rejected_writes: AtomicU32,
}

impl FailingRecordStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryWebhookStore::new(),
            rejected_writes: AtomicU32::new(0),
        }
    }

    pub async fn add_subscription(&self, org_id: &str, subscription: WebhookSubscription) {
        self.inner.add_subscription(org_id, subscription).await;
    }

    pub fn rejected_writes(&self) -> u32 {
        self.rejected_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebhookStore for FailingRecordStore {
    async fn list_enabled_subscriptions(
        &self,
        org_id: &str,
        event_type: &str,
    ) -> WebhookResult<Vec<WebhookSubscription>> {
        self.inner.list_enabled_subscriptions(org_id, event_type).await
    }

    async fn record_delivery_attempt(&self, _attempt: &DeliveryAttempt) -> WebhookResult<()> {
        self.rejected_writes.fetch_add(1, Ordering::SeqCst);
        Err(WebhookError::Store("disk full".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Dispatcher assembly
// ---------------------------------------------------------------------------

/// Builds a dispatcher with instant backoff and a pinned clock.
pub fn test_dispatcher(
    store: Arc<dyn WebhookStore>,
    resolver: Arc<MockResolver>,
    transport: Arc<MockTransport>,
) -> WebhookDispatcher {
    WebhookDispatcher::with_collaborators(
        DispatcherConfig::default(),
        store,
        resolver,
        transport,
        Arc::new(NoopScheduler),
        Arc::new(FixedClock(test_instant())),
    )
}

/// A public-resolving subscription to `hooks.example.com`.
pub fn public_subscription() -> WebhookSubscription {
    WebhookSubscription::new("https://hooks.example.com/hook", SECRET_1).events(["card.created"])
}

/// A resolver that knows `hooks.example.com` as a public address.
pub fn public_resolver() -> MockResolver {
    MockResolver::new().with_host("hooks.example.com", &["93.184.216.34"])
}
