//! Destination validation and SSRF protection.
//!
//! A destination URL is only handed to the HTTP transport after every
//! address it can reach has been classified as public. Validation never
//! returns an error: anything that cannot be proven safe degrades to
//! [`ValidationResult::Blocked`].

use std::io;
use std::net::IpAddr;

use async_trait::async_trait;
use url::{Host, Url};

use crate::net;

/// Hostnames rejected before any DNS lookup, matched case-insensitively.
pub const HOST_BLOCKLIST: &[&str] = &[
    "localhost",
    "0.0.0.0",
    "metadata.google.internal",
    "metadata.goog",
];

/// Outcome of destination validation. In-memory only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every reachable address is public. Carries the resolved set so a
    /// transport may pin the connection to a validated address.
    Allowed {
        /// Addresses the hostname resolved to (or the literal IP itself).
        resolved: Vec<IpAddr>,
    },
    /// The destination must not be contacted.
    Blocked {
        /// Human-readable reason, surfaced in diagnostics only.
        reason: String,
    },
}

impl ValidationResult {
    fn blocked(reason: impl Into<String>) -> Self {
        ValidationResult::Blocked {
            reason: reason.into(),
        }
    }

    /// Returns true if the destination was blocked.
    pub fn is_blocked(&self) -> bool {
        matches!(self, ValidationResult::Blocked { .. })
    }
}

/// DNS resolution seam, injectable for deterministic tests.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves a hostname to all of its A/AAAA addresses.
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Production resolver backed by the system resolver via tokio.
pub struct TokioResolver;

#[async_trait]
impl Resolver for TokioResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Validates a webhook destination URL.
///
/// Checks, in order:
/// 1. URL parses and the scheme is http or https
/// 2. hostname is not on [`HOST_BLOCKLIST`]
/// 3. a literal IP host is classified directly, no DNS
/// 4. otherwise the hostname resolves to at least one address
/// 5. every resolved address is public
///
/// A single disallowed address blocks the whole destination: DNS answers
/// are attacker-influenced, and a multi-answer response must not be able
/// to smuggle one private address past validation.
pub async fn validate_destination(url: &str, resolver: &dyn Resolver) -> ValidationResult {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => return ValidationResult::blocked(format!("invalid URL: {e}")),
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return ValidationResult::blocked(format!("unsupported URL scheme: {scheme}"));
        }
    }

    match parsed.host() {
        None => ValidationResult::blocked("URL has no host"),
        Some(Host::Ipv4(v4)) => {
            if net::is_disallowed_ipv4(v4) {
                ValidationResult::blocked(format!("address {v4} is private or reserved"))
            } else {
                ValidationResult::Allowed {
                    resolved: vec![IpAddr::V4(v4)],
                }
            }
        }
        Some(Host::Ipv6(v6)) => {
            if net::is_disallowed_ipv6(v6) {
                ValidationResult::blocked(format!("address {v6} is private or reserved"))
            } else {
                ValidationResult::Allowed {
                    resolved: vec![IpAddr::V6(v6)],
                }
            }
        }
        Some(Host::Domain(domain)) => {
            let lower = domain.to_ascii_lowercase();
            if HOST_BLOCKLIST.contains(&lower.as_str()) {
                return ValidationResult::blocked(format!("host {lower} is blocklisted"));
            }

            let resolved = match resolver.resolve(&lower).await {
                Ok(addrs) => addrs,
                Err(e) => {
                    return ValidationResult::blocked(format!("DNS resolution failed: {e}"));
                }
            };
            if resolved.is_empty() {
                return ValidationResult::blocked("DNS resolution returned no addresses");
            }

            if let Some(bad) = resolved.iter().find(|ip| net::is_disallowed_ip(**ip)) {
                return ValidationResult::blocked(format!(
                    "host {lower} resolves to private or reserved address {bad}"
                ));
            }

            ValidationResult::Allowed { resolved }
        }
    }
}
