//! Private-network classification for SSRF protection.
//!
//! Pure predicates over IPv4/IPv6 addresses. Everything here is
//! fail-closed: input that cannot be parsed is treated as disallowed.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Checks whether an IPv4 address falls inside a disallowed range.
///
/// Disallowed ranges:
/// - `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16` (RFC 1918)
/// - `127.0.0.0/8` (loopback)
/// - `169.254.0.0/16` (link-local, cloud metadata endpoints)
/// - `100.64.0.0/10` (carrier-grade NAT)
/// - `0.0.0.0/8` (unspecified)
pub fn is_disallowed_ipv4(addr: Ipv4Addr) -> bool {
    let [a, b, _, _] = addr.octets();
    a == 10
        || (a == 172 && (16..=31).contains(&b))
        || (a == 192 && b == 168)
        || a == 127
        || (a == 169 && b == 254)
        || (a == 100 && (64..=127).contains(&b))
        || a == 0
}

/// Fail-closed string form of [`is_disallowed_ipv4`].
///
/// Input that is not exactly four dot-separated decimal octets in 0-255
/// is disallowed.
pub fn is_disallowed_ipv4_str(input: &str) -> bool {
    let mut octets = [0u8; 4];
    let mut parts = input.split('.');

    for slot in octets.iter_mut() {
        let part = match parts.next() {
            Some(p) => p,
            None => return true,
        };
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return true;
        }
        match part.parse::<u8>() {
            Ok(value) => *slot = value,
            Err(_) => return true,
        }
    }

    if parts.next().is_some() {
        return true;
    }

    is_disallowed_ipv4(Ipv4Addr::from(octets))
}

/// Checks whether an IPv6 address falls inside a disallowed range.
///
/// Disallowed: loopback (`::1`), the unspecified address (`::`), unique
/// local (`fc00::/7`) and link-local (`fe80::/10`). IPv4-mapped addresses
/// are unwrapped and checked against the IPv4 rules.
pub fn is_disallowed_ipv6(addr: Ipv6Addr) -> bool {
    if let Some(mapped) = addr.to_ipv4_mapped() {
        return is_disallowed_ipv4(mapped);
    }

    let first = addr.segments()[0];
    addr.is_loopback()
        || addr.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

/// Fail-closed string form of [`is_disallowed_ipv6`].
pub fn is_disallowed_ipv6_str(input: &str) -> bool {
    match input.parse::<Ipv6Addr>() {
        Ok(addr) => is_disallowed_ipv6(addr),
        Err(_) => true,
    }
}

/// Checks either address family.
pub fn is_disallowed_ip(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_disallowed_ipv4(v4),
        IpAddr::V6(v6) => is_disallowed_ipv6(v6),
    }
}
