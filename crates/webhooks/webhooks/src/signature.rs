//! HMAC-SHA256 payload signing and verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature on outbound deliveries.
pub const SIGNATURE_HEADER: &str = "X-Nexus-Signature-256";

/// Prefix of every signature value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Signs the raw payload bytes with the subscription secret.
///
/// Returns `"sha256=" + lowercase_hex(HMAC-SHA256(secret, payload))`,
/// exactly the value sent in [`SIGNATURE_HEADER`]. Receivers recompute
/// this over the raw body bytes and compare in constant time.
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    let digest = mac.finalize();
    format!("{SIGNATURE_PREFIX}{}", hex::encode(digest.into_bytes()))
}

/// Verifies a provided signature against the payload and secret.
///
/// Returns `false` on malformed signatures, length mismatches, or any
/// other discrepancy; never panics.
pub fn verify_signature(payload: &[u8], secret: &str, provided: &str) -> bool {
    let expected = sign_payload(payload, secret);
    constant_time_compare(expected.as_bytes(), provided.as_bytes())
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
