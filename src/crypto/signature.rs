//! Deterministic SHA-256 signatures derived from the app id and secret.
//!
//! Every signature is `hex(sha256(parts.join(":")))` over UTF-8 input,
//! lowercase. Other SDKs for the service produce the same bytes.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Lowercase hex SHA-256 of `input`.
pub(crate) fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Static `Authorization` header value: `{app_id}:{hex(sha256("{app_id}:{secret}"))}`.
pub fn authorization_header(app_id: &str, secret: &str) -> String {
    format!("{}:{}", app_id, sha256_hex(&format!("{}:{}", app_id, secret)))
}

/// Proves to the service that `socket_id` may join `channel`.
pub fn channel_auth_signature(app_id: &str, secret: &str, socket_id: &str, channel: &str) -> String {
    sha256_hex(&format!("{}:{}:{}:{}", app_id, secret, socket_id, channel))
}

/// Signature carried in the `Authorization` header of inbound webhooks.
/// Constant for a credential pair.
pub fn webhook_signature(app_id: &str, secret: &str) -> String {
    sha256_hex(&format!("webhook:{}:{}", app_id, secret))
}

/// Full-string comparison in constant time.
pub fn verify_signature(expected: &str, received: &str) -> bool {
    bool::from(expected.as_bytes().ct_eq(received.as_bytes()))
}
