//! Report digests.
//!
//! A signed report carries `SHA1(payload || secret)` rendered as lowercase
//! hex, where `payload` is the first four tokens of the datagram joined by
//! single spaces. This is a plain hash over the concatenation, not an HMAC;
//! the layout is part of the wire format and must stay byte-compatible with
//! existing clients.

use sha1::{Digest, Sha1};

/// Length of a hex-encoded digest in characters.
pub const DIGEST_HEX_LEN: usize = 40;

/// Compute the hex digest of `payload` keyed by `secret`.
pub fn digest(payload: &str, secret: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret);
    hex::encode(hasher.finalize())
}

/// Verifies a supplied digest against the payload and secret.
///
/// Comparison is exact: no case folding, no prefix matching.
pub fn verify(payload: &str, secret: &[u8], supplied: &str) -> bool {
    supplied.len() == DIGEST_HEX_LEN && digest(payload, secret) == supplied
}
