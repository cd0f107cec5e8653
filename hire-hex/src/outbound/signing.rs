//! HMAC-SHA256 signing of webhook bodies.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `payload`. `None` only if the key is rejected,
/// which HMAC never does for SHA-256.
pub fn sign_payload(payload: &[u8], secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a signature produced by [`sign_payload`].
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    match sign_payload(payload, secret) {
        Some(expected) => expected.as_bytes().ct_eq(signature.as_bytes()).into(),
        None => false,
    }
}
