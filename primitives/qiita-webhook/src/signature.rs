//! GitHub webhook signature validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying `sha256=<hex digest>` of the request body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Validates an `X-Hub-Signature-256` value against the raw body.
///
/// The digest comparison is constant time.
pub fn validate_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Some(digest) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let expected = match hex::decode(digest) {
        Ok(h) => h,
        Err(_) => return false,
    };

    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);

    mac.verify_slice(&expected).is_ok()
}

/// Signature header value for `body`, as GitHub computes it.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
