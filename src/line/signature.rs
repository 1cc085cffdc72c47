//! `x-line-signature` verification.
//!
//! LINE signs each webhook delivery with base64(HMAC-SHA256(channel
//! secret, request body)) and sends the result in the `x-line-signature`
//! header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook body against its signature header.
///
/// Comparison happens on the raw MAC bytes in constant time. Any decode
/// failure counts as a mismatch.
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let Ok(provided) = BASE64.decode(signature) else {
        return false;
    };
    mac.verify_slice(&provided).is_ok()
}

/// Compute the signature for a body, as LINE would.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC key of any length is valid");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_body_verifies() {
        let body = br#"{"events":[]}"#;
        let sig = sign("channel-secret", body);
        assert!(verify("channel-secret", body, &sig));
    }

    #[test]
    fn tampered_body_fails() {
        let sig = sign("channel-secret", br#"{"events":[]}"#);
        assert!(!verify("channel-secret", br#"{"events":[{}]}"#, &sig));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = br#"{"events":[]}"#;
        let sig = sign("channel-secret", body);
        assert!(!verify("other-secret", body, &sig));
    }

    #[test]
    fn invalid_base64_fails() {
        assert!(!verify("channel-secret", b"body", "not base64!!!"));
    }

    #[test]
    fn empty_signature_fails() {
        assert!(!verify("channel-secret", b"body", ""));
    }
}
