//! Cryptographic utilities for webhook verification and signed upload keys.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum clock skew accepted for webhook timestamps.
const WEBHOOK_TOLERANCE_SECONDS: i64 = 5 * 60;

/// Compute HMAC-SHA256 and return hex-encoded result.
///
/// # Panics
///
/// This function will never panic in practice. The `expect` call is guarded by
/// the invariant that HMAC-SHA256 accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_hex(secret: &[u8], message: &str) -> String {
    hex::encode(hmac_sha256(secret, message))
}

/// Compute HMAC-SHA256 and return base64-encoded result.
#[must_use]
pub fn hmac_sha256_base64(secret: &[u8], message: &str) -> String {
    BASE64.encode(hmac_sha256(secret, message))
}

fn hmac_sha256(secret: &[u8], message: &str) -> Vec<u8> {
    // INVARIANT: HMAC-SHA256 accepts keys of any size per RFC 2104, so
    // `new_from_slice` only fails if the Hmac implementation is broken.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts any key size");
    mac.update(message.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Verify a PortOne webhook signature (standard-webhooks scheme).
///
/// The signed message is `"{id}.{timestamp}.{body}"`, signed with
/// HMAC-SHA256 using the base64-decoded secret (an optional `whsec_` prefix
/// is stripped first). The signature header carries space-separated
/// `v1,<base64 sig>` entries; verification succeeds if any entry matches.
/// Timestamps more than five minutes from `now` are rejected.
///
/// # Errors
///
/// Returns a description of the failure, suitable for logging only.
pub fn verify_webhook_signature(
    secret: &str,
    webhook_id: &str,
    timestamp: &str,
    body: &str,
    signature_header: &str,
    now: DateTime<Utc>,
) -> Result<(), String> {
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| format!("invalid webhook timestamp: {timestamp}"))?;

    let skew = (now.timestamp() - ts).abs();
    if skew > WEBHOOK_TOLERANCE_SECONDS {
        return Err(format!("webhook timestamp outside tolerance: {skew}s"));
    }

    let secret = secret.strip_prefix("whsec_").unwrap_or(secret);
    let key = BASE64
        .decode(secret)
        .map_err(|_| "webhook secret is not valid base64".to_string())?;

    let message = format!("{webhook_id}.{timestamp}.{body}");
    let expected = hmac_sha256_base64(&key, &message);

    let valid = signature_header
        .split_whitespace()
        .filter_map(|entry| entry.strip_prefix("v1,"))
        .any(|sig| constant_time_eq(&expected, sig));

    if valid {
        Ok(())
    } else {
        Err("signature mismatch".into())
    }
}

/// Sign a webhook payload the way the provider does.
///
/// Used by tests and local tooling to produce valid signature headers.
#[must_use]
pub fn sign_webhook(secret: &str, webhook_id: &str, timestamp: &str, body: &str) -> String {
    let secret = secret.strip_prefix("whsec_").unwrap_or(secret);
    let key = BASE64.decode(secret).unwrap_or_default();
    let message = format!("{webhook_id}.{timestamp}.{body}");
    format!("v1,{}", hmac_sha256_base64(&key, &message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_secret() -> String {
        // "beatdeck-webhook-secret" base64-encoded
        format!("whsec_{}", BASE64.encode("beatdeck-webhook-secret"))
    }

    #[test]
    fn hmac_sha256_produces_correct_length() {
        let result = hmac_sha256_hex(b"key", "The quick brown fox jumps over the lazy dog");
        assert_eq!(result.len(), 64); // SHA256 = 32 bytes = 64 hex chars
    }

    #[test]
    fn hmac_sha256_is_deterministic() {
        assert_eq!(
            hmac_sha256_base64(b"secret", "message"),
            hmac_sha256_base64(b"secret", "message")
        );
        assert_ne!(
            hmac_sha256_base64(b"secret", "message1"),
            hmac_sha256_base64(b"secret", "message2")
        );
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(constant_time_eq("", ""));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
        assert!(!constant_time_eq("abc", "ABC"));
    }

    #[test]
    fn valid_signature_verifies() {
        let secret = test_secret();
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let body = r#"{"type":"Transaction.Paid"}"#;

        let header = sign_webhook(&secret, "wh_1", &ts, body);

        assert!(verify_webhook_signature(&secret, "wh_1", &ts, body, &header, now).is_ok());
    }

    #[test]
    fn tampered_body_rejected() {
        let secret = test_secret();
        let now = Utc::now();
        let ts = now.timestamp().to_string();

        let header = sign_webhook(&secret, "wh_1", &ts, "original");

        assert!(verify_webhook_signature(&secret, "wh_1", &ts, "tampered", &header, now).is_err());
    }

    #[test]
    fn stale_timestamp_rejected() {
        let secret = test_secret();
        let now = Utc::now();
        let stale = (now.timestamp() - 10 * 60).to_string();
        let body = "{}";

        let header = sign_webhook(&secret, "wh_1", &stale, body);

        assert!(verify_webhook_signature(&secret, "wh_1", &stale, body, &header, now).is_err());
    }

    #[test]
    fn any_matching_entry_verifies() {
        let secret = test_secret();
        let now = Utc::now();
        let ts = now.timestamp().to_string();
        let body = "{}";

        let good = sign_webhook(&secret, "wh_1", &ts, body);
        let header = format!("v1,bogus {good}");

        assert!(verify_webhook_signature(&secret, "wh_1", &ts, body, &header, now).is_ok());
    }
}
