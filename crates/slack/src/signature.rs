//! Events API request signing (`X-Slack-Signature`).
//!
//! Slack signs `v0:{timestamp}:{raw body}` with HMAC-SHA256 keyed by the
//! app's signing secret and sends `v0=<hex digest>`.

use {
    hmac::{Hmac, Mac},
    sha2::Sha256,
};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older (or newer) than this are rejected as replays.
pub const MAX_CLOCK_SKEW_SECS: i64 = 300;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature headers")]
    MissingHeaders,
    #[error("malformed request timestamp")]
    InvalidTimestamp,
    #[error("request timestamp outside the allowed window")]
    StaleTimestamp,
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a request signature against the raw body.
///
/// `now` is the current Unix time in seconds.
pub fn verify(
    signing_secret: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        return Err(SignatureError::MissingHeaders);
    };

    let sent_at: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;
    if now.abs_diff(sent_at) > MAX_CLOCK_SKEW_SECS.unsigned_abs() {
        return Err(SignatureError::StaleTimestamp);
    }

    let digest = signature
        .strip_prefix("v0=")
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or(SignatureError::Mismatch)?;

    let mut mac =
        HmacSha256::new_from_slice(signing_secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac.verify_slice(&digest).map_err(|_| SignatureError::Mismatch)
}

/// Compute the `v0=` signature for a body. Used by tests and local tooling.
pub fn sign(signing_secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(signing_secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length.
        Err(_) => return String::new(),
    };
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const BODY: &[u8] = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J";

    #[test]
    fn accepts_valid_signature() {
        let sig = sign(SECRET, "1531420618", BODY);
        assert!(sig.starts_with("v0="));
        assert_eq!(
            verify(SECRET, Some("1531420618"), Some(&sig), BODY, 1531420618),
            Ok(())
        );
    }

    #[test]
    fn rejects_tampered_body() {
        let sig = sign(SECRET, "1531420618", BODY);
        assert_eq!(
            verify(SECRET, Some("1531420618"), Some(&sig), b"tampered", 1531420618),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_wrong_secret() {
        let sig = sign("other-secret", "1531420618", BODY);
        assert_eq!(
            verify(SECRET, Some("1531420618"), Some(&sig), BODY, 1531420618),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_stale_timestamp() {
        let sig = sign(SECRET, "1000", BODY);
        assert_eq!(
            verify(SECRET, Some("1000"), Some(&sig), BODY, 1000 + MAX_CLOCK_SKEW_SECS + 1),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn tolerates_skew_within_window() {
        let sig = sign(SECRET, "1000", BODY);
        assert_eq!(
            verify(SECRET, Some("1000"), Some(&sig), BODY, 1000 + MAX_CLOCK_SKEW_SECS),
            Ok(())
        );
    }

    #[test]
    fn rejects_missing_headers() {
        assert_eq!(
            verify(SECRET, None, Some("v0=00"), BODY, 0),
            Err(SignatureError::MissingHeaders)
        );
        assert_eq!(
            verify(SECRET, Some("0"), None, BODY, 0),
            Err(SignatureError::MissingHeaders)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            verify(SECRET, Some("abc"), Some("v0=00"), BODY, 0),
            Err(SignatureError::InvalidTimestamp)
        );
        assert_eq!(
            verify(SECRET, Some("0"), Some("v1=zz"), BODY, 0),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn extreme_timestamps_are_stale() {
        for ts in [i64::MIN.to_string(), i64::MAX.to_string()] {
            assert_eq!(
                verify(SECRET, Some(&ts), Some("v0=00"), BODY, 1_700_000_000),
                Err(SignatureError::StaleTimestamp)
            );
        }
        assert_eq!(
            verify(SECRET, Some("0"), Some("v0=00"), BODY, i64::MIN),
            Err(SignatureError::StaleTimestamp)
        );
    }
}
