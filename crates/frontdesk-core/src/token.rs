// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed, expiring visitor-session tokens.
//!
//! Handed to an unauthenticated visitor at conversation start so they can
//! keep posting to their own conversation without an account. The token is
//! HMAC-SHA256 over `conversation_id|email|expiry` with a configured secret,
//! so it cannot be forged from public data and stops working after its TTL.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::FrontdeskError;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a verified visitor token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorClaims {
    pub conversation_id: i64,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues a token binding `conversation_id` and `email` until `now + ttl`.
pub fn issue(
    secret: &[u8],
    conversation_id: i64,
    email: &str,
    now: DateTime<Utc>,
    ttl: std::time::Duration,
) -> Result<String, FrontdeskError> {
    if secret.is_empty() {
        return Err(FrontdeskError::Config(
            "visitor token secret must not be empty".into(),
        ));
    }
    let expires = now.timestamp() + ttl.as_secs() as i64;
    let payload = format!("{conversation_id}|{email}|{expires}");
    let sig = sign(secret, payload.as_bytes())?;
    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(payload.as_bytes()),
        URL_SAFE_NO_PAD.encode(sig)
    ))
}

/// Verifies a token's signature and expiry, returning its claims.
pub fn verify(
    secret: &[u8],
    token: &str,
    now: DateTime<Utc>,
) -> Result<VisitorClaims, FrontdeskError> {
    let (payload_b64, sig_b64) = token
        .split_once('.')
        .ok_or_else(|| FrontdeskError::Forbidden("malformed visitor token".into()))?;
    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| FrontdeskError::Forbidden("malformed visitor token".into()))?;
    let sig = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| FrontdeskError::Forbidden("malformed visitor token".into()))?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| FrontdeskError::Internal(format!("hmac key setup failed: {e}")))?;
    mac.update(&payload);
    mac.verify_slice(&sig)
        .map_err(|_| FrontdeskError::Forbidden("invalid visitor token signature".into()))?;

    let payload = String::from_utf8(payload)
        .map_err(|_| FrontdeskError::Forbidden("malformed visitor token".into()))?;
    let mut parts = payload.splitn(3, '|');
    let conversation_id = parts
        .next()
        .and_then(|p| p.parse::<i64>().ok())
        .ok_or_else(|| FrontdeskError::Forbidden("malformed visitor token".into()))?;
    let email = parts
        .next()
        .ok_or_else(|| FrontdeskError::Forbidden("malformed visitor token".into()))?
        .to_string();
    let expires = parts
        .next()
        .and_then(|p| p.parse::<i64>().ok())
        .ok_or_else(|| FrontdeskError::Forbidden("malformed visitor token".into()))?;

    let expires_at = DateTime::from_timestamp(expires, 0)
        .ok_or_else(|| FrontdeskError::Forbidden("malformed visitor token".into()))?;
    if now >= expires_at {
        return Err(FrontdeskError::Forbidden("visitor token expired".into()));
    }

    Ok(VisitorClaims {
        conversation_id,
        email,
        expires_at,
    })
}

fn sign(secret: &[u8], payload: &[u8]) -> Result<Vec<u8>, FrontdeskError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| FrontdeskError::Internal(format!("hmac key setup failed: {e}")))?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SECRET: &[u8] = b"test-secret-at-least-long-enough";

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let now = at(1_700_000_000);
        let token = issue(SECRET, 42, "ana@x.com", now, Duration::from_secs(3600)).unwrap();
        let claims = verify(SECRET, &token, now).unwrap();
        assert_eq!(claims.conversation_id, 42);
        assert_eq!(claims.email, "ana@x.com");
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = at(1_700_000_000);
        let token = issue(SECRET, 42, "ana@x.com", now, Duration::from_secs(60)).unwrap();
        let later = at(1_700_000_061);
        let err = verify(SECRET, &token, later).unwrap_err();
        assert!(matches!(err, FrontdeskError::Forbidden(_)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = at(1_700_000_000);
        let token = issue(SECRET, 42, "ana@x.com", now, Duration::from_secs(3600)).unwrap();
        let (_, sig) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(b"43|ana@x.com|1700003600");
        let forged = format!("{forged_payload}.{sig}");
        assert!(verify(SECRET, &forged, now).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = at(1_700_000_000);
        let token = issue(SECRET, 42, "ana@x.com", now, Duration::from_secs(3600)).unwrap();
        assert!(verify(b"another-secret", &token, now).is_err());
    }

    #[test]
    fn empty_secret_cannot_issue() {
        let now = at(1_700_000_000);
        let err = issue(b"", 1, "a@b.c", now, Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, FrontdeskError::Config(_)));
    }
}
