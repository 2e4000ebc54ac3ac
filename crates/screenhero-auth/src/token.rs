//! Single-use session tokens issued after a successful pairing redemption,
//! signed with HMAC-SHA256 so a viewer cannot forge or extend one.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Expired,
    InvalidHost,
    InvalidSignature,
}

/// A signed, time-bounded grant for one viewer to connect to one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: String,
    pub host_id: String,
    pub viewer_id: String,
    pub created_at: u64,
    pub expires_at: u64,
    /// Lowercase hex-encoded HMAC-SHA256 signature over the fields above.
    pub signature: String,
}

fn signing_input(id: &str, host_id: &str, viewer_id: &str, created_at: u64, expires_at: u64) -> String {
    format!("{id}|{host_id}|{viewer_id}|{created_at}|{expires_at}")
}

fn sign(secret: &[u8], input: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts a key of any length");
    mac.update(input.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

impl AuthToken {
    /// Mint a new token valid for `ttl_secs` starting at `created_at`
    /// (unix seconds).
    #[must_use]
    pub fn issue(
        id: String,
        host_id: String,
        viewer_id: String,
        created_at: u64,
        ttl_secs: u64,
        secret: &[u8],
    ) -> Self {
        let expires_at = created_at + ttl_secs;
        let signature = sign(
            secret,
            &signing_input(&id, &host_id, &viewer_id, created_at, expires_at),
        );
        Self {
            id,
            host_id,
            viewer_id,
            created_at,
            expires_at,
            signature,
        }
    }

    /// Validate the token's signature, expiry, and that it was issued for
    /// `expected_host_id`. Signature comparison is constant-time via the
    /// `hmac` crate's `Mac::verify_slice`.
    #[must_use]
    pub fn validate(&self, secret: &[u8], expected_host_id: &str, now: u64) -> ValidationOutcome {
        if self.host_id != expected_host_id {
            return ValidationOutcome::InvalidHost;
        }
        let input = signing_input(&self.id, &self.host_id, &self.viewer_id, self.created_at, self.expires_at);
        let Ok(expected_bytes) = hex::decode(&self.signature) else {
            return ValidationOutcome::InvalidSignature;
        };
        let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts a key of any length");
        mac.update(input.as_bytes());
        if mac.verify_slice(&expected_bytes).is_err() {
            return ValidationOutcome::InvalidSignature;
        }
        if now >= self.expires_at {
            return ValidationOutcome::Expired;
        }
        ValidationOutcome::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-shared-secret";

    #[test]
    fn valid_token_validates() {
        let token = AuthToken::issue("t1".into(), "host-a".into(), "viewer-b".into(), 1_000, 3600, SECRET);
        assert_eq!(token.validate(SECRET, "host-a", 1_500), ValidationOutcome::Valid);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = AuthToken::issue("t1".into(), "host-a".into(), "viewer-b".into(), 1_000, 3600, SECRET);
        assert_eq!(
            token.validate(SECRET, "host-a", 10_000),
            ValidationOutcome::Expired
        );
    }

    #[test]
    fn wrong_host_is_rejected() {
        let token = AuthToken::issue("t1".into(), "host-a".into(), "viewer-b".into(), 1_000, 3600, SECRET);
        assert_eq!(
            token.validate(SECRET, "host-z", 1_500),
            ValidationOutcome::InvalidHost
        );
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let mut token = AuthToken::issue("t1".into(), "host-a".into(), "viewer-b".into(), 1_000, 3600, SECRET);
        token.expires_at += 1; // tamper with a signed field without re-signing
        assert_eq!(
            token.validate(SECRET, "host-a", 1_500),
            ValidationOutcome::InvalidSignature
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = AuthToken::issue("t1".into(), "host-a".into(), "viewer-b".into(), 1_000, 3600, SECRET);
        assert_eq!(
            token.validate(b"different-secret", "host-a", 1_500),
            ValidationOutcome::InvalidSignature
        );
    }
}
