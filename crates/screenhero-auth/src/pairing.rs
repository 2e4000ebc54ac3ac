//! Short-lived, single-use pairing codes the host displays and a viewer
//! types in to start a session: format `AAAA-NNNN`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::AuthError;

/// 24 letters, excluding `I` and `O` so they can't be confused with `1`/`0`.
const LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
/// 8 digits, excluding `0` and `1` for the same reason.
const DIGITS: &[u8] = b"23456789";

const LETTER_COUNT: usize = 4;
const DIGIT_COUNT: usize = 4;

pub const PAIRING_CODE_TTL: Duration = Duration::from_secs(300);

#[must_use]
pub fn generate_code() -> String {
    generate_code_with(&mut rand::rng())
}

fn generate_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let letters: String = (0..LETTER_COUNT)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect();
    let digits: String = (0..DIGIT_COUNT)
        .map(|_| DIGITS[rng.random_range(0..DIGITS.len())] as char)
        .collect();
    format!("{letters}-{digits}")
}

/// Strip dashes/whitespace and uppercase, so `aaaa nnnn`, `AAAA-NNNN` and
/// `aaaannnn` all compare equal.
fn normalize(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

struct PendingCode {
    issued_at: Instant,
    redeemed: bool,
}

/// Tracks outstanding pairing codes issued by a host. Each code is valid
/// for [`PAIRING_CODE_TTL`] and may be redeemed exactly once.
#[derive(Default)]
pub struct PairingManager {
    codes: HashMap<String, PendingCode>,
}

impl PairingManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate and register a new code, returning it in display form
    /// (`AAAA-NNNN`).
    pub fn issue(&mut self, now: Instant) -> String {
        self.reap_expired(now);
        let code = generate_code();
        self.codes.insert(
            normalize(&code),
            PendingCode {
                issued_at: now,
                redeemed: false,
            },
        );
        code
    }

    fn reap_expired(&mut self, now: Instant) {
        self.codes
            .retain(|_, pending| now.duration_since(pending.issued_at) < PAIRING_CODE_TTL);
    }

    /// Redeem a code entered by a viewer. Consumes the code on success;
    /// a second redemption attempt fails with `AlreadyRedeemed`.
    pub fn redeem(&mut self, code: &str, now: Instant) -> Result<(), AuthError> {
        self.reap_expired(now);
        let key = normalize(code);
        let pending = self.codes.get_mut(&key).ok_or(AuthError::InvalidCode)?;
        if now.duration_since(pending.issued_at) >= PAIRING_CODE_TTL {
            return Err(AuthError::CodeExpired);
        }
        if pending.redeemed {
            return Err(AuthError::AlreadyRedeemed);
        }
        pending.redeemed = true;
        Ok(())
    }
}
