//! Pairing and session-token authentication for the screenhero streaming
//! pipeline.
//!
//! - `pairing.rs`: short-lived, single-use `AAAA-NNNN` pairing codes
//! - `token.rs`: HMAC-SHA256 signed session tokens
//! - `persistence.rs`: host secret and viewer token store on disk

pub mod error;
pub mod pairing;
pub mod persistence;
pub mod token;

pub use error::AuthError;
pub use pairing::{generate_code, PairingManager, PAIRING_CODE_TTL};
pub use persistence::{default_host_secret_path, default_token_store_path, load_or_create_host_secret, TokenStore};
pub use token::{AuthToken, ValidationOutcome};
