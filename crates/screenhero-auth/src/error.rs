#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("pairing code not found or already consumed")]
    InvalidCode,
    #[error("pairing code has expired")]
    CodeExpired,
    #[error("pairing code was already redeemed")]
    AlreadyRedeemed,
}
