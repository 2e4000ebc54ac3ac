#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("malformed packet: {0}")]
    Malformed(String),
    #[error("unknown wire magic {0:?}")]
    UnknownMagic([u8; 4]),
    #[error("packet exceeds configured MTU: {0} bytes")]
    TooLarge(usize),
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config message (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
