/// Errors surfaced by [`crate::encoder::Encoder`] and [`crate::decoder::Decoder`].
#[derive(Debug, thiserror::Error, Clone)]
pub enum CodecError {
    /// Encoder/decoder `encode`/`decode` called before `configure`.
    #[error("codec session not configured")]
    NotConfigured,
    /// Capture emitted a status frame rather than real pixels; skip silently.
    #[error("no image buffer in frame")]
    NoImageBuffer,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create codec session: {0}")]
    SessionCreationFailed(String),
    #[error("encoding failed: {0}")]
    EncodingFailed(String),
    /// Decoder rejected a non-keyframe packet while awaiting a keyframe.
    /// Recoverable; the pipeline drops the frame and continues.
    #[error("decoder is waiting for a keyframe")]
    WaitingForKeyframe,
    #[error("decoding failed: {0}")]
    DecodingFailed(String),
    #[error("invalid data")]
    InvalidData,
    /// The in-flight request was cancelled by `stop()`.
    #[error("operation cancelled")]
    Cancelled,
}
