#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("malformed input event: {0}")]
    Malformed(String),
    #[error("failed to inject input: {0}")]
    InjectionFailed(String),
    #[error("input capture is not available: {0}")]
    CaptureUnavailable(String),
}
