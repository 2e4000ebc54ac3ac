/// Errors surfaced by a [`crate::source::FrameSource`] at start time.
///
/// These are fatal-to-session: the pipeline
/// reports them to the user rather than retrying automatically.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no display matching the requested index was found")]
    DisplayNotFound,
    #[error("screen capture permission was denied")]
    PermissionDenied,
    #[error("failed to start capture session: {0}")]
    StartFailed(String),
}
