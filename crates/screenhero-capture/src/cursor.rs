//! `CursorTracker` polling contract.
//!
//! The host pipeline polls a `CursorSource` on its own schedule (independent
//! of the frame rate) and injects `cursorPosition` input events into the
//! outbound datagram stream. The real implementation queries the platform
//! cursor (position + shape); it is out of scope here and specified only at
//! this interface.

use crate::frame::CursorInfo;

/// Polls the current host cursor position and shape.
pub trait CursorSource: Send {
    /// Return the current cursor state. Called on the host pipeline's own
    /// cadence; implementations should be cheap and non-blocking.
    fn poll(&mut self) -> CursorInfo;
}

/// A fixed cursor position for tests and headless demo hosts.
pub struct StaticCursorSource {
    info: CursorInfo,
}

impl StaticCursorSource {
    #[must_use]
    pub fn new(info: CursorInfo) -> Self {
        Self { info }
    }
}

impl CursorSource for StaticCursorSource {
    fn poll(&mut self) -> CursorInfo {
        self.info.clone()
    }
}
