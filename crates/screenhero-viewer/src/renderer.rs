//! Headless frame presentation: the surface a real windowing backend would
//! sit behind. Enforces that presentation timestamps only move forward,
//! since a decoder can complete frames slightly out of order even though
//! `Decoder::decode` serializes them per-caller.

/// One decoded image ready to be shown.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub frame_id: u64,
    pub presentation_time_ns: u64,
    pub width: u32,
    pub height: u32,
    pub image: Vec<u8>,
}

#[derive(Default)]
pub struct Renderer {
    last_presentation_time_ns: Option<u64>,
    frames_rendered: u64,
    frames_dropped_stale: u64,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Present one frame. Returns `false` without rendering it if its
    /// presentation time does not exceed the last rendered frame's, which
    /// would otherwise show the viewer a moment that has already passed.
    pub fn present(&mut self, frame: &RenderedFrame) -> bool {
        if let Some(last) = self.last_presentation_time_ns {
            if frame.presentation_time_ns <= last {
                self.frames_dropped_stale += 1;
                tracing::trace!(
                    frame_id = frame.frame_id,
                    presentation_time_ns = frame.presentation_time_ns,
                    "dropping stale frame"
                );
                return false;
            }
        }
        self.last_presentation_time_ns = Some(frame.presentation_time_ns);
        self.frames_rendered += 1;
        true
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    #[must_use]
    pub fn frames_dropped_stale(&self) -> u64 {
        self.frames_dropped_stale
    }
}
