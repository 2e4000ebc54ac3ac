//! The `FrameSource` contract and a synthetic implementation used by
//! the host binary's test/demo path and by pipeline tests elsewhere in the
//! workspace.
//!
//! A real capture backend (ScreenCaptureKit, PipeWire/portal, DXGI, ...) is
//! explicitly out of scope here; it is specified only at this interface.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::error::CaptureError;
use crate::frame::RawFrame;

/// Emits a lazy sequence of frames at approximately the configured FPS.
///
/// # Back-pressure
///
/// Implementors MUST NOT block the platform capture callback. If the
/// downstream channel is full, the newest frame replaces the queued one
/// frames are otherwise dropped rather than queued unboundedly.
#[async_trait]
pub trait FrameSource: Send {
    /// Start producing frames. Idempotent: calling twice without an
    /// intervening `stop` is a no-op that returns `Ok(())`.
    async fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop producing frames. Idempotent and bounded in time.
    async fn stop(&mut self);

    /// Await the next captured frame. Returns `None` once the source has
    /// been stopped and will not produce further frames.
    async fn next_frame(&mut self) -> Option<RawFrame>;
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Synthetic capture source producing deterministic color-bar frames at a
/// fixed resolution and FPS, used where no real display is available
/// (tests, headless demos, CI) and standing in for a platform capture
/// surface.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    fps: u32,
    rx: Option<mpsc::Receiver<RawFrame>>,
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl SyntheticFrameSource {
    #[must_use]
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            rx: None,
            stop_tx: None,
        }
    }

    fn color_bar_frame(frame_id: u64, width: u32, height: u32) -> Vec<u8> {
        // Eight vertical color bars, a classic SMPTE-adjacent test pattern,
        // shifted one bar per frame so consecutive frames actually differ.
        const BARS: [[u8; 4]; 8] = [
            [255, 255, 255, 255], // white
            [0, 255, 255, 255],   // yellow (BGRA)
            [255, 255, 0, 255],   // cyan
            [0, 255, 0, 255],     // green
            [255, 0, 255, 255],   // magenta
            [0, 0, 255, 255],     // red
            [255, 0, 0, 255],     // blue
            [0, 0, 0, 255],       // black
        ];
        let mut data = vec![0u8; RawFrame::expected_len(width, height)];
        let bar_width = (width / 8).max(1);
        let shift = (frame_id % 8) as u32;
        for y in 0..height {
            let row_start = (y * width * 4) as usize;
            for x in 0..width {
                let bar = ((x / bar_width) + shift) % 8;
                let px = row_start + (x * 4) as usize;
                data[px..px + 4].copy_from_slice(&BARS[bar as usize]);
            }
        }
        data
    }
}

#[async_trait]
impl FrameSource for SyntheticFrameSource {
    async fn start(&mut self) -> Result<(), CaptureError> {
        if self.rx.is_some() {
            return Ok(());
        }
        if self.width == 0 || self.height == 0 || self.fps == 0 {
            return Err(CaptureError::StartFailed(
                "width, height and fps must be non-zero".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(1);
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel();
        let width = self.width;
        let height = self.height;
        let interval = Duration::from_secs_f64(1.0 / f64::from(self.fps));

        tokio::spawn(async move {
            let mut frame_id: u64 = 0;
            let mut next_tick = Instant::now();
            loop {
                if stop_rx.try_recv().is_ok() {
                    break;
                }
                let data = SyntheticFrameSource::color_bar_frame(frame_id, width, height);
                let ts = now_ns();
                let frame = RawFrame {
                    frame_id,
                    capture_ts_ns: ts,
                    presentation_ts_ns: ts,
                    width,
                    height,
                    data,
                    damage: None,
                };
                // Back-pressure policy: drop the frame if the channel is full
                // rather than block. try_send never awaits.
                if tx.try_send(frame).is_err() {
                    tracing::trace!(frame_id, "synthetic source dropped frame, channel full");
                }
                frame_id += 1;
                next_tick += interval;
                tokio::time::sleep_until(next_tick).await;
            }
        });

        self.rx = Some(rx);
        self.stop_tx = Some(stop_tx);
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        self.rx = None;
    }

    async fn next_frame(&mut self) -> Option<RawFrame> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn synthetic_source_produces_monotonic_frame_ids() {
        let mut source = SyntheticFrameSource::new(64, 64, 1000);
        source.start().await.unwrap();

        let mut last_id = None;
        for _ in 0..5 {
            let frame = source.next_frame().await.expect("frame");
            assert!(frame.is_valid());
            if let Some(last) = last_id {
                assert_eq!(frame.frame_id, last + 1);
            }
            last_id = Some(frame.frame_id);
        }
        source.stop().await;
    }

    #[tokio::test]
    async fn start_rejects_zero_dimensions() {
        let mut source = SyntheticFrameSource::new(0, 64, 30);
        assert!(matches!(
            source.start().await,
            Err(CaptureError::StartFailed(_))
        ));
    }
}
