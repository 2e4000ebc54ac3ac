//! Encoder orchestration: keyframe policy, parameter-set extraction, and a
//! soft bitrate cap, layered over an `EncoderBackend`.

use std::collections::VecDeque;

use screenhero_capture::RawFrame;

use crate::backend::EncoderBackend;
use crate::error::CodecError;
use crate::types::{Codec, EncodedPacket, StreamConfig};

/// Caps instantaneous throughput at 1.25x the configured average bitrate,
/// measured over a trailing 1-second window of presentation timestamps.
const BITRATE_CAP_FACTOR: f64 = 1.25;
const BITRATE_WINDOW_NS: u64 = 1_000_000_000;

struct BitrateWindow {
    /// (presentation_time_ns, encoded byte length) for frames in the
    /// trailing window, oldest first.
    samples: VecDeque<(u64, usize)>,
}

impl BitrateWindow {
    fn new() -> Self {
        Self {
            samples: VecDeque::new(),
        }
    }

    fn push_and_sum(&mut self, ts_ns: u64, len: usize) -> usize {
        self.samples.push_back((ts_ns, len));
        while let Some(&(oldest_ts, _)) = self.samples.front() {
            if ts_ns.saturating_sub(oldest_ts) > BITRATE_WINDOW_NS {
                self.samples.pop_front();
            } else {
                break;
            }
        }
        self.samples.iter().map(|(_, len)| *len).sum()
    }
}

/// Drives an `EncoderBackend` session to encode a stream of raw frames,
/// attaching the keyframe/parameter-set metadata the wire codec needs.
pub struct Encoder {
    backend: Box<dyn EncoderBackend>,
    config: Option<StreamConfig>,
    frames_encoded: u64,
    last_frame_id: Option<u64>,
    bitrate_window: BitrateWindow,
}

impl Encoder {
    #[must_use]
    pub fn new(backend: Box<dyn EncoderBackend>) -> Self {
        Self {
            backend,
            config: None,
            frames_encoded: 0,
            last_frame_id: None,
            bitrate_window: BitrateWindow::new(),
        }
    }

    pub async fn configure(&mut self, config: StreamConfig) -> Result<(), CodecError> {
        config
            .validate()
            .map_err(CodecError::SessionCreationFailed)?;
        self.backend.create_session(&config).await?;
        self.frames_encoded = 0;
        self.last_frame_id = None;
        self.bitrate_window = BitrateWindow::new();
        self.config = Some(config);
        Ok(())
    }

    /// Force a keyframe on frame 0 and at every `keyframe_interval` frames
    /// thereafter.
    fn keyframe_due(&self, config: &StreamConfig) -> bool {
        self.frames_encoded == 0 || self.frames_encoded % u64::from(config.keyframe_interval) == 0
    }

    /// Encode one frame. Frame IDs must be strictly increasing; a
    /// non-increasing `frame_id` indicates the caller fed frames out of
    /// capture order and is rejected rather than silently reordered.
    pub async fn encode(&mut self, frame: &RawFrame) -> Result<EncodedPacket, CodecError> {
        let config = self
            .config
            .as_ref()
            .ok_or(CodecError::NotConfigured)?
            .clone();

        if let Some(last) = self.last_frame_id {
            if frame.frame_id <= last {
                return Err(CodecError::InvalidInput(format!(
                    "frame_id {} did not increase past {}",
                    frame.frame_id, last
                )));
            }
        }
        if !frame.is_valid() {
            return Err(CodecError::InvalidInput(
                "frame buffer length does not match declared dimensions".to_string(),
            ));
        }

        let force_keyframe = self.keyframe_due(&config);
        let out = self
            .backend
            .encode(&frame.data, frame.width, frame.height, force_keyframe)
            .await?;

        let encode_ts_ns = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        let windowed_bytes = self
            .bitrate_window
            .push_and_sum(frame.presentation_ts_ns, out.payload.len());
        let cap_bytes = ((f64::from(config.bitrate) / 8.0) * BITRATE_CAP_FACTOR) as usize;
        if windowed_bytes > cap_bytes {
            tracing::warn!(
                windowed_bytes,
                cap_bytes,
                frame_id = frame.frame_id,
                "encoder exceeded soft bitrate cap over trailing window"
            );
        }

        self.frames_encoded += 1;
        self.last_frame_id = Some(frame.frame_id);

        Ok(EncodedPacket {
            frame_id: frame.frame_id,
            data: out.payload,
            presentation_time_ns: frame.presentation_ts_ns,
            is_keyframe: out.is_keyframe,
            codec: config.codec,
            width: frame.width,
            height: frame.height,
            capture_ts_ns: frame.capture_ts_ns,
            encode_ts_ns,
            parameter_sets: out.parameter_sets,
        })
    }

    /// Tear down the backend session. Idempotent.
    pub async fn flush(&mut self) {
        self.backend.destroy_session().await;
        self.config = None;
    }

    #[must_use]
    pub fn codec(&self) -> Option<Codec> {
        self.config.as_ref().map(|c| c.codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FakeEncoderBackend;

    fn frame(id: u64) -> RawFrame {
        RawFrame {
            frame_id: id,
            capture_ts_ns: id * 16_666_667,
            presentation_ts_ns: id * 16_666_667,
            width: 4,
            height: 4,
            data: vec![0u8; 4 * 4 * 4],
            damage: None,
        }
    }

    fn test_config() -> StreamConfig {
        let mut cfg = StreamConfig::default();
        cfg.width = 4;
        cfg.height = 4;
        cfg.keyframe_interval = 3;
        cfg
    }

    #[tokio::test]
    async fn first_frame_and_every_interval_is_a_keyframe() {
        let mut enc = Encoder::new(Box::new(FakeEncoderBackend::new()));
        enc.configure(test_config()).await.unwrap();

        let mut keyframes = Vec::new();
        for id in 0..6 {
            let packet = enc.encode(&frame(id)).await.unwrap();
            keyframes.push(packet.is_keyframe);
            assert!(packet.satisfies_keyframe_invariant());
        }
        assert_eq!(keyframes, vec![true, false, false, true, false, false]);
    }

    #[tokio::test]
    async fn rejects_non_increasing_frame_ids() {
        let mut enc = Encoder::new(Box::new(FakeEncoderBackend::new()));
        enc.configure(test_config()).await.unwrap();
        enc.encode(&frame(5)).await.unwrap();
        let err = enc.encode(&frame(5)).await.unwrap_err();
        assert!(matches!(err, CodecError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn encode_before_configure_is_rejected() {
        let mut enc = Encoder::new(Box::new(FakeEncoderBackend::new()));
        let err = enc.encode(&frame(0)).await.unwrap_err();
        assert!(matches!(err, CodecError::NotConfigured));
    }

    #[tokio::test]
    async fn flush_requires_reconfigure_before_reuse() {
        let mut enc = Encoder::new(Box::new(FakeEncoderBackend::new()));
        enc.configure(test_config()).await.unwrap();
        enc.encode(&frame(0)).await.unwrap();
        enc.flush().await;
        let err = enc.encode(&frame(1)).await.unwrap_err();
        assert!(matches!(err, CodecError::NotConfigured));
    }
}
