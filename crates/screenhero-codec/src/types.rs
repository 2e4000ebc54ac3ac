//! Shared codec data model: `StreamConfig`, `Codec`, `EncodedPacket`.

/// Video codec selection. `Passthrough` carries raw or externally-compressed
/// bytes with no parameter-set framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    H264,
    Hevc,
    Passthrough,
}

impl Codec {
    #[must_use]
    pub fn as_wire_u8(self) -> u8 {
        match self {
            Self::H264 => 0,
            Self::Hevc => 1,
            Self::Passthrough => 2,
        }
    }

    #[must_use]
    pub fn from_wire_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::H264),
            1 => Some(Self::Hevc),
            2 => Some(Self::Passthrough),
            _ => None,
        }
    }
}

/// Immutable capture/encode parameters. Built once at pipeline
/// construction and frozen thereafter.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: Codec,
    /// Target bitrate in bits per second.
    pub bitrate: u32,
    pub keyframe_interval: u32,
    pub low_latency: bool,
    /// Maximum bytes per outgoing datagram (header + payload).
    pub max_packet_size: u32,
    pub full_color_mode: bool,
}

impl StreamConfig {
    /// Validate the invariants: all positive dimensions/rates,
    /// `keyframe_interval >= 1`, `max_packet_size` within the default LAN
    /// MTU ceiling.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invariant violated.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 || self.fps == 0 || self.bitrate == 0 {
            return Err("width, height, fps and bitrate must be positive".to_string());
        }
        if self.keyframe_interval < 1 {
            return Err("keyframe_interval must be >= 1".to_string());
        }
        if self.max_packet_size == 0 || self.max_packet_size > 1400 {
            return Err("max_packet_size must be in 1..=1400".to_string());
        }
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 60,
            codec: Codec::H264,
            bitrate: 20_000_000,
            keyframe_interval: 30,
            low_latency: true,
            max_packet_size: 1400,
            full_color_mode: false,
        }
    }
}

/// Codec output for a single frame.
///
/// Invariant (testable property 1): `is_keyframe && parameter_sets.is_some()`
/// or `!is_keyframe && parameter_sets.is_none()`, when `codec != Passthrough`.
#[derive(Debug, Clone)]
pub struct EncodedPacket {
    pub frame_id: u64,
    /// AVCC/HVCC-framed payload (4-byte length-prefixed NAL units), as
    /// emitted by the codec. The wire format does not re-wrap this.
    pub data: Vec<u8>,
    pub presentation_time_ns: u64,
    pub is_keyframe: bool,
    pub codec: Codec,
    pub width: u32,
    pub height: u32,
    pub capture_ts_ns: u64,
    pub encode_ts_ns: u64,
    /// Annex-B framed (`00 00 00 01`-prefixed) parameter sets (SPS/PPS, or
    /// VPS/SPS/PPS for HEVC). Present iff `is_keyframe` and `codec !=
    /// Passthrough`.
    pub parameter_sets: Option<Vec<u8>>,
}

impl EncodedPacket {
    /// Check the keyframe/parameter-set wire invariant.
    #[must_use]
    pub fn satisfies_keyframe_invariant(&self) -> bool {
        if self.codec == Codec::Passthrough {
            return true;
        }
        if self.is_keyframe {
            self.parameter_sets.is_some()
        } else {
            self.parameter_sets.is_none()
        }
    }
}
