//! Wire magic constants and the video fragment header.
//!
//! Every datagram starts with a 4-byte ASCII magic identifying the payload
//! kind, so a demultiplexing socket can route a single UDP port to the
//! right consumer:
//!
//! - `SHVP`: a video fragment (see [`VideoFragmentHeader`])
//! - `SHTL`: a tile update (see [`crate::tile::TileUpdate`])
//! - `SHIP`: an input event (see `screenhero_input::InputEvent`)
//! - `SHCF`: a JSON config/control message (see [`crate::config_msg::ConfigMessage`])

use screenhero_codec::Codec;

use crate::error::TransportError;

pub const MAGIC_VIDEO: [u8; 4] = *b"SHVP";
pub const MAGIC_TILE: [u8; 4] = *b"SHTL";
pub const MAGIC_INPUT: [u8; 4] = *b"SHIP";
pub const MAGIC_CONFIG: [u8; 4] = *b"SHCF";

pub const VIDEO_FRAGMENT_HEADER_LEN: usize = 48;

pub const WIRE_VERSION: u8 = 1;

const FLAG_KEYFRAME: u8 = 1 << 0;
const FLAG_HAS_PARAMETER_SETS: u8 = 1 << 1;

/// Fixed header prefixed to every video fragment datagram. The bytes that
/// follow, up to `payload_len`, are this fragment's slice of the frame's
/// encoded payload (see [`crate::packetizer`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFragmentHeader {
    pub version: u8,
    pub is_keyframe: bool,
    /// Set on fragment 0 of a keyframe, when `parameter_set_len > 0`.
    pub has_parameter_sets: bool,
    pub codec: Codec,
    pub frame_id: u64,
    /// Capture timestamp of the frame this fragment belongs to, carried on
    /// every fragment so a receiver can compute capture-to-receive latency
    /// without waiting for reassembly to finish.
    pub capture_time_ns: u64,
    pub presentation_time_ns: u64,
    pub width: u16,
    pub height: u16,
    pub fragment_index: u16,
    pub fragment_count: u16,
    /// Length, in bytes, of the Annex-B parameter-set block prefixed to the
    /// reassembled payload. Zero for non-keyframes.
    pub parameter_set_len: u32,
    /// Length of this datagram's own payload slice.
    pub payload_len: u32,
}

impl VideoFragmentHeader {
    #[must_use]
    pub fn encode(&self) -> [u8; VIDEO_FRAGMENT_HEADER_LEN] {
        let mut buf = [0u8; VIDEO_FRAGMENT_HEADER_LEN];
        let mut flags = 0u8;
        if self.is_keyframe {
            flags |= FLAG_KEYFRAME;
        }
        if self.has_parameter_sets {
            flags |= FLAG_HAS_PARAMETER_SETS;
        }
        buf[0..4].copy_from_slice(&MAGIC_VIDEO);
        buf[4] = self.version;
        buf[5] = flags;
        buf[6] = self.codec.as_wire_u8();
        buf[7] = 0; // reserved
        buf[8..16].copy_from_slice(&self.frame_id.to_be_bytes());
        buf[16..24].copy_from_slice(&self.capture_time_ns.to_be_bytes());
        buf[24..32].copy_from_slice(&self.presentation_time_ns.to_be_bytes());
        buf[32..34].copy_from_slice(&self.width.to_be_bytes());
        buf[34..36].copy_from_slice(&self.height.to_be_bytes());
        buf[36..38].copy_from_slice(&self.fragment_index.to_be_bytes());
        buf[38..40].copy_from_slice(&self.fragment_count.to_be_bytes());
        buf[40..44].copy_from_slice(&self.parameter_set_len.to_be_bytes());
        buf[44..48].copy_from_slice(&self.payload_len.to_be_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, TransportError> {
        if buf.len() < VIDEO_FRAGMENT_HEADER_LEN {
            return Err(TransportError::Malformed(format!(
                "video fragment header needs {VIDEO_FRAGMENT_HEADER_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let magic: [u8; 4] = buf[0..4].try_into().unwrap();
        if magic != MAGIC_VIDEO {
            return Err(TransportError::UnknownMagic(magic));
        }
        let flags = buf[5];
        let codec = Codec::from_wire_u8(buf[6])
            .ok_or_else(|| TransportError::Malformed(format!("unknown codec byte {}", buf[6])))?;
        Ok(Self {
            version: buf[4],
            is_keyframe: flags & FLAG_KEYFRAME != 0,
            has_parameter_sets: flags & FLAG_HAS_PARAMETER_SETS != 0,
            codec,
            frame_id: u64::from_be_bytes(buf[8..16].try_into().unwrap()),
            capture_time_ns: u64::from_be_bytes(buf[16..24].try_into().unwrap()),
            presentation_time_ns: u64::from_be_bytes(buf[24..32].try_into().unwrap()),
            width: u16::from_be_bytes(buf[32..34].try_into().unwrap()),
            height: u16::from_be_bytes(buf[34..36].try_into().unwrap()),
            fragment_index: u16::from_be_bytes(buf[36..38].try_into().unwrap()),
            fragment_count: u16::from_be_bytes(buf[38..40].try_into().unwrap()),
            parameter_set_len: u32::from_be_bytes(buf[40..44].try_into().unwrap()),
            payload_len: u32::from_be_bytes(buf[44..48].try_into().unwrap()),
        })
    }
}

/// Peek at a datagram's leading magic without consuming it, to route the
/// packet to the right parser.
#[must_use]
pub fn peek_magic(buf: &[u8]) -> Option<[u8; 4]> {
    buf.get(0..4).map(|m| m.try_into().unwrap())
}
