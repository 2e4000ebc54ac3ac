//! Tile update wire format, used instead of a full-frame video fragment
//! when only a small damaged region changed.

use crate::error::TransportError;
use crate::wire::MAGIC_TILE;

pub const TILE_UPDATE_HEADER_LEN: usize = 36;

/// A single damaged-region patch: header fields plus the raw BGRA pixel
/// bytes for the rect, `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TileUpdate {
    pub frame_id: u64,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub presentation_time_ns: u64,
    pub pixels: Vec<u8>,
}

impl TileUpdate {
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(TILE_UPDATE_HEADER_LEN + self.pixels.len());
        buf.extend_from_slice(&MAGIC_TILE);
        buf.extend_from_slice(&self.frame_id.to_be_bytes());
        buf.extend_from_slice(&self.x.to_be_bytes());
        buf.extend_from_slice(&self.y.to_be_bytes());
        buf.extend_from_slice(&self.width.to_be_bytes());
        buf.extend_from_slice(&self.height.to_be_bytes());
        buf.extend_from_slice(&self.presentation_time_ns.to_be_bytes());
        buf.extend_from_slice(&self.pixels);
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, TransportError> {
        if buf.len() < TILE_UPDATE_HEADER_LEN {
            return Err(TransportError::Malformed(format!(
                "tile update header needs {TILE_UPDATE_HEADER_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let magic: [u8; 4] = buf[0..4].try_into().unwrap();
        if magic != MAGIC_TILE {
            return Err(TransportError::UnknownMagic(magic));
        }
        let frame_id = u64::from_be_bytes(buf[4..12].try_into().unwrap());
        let x = u32::from_be_bytes(buf[12..16].try_into().unwrap());
        let y = u32::from_be_bytes(buf[16..20].try_into().unwrap());
        let width = u32::from_be_bytes(buf[20..24].try_into().unwrap());
        let height = u32::from_be_bytes(buf[24..28].try_into().unwrap());
        let presentation_time_ns = u64::from_be_bytes(buf[28..36].try_into().unwrap());
        let pixels = buf[TILE_UPDATE_HEADER_LEN..].to_vec();

        let expected_len = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected_len {
            return Err(TransportError::Malformed(format!(
                "tile pixel data is {} bytes, expected {expected_len} for {width}x{height}",
                pixels.len()
            )));
        }

        Ok(Self {
            frame_id,
            x,
            y,
            width,
            height,
            presentation_time_ns,
            pixels,
        })
    }
}
