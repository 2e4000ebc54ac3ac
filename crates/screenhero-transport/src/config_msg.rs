//! JSON control-plane message exchanged before and during a session:
//! initial stream negotiation, resolution change notifications, and
//! session teardown.

use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::wire::MAGIC_CONFIG;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigMessage {
    /// Host announces its stream parameters to a newly connected viewer.
    StreamInfo {
        width: u32,
        height: u32,
        fps: u32,
        codec: String,
    },
    /// Either side asks the encoder to emit a fresh keyframe, typically
    /// after a reassembly timeout dropped a frame.
    RequestKeyframe,
    /// Viewer requests a different effective resolution (e.g. window
    /// resize), subject to host approval.
    ResizeRequest { width: u32, height: u32 },
    /// Host notifies the viewer it changed resolution or frame rate.
    FormatChanged { width: u32, height: u32, fps: u32 },
    /// Either side is ending the session cleanly.
    Goodbye { reason: String },
}

impl ConfigMessage {
    pub fn encode(&self) -> Result<Vec<u8>, TransportError> {
        let json = serde_json::to_vec(self)?;
        let mut buf = Vec::with_capacity(MAGIC_CONFIG.len() + json.len());
        buf.extend_from_slice(&MAGIC_CONFIG);
        buf.extend_from_slice(&json);
        Ok(buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, TransportError> {
        if buf.len() < MAGIC_CONFIG.len() {
            return Err(TransportError::Malformed("config message too short".to_string()));
        }
        let magic: [u8; 4] = buf[0..4].try_into().unwrap();
        if magic != MAGIC_CONFIG {
            return Err(TransportError::UnknownMagic(magic));
        }
        Ok(serde_json::from_slice(&buf[4..])?)
    }
}
