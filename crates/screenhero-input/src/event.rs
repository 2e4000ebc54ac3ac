//! Wire format for input events sent from viewer to host.
//!
//! Fixed 28-byte layout, all multi-byte fields big-endian:
//!
//! ```text
//! offset  size  field
//! 0       4     magic "SHIP"
//! 4       1     event type (u8)
//! 5       3     pad
//! 8       8     timestamp_ns (u64)
//! 16      4     x (f32)
//! 20      4     y (f32)
//! 24      1     button (u8)
//! 25      2     key_code (u16)
//! 27      1     modifiers (u8 bitmask)
//! ```

use crate::error::InputError;

pub const INPUT_MAGIC: [u8; 4] = *b"SHIP";
pub const INPUT_EVENT_WIRE_LEN: usize = 28;

pub const MODIFIER_SHIFT: u8 = 1 << 0;
pub const MODIFIER_CTRL: u8 = 1 << 1;
pub const MODIFIER_OPTION: u8 = 1 << 2;
pub const MODIFIER_CMD: u8 = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEventType {
    MouseMove,
    MouseDown,
    MouseUp,
    Scroll,
    KeyDown,
    KeyUp,
    ReleaseCapture,
    CursorPosition,
}

impl InputEventType {
    #[must_use]
    pub fn as_wire_u8(self) -> u8 {
        match self {
            Self::MouseMove => 0,
            Self::MouseDown => 1,
            Self::MouseUp => 2,
            Self::Scroll => 3,
            Self::KeyDown => 4,
            Self::KeyUp => 5,
            Self::ReleaseCapture => 6,
            Self::CursorPosition => 7,
        }
    }

    #[must_use]
    pub fn from_wire_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::MouseMove),
            1 => Some(Self::MouseDown),
            2 => Some(Self::MouseUp),
            3 => Some(Self::Scroll),
            4 => Some(Self::KeyDown),
            5 => Some(Self::KeyUp),
            6 => Some(Self::ReleaseCapture),
            7 => Some(Self::CursorPosition),
            _ => None,
        }
    }
}

/// One input event as exchanged between viewer and host. Coordinates are in
/// the normalized top-left space produced by `transform::view_to_normalized`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub event_type: InputEventType,
    pub timestamp_ns: u64,
    pub x: f32,
    pub y: f32,
    pub button: u8,
    pub key_code: u16,
    pub modifiers: u8,
}

impl InputEvent {
    #[must_use]
    pub fn serialize(&self) -> [u8; INPUT_EVENT_WIRE_LEN] {
        let mut buf = [0u8; INPUT_EVENT_WIRE_LEN];
        buf[0..4].copy_from_slice(&INPUT_MAGIC);
        buf[4] = self.event_type.as_wire_u8();
        buf[5..8].fill(0); // pad
        buf[8..16].copy_from_slice(&self.timestamp_ns.to_be_bytes());
        buf[16..20].copy_from_slice(&self.x.to_be_bytes());
        buf[20..24].copy_from_slice(&self.y.to_be_bytes());
        buf[24] = self.button;
        buf[25..27].copy_from_slice(&self.key_code.to_be_bytes());
        buf[27] = self.modifiers;
        buf
    }

    pub fn deserialize(buf: &[u8]) -> Result<Self, InputError> {
        if buf.len() != INPUT_EVENT_WIRE_LEN {
            return Err(InputError::Malformed(format!(
                "expected {INPUT_EVENT_WIRE_LEN} bytes, got {}",
                buf.len()
            )));
        }
        if buf[0..4] != INPUT_MAGIC {
            return Err(InputError::Malformed("bad magic".to_string()));
        }
        let event_type =
            InputEventType::from_wire_u8(buf[4]).ok_or_else(|| InputError::Malformed("unknown event type".to_string()))?;
        let timestamp_ns = u64::from_be_bytes(buf[8..16].try_into().unwrap());
        let x = f32::from_be_bytes(buf[16..20].try_into().unwrap());
        let y = f32::from_be_bytes(buf[20..24].try_into().unwrap());
        let button = buf[24];
        let key_code = u16::from_be_bytes(buf[25..27].try_into().unwrap());
        let modifiers = buf[27];
        Ok(Self {
            event_type,
            timestamp_ns,
            x,
            y,
            button,
            key_code,
            modifiers,
        })
    }

    #[must_use]
    pub fn shift(&self) -> bool {
        self.modifiers & MODIFIER_SHIFT != 0
    }

    #[must_use]
    pub fn ctrl(&self) -> bool {
        self.modifiers & MODIFIER_CTRL != 0
    }

    #[must_use]
    pub fn option(&self) -> bool {
        self.modifiers & MODIFIER_OPTION != 0
    }

    #[must_use]
    pub fn cmd(&self) -> bool {
        self.modifiers & MODIFIER_CMD != 0
    }
}
