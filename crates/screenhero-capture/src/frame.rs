//! Raw capture output and cursor shadow types.
//!
//! `RawFrame` is the data model entity produced by [`crate::source::FrameSource`]
//! and consumed by the encoder. A capture backend never blocks the capture
//! callback (see [`crate::source::FrameSource`] contract); it drops frames
//! downstream instead.

/// A rectangular region of changed pixels, used to decide between a
/// full-frame encode and a tile-update patch upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl DamageRect {
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a damage rect covering the full frame.
    #[must_use]
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether this rect fits within a frame of the given dimensions and
    /// satisfies the `TileUpdate` size invariant (`w,h >= 64`, 16-aligned).
    #[must_use]
    pub fn is_valid_tile(&self, full_w: u32, full_h: u32) -> bool {
        self.x + self.width <= full_w
            && self.y + self.height <= full_h
            && self.width >= 64
            && self.height >= 64
            && self.width % 16 == 0
            && self.height % 16 == 0
    }
}

/// A single captured frame: timestamped, dimensioned, raw BGRA pixels.
///
/// Mirrors the `RawFrame` entity in the data model: `frame_id` is assigned
/// by the caller (the pipeline), monotonic starting at 0; `capture_ts_ns` is
/// the wall-clock time the pixels were produced; `presentation_ts_ns` is the
/// intended display time, derived from the capture clock.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Monotonic frame identifier, strictly increasing from 0 within a
    /// capture session.
    pub frame_id: u64,
    /// Wall-clock capture timestamp, nanoseconds since `UNIX_EPOCH`.
    pub capture_ts_ns: u64,
    /// Intended presentation timestamp, nanoseconds.
    pub presentation_ts_ns: u64,
    pub width: u32,
    pub height: u32,
    /// Row-major BGRA8 pixel data, `width * height * 4` bytes, no padding.
    pub data: Vec<u8>,
    /// Damage regions relative to the full frame. `None` means the source
    /// did not compute damage (treat as full-frame dirty).
    pub damage: Option<Vec<DamageRect>>,
}

impl RawFrame {
    #[must_use]
    pub fn expected_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * 4
    }

    /// `true` iff `data.len()` matches `width * height * 4`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.data.len() == Self::expected_len(self.width, self.height)
    }
}

/// Cursor hot-spot bitmap (RGBA pixels, top-to-bottom rows).
#[derive(Debug, Clone)]
pub struct CursorBitmap {
    pub width: u32,
    pub height: u32,
    pub hot_x: u32,
    pub hot_y: u32,
    pub data: Vec<u8>,
}

impl CursorBitmap {
    #[must_use]
    pub fn expected_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * 4
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.data.len() == Self::expected_len(self.width, self.height)
    }
}

/// Cursor shape the viewer should draw as a faithful proxy. Carried on the
/// `cursorPosition` input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Arrow,
    IBeam,
    Crosshair,
    PointingHand,
    ResizeLeftRight,
    ResizeUpDown,
}

impl CursorShape {
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Arrow => 0,
            Self::IBeam => 1,
            Self::Crosshair => 2,
            Self::PointingHand => 3,
            Self::ResizeLeftRight => 4,
            Self::ResizeUpDown => 5,
        }
    }

    #[must_use]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Arrow),
            1 => Some(Self::IBeam),
            2 => Some(Self::Crosshair),
            3 => Some(Self::PointingHand),
            4 => Some(Self::ResizeLeftRight),
            5 => Some(Self::ResizeUpDown),
            _ => None,
        }
    }
}

/// Host cursor position and (optionally changed) shape, as polled by
/// `CursorTracker`.
#[derive(Debug, Clone)]
pub struct CursorInfo {
    pub x: i32,
    pub y: i32,
    pub visible: bool,
    pub shape: CursorShape,
    /// Present only when the shape bitmap changed since the last poll.
    pub bitmap: Option<CursorBitmap>,
}
