//! Frame capture abstraction for the screenhero streaming pipeline.
//!
//! Provides the `FrameSource` trait and the data model entities it
//! produces:
//! - `frame.rs`: `RawFrame`, damage rects, cursor bitmap/shape types
//! - `source.rs`: `FrameSource` trait + `SyntheticFrameSource`
//! - `cursor.rs`: `CursorSource` trait polled by the host's `CursorTracker`
//!
//! A real platform capture backend is out of scope and specified only
//! at the `FrameSource`/`CursorSource` interfaces.

pub mod cursor;
pub mod error;
pub mod frame;
pub mod source;

pub use cursor::{CursorSource, StaticCursorSource};
pub use error::CaptureError;
pub use frame::{CursorBitmap, CursorInfo, CursorShape, DamageRect, RawFrame};
pub use source::{FrameSource, SyntheticFrameSource};
