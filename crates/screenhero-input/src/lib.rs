//! Input event wire format, coordinate transforms, capture and injection
//! abstractions for the screenhero streaming pipeline.
//!
//! - `event.rs`: `InputEvent` wire struct (serialize/deserialize)
//! - `transform.rs`: pure coordinate-space conversions
//! - `capture.rs`: viewer-side `InputCapture` trait
//! - `inject.rs`: host-side `InputInjection` trait and button-priority
//!   drag synthesis
//! - `keymap.rs`: wire key code to evdev keycode mapping

pub mod capture;
pub mod error;
pub mod event;
pub mod inject;
pub mod keymap;
pub mod transform;

pub use capture::{InputCapture, ScriptedInputCapture};
pub use error::InputError;
pub use event::{InputEvent, InputEventType};
pub use inject::{ButtonState, InjectedAction, InputInjection, InputInjector, MouseButton, RecordingInjector};
