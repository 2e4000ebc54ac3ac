//! Encoder/decoder session orchestration for the screenhero streaming
//! pipeline.
//!
//! - `backend.rs`: `EncoderBackend`/`DecoderBackend` traits abstracting the
//!   platform hardware codec, plus fake test doubles
//! - `encoder.rs`: keyframe policy, bitrate cap, parameter-set framing
//! - `decoder.rs`: keyframe-gated decode state machine
//! - `waiters.rs`: lock-protected completion-waiter map bridging
//!   out-of-order backend completions back to the awaiting caller
//! - `types.rs` / `error.rs`: shared data model and error type

pub mod backend;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod types;
pub mod waiters;

pub use backend::{BackendDecodeOutput, BackendEncodeOutput, DecoderBackend, EncoderBackend};
pub use decoder::{Decoder, DecoderState};
pub use encoder::Encoder;
pub use error::CodecError;
pub use types::{Codec, EncodedPacket, StreamConfig};
