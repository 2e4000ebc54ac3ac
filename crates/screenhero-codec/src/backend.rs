//! Backend abstraction over the platform hardware encoder/decoder.
//!
//! A real hardware session is out of scope here; it is specified only at
//! this trait boundary. `FakeEncoderBackend`/`FakeDecoderBackend` are
//! deterministic stand-ins used by the orchestration logic in
//! `encoder.rs`/`decoder.rs` and by their tests.

use async_trait::async_trait;

use crate::error::CodecError;
use crate::types::{Codec, StreamConfig};

/// Raw bytes produced by one backend encode call, before the orchestrator
/// attaches frame metadata.
#[derive(Debug, Clone)]
pub struct BackendEncodeOutput {
    pub payload: Vec<u8>,
    pub is_keyframe: bool,
    /// Annex-B framed parameter sets, present only on keyframes.
    pub parameter_sets: Option<Vec<u8>>,
}

/// Raw bytes produced by one backend decode call.
#[derive(Debug, Clone)]
pub struct BackendDecodeOutput {
    pub image: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait EncoderBackend: Send + Sync {
    async fn create_session(&mut self, config: &StreamConfig) -> Result<(), CodecError>;

    /// Encode one image, forcing a keyframe if requested.
    async fn encode(
        &mut self,
        image: &[u8],
        width: u32,
        height: u32,
        force_keyframe: bool,
    ) -> Result<BackendEncodeOutput, CodecError>;

    async fn destroy_session(&mut self);
}

#[async_trait]
pub trait DecoderBackend: Send + Sync {
    async fn create_session(&mut self, codec: Codec, width: u32, height: u32) -> Result<(), CodecError>;

    async fn decode(
        &mut self,
        payload: &[u8],
        parameter_sets: Option<&[u8]>,
    ) -> Result<BackendDecodeOutput, CodecError>;

    async fn destroy_session(&mut self);
}

/// Deterministic encoder stand-in: "encodes" by prefixing the input with a
/// 1-byte keyframe marker. Good enough to exercise orchestration without a
/// real codec.
#[derive(Default)]
pub struct FakeEncoderBackend {
    configured: bool,
    fail_next: bool,
}

impl FakeEncoderBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `encode` call fail, to exercise error propagation.
    pub fn fail_next_encode(&mut self) {
        self.fail_next = true;
    }
}

#[async_trait]
impl EncoderBackend for FakeEncoderBackend {
    async fn create_session(&mut self, config: &StreamConfig) -> Result<(), CodecError> {
        config
            .validate()
            .map_err(CodecError::SessionCreationFailed)?;
        self.configured = true;
        Ok(())
    }

    async fn encode(
        &mut self,
        image: &[u8],
        _width: u32,
        _height: u32,
        force_keyframe: bool,
    ) -> Result<BackendEncodeOutput, CodecError> {
        if !self.configured {
            return Err(CodecError::NotConfigured);
        }
        if self.fail_next {
            self.fail_next = false;
            return Err(CodecError::EncodingFailed("injected failure".to_string()));
        }
        if image.is_empty() {
            return Err(CodecError::NoImageBuffer);
        }
        let mut payload = Vec::with_capacity(image.len() + 1);
        payload.push(u8::from(force_keyframe));
        payload.extend_from_slice(image);
        Ok(BackendEncodeOutput {
            payload,
            is_keyframe: force_keyframe,
            parameter_sets: force_keyframe.then(|| vec![0, 0, 0, 1, 0x67]),
        })
    }

    async fn destroy_session(&mut self) {
        self.configured = false;
    }
}

/// Deterministic decoder stand-in: the inverse of `FakeEncoderBackend`.
#[derive(Default)]
pub struct FakeDecoderBackend {
    configured: bool,
    fail_next: bool,
}

impl FakeDecoderBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_decode(&mut self) {
        self.fail_next = true;
    }
}

#[async_trait]
impl DecoderBackend for FakeDecoderBackend {
    async fn create_session(&mut self, _codec: Codec, _width: u32, _height: u32) -> Result<(), CodecError> {
        self.configured = true;
        Ok(())
    }

    async fn decode(
        &mut self,
        payload: &[u8],
        _parameter_sets: Option<&[u8]>,
    ) -> Result<BackendDecodeOutput, CodecError> {
        if !self.configured {
            return Err(CodecError::NotConfigured);
        }
        if self.fail_next {
            self.fail_next = false;
            return Err(CodecError::DecodingFailed("injected failure".to_string()));
        }
        if payload.is_empty() {
            return Err(CodecError::InvalidData);
        }
        Ok(BackendDecodeOutput {
            image: payload[1..].to_vec(),
            width: 0,
            height: 0,
        })
    }

    async fn destroy_session(&mut self) {
        self.configured = false;
    }
}
