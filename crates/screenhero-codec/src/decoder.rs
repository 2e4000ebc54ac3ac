//! Decoder state machine: `Uninitialized -> AwaitingKeyframe -> Ready`, with
//! a fall back to `AwaitingKeyframe` on format change or a decode error.
//!
//! Decodes are submitted to the backend concurrently, bounded by a
//! `D = fps / 2` outstanding-frame window, and may complete out of order.
//! Completion delivery is bridged through a [`crate::waiters::WaiterMap`]
//! exactly as a native async codec callback would signal it, which lets
//! `decode()` await its own frame regardless of backend completion order.

use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};

use crate::backend::{BackendDecodeOutput, DecoderBackend};
use crate::error::CodecError;
use crate::types::Codec;
use crate::waiters::WaiterMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Uninitialized,
    AwaitingKeyframe,
    Ready,
}

struct Session {
    codec: Codec,
    width: u32,
    height: u32,
}

pub struct Decoder {
    backend: Arc<Mutex<Box<dyn DecoderBackend>>>,
    state: DecoderState,
    session: Option<Session>,
    waiters: Arc<WaiterMap<BackendDecodeOutput>>,
    /// Bounds concurrent in-flight decodes to `D = fps / 2`.
    inflight: Arc<Semaphore>,
}

impl Decoder {
    #[must_use]
    pub fn new(backend: Box<dyn DecoderBackend>, fps: u32) -> Self {
        let bound = (fps / 2).max(1) as usize;
        Self {
            backend: Arc::new(Mutex::new(backend)),
            state: DecoderState::Uninitialized,
            session: None,
            waiters: Arc::new(WaiterMap::new()),
            inflight: Arc::new(Semaphore::new(bound)),
        }
    }

    #[must_use]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    async fn open_session(&mut self, codec: Codec, width: u32, height: u32) -> Result<(), CodecError> {
        let mut backend = self.backend.lock().await;
        backend.create_session(codec, width, height).await?;
        drop(backend);
        self.session = Some(Session { codec, width, height });
        self.state = DecoderState::AwaitingKeyframe;
        Ok(())
    }

    /// Decode one received packet. `frame_id` is used only to correlate the
    /// completion callback; it need not be contiguous (the receiver may
    /// have dropped frames upstream).
    ///
    /// Non-keyframe packets while `AwaitingKeyframe` are rejected with
    /// [`CodecError::WaitingForKeyframe`] rather than fed to the backend.
    pub async fn decode(
        &mut self,
        frame_id: u64,
        codec: Codec,
        width: u32,
        height: u32,
        payload: &[u8],
        parameter_sets: Option<&[u8]>,
        is_keyframe: bool,
    ) -> Result<BackendDecodeOutput, CodecError> {
        let format_changed = match &self.session {
            Some(s) => s.codec != codec || s.width != width || s.height != height,
            None => true,
        };
        if format_changed {
            self.open_session(codec, width, height).await?;
        }

        if self.state == DecoderState::AwaitingKeyframe && !is_keyframe {
            return Err(CodecError::WaitingForKeyframe);
        }
        if is_keyframe && parameter_sets.is_none() && codec != Codec::Passthrough {
            return Err(CodecError::InvalidInput(
                "keyframe packet missing parameter sets".to_string(),
            ));
        }

        let permit = self
            .inflight
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CodecError::Cancelled)?;

        let rx = self.waiters.register(frame_id);
        let backend = Arc::clone(&self.backend);
        let waiters = Arc::clone(&self.waiters);
        let payload = payload.to_vec();
        let parameter_sets = parameter_sets.map(<[u8]>::to_vec);

        tokio::spawn(async move {
            let _permit = permit;
            let mut backend = backend.lock().await;
            let result = backend.decode(&payload, parameter_sets.as_deref()).await;
            drop(backend);
            waiters.complete(frame_id, result);
        });

        match rx.await {
            Ok(Ok(output)) => {
                self.state = DecoderState::Ready;
                Ok(output)
            }
            Ok(Err(err)) => {
                self.state = DecoderState::AwaitingKeyframe;
                Err(err)
            }
            Err(_) => Err(CodecError::Cancelled),
        }
    }

    /// Force the state machine back to `AwaitingKeyframe`, e.g. after a
    /// detected packet loss that a reassembly deadline gave up on.
    pub fn request_keyframe(&mut self) {
        if self.state == DecoderState::Ready {
            self.state = DecoderState::AwaitingKeyframe;
        }
    }

    pub async fn reset(&mut self) {
        self.waiters.cancel_all();
        let mut backend = self.backend.lock().await;
        backend.destroy_session().await;
        drop(backend);
        self.session = None;
        self.state = DecoderState::Uninitialized;
    }
}
