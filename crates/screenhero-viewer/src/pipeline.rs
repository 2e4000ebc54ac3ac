//! Viewer pipeline: receive -> reassemble -> decode -> render, and in the
//! other direction, capture local input -> send.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use screenhero_codec::Decoder;
use screenhero_input::InputCapture;
use screenhero_transport::wire::{self, VIDEO_FRAGMENT_HEADER_LEN};
use screenhero_transport::{PipelineStats, Reassembler, ScreenSocket};

use crate::renderer::{RenderedFrame, Renderer};

const RECV_BUFFER_SIZE: usize = 2048;

pub struct ViewerPipeline<C: InputCapture> {
    socket: Arc<ScreenSocket>,
    reassembler: Reassembler,
    decoder: Decoder,
    input_capture: C,
    stats: Arc<PipelineStats>,
}

impl<C: InputCapture + 'static> ViewerPipeline<C> {
    #[must_use]
    pub fn new(
        socket: Arc<ScreenSocket>,
        reassembler: Reassembler,
        decoder: Decoder,
        input_capture: C,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            socket,
            reassembler,
            decoder,
            input_capture,
            stats,
        }
    }

    /// Run the receive/decode/render loop and the input capture/send loop
    /// concurrently until either side ends.
    pub async fn run(self) -> Result<()> {
        let mut input_capture = self.input_capture;
        input_capture.start().await.context("starting input capture")?;

        let socket_input = Arc::clone(&self.socket);
        let stats_input = Arc::clone(&self.stats);
        let input_task = tokio::spawn(async move {
            send_input_loop(socket_input, &mut input_capture, stats_input).await;
        });

        let socket_video = Arc::clone(&self.socket);
        let mut reassembler = self.reassembler;
        let mut decoder = self.decoder;
        let stats_video = Arc::clone(&self.stats);
        let video_task = tokio::spawn(async move {
            let mut renderer = Renderer::new();
            receive_video_loop(socket_video, &mut reassembler, &mut decoder, &mut renderer, stats_video).await;
        });

        let _ = tokio::try_join!(input_task, video_task);
        Ok(())
    }
}

async fn receive_video_loop(
    socket: Arc<ScreenSocket>,
    reassembler: &mut Reassembler,
    decoder: &mut Decoder,
    renderer: &mut Renderer,
    stats: Arc<PipelineStats>,
) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    loop {
        let (n, _from) = match socket.recv(&mut buf).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(%err, "video socket recv failed");
                continue;
            }
        };
        PipelineStats::incr(&stats.frames_received);
        if wire::peek_magic(&buf[..n]) != Some(wire::MAGIC_VIDEO) {
            continue;
        }

        let header = match wire::VideoFragmentHeader::decode(&buf[..n]) {
            Ok(h) => h,
            Err(err) => {
                tracing::warn!(%err, "malformed video fragment header");
                continue;
            }
        };
        let payload = &buf[VIDEO_FRAGMENT_HEADER_LEN.min(n)..n];
        let reassembled = reassembler.ingest(header, payload, Instant::now());

        let dropped_keyframes = reassembler.take_dropped_keyframes();
        if !dropped_keyframes.is_empty() {
            tracing::warn!(?dropped_keyframes, "keyframe lost before reassembly completed, requesting a new one");
            decoder.request_keyframe();
        }

        let Some(frame) = reassembled else {
            continue;
        };
        PipelineStats::incr(&stats.frames_reassembled);

        // Dimensions and codec travel on the wire per fragment, so a
        // mid-stream change takes effect on the very frame that announces
        // it rather than waiting on a config message.
        match decoder
            .decode(
                frame.frame_id,
                frame.codec,
                u32::from(frame.width),
                u32::from(frame.height),
                &frame.data,
                frame.parameter_sets.as_deref(),
                frame.is_keyframe,
            )
            .await
        {
            Ok(decoded) => {
                PipelineStats::incr(&stats.frames_decoded);
                renderer.present(&RenderedFrame {
                    frame_id: frame.frame_id,
                    presentation_time_ns: frame.presentation_time_ns,
                    width: decoded.width,
                    height: decoded.height,
                    image: decoded.image,
                });
            }
            Err(err) => {
                tracing::warn!(%err, frame_id = frame.frame_id, "decode failed, awaiting next keyframe");
            }
        }
    }
}

async fn send_input_loop<C: InputCapture>(socket: Arc<ScreenSocket>, capture: &mut C, stats: Arc<PipelineStats>) {
    while let Some(event) = capture.next_event().await {
        let datagram = event.serialize();
        if let Err(err) = socket.send(&datagram).await {
            tracing::warn!(%err, "failed to send input event");
            continue;
        }
        PipelineStats::incr(&stats.input_events_sent);
    }
    capture.stop().await;
}

#[must_use]
pub fn default_reassembler(fps: u32) -> Reassembler {
    Reassembler::new(
        screenhero_transport::DEFAULT_CAPACITY,
        Reassembler::default_deadline_for_fps(fps),
    )
}
