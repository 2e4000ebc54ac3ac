//! Host pipeline: capture -> encode -> fragment -> send, and in the other
//! direction, receive -> inject input.
//!
//! Bounded channels enforce the back-pressure policy: a slow encoder or
//! socket never blocks capture, it just drops the newest frame in favor
//! of the next one (`try_send`, never `send`).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use screenhero_capture::FrameSource;
use screenhero_codec::Encoder;
use screenhero_input::{InputEvent, InputInjection, InputInjector};
use screenhero_transport::{wire::MAGIC_INPUT, PipelineStats, Packetizer, ScreenSocket};
use tokio::sync::mpsc;

/// Bound on the capture -> encode handoff: only the newest unencoded frame
/// is kept.
const CAPTURE_CHANNEL_CAPACITY: usize = 1;
/// Bound on the encode -> send handoff.
const ENCODE_CHANNEL_CAPACITY: usize = 2;

pub struct HostPipeline<I: InputInjection> {
    frame_source: Box<dyn FrameSource>,
    encoder: Encoder,
    packetizer: Packetizer,
    socket: Arc<ScreenSocket>,
    injector: InputInjector<I>,
    stats: Arc<PipelineStats>,
}

impl<I: InputInjection> HostPipeline<I> {
    #[must_use]
    pub fn new(
        frame_source: Box<dyn FrameSource>,
        encoder: Encoder,
        packetizer: Packetizer,
        socket: Arc<ScreenSocket>,
        injector: InputInjector<I>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            frame_source,
            encoder,
            packetizer,
            socket,
            injector,
            stats,
        }
    }

    /// Run capture->encode->send and the input receive loop concurrently
    /// until the frame source is exhausted or either loop errors.
    pub async fn run(mut self) -> Result<()> {
        self.frame_source.start().await.context("starting frame source")?;

        let (raw_tx, raw_rx) = mpsc::channel(CAPTURE_CHANNEL_CAPACITY);
        let (encoded_tx, mut encoded_rx) = mpsc::channel(ENCODE_CHANNEL_CAPACITY);

        let stats_capture = Arc::clone(&self.stats);
        let capture_task = tokio::spawn(capture_loop(self.frame_source, raw_tx, stats_capture));

        let stats_encode = Arc::clone(&self.stats);
        let mut encoder = self.encoder;
        let packetizer = self.packetizer;
        let socket_send = Arc::clone(&self.socket);
        let encode_task = tokio::spawn(async move {
            let mut raw_rx = raw_rx;
            while let Some(frame) = raw_rx.recv().await {
                match encoder.encode(&frame).await {
                    Ok(packet) => {
                        PipelineStats::incr(&stats_encode.frames_encoded);
                        let _ = encoded_tx.try_send(packet);
                    }
                    Err(err) => {
                        tracing::warn!(%err, frame_id = frame.frame_id, "dropping frame: encode failed");
                    }
                }
            }
        });

        let stats_send = Arc::clone(&self.stats);
        let send_task = tokio::spawn(async move {
            while let Some(packet) = encoded_rx.recv().await {
                match packetizer.fragment(&packet) {
                    Ok(fragments) => {
                        for fragment in &fragments {
                            if let Err(err) = socket_send.send(fragment).await {
                                tracing::warn!(%err, "failed to send video fragment");
                                break;
                            }
                            PipelineStats::incr(&stats_send.fragments_sent);
                        }
                        PipelineStats::incr(&stats_send.frames_sent);
                        let sent_at_ns = wall_clock_ns();
                        stats_send.record_capture_to_send_latency(sent_at_ns.saturating_sub(packet.capture_ts_ns));
                    }
                    Err(err) => {
                        tracing::warn!(%err, frame_id = packet.frame_id, "dropping frame: fragmentation failed");
                    }
                }
            }
        });

        let mut injector = self.injector;
        let socket_recv = Arc::clone(&self.socket);
        let stats_recv = Arc::clone(&self.stats);
        let input_task = tokio::spawn(async move {
            input_loop(socket_recv, &mut injector, stats_recv).await;
        });

        let _ = tokio::try_join!(capture_task, encode_task, send_task, input_task);
        Ok(())
    }
}

async fn capture_loop(
    mut frame_source: Box<dyn FrameSource>,
    raw_tx: mpsc::Sender<screenhero_capture::RawFrame>,
    stats: Arc<PipelineStats>,
) {
    while let Some(frame) = frame_source.next_frame().await {
        PipelineStats::incr(&stats.frames_captured);
        // Drop rather than block: the encoder pulls at its own pace.
        let _ = raw_tx.try_send(frame);
    }
    frame_source.stop().await;
}

async fn input_loop<I: InputInjection>(
    socket: Arc<ScreenSocket>,
    injector: &mut InputInjector<I>,
    stats: Arc<PipelineStats>,
) {
    let mut buf = [0u8; 512];
    loop {
        let (n, _from) = match socket.recv(&mut buf).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(%err, "input socket recv failed");
                continue;
            }
        };
        if buf.get(0..4) != Some(&MAGIC_INPUT[..]) {
            continue;
        }
        match InputEvent::deserialize(&buf[..n]) {
            Ok(event) => {
                PipelineStats::incr(&stats.input_events_sent);
                if let Err(err) = injector.handle(&event).await {
                    tracing::warn!(%err, "failed to inject input event");
                } else {
                    PipelineStats::incr(&stats.input_events_injected);
                }
            }
            Err(err) => tracing::warn!(%err, "malformed input event"),
        }
    }
}

#[must_use]
pub fn bind_addr(port: u16) -> SocketAddr {
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), port)
}

fn wall_clock_ns() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
