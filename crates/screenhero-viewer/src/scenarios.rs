//! End-to-end pipeline scenarios, wiring capture through to render purely
//! in-process with fake codec backends. No network I/O; fragments pass
//! directly from `Packetizer` to `Reassembler` as in-memory byte vectors.

use std::time::Instant;

use screenhero_auth::{AuthToken, PairingManager, ValidationOutcome};
use screenhero_capture::RawFrame;
use screenhero_codec::backend::{FakeDecoderBackend, FakeEncoderBackend};
use screenhero_codec::{Codec, Decoder, DecoderState, Encoder, StreamConfig};
use screenhero_input::transform::{normalized_top_left_to_display_point, view_point_to_normalized_top_left};
use screenhero_input::{ButtonState, MouseButton};
use screenhero_transport::wire::VideoFragmentHeader;
use screenhero_transport::{Packetizer, Reassembler, DEFAULT_CAPACITY};

use crate::renderer::{RenderedFrame, Renderer};

fn color_frame(frame_id: u64, width: u32, height: u32) -> RawFrame {
    RawFrame {
        frame_id,
        capture_ts_ns: frame_id * 16_666_667,
        presentation_ts_ns: frame_id * 16_666_667,
        width,
        height,
        data: vec![(frame_id % 256) as u8; RawFrame::expected_len(width, height)],
        damage: None,
    }
}

/// Run one frame through encode -> fragment -> reassemble -> decode,
/// optionally dropping one fragment by index to simulate loss. Mirrors
/// `ViewerPipeline::receive_video_loop`'s per-datagram handling.
#[allow(clippy::too_many_arguments)]
async fn run_frame(
    encoder: &mut Encoder,
    packetizer: &Packetizer,
    reassembler: &mut Reassembler,
    decoder: &mut Decoder,
    config: &StreamConfig,
    frame_id: u64,
    now: Instant,
    drop_fragment: Option<usize>,
) -> Option<Result<(), screenhero_codec::CodecError>> {
    let frame = color_frame(frame_id, config.width, config.height);
    let packet = encoder.encode(&frame).await.unwrap();
    let fragments = packetizer.fragment(&packet).unwrap();

    let mut outcome = None;
    for (index, datagram) in fragments.iter().enumerate() {
        if Some(index) == drop_fragment {
            continue;
        }
        let header = VideoFragmentHeader::decode(datagram).unwrap();
        let payload = &datagram[screenhero_transport::wire::VIDEO_FRAGMENT_HEADER_LEN..];
        let reassembled = reassembler.ingest(header, payload, now);

        if !reassembler.take_dropped_keyframes().is_empty() {
            decoder.request_keyframe();
        }

        if let Some(frame) = reassembled {
            let result = decoder
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
                .map(|_| ());
            outcome = Some(result);
        }
    }
    outcome
}

fn small_config(max_packet_size: u32) -> StreamConfig {
    StreamConfig {
        width: 4,
        height: 2,
        fps: 30,
        codec: Codec::H264,
        bitrate: 1_000_000,
        keyframe_interval: 30,
        low_latency: true,
        max_packet_size,
        full_color_mode: false,
    }
}

/// Scenario A: round trip on an ideal network. 120 frames in, 120 frames
/// decoded and rendered, a keyframe at least every 30 frames.
#[tokio::test]
async fn round_trip_on_an_ideal_network() {
    let config = StreamConfig {
        width: 320,
        height: 240,
        fps: 60,
        codec: Codec::H264,
        bitrate: 20_000_000,
        keyframe_interval: 30,
        low_latency: true,
        max_packet_size: 1400,
        full_color_mode: false,
    };

    let mut encoder = Encoder::new(Box::new(FakeEncoderBackend::new()));
    encoder.configure(config.clone()).await.unwrap();
    let packetizer = Packetizer::new(config.max_packet_size);
    let mut reassembler = Reassembler::new(DEFAULT_CAPACITY, Reassembler::default_deadline_for_fps(config.fps));
    let mut decoder = Decoder::new(Box::new(FakeDecoderBackend::new()), config.fps);
    let mut renderer = Renderer::new();
    let now = Instant::now();

    let mut keyframes_sent = 0u32;
    let mut frames_decoded = 0u32;

    for frame_id in 0..120u64 {
        let frame = color_frame(frame_id, config.width, config.height);
        let packet = encoder.encode(&frame).await.unwrap();
        if packet.is_keyframe {
            keyframes_sent += 1;
        }
        for datagram in packetizer.fragment(&packet).unwrap() {
            let header = VideoFragmentHeader::decode(&datagram).unwrap();
            let payload = &datagram[screenhero_transport::wire::VIDEO_FRAGMENT_HEADER_LEN..];
            let Some(reassembled) = reassembler.ingest(header, payload, now) else {
                continue;
            };
            let decoded = decoder
                .decode(
                    reassembled.frame_id,
                    reassembled.codec,
                    u32::from(reassembled.width),
                    u32::from(reassembled.height),
                    &reassembled.data,
                    reassembled.parameter_sets.as_deref(),
                    reassembled.is_keyframe,
                )
                .await
                .unwrap();
            frames_decoded += 1;
            renderer.present(&RenderedFrame {
                frame_id: reassembled.frame_id,
                presentation_time_ns: reassembled.presentation_time_ns,
                width: decoded.width,
                height: decoded.height,
                image: decoded.image,
            });
        }
    }

    assert!(keyframes_sent >= 120u32.div_ceil(30));
    assert_eq!(frames_decoded, 120);
    assert_eq!(renderer.frames_rendered(), 120);
    assert_eq!(renderer.frames_dropped_stale(), 0);
}

/// Scenario B: a lost fragment in a delta frame drops only that frame;
/// the decoder stays `Ready` and picks the stream back up at the next one.
#[tokio::test]
async fn lost_fragment_in_a_delta_frame_does_not_stall_decoding() {
    // max_packet_size 41 gives an 8-byte fragment payload, splitting a
    // 33-byte delta-frame payload (32 raw bytes + 1 keyframe marker byte)
    // into exactly 5 fragments, matching the dropped-fragment scenario.
    let config = small_config(41);
    let mut encoder = Encoder::new(Box::new(FakeEncoderBackend::new()));
    encoder.configure(config.clone()).await.unwrap();
    let packetizer = Packetizer::new(config.max_packet_size);
    let mut reassembler = Reassembler::new(DEFAULT_CAPACITY, Reassembler::default_deadline_for_fps(config.fps));
    let mut decoder = Decoder::new(Box::new(FakeDecoderBackend::new()), config.fps);
    let now = Instant::now();

    for frame_id in 0..37u64 {
        run_frame(&mut encoder, &packetizer, &mut reassembler, &mut decoder, &config, frame_id, now, None)
            .await
            .unwrap()
            .unwrap();
    }
    assert_eq!(decoder.state(), DecoderState::Ready);

    // Frame 37 is a delta frame (37 % 30 != 0); drop its third fragment
    // (index 2 of 5) so it never completes.
    let outcome = run_frame(
        &mut encoder,
        &packetizer,
        &mut reassembler,
        &mut decoder,
        &config,
        37,
        now,
        Some(2),
    )
    .await;
    assert!(outcome.is_none(), "frame 37 should never reassemble");

    let later = now + Reassembler::default_deadline_for_fps(config.fps) + std::time::Duration::from_millis(1);
    let dropped = reassembler.reap_expired(later);
    assert_eq!(dropped, vec![37]);
    assert!(reassembler.take_dropped_keyframes().is_empty());

    run_frame(&mut encoder, &packetizer, &mut reassembler, &mut decoder, &config, 38, later, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decoder.state(), DecoderState::Ready);
}

/// Scenario C: losing a keyframe entirely forces the decoder back to
/// `AwaitingKeyframe`; delta frames in between are rejected harmlessly
/// until the next scheduled keyframe resumes decoding.
#[tokio::test]
async fn lost_keyframe_forces_a_wait_for_the_next_one() {
    let config = small_config(41);
    let mut encoder = Encoder::new(Box::new(FakeEncoderBackend::new()));
    encoder.configure(config.clone()).await.unwrap();
    let packetizer = Packetizer::new(config.max_packet_size);
    let mut reassembler = Reassembler::new(DEFAULT_CAPACITY, Reassembler::default_deadline_for_fps(config.fps));
    let mut decoder = Decoder::new(Box::new(FakeDecoderBackend::new()), config.fps);
    let now = Instant::now();

    for frame_id in 0..60u64 {
        run_frame(&mut encoder, &packetizer, &mut reassembler, &mut decoder, &config, frame_id, now, None)
            .await
            .unwrap()
            .unwrap();
    }
    assert_eq!(decoder.state(), DecoderState::Ready);

    // Frame 60 is a keyframe (60 % 30 == 0). Only its first fragment
    // leaks through before the rest is lost, same as a real receiver that
    // sees one datagram of a burst before the rest never arrive; that one
    // fragment is enough to record the header's keyframe flag.
    let frame = color_frame(60, config.width, config.height);
    let packet = encoder.encode(&frame).await.unwrap();
    assert!(packet.is_keyframe);
    let fragments = packetizer.fragment(&packet).unwrap();
    let header = VideoFragmentHeader::decode(&fragments[0]).unwrap();
    let payload = &fragments[0][screenhero_transport::wire::VIDEO_FRAGMENT_HEADER_LEN..];
    assert!(reassembler.ingest(header, payload, now).is_none());

    let later = now + Reassembler::default_deadline_for_fps(config.fps) + std::time::Duration::from_millis(1);
    let dropped = reassembler.reap_expired(later);
    assert_eq!(dropped, vec![60]);
    assert_eq!(reassembler.take_dropped_keyframes(), vec![60]);
    decoder.request_keyframe();
    assert_eq!(decoder.state(), DecoderState::AwaitingKeyframe);

    // Frames 61..=89 are delta frames; the decoder rejects every one
    // rather than crash, and never leaves AwaitingKeyframe early.
    for frame_id in 61..90u64 {
        let outcome = run_frame(
            &mut encoder,
            &packetizer,
            &mut reassembler,
            &mut decoder,
            &config,
            frame_id,
            later,
            None,
        )
        .await;
        assert!(matches!(
            outcome,
            Some(Err(screenhero_codec::CodecError::WaitingForKeyframe))
        ));
        assert_eq!(decoder.state(), DecoderState::AwaitingKeyframe);
    }

    // Frame 90 is the next scheduled keyframe; decoding resumes.
    run_frame(&mut encoder, &packetizer, &mut reassembler, &mut decoder, &config, 90, later, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decoder.state(), DecoderState::Ready);
}

/// Scenario D: a mid-stream change in the announced frame dimensions
/// makes the decoder rebuild its session once rather than crash, and
/// decoding continues at the new size. Driven through the same
/// encode -> fragment -> reassemble -> decode path as every other
/// scenario, so the dimensions the decoder sees come from the wire,
/// not from a value handed to it directly.
#[tokio::test]
async fn format_change_mid_stream_rebuilds_the_decoder_session_once() {
    let hd_config = StreamConfig {
        width: 16,
        height: 12,
        fps: 30,
        codec: Codec::H264,
        bitrate: 1_000_000,
        keyframe_interval: 30,
        low_latency: true,
        max_packet_size: 4096,
        full_color_mode: false,
    };
    let sd_config = StreamConfig {
        width: 8,
        height: 6,
        ..hd_config.clone()
    };

    let mut encoder = Encoder::new(Box::new(FakeEncoderBackend::new()));
    encoder.configure(hd_config.clone()).await.unwrap();
    let mut packetizer = Packetizer::new(hd_config.max_packet_size);
    let mut reassembler = Reassembler::new(DEFAULT_CAPACITY, Reassembler::default_deadline_for_fps(hd_config.fps));
    let mut decoder = Decoder::new(Box::new(FakeDecoderBackend::new()), hd_config.fps);
    let now = Instant::now();

    run_frame(&mut encoder, &packetizer, &mut reassembler, &mut decoder, &hd_config, 0, now, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decoder.state(), DecoderState::Ready);

    // Reconfiguring the encoder for the new resolution forces a keyframe
    // on the next frame, same as a real capture source switching modes.
    encoder.configure(sd_config.clone()).await.unwrap();
    packetizer = Packetizer::new(sd_config.max_packet_size);

    let outcome = run_frame(&mut encoder, &packetizer, &mut reassembler, &mut decoder, &sd_config, 1, now, None)
        .await
        .unwrap();
    outcome.unwrap();
    assert_eq!(decoder.state(), DecoderState::Ready);

    let delta_outcome = run_frame(&mut encoder, &packetizer, &mut reassembler, &mut decoder, &sd_config, 2, now, None)
        .await
        .unwrap();
    delta_outcome.unwrap();
    assert_eq!(decoder.state(), DecoderState::Ready);
}

/// Scenario E: pairing happy path, then expiry.
#[tokio::test]
async fn pairing_issues_a_token_that_expires_after_its_ttl() {
    const DAY_SECS: u64 = 24 * 3600;
    let secret = b"host-signing-secret";

    let mut pairing = PairingManager::new();
    let issued_at_instant = Instant::now();
    let code = pairing.issue(issued_at_instant);

    pairing.redeem(&code, issued_at_instant).unwrap();

    let now_unix = 1_700_000_000u64;
    let token = AuthToken::issue(code.clone(), "host-1".to_string(), "viewer-v".to_string(), now_unix, DAY_SECS, secret);

    assert_eq!(token.host_id, "host-1");
    assert_eq!(token.viewer_id, "viewer-v");
    assert_eq!(token.expires_at, now_unix + DAY_SECS);
    assert_eq!(token.validate(secret, "host-1", now_unix + 10), ValidationOutcome::Valid);

    assert_eq!(
        token.validate(secret, "host-1", now_unix + DAY_SECS + 1),
        ValidationOutcome::Expired
    );
}

/// Scenario F: a normalized mouse move at the center of a 1512x982
/// viewport positioned at display origin (3164, 0) lands on the expected
/// host-global point, and a held left button synthesizes a drag.
#[tokio::test]
async fn normalized_input_coordinate_flow_matches_host_global_point() {
    let view_width = 1512.0f32;
    let view_height = 982.0f32;
    let display_origin = (3164.0f32, 0.0f32);

    // Viewer side: a bottom-left-origin UI point at dead center serializes
    // to the normalized top-left point (0.5, 0.5) the same way either
    // convention would for a point at the exact center of the view.
    let (nx, ny) = view_point_to_normalized_top_left(view_width / 2.0, view_height / 2.0, view_width, view_height);
    assert!((nx - 0.5).abs() < 1e-6);
    assert!((ny - 0.5).abs() < 1e-6);

    // Host side: normalized point -> local display point -> global point
    // by adding the display's origin.
    let (local_x, local_y) = normalized_top_left_to_display_point(nx, ny, view_width, view_height);
    let global = (display_origin.0 + local_x, display_origin.1 + local_y);
    assert!((global.0 - 3920.0).abs() < 1e-3);
    assert!((global.1 - 491.0).abs() < 1e-3);

    // With no button held, the host synthesizes a plain move; holding
    // left turns the same move into a left drag.
    let mut buttons = ButtonState::new();
    assert!(buttons.dominant().is_none());
    buttons.press(MouseButton::Left);
    assert_eq!(buttons.dominant(), Some(MouseButton::Left));
}
