mod config;
mod pipeline;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use screenhero_auth::{load_or_create_host_secret, PairingManager};
use screenhero_capture::SyntheticFrameSource;
use screenhero_codec::backend::FakeEncoderBackend;
use screenhero_codec::Encoder;
use screenhero_input::RecordingInjector;
use screenhero_input::InputInjector;
use screenhero_transport::{Packetizer, PipelineStats, ScreenSocket};

use config::HostConfig;
use pipeline::HostPipeline;

/// Low-latency screen sharing host: captures the local display, encodes
/// and streams it over UDP, and injects input received from a paired
/// viewer.
#[derive(Parser, Debug)]
#[command(name = "screenhero-host", version, about)]
struct Cli {
    /// Path to a TOML config file. Defaults to the platform config dir.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// UDP port to listen on for the viewer connection.
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Capture width in pixels.
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Capture height in pixels.
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Target frames per second.
    #[arg(short = 'f', long)]
    fps: Option<u32>,

    /// Target average bitrate in megabits per second.
    #[arg(short = 'b', long)]
    bitrate_mbps: Option<u32>,

    /// Video codec to advertise.
    #[arg(short = 'c', long, value_parser = ["h264", "hevc"])]
    codec: Option<String>,

    /// Frames between forced keyframes.
    #[arg(short = 'k', long)]
    keyframe_interval: Option<u32>,

    /// Index of the display to capture, for multi-monitor hosts.
    #[arg(short = 'd', long)]
    display_index: Option<u32>,

    /// Address of the viewer to stream to. Required until a real pairing
    /// handshake negotiates it automatically.
    #[arg(long)]
    peer: std::net::SocketAddr,
}

impl Cli {
    fn apply_to(&self, config: &mut HostConfig) {
        if let Some(v) = self.port {
            config.port = v;
        }
        if let Some(v) = self.width {
            config.width = v;
        }
        if let Some(v) = self.height {
            config.height = v;
        }
        if let Some(v) = self.fps {
            config.fps = v;
        }
        if let Some(v) = self.bitrate_mbps {
            config.bitrate_mbps = v;
        }
        if let Some(v) = &self.codec {
            config.codec = v.clone();
        }
        if let Some(v) = self.keyframe_interval {
            config.keyframe_interval = v;
        }
        if let Some(v) = self.display_index {
            config.display_index = v;
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<HostConfig> {
    let path = cli.config.clone().or_else(config::default_config_path);
    let mut host_config = match &path {
        Some(path) if path.exists() => HostConfig::from_file(path)?,
        _ => HostConfig::default(),
    };
    cli.apply_to(&mut host_config);
    Ok(host_config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let host_config = load_config(&cli)?;
    let stream_config = host_config.stream_config();
    stream_config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid stream configuration: {e}"))?;

    let secret_path = screenhero_auth::default_host_secret_path()
        .context("could not determine a config directory for the host secret")?;
    let secret = load_or_create_host_secret(&secret_path).context("loading host signing secret")?;

    let mut pairing = PairingManager::new();
    let code = pairing.issue(Instant::now());
    tracing::info!(pairing_code = %code, host_id = %host_config.host_id, "pairing code issued, share it with the viewer");

    // A real handshake would redeem `code` off the wire once a viewer
    // connects and submits it; issuing the token eagerly here keeps the
    // pipeline runnable end to end without that network round trip.
    pairing
        .redeem(&code, Instant::now())
        .context("redeeming freshly issued pairing code")?;
    let issued_at = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let session_token = screenhero_auth::AuthToken::issue(
        code.clone(),
        host_config.host_id.clone(),
        cli.peer.to_string(),
        issued_at,
        host_config.session_ttl_secs,
        &secret,
    );
    tracing::debug!(token_id = %session_token.id, "session token minted for paired viewer");

    let frame_source = Box::new(SyntheticFrameSource::new(
        host_config.width,
        host_config.height,
        host_config.fps,
    ));

    let mut encoder = Encoder::new(Box::new(FakeEncoderBackend::new()));
    encoder
        .configure(stream_config.clone())
        .await
        .context("configuring encoder")?;

    let packetizer = Packetizer::new(stream_config.max_packet_size);

    let bind_addr = pipeline::bind_addr(host_config.port);
    let socket = Arc::new(
        ScreenSocket::bind_unicast(bind_addr, cli.peer)
            .await
            .with_context(|| format!("binding host socket on {bind_addr}"))?,
    );

    let injector = InputInjector::new(RecordingInjector::default());
    let stats = Arc::new(PipelineStats::new());

    let pipeline = HostPipeline::new(frame_source, encoder, packetizer, socket, injector, stats);
    pipeline.run().await
}
