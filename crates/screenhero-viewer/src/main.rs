mod config;
mod pipeline;
mod renderer;
#[cfg(test)]
mod scenarios;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use screenhero_auth::TokenStore;
use screenhero_codec::backend::FakeDecoderBackend;
use screenhero_codec::Decoder;
use screenhero_input::ScriptedInputCapture;
use screenhero_transport::{PipelineStats, ScreenSocket};

use config::ViewerConfig;
use pipeline::ViewerPipeline;

/// Low-latency screen sharing viewer: connects to a host, decodes and
/// displays the incoming video stream, and sends local input back.
#[derive(Parser, Debug)]
#[command(name = "screenhero-viewer", version, about)]
struct Cli {
    /// Path to a TOML config file. Defaults to the platform config dir.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Host address to connect to.
    #[arg(long)]
    host: Option<String>,

    /// UDP port the host is listening on.
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Window width in pixels.
    #[arg(short = 'W', long)]
    window_width: Option<u32>,

    /// Window height in pixels.
    #[arg(short = 'H', long)]
    window_height: Option<u32>,

    /// Start in fullscreen.
    #[arg(short = 'F', long)]
    fullscreen: bool,

    /// Expected capture frame rate, used to size the reassembly deadline.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Pairing code shown on the host, entered here to authenticate.
    #[arg(long)]
    pair_code: Option<String>,

    /// Identifier the host signs its tokens under, used as the cache key
    /// in the local token store.
    #[arg(long, default_value = "screenhero-host")]
    host_id: String,
}

impl Cli {
    fn apply_to(&self, config: &mut ViewerConfig) {
        if let Some(v) = &self.host {
            config.host = v.clone();
        }
        if let Some(v) = self.port {
            config.port = v;
        }
        if let Some(v) = self.window_width {
            config.window_width = v;
        }
        if let Some(v) = self.window_height {
            config.window_height = v;
        }
        if self.fullscreen {
            config.fullscreen = true;
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

fn load_config(cli: &Cli) -> Result<ViewerConfig> {
    let path = cli.config.clone().or_else(config::default_config_path);
    let mut viewer_config = match &path {
        Some(path) if path.exists() => ViewerConfig::from_file(path)?,
        _ => ViewerConfig::default(),
    };
    cli.apply_to(&mut viewer_config);
    Ok(viewer_config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let viewer_config = load_config(&cli)?;
    let host_addr = viewer_config.host_addr()?;

    let token_store_path = screenhero_auth::default_token_store_path();
    let token_store = match &token_store_path {
        Some(path) => TokenStore::load(path).context("loading cached session tokens")?,
        None => TokenStore::new(),
    };

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    match token_store.get(&cli.host_id) {
        Some(token) if token.expires_at > now => {
            tracing::info!(host_id = %cli.host_id, token_id = %token.id, "reusing cached session token");
        }
        _ => {
            // A full pairing handshake would exchange `code` with the host
            // over the wire and receive a signed token back; that round
            // trip isn't implemented yet, so there is nothing to cache
            // until it is.
            match &cli.pair_code {
                Some(code) => tracing::info!(
                    pair_code = %code,
                    host_id = %cli.host_id,
                    "no cached token for this host, pairing code entered but not yet redeemed over the wire"
                ),
                None => tracing::warn!(host_id = %cli.host_id, "no cached token and no pairing code supplied, connecting without authentication"),
            }
        }
    }

    let bind_addr = std::net::SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 0);
    let socket = Arc::new(
        ScreenSocket::bind_unicast(bind_addr, host_addr)
            .await
            .with_context(|| format!("connecting to host at {host_addr}"))?,
    );

    let reassembler = pipeline::default_reassembler(cli.fps);
    let decoder = Decoder::new(Box::new(FakeDecoderBackend::new()), cli.fps);
    let input_capture = ScriptedInputCapture::new(Vec::new());
    let stats = Arc::new(PipelineStats::new());

    let pipeline = ViewerPipeline::new(socket, reassembler, decoder, input_capture, stats);
    pipeline.run().await
}
