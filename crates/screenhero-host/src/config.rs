use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use screenhero_codec::{Codec, StreamConfig};
use serde::Deserialize;

/// Host configuration: defaults, overridden by an optional TOML file,
/// overridden in turn by explicit CLI flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub port: u16,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub bitrate_mbps: u32,
    pub codec: String,
    pub keyframe_interval: u32,
    pub display_index: u32,
    /// Identifier this host signs session tokens under; a viewer's cached
    /// token is keyed by this value.
    pub host_id: String,
    /// How long a session token stays valid after a successful pairing.
    pub session_ttl_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: 7890,
            width: 1920,
            height: 1080,
            fps: 60,
            bitrate_mbps: 20,
            codec: "h264".to_string(),
            keyframe_interval: 30,
            display_index: 0,
            host_id: "screenhero-host".to_string(),
            session_ttl_secs: 8 * 3600,
        }
    }
}

impl HostConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    #[must_use]
    pub fn codec(&self) -> Codec {
        match self.codec.to_lowercase().as_str() {
            "hevc" | "h265" => Codec::Hevc,
            _ => Codec::H264,
        }
    }

    #[must_use]
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            width: self.width,
            height: self.height,
            fps: self.fps,
            codec: self.codec(),
            bitrate: self.bitrate_mbps * 1_000_000,
            keyframe_interval: self.keyframe_interval,
            low_latency: true,
            max_packet_size: 1400,
            full_color_mode: false,
        }
    }
}

/// Default config file location, `$XDG_CONFIG_HOME/screenhero/host.toml`
/// (or the platform equivalent via the `dirs` crate).
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("screenhero").join("host.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = HostConfig::default();
        assert!(config.stream_config().validate().is_ok());
    }

    #[test]
    fn codec_name_is_case_insensitive() {
        let mut config = HostConfig::default();
        config.codec = "HEVC".to_string();
        assert_eq!(config.codec(), Codec::Hevc);
    }

    #[test]
    fn unknown_codec_name_falls_back_to_h264() {
        let mut config = HostConfig::default();
        config.codec = "vp9".to_string();
        assert_eq!(config.codec(), Codec::H264);
    }
}
