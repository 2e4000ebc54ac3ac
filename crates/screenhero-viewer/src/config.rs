use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Viewer configuration: defaults, overridden by an optional TOML file,
/// overridden in turn by explicit CLI flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub host: String,
    pub port: u16,
    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7890,
            window_width: 1280,
            window_height: 720,
            fullscreen: false,
        }
    }
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn host_addr(&self) -> Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid host address {}:{}", self.host, self.port))
    }
}

/// Default config file location, `$XDG_CONFIG_HOME/screenhero/viewer.toml`
/// (or the platform equivalent via the `dirs` crate).
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("screenhero").join("viewer.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_to_a_valid_socket_addr() {
        let config = ViewerConfig::default();
        assert!(config.host_addr().is_ok());
    }

    #[test]
    fn bad_host_is_rejected() {
        let mut config = ViewerConfig::default();
        config.host = "not an address".to_string();
        assert!(config.host_addr().is_err());
    }
}
