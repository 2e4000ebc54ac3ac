//! On-disk state for the host's signing secret and the viewer's per-host
//! token cache, both under the platform config directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::RngCore;

use crate::token::AuthToken;

const HOST_SECRET_LEN: usize = 32;

/// Load the host's HMAC signing secret from `path`, generating and
/// persisting a fresh random one if the file doesn't exist yet. The
/// secret never needs to be typed or displayed; only the pairing code
/// crosses to the viewer.
pub fn load_or_create_host_secret(path: &Path) -> Result<Vec<u8>> {
    if let Ok(existing) = std::fs::read(path) {
        if !existing.is_empty() {
            return Ok(existing);
        }
    }
    let mut secret = vec![0u8; HOST_SECRET_LEN];
    rand::rng().fill_bytes(&mut secret);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, &secret).with_context(|| format!("writing host secret to {}", path.display()))?;
    restrict_permissions(path)?;
    Ok(secret)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("restricting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[must_use]
pub fn default_host_secret_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("screenhero").join("host_secret"))
}

/// The viewer's cache of session tokens it has been issued, one per host
/// it has paired with, keyed by `host_id`.
#[derive(Debug, Default, Clone)]
pub struct TokenStore {
    tokens: HashMap<String, AuthToken>,
}

impl TokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let tokens = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok(Self { tokens })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.tokens)?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        restrict_permissions(path)
    }

    #[must_use]
    pub fn get(&self, host_id: &str) -> Option<&AuthToken> {
        self.tokens.get(host_id)
    }

    pub fn insert(&mut self, token: AuthToken) {
        self.tokens.insert(token.host_id.clone(), token);
    }
}

#[must_use]
pub fn default_token_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("screenhero").join("tokens.json"))
}
