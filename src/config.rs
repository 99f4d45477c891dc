//! Server configuration.
//!
//! Configuration is read from an optional YAML file (path in `SWS_CONFIG`),
//! then `LISTEN` and `DOC_ROOT` from the environment override the listen
//! address and document root. Every field has a default so an empty file,
//! or no file at all, yields a working server rooted at the current
//! directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_PATH_ENV: &str = "SWS_CONFIG";
pub const LISTEN_ENV: &str = "LISTEN";
pub const DOC_ROOT_ENV: &str = "DOC_ROOT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticConfig,
}

/// Listener and per-connection limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Upper bound on connections served at once. The acceptor stops
    /// accepting while the bound is reached.
    pub max_connections: usize,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
}

/// Where static resources live and how they are presented.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub document_root: PathBuf,
    /// Served for `/`, relative to the document root.
    pub welcome_page: PathBuf,
    /// Served for `/favicon.ico`, relative to the document root.
    pub favicon: PathBuf,
    /// Sent in the `Server` header and substituted for `<cs371server>`.
    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            max_connections: 1024,
            read_timeout_secs: 10,
            write_timeout_secs: 30,
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            document_root: PathBuf::from("."),
            welcome_page: PathBuf::from("welcome/welcome.html"),
            favicon: PathBuf::from("images/favicon.ico"),
            server_name: "Simple static server".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Config {
    /// Loads the file named by `SWS_CONFIG` (if any) and applies the
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }
        if let Some(root) = std::env::var_os(DOC_ROOT_ENV) {
            cfg.static_files.document_root = PathBuf::from(root);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as `null`, which serde_yaml refuses
        // for a struct.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_connections == 0 {
            anyhow::bail!("server.max_connections must be at least 1");
        }
        if self.server.read_timeout_secs == 0 || self.server.write_timeout_secs == 0 {
            anyhow::bail!("server timeouts must be at least 1 second");
        }
        Ok(())
    }
}
