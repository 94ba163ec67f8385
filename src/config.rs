use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Port the RPC surface listens on
    pub listen_port: u16,
    pub store_host: String,
    pub store_port: u16,
    pub store_scheme: String,
    /// Readiness polls before giving up on the store
    pub ready_attempts: u32,
    pub ready_delay_secs: u64,
    /// Per-request timeout for store calls
    pub request_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_port: 50052,
            store_host: "localhost".to_string(),
            store_port: 8080,
            store_scheme: "http".to_string(),
            ready_attempts: 5,
            ready_delay_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Values taken from the environment or the command line.
///
/// Anything set here wins over the config file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigOverrides {
    /// RPC listen port
    #[arg(long, env = "GRPC_PORT")]
    pub port: Option<u16>,

    /// Store host
    #[arg(long, env = "WEAVIATE_HOST")]
    pub store_host: Option<String>,

    /// Store port
    #[arg(long, env = "WEAVIATE_PORT")]
    pub store_port: Option<u16>,
}

impl ProxyConfig {
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.listen_port = port;
        }
        if let Some(host) = overrides.store_host {
            self.store_host = host;
        }
        if let Some(port) = overrides.store_port {
            self.store_port = port;
        }
        self
    }

    /// `scheme://host:port` of the store
    pub fn store_base_url(&self) -> Result<String> {
        if self.store_host.trim().is_empty() {
            return Err(Error::Config("store host must not be empty".to_string()));
        }
        Ok(format!(
            "{}://{}:{}",
            self.store_scheme, self.store_host, self.store_port
        ))
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.listen_port))
    }

    pub fn ready_delay(&self) -> Duration {
        Duration::from_secs(self.ready_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("astgraph.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ProxyConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ProxyConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Defaults, then the config file, then overrides.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> anyhow::Result<ProxyConfig> {
    let base = load_config(path)?.unwrap_or_default();
    Ok(base.with_overrides(overrides))
}

pub fn write_config(path: &Path, config: &ProxyConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
