//! # Configuration Model
//!
//! Typed view of `safenet.yaml`. The file carries three target lists
//! (`websites`, `systems`, `networks`) plus optional tuning sections:
//!
//! ```yaml
//! websites:
//!   - name: intranet
//!     address: https://intranet.example.com
//!     safe: true
//! systems:
//!   - name: admin host
//!     address: 10.0.0.5
//!     safe: false
//!     count: 5
//! networks:
//!   - name: ssh on mgmt
//!     address: 10.0.0.1
//!     network: 10.0.0.0/24
//!     port: 22
//!     safe: false
//! ping:
//!   timeout_secs: 3
//! checks:
//!   concurrency: 4
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "safenet.yaml";

/// Largest echo payload that fits one IPv4 datagram (65535 - 20 - 8).
pub const MAX_PING_SIZE: usize = 65_507;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub websites: Vec<WebsiteConfig>,
    pub systems: Vec<SystemConfig>,
    pub networks: Vec<NetworkConfig>,
    pub ping: PingSettings,
    pub http: HttpSettings,
    pub tcp: TcpSettings,
    pub checks: CheckSettings,
}

/// An HTTP(S) endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteConfig {
    pub name: String,
    pub address: String,
    pub safe: bool,
}

/// A host probed with ICMP echo. Ping fields left out fall back to the
/// global [`PingSettings`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    pub address: String,
    pub safe: bool,
    #[serde(default)]
    pub count: Option<u16>,
    #[serde(default)]
    pub ttl: Option<u8>,
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub interval_ms: Option<u64>,
}

/// A port on a host or subnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub address: String,
    pub safe: bool,
    pub network: String,
    pub port: u16,
    #[serde(default)]
    pub strategy: NetworkStrategy,
}

/// How a network target decides whether it is reachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStrategy {
    /// One TCP connect to `address:port`.
    #[default]
    Connect,
    /// TCP connect to `port` on every host of `network`; reachable if any accepts.
    Sweep,
}

/// ICMP echo parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingSettings {
    /// Number of echo requests sent.
    pub count: u16,
    /// IP time-to-live of each request.
    pub ttl: u8,
    /// Payload bytes after the 8 byte ICMP header.
    pub size: usize,
    /// Upper bound for the whole exchange.
    pub timeout_secs: u64,
    /// Delay between two requests.
    pub interval_ms: u64,
}

impl Default for PingSettings {
    fn default() -> Self {
        Self {
            count: 3,
            ttl: 64,
            size: 56,
            timeout_secs: 5,
            interval_ms: 1_000,
        }
    }
}

impl PingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Rejects settings under which no echo could ever be sent or sized.
    fn check(&self) -> std::result::Result<(), String> {
        if self.count == 0 {
            return Err("count must be at least 1".into());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".into());
        }
        if self.size > MAX_PING_SIZE {
            return Err(format!("size must not exceed {MAX_PING_SIZE} bytes"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Ignore `HTTP_PROXY` and friends and always connect directly.
    pub no_proxy: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            no_proxy: false,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpSettings {
    pub timeout_ms: u64,
    /// Parallel connects of a single sweep.
    pub sweep_concurrency: usize,
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 3_000,
            sweep_concurrency: 64,
        }
    }
}

impl TcpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Orchestration policy of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    /// Targets checked at the same time. `1` keeps the run sequential.
    pub concurrency: usize,
    /// Count a probe error as a failed run even when its verdict is safe.
    pub fail_on_error: bool,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            fail_on_error: false,
        }
    }
}

impl SystemConfig {
    /// Ping parameters of this host with its overrides applied to `defaults`.
    pub fn ping_settings(&self, defaults: &PingSettings) -> PingSettings {
        PingSettings {
            count: self.count.unwrap_or(defaults.count),
            ttl: self.ttl.unwrap_or(defaults.ttl),
            size: self.size.unwrap_or(defaults.size),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            interval_ms: self.interval_ms.unwrap_or(defaults.interval_ms),
        }
    }
}

impl Config {
    /// Load and validate the configuration at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml(&content)?;
        debug!(
            path = %path.display(),
            websites = config.websites.len(),
            systems = config.systems.len(),
            networks = config.networks.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn target_count(&self) -> usize {
        self.websites.len() + self.systems.len() + self.networks.len()
    }

    fn validate(&self) -> Result<()> {
        let names = self
            .websites
            .iter()
            .map(|w| ("websites", &w.name))
            .enumerate()
            .chain(self.systems.iter().map(|s| ("systems", &s.name)).enumerate())
            .chain(self.networks.iter().map(|n| ("networks", &n.name)).enumerate());

        for (index, (section, name)) in names {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    section,
                    index,
                    message: "name must not be empty".into(),
                });
            }
        }

        self.ping.check().map_err(|message| ConfigError::Invalid {
            section: "ping",
            index: 0,
            message,
        })?;

        for (index, system) in self.systems.iter().enumerate() {
            let ping = system.ping_settings(&self.ping);
            if let Err(message) = ping.check() {
                return Err(ConfigError::Invalid {
                    section: "systems",
                    index,
                    message,
                });
            }
        }

        Ok(())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
