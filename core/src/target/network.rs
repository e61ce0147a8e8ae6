use async_trait::async_trait;
use safenet_common::config::{NetworkConfig, NetworkStrategy, TcpSettings};
use safenet_common::network::range::{self, Ipv4Range};
use tracing::debug;

use super::{Target, TargetKind};
use crate::error::ProbeError;
use crate::network::tcp;

/// Largest subnet a sweep will walk.
pub const MAX_SWEEP_HOSTS: usize = 1024;

/// A port on a host or subnet, checked through its [`NetworkStrategy`].
#[derive(Clone, Debug)]
pub struct NetworkTarget {
    name: String,
    address: String,
    safe: bool,
    network: String,
    port: u16,
    strategy: NetworkStrategy,
    settings: TcpSettings,
}

impl NetworkTarget {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        safe: bool,
        network: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            safe,
            network: network.into(),
            port,
            strategy: NetworkStrategy::default(),
            settings: TcpSettings::default(),
        }
    }

    pub fn from_config(cfg: &NetworkConfig, settings: &TcpSettings) -> Self {
        Self::new(&cfg.name, &cfg.address, cfg.safe, &cfg.network, cfg.port)
            .with_strategy(cfg.strategy)
            .with_settings(settings.clone())
    }

    pub fn with_strategy(mut self, strategy: NetworkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_settings(mut self, settings: TcpSettings) -> Self {
        self.settings = settings;
        self
    }

    async fn connect(&self) -> Result<bool, ProbeError> {
        let addr = tcp::resolve(&self.address, self.port).await?;
        let open = tcp::handshake_probe(addr, self.settings.timeout()).await;
        debug!(name = %self.name, %addr, open, "connect finished");
        Ok(open)
    }

    async fn sweep(&self) -> Result<bool, ProbeError> {
        let range = self.sweep_range()?;
        let found = tcp::handshake_range_discovery(
            range,
            self.port,
            self.settings.timeout(),
            self.settings.sweep_concurrency,
        )
        .await;
        debug!(name = %self.name, hosts = range.len(), found = ?found, "sweep finished");
        Ok(found.is_some())
    }

    fn sweep_range(&self) -> Result<Ipv4Range, ProbeError> {
        let invalid = |reason: String| ProbeError::InvalidAddress {
            address: self.network.clone(),
            reason,
        };

        let range = range::parse_cidr(&self.network).map_err(|e| invalid(format!("{e:#}")))?;
        if range.len() > MAX_SWEEP_HOSTS {
            return Err(invalid(format!(
                "{} hosts exceed the sweep limit of {MAX_SWEEP_HOSTS}",
                range.len()
            )));
        }
        Ok(range)
    }
}

#[async_trait]
impl Target for NetworkTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Network
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn expected_safe(&self) -> bool {
        self.safe
    }

    async fn probe(&self) -> Result<bool, ProbeError> {
        debug!(
            name = %self.name,
            address = %self.address,
            network = %self.network,
            port = self.port,
            strategy = ?self.strategy,
            safe = self.safe,
            "checking network"
        );

        match self.strategy {
            NetworkStrategy::Connect => self.connect().await,
            NetworkStrategy::Sweep => self.sweep().await,
        }
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
