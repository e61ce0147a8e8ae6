use std::sync::Arc;

use async_trait::async_trait;
use safenet_common::config::{PingSettings, SystemConfig};
use tracing::debug;

use super::{Target, TargetKind};
use crate::error::ProbeError;
use crate::network::icmp::{IcmpPinger, PingStatistics, Pinger};

/// A host, available when at least one ICMP echo is answered.
#[derive(Clone)]
pub struct SystemTarget {
    name: String,
    address: String,
    safe: bool,
    settings: PingSettings,
    pinger: Arc<dyn Pinger>,
}

impl SystemTarget {
    pub fn new(name: impl Into<String>, address: impl Into<String>, safe: bool) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            safe,
            settings: PingSettings::default(),
            pinger: Arc::new(IcmpPinger),
        }
    }

    pub fn from_config(cfg: &SystemConfig, settings: PingSettings, pinger: Arc<dyn Pinger>) -> Self {
        Self::new(&cfg.name, &cfg.address, cfg.safe)
            .with_settings(settings)
            .with_pinger(pinger)
    }

    pub fn with_settings(mut self, settings: PingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_pinger(mut self, pinger: Arc<dyn Pinger>) -> Self {
        self.pinger = pinger;
        self
    }

    pub fn settings(&self) -> &PingSettings {
        &self.settings
    }

    async fn is_available(&self) -> Result<bool, ProbeError> {
        let stats: PingStatistics = self.pinger.ping(&self.address, &self.settings).await?;

        debug!(
            name = %self.name,
            packets_sent = stats.packets_sent,
            packets_recv = stats.packets_recv,
            packet_loss = stats.packet_loss(),
            "packet statistics"
        );
        debug!(
            name = %self.name,
            min = ?stats.min_rtt,
            max = ?stats.max_rtt,
            avg = ?stats.avg_rtt,
            "ping time"
        );

        Ok(stats.is_available())
    }
}

#[async_trait]
impl Target for SystemTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::System
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
            safe = self.safe,
            count = self.settings.count,
            ttl = self.settings.ttl,
            size = self.settings.size,
            "checking system"
        );
        self.is_available().await
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
