//! The central **abstraction** for checked endpoints.
//!
//! Every target kind implements [`Target`]: it can name itself, declare
//! whether it is expected to be reachable, and probe the network for the
//! actual state. The orchestrator only ever talks to this trait.
//!
//! The set of kinds is closed; [`AnyTarget`] holds one of them and is what
//! the configuration turns into.

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use safenet_common::config::Config;

use crate::error::ProbeError;
use crate::network::icmp::IcmpPinger;

mod network;
mod system;
mod website;

pub use network::NetworkTarget;
pub use system::SystemTarget;
pub use website::{WebsiteTarget, http_client};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Website,
    System,
    Network,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TargetKind::Website => "website",
            TargetKind::System => "system",
            TargetKind::Network => "network",
        };
        f.write_str(label)
    }
}

/// Outcome of checking one target.
#[derive(Debug)]
pub struct Verdict {
    /// Raw reachability. `false` whenever the probe failed.
    pub available: bool,
    /// Whether `available` matched the target's declared expectation.
    pub safe: bool,
    /// Set when the probe could not observe anything.
    pub error: Option<ProbeError>,
}

impl Verdict {
    /// Applies the safety rule to a probe observation.
    ///
    /// A failed probe counts as "not available" and keeps its error.
    pub fn evaluate(expected_safe: bool, observed: Result<bool, ProbeError>) -> Self {
        let (available, error) = match observed {
            Ok(available) => (available, None),
            Err(e) => (false, Some(e)),
        };

        Self {
            available,
            safe: expected_safe == available,
            error,
        }
    }
}

/// A configured endpoint with a declared reachability expectation.
#[async_trait]
pub trait Target: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> TargetKind;

    fn address(&self) -> &str;

    /// `true` if the target should be reachable, `false` if it must be blocked.
    fn expected_safe(&self) -> bool;

    /// Measures reachability. `Ok(false)` is a valid observation, not a failure.
    async fn probe(&self) -> Result<bool, ProbeError>;

    async fn check(&self) -> Verdict {
        Verdict::evaluate(self.expected_safe(), self.probe().await)
    }
}

#[derive(Clone)]
pub enum AnyTarget {
    Website(WebsiteTarget),
    System(SystemTarget),
    Network(NetworkTarget),
}

#[async_trait]
impl Target for AnyTarget {
    fn name(&self) -> &str {
        match self {
            AnyTarget::Website(t) => t.name(),
            AnyTarget::System(t) => t.name(),
            AnyTarget::Network(t) => t.name(),
        }
    }

    fn kind(&self) -> TargetKind {
        match self {
            AnyTarget::Website(_) => TargetKind::Website,
            AnyTarget::System(_) => TargetKind::System,
            AnyTarget::Network(_) => TargetKind::Network,
        }
    }

    fn address(&self) -> &str {
        match self {
            AnyTarget::Website(t) => t.address(),
            AnyTarget::System(t) => t.address(),
            AnyTarget::Network(t) => t.address(),
        }
    }

    fn expected_safe(&self) -> bool {
        match self {
            AnyTarget::Website(t) => t.expected_safe(),
            AnyTarget::System(t) => t.expected_safe(),
            AnyTarget::Network(t) => t.expected_safe(),
        }
    }

    async fn probe(&self) -> Result<bool, ProbeError> {
        match self {
            AnyTarget::Website(t) => t.probe().await,
            AnyTarget::System(t) => t.probe().await,
            AnyTarget::Network(t) => t.probe().await,
        }
    }
}

/// Turns the configured target lists into one sequence: websites, then
/// systems, then networks.
pub fn build_targets(config: &Config) -> anyhow::Result<Vec<AnyTarget>> {
    let client = http_client(&config.http).context("building HTTP client")?;
    let pinger = Arc::new(IcmpPinger);

    let websites = config
        .websites
        .iter()
        .map(|cfg| AnyTarget::Website(WebsiteTarget::from_config(cfg, client.clone())));

    let systems = config.systems.iter().map(|cfg| {
        let settings = cfg.ping_settings(&config.ping);
        AnyTarget::System(SystemTarget::from_config(cfg, settings, pinger.clone()))
    });

    let networks = config
        .networks
        .iter()
        .map(|cfg| AnyTarget::Network(NetworkTarget::from_config(cfg, &config.tcp)));

    Ok(websites.chain(systems).chain(networks).collect())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
