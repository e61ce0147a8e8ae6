use std::net::{IpAddr, Ipv4Addr};

use anyhow::Context;
use pnet::ipnetwork::Ipv4Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        end.checked_sub(start).map_or(0, |span| span as usize + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }
}

/// Usable host addresses of `ip/prefix`.
///
/// Network and broadcast addresses are stripped unless the block is too
/// small to have any (`/31` and `/32`).
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)?;
    let net_u32: u32 = network.network().into();
    let broadcast_u32: u32 = network.broadcast().into();

    if prefix >= 31 {
        return Ok(Ipv4Range::new(network.network(), network.broadcast()));
    }

    let start = Ipv4Addr::from(net_u32.saturating_add(1));
    let end = Ipv4Addr::from(broadcast_u32.saturating_sub(1));
    Ok(Ipv4Range::new(start, end))
}

/// Parses CIDR notation like "192.168.1.0/24". A bare address is a `/32`.
pub fn parse_cidr(s: &str) -> anyhow::Result<Ipv4Range> {
    let s = s.trim();
    let (ip_str, prefix_str) = s.split_once('/').unwrap_or((s, "32"));

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .with_context(|| format!("Invalid IP in CIDR '{ip_str}'"))?;

    let prefix = prefix_str
        .parse::<u8>()
        .with_context(|| format!("Invalid prefix in CIDR '{prefix_str}'"))?;

    cidr_range(ipv4_addr, prefix)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
