use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use safenet_common::network::range::Ipv4Range;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::ProbeError;

/// Resolves `host:port`, erroring only when the name cannot be resolved.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ProbeError> {
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| ProbeError::Resolve {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

    addrs.next().ok_or_else(|| ProbeError::Resolve {
        host: host.to_string(),
        reason: "no addresses".into(),
    })
}

/// Whether a TCP handshake with `addr` completes within `probe_timeout`.
///
/// Refused, unreachable and silent endpoints all count as not reachable.
pub async fn handshake_probe(addr: SocketAddr, probe_timeout: Duration) -> bool {
    match timeout(probe_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            trace!(%addr, error = %e, "connect failed");
            false
        }
        Err(_elapsed) => {
            trace!(%addr, "connect timed out after {probe_timeout:?}");
            false
        }
    }
}

/// Tries `port` on every address of `range`; stops at the first host that
/// accepts.
pub async fn handshake_range_discovery(
    range: Ipv4Range,
    port: u16,
    probe_timeout: Duration,
    concurrency: usize,
) -> Option<IpAddr> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut probes: JoinSet<Option<IpAddr>> = JoinSet::new();

    for ip in range.to_iter() {
        let permits = permits.clone();
        probes.spawn(async move {
            let _permit = permits.acquire_owned().await.ok()?;
            handshake_probe(SocketAddr::new(ip, port), probe_timeout)
                .await
                .then_some(ip)
        });
    }

    while let Some(joined) = probes.join_next().await {
        if let Ok(Some(ip)) = joined {
            debug!(%ip, port, "port open");
            probes.abort_all();
            return Some(ip);
        }
    }
    None
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

    async fn closed_port() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    #[tokio::test]
    async fn handshake_probe_should_find_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(handshake_probe(addr, PROBE_TIMEOUT).await);
    }

    #[tokio::test]
    async fn handshake_probe_should_reject_closed_port() {
        let addr = closed_port().await;
        assert!(!handshake_probe(addr, PROBE_TIMEOUT).await);
    }

    #[tokio::test]
    async fn resolve_should_accept_literals() {
        let addr = resolve("127.0.0.1", 22).await.unwrap();
        assert_eq!(addr, SocketAddr::from((Ipv4Addr::LOCALHOST, 22)));
    }

    #[tokio::test]
    async fn resolve_should_fail_on_unknown_names() {
        let err = resolve("does-not-exist.invalid", 80).await.unwrap_err();
        assert!(matches!(err, ProbeError::Resolve { .. }));
    }

    #[tokio::test]
    async fn range_discovery_should_find_loopback_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let range = Ipv4Range::new(Ipv4Addr::new(127, 0, 0, 1), Ipv4Addr::new(127, 0, 0, 1));

        let found = handshake_range_discovery(range, port, PROBE_TIMEOUT, 4).await;
        assert_eq!(found, Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }

    #[tokio::test]
    async fn range_discovery_should_come_back_empty() {
        let port = closed_port().await.port();
        let range = Ipv4Range::new(Ipv4Addr::new(127, 0, 0, 1), Ipv4Addr::new(127, 0, 0, 1));

        assert_eq!(handshake_range_discovery(range, port, PROBE_TIMEOUT, 4).await, None);
    }
}
