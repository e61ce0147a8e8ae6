//! ICMP echo exchange over a raw IPv4 transport channel.
//!
//! Opening the channel requires raw socket privileges (root or
//! `CAP_NET_RAW`); without them the exchange fails before anything is sent.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pnet::{
    packet::{
        Packet,
        icmp::{
            self, IcmpCode, IcmpPacket, IcmpTypes,
            echo_reply::EchoReplyPacket,
            echo_request::{EchoRequestPacket, MutableEchoRequestPacket},
        },
        ip::IpNextHeaderProtocols,
    },
    transport::{self, TransportChannelType, TransportProtocol},
};
use safenet_common::config::PingSettings;
use tracing::{trace, warn};

use crate::error::ProbeError;

const ICMP_HEADER_LEN: usize = 8;
const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
// SO_RCVTIMEO of zero blocks forever
const MIN_RECV_WAIT: Duration = Duration::from_millis(1);

/// Outcome of one echo exchange. Only `packets_recv` feeds a verdict, the
/// rest is diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingStatistics {
    pub packets_sent: u16,
    pub packets_recv: u16,
    pub min_rtt: Duration,
    pub avg_rtt: Duration,
    pub max_rtt: Duration,
}

impl PingStatistics {
    pub fn new(packets_sent: u16, rtts: &[Duration]) -> Self {
        let packets_recv = rtts.len().min(u16::MAX as usize) as u16;
        let min_rtt = rtts.iter().min().copied().unwrap_or_default();
        let max_rtt = rtts.iter().max().copied().unwrap_or_default();
        let avg_rtt = match rtts.len() {
            0 => Duration::ZERO,
            n => rtts.iter().sum::<Duration>() / n as u32,
        };

        Self {
            packets_sent,
            packets_recv,
            min_rtt,
            avg_rtt,
            max_rtt,
        }
    }

    /// Percentage of requests without a reply.
    pub fn packet_loss(&self) -> f64 {
        if self.packets_sent == 0 {
            return 0.0;
        }
        let lost = self.packets_sent.saturating_sub(self.packets_recv) as f64;
        lost / self.packets_sent as f64 * 100.0
    }

    /// A single reply is enough to call the host reachable.
    pub fn is_available(&self) -> bool {
        self.packets_recv > 0
    }
}

/// Performs an echo exchange with a host.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn ping(&self, host: &str, settings: &PingSettings) -> Result<PingStatistics, ProbeError>;
}

/// Production [`Pinger`] backed by a `pnet` raw socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct IcmpPinger;

#[async_trait]
impl Pinger for IcmpPinger {
    async fn ping(&self, host: &str, settings: &PingSettings) -> Result<PingStatistics, ProbeError> {
        let addr = resolve_ipv4(host).await?;
        trace!(%addr, "PING");

        let settings = settings.clone();
        tokio::task::spawn_blocking(move || exchange(addr, &settings))
            .await
            .map_err(|e| ProbeError::Aborted(e.to_string()))?
    }
}

async fn resolve_ipv4(host: &str) -> Result<Ipv4Addr, ProbeError> {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => return Ok(addr),
        Ok(IpAddr::V6(_)) => {
            return Err(ProbeError::InvalidAddress {
                address: host.to_string(),
                reason: "only IPv4 hosts can be pinged".into(),
            });
        }
        Err(_) => {}
    }

    let addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| ProbeError::Resolve {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

    addrs
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ProbeError::Resolve {
            host: host.to_string(),
            reason: "no IPv4 address".into(),
        })
}

/// What the exchange loop does next.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Send,
    Wait(Duration),
    Done,
}

/// Echo `n` is due `n * interval` after the start; the exchange ends at the
/// timeout or once every request is answered.
fn next_step(elapsed: Duration, sent: u16, answered: usize, settings: &PingSettings) -> Step {
    let timeout = settings.timeout();
    if elapsed >= timeout || answered >= settings.count as usize {
        return Step::Done;
    }
    let remaining = timeout - elapsed;

    if sent < settings.count {
        let due = settings.interval().saturating_mul(sent as u32);
        if elapsed >= due {
            return Step::Send;
        }
        return Step::Wait((due - elapsed).min(remaining).max(MIN_RECV_WAIT));
    }
    Step::Wait(remaining.max(MIN_RECV_WAIT))
}

/// Requests that fit before the timeout, at most `count`.
fn echoes_within(settings: &PingSettings) -> u16 {
    let timeout = settings.timeout().as_nanos();
    if timeout == 0 {
        return 0;
    }
    let interval = settings.interval().as_nanos();
    if interval == 0 {
        return settings.count;
    }
    let fitting = (timeout - 1) / interval + 1;
    fitting.min(settings.count as u128) as u16
}

/// Blocking exchange: sends `count` requests spaced by `interval` and
/// collects matching replies until every request is answered or the
/// timeout runs out.
fn exchange(addr: Ipv4Addr, settings: &PingSettings) -> Result<PingStatistics, ProbeError> {
    let planned = echoes_within(settings);
    if planned == 0 {
        return Err(ProbeError::NothingSent(settings.timeout()));
    }
    if planned < settings.count {
        warn!(
            %addr,
            count = settings.count,
            planned,
            "only {planned} of {} echo requests fit into the timeout",
            settings.count
        );
    }

    let (mut tx, mut rx) =
        transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP).map_err(ProbeError::Socket)?;
    tx.set_ttl(settings.ttl).map_err(ProbeError::Socket)?;
    let mut replies = transport::icmp_packet_iter(&mut rx);

    let identifier: u16 = rand::random();
    let payload: Vec<u8> = (0..settings.size).map(|i| i as u8).collect();
    let destination = IpAddr::V4(addr);

    let mut sent_at: HashMap<u16, Instant> = HashMap::new();
    let mut rtts: Vec<Duration> = Vec::new();
    let mut sequence: u16 = 0;
    let start = Instant::now();

    loop {
        match next_step(start.elapsed(), sequence, rtts.len(), settings) {
            Step::Done => break,
            Step::Send => {
                let bytes = build_echo_request(identifier, sequence, &payload).ok_or_else(|| {
                    ProbeError::Aborted("echo request buffer too small".into())
                })?;
                let request = EchoRequestPacket::new(&bytes)
                    .ok_or_else(|| ProbeError::Aborted("malformed echo request".into()))?;
                tx.send_to(request, destination).map_err(ProbeError::Icmp)?;

                sent_at.insert(sequence, Instant::now());
                sequence += 1;
            }
            Step::Wait(wait) => {
                let Some((packet, source)) = replies.next_with_timeout(wait).map_err(ProbeError::Icmp)? else {
                    continue;
                };
                if source != destination {
                    continue;
                }
                if let Some(seq) = match_reply(&packet, identifier)
                    && let Some(sent) = sent_at.remove(&seq)
                {
                    rtts.push(sent.elapsed());
                }
            }
        }
    }

    if sequence == 0 {
        return Err(ProbeError::NothingSent(settings.timeout()));
    }
    Ok(PingStatistics::new(sequence, &rtts))
}

fn build_echo_request(identifier: u16, sequence: u16, payload: &[u8]) -> Option<Vec<u8>> {
    let mut buffer = vec![0u8; ICMP_HEADER_LEN + payload.len()];
    let mut echo = MutableEchoRequestPacket::new(&mut buffer)?;

    echo.set_icmp_type(IcmpTypes::EchoRequest);
    echo.set_icmp_code(IcmpCode(0));
    echo.set_identifier(identifier);
    echo.set_sequence_number(sequence);
    echo.set_payload(payload);

    echo.set_checksum(0);
    let checksum = icmp::checksum(&IcmpPacket::new(echo.packet())?);
    echo.set_checksum(checksum);

    Some(buffer)
}

/// Sequence number of an echo reply that belongs to `identifier`.
fn match_reply(packet: &IcmpPacket, identifier: u16) -> Option<u16> {
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return None;
    }
    let reply = EchoReplyPacket::new(packet.packet())?;
    (reply.get_identifier() == identifier).then(|| reply.get_sequence_number())
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

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn statistics_summarize_round_trips() {
        let stats = PingStatistics::new(3, &[ms(10), ms(30), ms(20)]);
        assert_eq!(stats.packets_recv, 3);
        assert_eq!(stats.min_rtt, ms(10));
        assert_eq!(stats.max_rtt, ms(30));
        assert_eq!(stats.avg_rtt, ms(20));
        assert_eq!(stats.packet_loss(), 0.0);
        assert!(stats.is_available());
    }

    #[test]
    fn partial_replies_still_count_as_available() {
        let stats = PingStatistics::new(3, &[ms(5)]);
        assert!(stats.is_available());
        assert!((stats.packet_loss() - 66.666).abs() < 0.01);
    }

    #[test]
    fn silence_is_unavailable_without_error() {
        let stats = PingStatistics::new(3, &[]);
        assert!(!stats.is_available());
        assert_eq!(stats.packet_loss(), 100.0);
        assert_eq!(stats.avg_rtt, Duration::ZERO);
    }

    #[test]
    fn echo_request_has_valid_layout_and_checksum() {
        let payload = [0xab; 56];
        let bytes = build_echo_request(0x1234, 2, &payload).unwrap();
        assert_eq!(bytes.len(), 64);

        let packet = IcmpPacket::new(&bytes).unwrap();
        assert_eq!(packet.get_icmp_type(), IcmpTypes::EchoRequest);
        assert_eq!(packet.get_checksum(), icmp::checksum(&packet));

        let echo = EchoRequestPacket::new(&bytes).unwrap();
        assert_eq!(echo.get_identifier(), 0x1234);
        assert_eq!(echo.get_sequence_number(), 2);
        assert_eq!(echo.payload(), &payload[..]);
    }

    #[test]
    fn replies_match_only_their_identifier() {
        let mut bytes = build_echo_request(7, 1, &[0; 8]).unwrap();
        bytes[0] = IcmpTypes::EchoReply.0;

        let reply = IcmpPacket::new(&bytes).unwrap();
        assert_eq!(match_reply(&reply, 7), Some(1));
        assert_eq!(match_reply(&reply, 8), None);

        let request_bytes = build_echo_request(7, 1, &[0; 8]).unwrap();
        let request = IcmpPacket::new(&request_bytes).unwrap();
        assert_eq!(match_reply(&request, 7), None);
    }

    fn settings(count: u16, timeout_secs: u64, interval_ms: u64) -> PingSettings {
        PingSettings {
            count,
            timeout_secs,
            interval_ms,
            ..PingSettings::default()
        }
    }

    #[test]
    fn first_echo_goes_out_immediately() {
        assert_eq!(next_step(Duration::ZERO, 0, 0, &settings(3, 5, 1000)), Step::Send);
    }

    #[test]
    fn waits_for_the_next_slot() {
        let s = settings(3, 5, 1000);
        assert_eq!(next_step(ms(200), 1, 0, &s), Step::Wait(ms(800)));
        assert_eq!(next_step(ms(1000), 1, 0, &s), Step::Send);
        assert_eq!(next_step(ms(4500), 3, 1, &s), Step::Wait(ms(500)));
    }

    #[test]
    fn stops_at_timeout_or_when_all_answered() {
        let s = settings(3, 5, 1000);
        assert_eq!(next_step(ms(5000), 1, 0, &s), Step::Done);
        assert_eq!(next_step(ms(2100), 3, 3, &s), Step::Done);
    }

    #[test]
    fn zero_timeout_never_sends() {
        let s = settings(3, 0, 1000);
        assert_eq!(next_step(Duration::ZERO, 0, 0, &s), Step::Done);
        assert_eq!(echoes_within(&s), 0);
    }

    #[test]
    fn long_interval_caps_the_echo_count() {
        assert_eq!(echoes_within(&settings(3, 5, 1000)), 3);
        assert_eq!(echoes_within(&settings(3, 2, 1000)), 2);
        assert_eq!(echoes_within(&settings(3, 1, 1000)), 1);
        assert_eq!(echoes_within(&settings(3, 1, 5000)), 1);
        assert_eq!(echoes_within(&settings(4, 1, 0)), 4);

        let s = settings(3, 1, 1000);
        assert_eq!(next_step(Duration::ZERO, 1, 0, &s), Step::Wait(ms(1000)));
        assert_eq!(next_step(ms(1000), 1, 0, &s), Step::Done);
    }

    #[test]
    fn wait_never_reaches_zero() {
        let s = settings(3, 5, 1000);
        assert_eq!(next_step(ms(4999) + Duration::from_micros(500), 3, 0, &s), Step::Wait(MIN_RECV_WAIT));
    }

    #[tokio::test]
    async fn zero_timeout_is_an_error_not_silence() {
        let err = IcmpPinger.ping("127.0.0.1", &settings(3, 0, 1000)).await.unwrap_err();
        assert!(matches!(err, ProbeError::NothingSent(_)));
    }

    #[tokio::test]
    async fn ipv6_literals_are_rejected() {
        let err = resolve_ipv4("::1").await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn ipv4_literals_skip_resolution() {
        assert_eq!(resolve_ipv4("127.0.0.1").await.unwrap(), Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    #[ignore]
    async fn loopback_answers_every_echo() {
        let settings = PingSettings {
            interval_ms: 100,
            ..PingSettings::default()
        };
        let stats = IcmpPinger.ping("127.0.0.1", &settings).await.unwrap();
        assert_eq!(stats.packets_sent, 3);
        assert_eq!(stats.packets_recv, 3);
    }
}
