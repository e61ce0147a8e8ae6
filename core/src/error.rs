use thiserror::Error;

/// A probe could not produce an observation.
///
/// Construction failures (bad address, no raw socket) and execution failures
/// (transport errors) are handled the same way: the target is recorded as
/// unavailable and the run moves on.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("failed to open raw ICMP socket: {0}")]
    Socket(#[source] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ICMP exchange failed: {0}")]
    Icmp(#[source] std::io::Error),

    #[error("no echo request could be sent within {0:?}")]
    NothingSent(std::time::Duration),

    #[error("probe aborted: {0}")]
    Aborted(String),
}
