use std::net::SocketAddr;

use async_trait::async_trait;
use safenet_core::{ProbeError, Target, TargetKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Starts a loopback HTTP server answering every request with `status`.
pub async fn serve_status(status: u16, reason: &str) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Ok(addr)
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

/// What a [`MockTarget`] observes when probed.
#[derive(Debug, Clone, Copy)]
pub enum Observation {
    Available,
    Unavailable,
    Fails,
    Panics,
}

#[derive(Debug, Clone)]
pub struct MockTarget {
    pub name: String,
    pub expected_safe: bool,
    pub observation: Observation,
}

impl MockTarget {
    pub fn new(name: &str, expected_safe: bool, observation: Observation) -> Self {
        Self {
            name: name.to_string(),
            expected_safe,
            observation,
        }
    }
}

#[async_trait]
impl Target for MockTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::System
    }

    fn address(&self) -> &str {
        "192.0.2.1"
    }

    fn expected_safe(&self) -> bool {
        self.expected_safe
    }

    async fn probe(&self) -> Result<bool, ProbeError> {
        match self.observation {
            Observation::Available => Ok(true),
            Observation::Unavailable => Ok(false),
            Observation::Fails => Err(ProbeError::Resolve {
                host: self.name.clone(),
                reason: "no such host".into(),
            }),
            Observation::Panics => panic!("probe for {} blew up", self.name),
        }
    }
}
