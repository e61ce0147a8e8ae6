use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use safenet_common::config::{HttpSettings, WebsiteConfig};
use tracing::{debug, trace};

use super::{Target, TargetKind};
use crate::error::ProbeError;

/// HTTP client shared by every website target of a run.
pub fn http_client(settings: &HttpSettings) -> reqwest::Result<Client> {
    let mut builder = Client::builder().timeout(settings.timeout());
    if settings.no_proxy {
        builder = builder.no_proxy();
    }
    builder.build()
}

/// An HTTP(S) endpoint, available when a GET answers with a non-error status.
#[derive(Clone, Debug)]
pub struct WebsiteTarget {
    name: String,
    address: String,
    safe: bool,
    client: Client,
}

impl WebsiteTarget {
    pub fn new(name: impl Into<String>, address: impl Into<String>, safe: bool, client: Client) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            safe,
            client,
        }
    }

    pub fn from_config(cfg: &WebsiteConfig, client: Client) -> Self {
        Self::new(&cfg.name, &cfg.address, cfg.safe, client)
    }

    async fn is_available(&self) -> Result<bool, ProbeError> {
        let url = Url::parse(&self.address).map_err(|e| ProbeError::InvalidAddress {
            address: self.address.clone(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        trace!(status = status.as_u16(), url = %self.address, "website response status");
        drop(response);

        Ok(is_http_status_ok(status))
    }
}

#[async_trait]
impl Target for WebsiteTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Website
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn expected_safe(&self) -> bool {
        self.safe
    }

    async fn probe(&self) -> Result<bool, ProbeError> {
        debug!(name = %self.name, address = %self.address, safe = self.safe, "checking website");
        self.is_available().await
    }
}

/// 2xx and 3xx mean the site answered; anything else is a refusal.
fn is_http_status_ok(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
