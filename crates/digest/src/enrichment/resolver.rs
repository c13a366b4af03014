//! Shortened-URL resolution.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Generic browser user agent; some shorteners refuse unknown clients.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (compatible;)";

/// Bounds each resolution attempt so a dead host cannot block the run.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolution of a (possibly shortened) URL to its final destination.
#[async_trait]
pub trait ResolveUrl: Send + Sync {
    /// Follow redirects and return the final destination URL.
    async fn resolve(&self, url: &str) -> Result<String>;
}

/// Redirect-following resolver backed by reqwest.
pub struct LinkResolver {
    client: Client,
}

impl LinkResolver {
    /// Create a new resolver.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(RESOLVE_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ResolveUrl for LinkResolver {
    async fn resolve(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("resolution failed for {url}: {e}"))?;

        Ok(response.url().to_string())
    }
}
