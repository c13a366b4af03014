//! Page-metadata enrichment and embedded-tweet cards.

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::resolver::USER_AGENT;
use crate::twitter::TwitterClient;

/// Meta tag names that can supply a preview image, in precedence order.
const IMAGE_TAGS: [&str; 3] = ["twitter:image", "og:image", "twitter:image:src"];

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(30);

/// Derived data for one rendered link. Recomputed each render pass.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    /// Preview image extracted from the page's metadata.
    pub preview_image: Option<String>,
    /// Embeddable card markup when the link points back at a tweet.
    pub embed_html: Option<String>,
    /// Failures encountered while enriching; the affected field stays
    /// absent.
    pub errors: Vec<String>,
}

/// Enrichment of a resolved URL with page metadata.
#[async_trait]
pub trait EnrichUrl: Send + Sync {
    async fn enrich(&self, url: &str) -> Enrichment;
}

/// Scrapes page metadata and fetches embed cards for tweet permalinks.
pub struct MetadataEnricher {
    api: Arc<TwitterClient>,
    client: Client,
}

impl MetadataEnricher {
    /// Create a new enricher using the given API client for embed cards.
    pub fn new(api: Arc<TwitterClient>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(SCRAPE_TIMEOUT)
            .build()?;

        Ok(Self { api, client })
    }

    /// Whether a URL is a tweet permalink (`/<user>/status/<id>`).
    #[must_use]
    pub fn is_tweet_permalink(url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let host_ok = matches!(
            parsed.host_str(),
            Some("twitter.com" | "www.twitter.com" | "x.com" | "www.x.com")
        );
        if !host_ok {
            return false;
        }
        let segments: Vec<&str> = parsed.path_segments().map_or_else(Vec::new, Iterator::collect);
        segments.len() >= 3 && segments[1] == "status"
    }

    async fn fetch_meta_tags(&self, url: &str) -> Result<Vec<(String, String)>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("metadata fetch for {url} returned {status}");
        }
        let body = response.text().await?;
        Ok(extract_meta_tags(&body))
    }
}

#[async_trait]
impl EnrichUrl for MetadataEnricher {
    async fn enrich(&self, url: &str) -> Enrichment {
        let mut enrichment = Enrichment::default();
        let mut target = url.to_string();

        if Self::is_tweet_permalink(url) {
            tracing::debug!(url, "generating tweet card");
            match self.api.oembed(url).await {
                Ok(card) => {
                    enrichment.embed_html = Some(card.html);
                    // The endpoint may report a canonical URL; scrape that
                    // one instead.
                    if let Some(canonical) = card.url {
                        target = canonical;
                    }
                }
                Err(e) => {
                    tracing::error!(url, error = %e, "error generating tweet card");
                    enrichment.errors.push(format!("embed card for {url}: {e}"));
                }
            }
        }

        tracing::debug!(url = %target, "fetching image for URL");
        match self.fetch_meta_tags(&target).await {
            Ok(tags) => enrichment.preview_image = first_image(&tags),
            Err(e) => {
                tracing::error!(url = %target, error = %e, "error getting metadata for an url");
                enrichment.errors.push(format!("metadata for {target}: {e}"));
            }
        }

        enrichment
    }
}

/// Collect meta tag name/content pairs, reading both `name` and
/// `property` attributes.
fn extract_meta_tags(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("meta").expect("Invalid meta selector");

    let mut tags = Vec::new();
    for element in document.select(&selector) {
        let value = element.value();
        let Some(content) = value.attr("content") else {
            continue;
        };
        if let Some(name) = value.attr("name").or_else(|| value.attr("property")) {
            tags.push((name.to_string(), content.to_string()));
        }
    }
    tags
}

fn first_image(tags: &[(String, String)]) -> Option<String> {
    IMAGE_TAGS.iter().find_map(|wanted| {
        tags.iter()
            .find(|(name, _)| name.as_str() == *wanted)
            .map(|(_, content)| content.clone())
    })
}
