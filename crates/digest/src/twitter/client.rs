//! Twitter v1.1 API client.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::fetcher::TimelineSource;
use super::types::Tweet;

const API_BASE: &str = "https://api.twitter.com/1.1";
const OEMBED_BASE: &str = "https://publish.twitter.com/oembed";

/// An embeddable tweet card from the publish oEmbed endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Oembed {
    /// Embeddable HTML markup for the tweet.
    pub html: String,
    /// Canonical tweet URL, when the endpoint reports one.
    #[serde(default)]
    pub url: Option<String>,
}

/// API client for the timeline and oEmbed endpoints.
pub struct TwitterClient {
    client: Client,
    bearer_token: String,
    api_base: String,
    oembed_base: String,
}

impl TwitterClient {
    /// Create a new client with the given bearer token.
    pub fn new(bearer_token: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            bearer_token,
            api_base: API_BASE.to_string(),
            oembed_base: OEMBED_BASE.to_string(),
        })
    }

    /// Override the timeline API base URL (used by tests).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Override the oEmbed endpoint URL (used by tests).
    #[must_use]
    pub fn with_oembed_base(mut self, base: impl Into<String>) -> Self {
        self.oembed_base = base.into();
        self
    }

    /// Fetch an embeddable card for a tweet permalink.
    pub async fn oembed(&self, tweet_url: &str) -> Result<Oembed> {
        let response = self
            .client
            .get(&self.oembed_base)
            .query(&[("url", tweet_url), ("dnt", "true")])
            .send()
            .await
            .map_err(|e| anyhow!("oEmbed request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(anyhow!("oEmbed API error ({status}): {error_text}"));
        }

        response
            .json::<Oembed>()
            .await
            .map_err(|e| anyhow!("Failed to parse oEmbed response: {e}"))
    }
}

#[async_trait]
impl TimelineSource for TwitterClient {
    async fn user_timeline(&self, screen_name: &str, count: u32) -> Result<Vec<Tweet>> {
        let count = count.to_string();
        let response = self
            .client
            .get(format!("{}/statuses/user_timeline.json", self.api_base))
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("screen_name", screen_name),
                ("count", count.as_str()),
                ("tweet_mode", "extended"),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("timeline request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(anyhow!("timeline API error ({status}): {error_text}"));
        }

        response
            .json::<Vec<Tweet>>()
            .await
            .map_err(|e| anyhow!("Failed to parse timeline response: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_extended_timeline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/statuses/user_timeline.json"))
            .and(query_param("screen_name", "alice"))
            .and(query_param("count", "50"))
            .and(query_param("tweet_mode", "extended"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id_str": "1",
                    "full_text": "hello",
                    "created_at": "Wed Oct 10 20:19:24 +0000 2018",
                    "user": {
                        "id_str": "9",
                        "screen_name": "alice",
                        "name": "Alice",
                        "profile_image_url_https": "https://example.com/a.png"
                    },
                    "retweet_count": 2,
                    "favorite_count": 3
                }
            ])))
            .mount(&server)
            .await;

        let client = TwitterClient::new("token".to_string())
            .unwrap()
            .with_api_base(server.uri());

        let tweets = client.user_timeline("alice", 50).await.unwrap();

        assert_eq!(tweets.len(), 1);
        assert_eq!(tweets[0].id, "1");
        assert_eq!(tweets[0].user.screen_name, "alice");
    }

    #[tokio::test]
    async fn surfaces_timeline_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/statuses/user_timeline.json"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = TwitterClient::new("token".to_string())
            .unwrap()
            .with_api_base(server.uri());

        let error = client.user_timeline("alice", 50).await.unwrap_err();
        assert!(error.to_string().contains("429"));
    }

    #[tokio::test]
    async fn fetches_embed_card_with_dnt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("url", "https://twitter.com/alice/status/1"))
            .and(query_param("dnt", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "html": "<blockquote>quoted tweet</blockquote>",
                "url": "https://twitter.com/alice/status/1"
            })))
            .mount(&server)
            .await;

        let client = TwitterClient::new("token".to_string())
            .unwrap()
            .with_oembed_base(format!("{}/oembed", server.uri()));

        let card = client
            .oembed("https://twitter.com/alice/status/1")
            .await
            .unwrap();

        assert!(card.html.contains("quoted tweet"));
        assert_eq!(
            card.url.as_deref(),
            Some("https://twitter.com/alice/status/1")
        );
    }
}
