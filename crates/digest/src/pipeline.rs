//! Digest pipeline - orchestrates the fetch-filter-render-send flow.

use anyhow::Result;
use chrono::Local;

use crate::config::DigestRequest;
use crate::email::{digest_subject, EmailSender};
use crate::filter;
use crate::render::DigestRenderer;
use crate::twitter::TimelineFetcher;

/// Result of a single digest run.
///
/// Soft errors accumulate here and are translated to an exit status at
/// the outermost boundary; they never abort the run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of tweets fetched across all accounts.
    pub fetched: usize,
    /// Number that survived filtering.
    pub kept: usize,
    /// Whether a digest mail was sent.
    pub sent: bool,
    /// Soft errors encountered (fetch and enrichment failures).
    pub errors: Vec<String>,
}

impl RunReport {
    /// Whether any error-level event was recorded during the run.
    #[must_use]
    pub fn errors_encountered(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Digest pipeline orchestrator.
pub struct Pipeline {
    fetcher: TimelineFetcher,
    renderer: DigestRenderer,
    sender: EmailSender,
}

impl Pipeline {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(fetcher: TimelineFetcher, renderer: DigestRenderer, sender: EmailSender) -> Self {
        Self {
            fetcher,
            renderer,
            sender,
        }
    }

    /// Run a single digest cycle.
    ///
    /// Fetch and enrichment failures degrade gracefully into the report;
    /// only delivery failure propagates as an error. An empty digest
    /// sends no mail.
    pub async fn run(&self, request: &DigestRequest) -> Result<RunReport> {
        let mut report = RunReport::default();
        let now = Local::now();

        tracing::info!(handles = ?request.handles, "Starting digest run");

        let mut tweets = Vec::new();
        for handle in &request.handles {
            let outcome = self.fetcher.fetch(handle, request.tweet_count).await;
            report.fetched += outcome.tweets.len();
            report.errors.extend(outcome.errors);
            tweets.extend(filter::filter(outcome.tweets, request, now));
        }
        report.kept = tweets.len();

        if tweets.is_empty() {
            tracing::info!("No tweets within the digest window, skipping send");
            return Ok(report);
        }

        let rendered = self.renderer.render(&tweets).await;
        report.errors.extend(rendered.errors);

        let subject = digest_subject(&request.handles, now.date_naive());
        self.sender.send(&subject, &rendered.html).await?;
        report.sent = true;

        tracing::info!(
            fetched = report.fetched,
            kept = report.kept,
            errors = report.errors.len(),
            "Digest run complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;
    use crate::enrichment::{EnrichUrl, Enrichment, ResolveUrl};
    use crate::twitter::{Author, RetryPolicy, Sleeper, TimelineSource, Tweet};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    struct FixedSource {
        tweets: Vec<Tweet>,
    }

    #[async_trait]
    impl TimelineSource for FixedSource {
        async fn user_timeline(&self, _screen_name: &str, _count: u32) -> anyhow::Result<Vec<Tweet>> {
            Ok(self.tweets.clone())
        }
    }

    struct NoopSleeper;

    #[async_trait]
    impl Sleeper for NoopSleeper {
        async fn sleep(&self, _duration: StdDuration) {}
    }

    struct NoResolver;

    #[async_trait]
    impl ResolveUrl for NoResolver {
        async fn resolve(&self, url: &str) -> anyhow::Result<String> {
            Err(anyhow!("unexpected resolution of {url}"))
        }
    }

    struct NoEnricher;

    #[async_trait]
    impl EnrichUrl for NoEnricher {
        async fn enrich(&self, _url: &str) -> Enrichment {
            Enrichment::default()
        }
    }

    fn pipeline_over(tweets: Vec<Tweet>) -> Pipeline {
        let fetcher = TimelineFetcher::new(
            Arc::new(FixedSource { tweets }),
            RetryPolicy::default(),
            Arc::new(NoopSleeper),
        );
        let renderer = DigestRenderer::new(Arc::new(NoResolver), Arc::new(NoEnricher));
        // The sender is never reached in these tests; send is only called
        // for a non-empty digest.
        let sender = EmailSender::new(MailConfig {
            smtp_host: "smtp.invalid".to_string(),
            smtp_port: 587,
            smtp_username: "user".to_string(),
            smtp_password: "pass".to_string(),
            from_email: "digest@example.com".to_string(),
            from_name: "Tweet Digest".to_string(),
            to_emails: vec!["inbox@example.com".to_string()],
        });
        Pipeline::new(fetcher, renderer, sender)
    }

    fn request(lookback: Duration) -> DigestRequest {
        DigestRequest {
            handles: vec!["alice".to_string()],
            tweet_count: 50,
            lookback,
            include_retweets: true,
            include_replies: true,
        }
    }

    #[tokio::test]
    async fn empty_timeline_sends_no_mail() {
        let pipeline = pipeline_over(Vec::new());

        let report = pipeline.run(&request(Duration::hours(-24))).await.unwrap();

        assert_eq!(report.fetched, 0);
        assert_eq!(report.kept, 0);
        assert!(!report.sent);
        assert!(!report.errors_encountered());
    }

    #[tokio::test]
    async fn future_cutoff_empties_digest_and_sends_no_mail() {
        let tweets = vec![
            Tweet::new(
                "2".to_string(),
                Author::new("9".to_string(), "alice".to_string(), "Alice".to_string()),
                "recent".to_string(),
                Utc::now() - Duration::hours(1),
            ),
            Tweet::new(
                "1".to_string(),
                Author::new("9".to_string(), "alice".to_string(), "Alice".to_string()),
                "older".to_string(),
                Utc::now() - Duration::hours(2),
            ),
        ];
        let pipeline = pipeline_over(tweets);

        let report = pipeline.run(&request(Duration::hours(24))).await.unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(report.kept, 0);
        assert!(!report.sent);
    }
}
