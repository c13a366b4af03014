//! Bounded timeline fetching with retry/backoff.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::types::Tweet;

/// Source of timeline batches.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Fetch up to `count` of the most recent tweets for a screen name,
    /// newest first.
    async fn user_timeline(&self, screen_name: &str, count: u32) -> Result<Vec<Tweet>>;
}

/// Sleep capability, injectable so backoff schedules are testable
/// without real sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry schedule for timeline fetches.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum fetch attempts per account.
    pub max_attempts: u32,
    /// Base backoff; attempt `n` sleeps `n * base_backoff` before the next.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Backoff to apply after the given 1-indexed attempt.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff * attempt
    }
}

/// Result of fetching one account's timeline.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Most-recent-first tweets, as returned by the source.
    pub tweets: Vec<Tweet>,
    /// Transport errors encountered across attempts.
    pub errors: Vec<String>,
}

/// Fetches a bounded timeline batch, retrying short results.
///
/// The upstream source occasionally returns a truncated batch; bounded
/// retries with a growing backoff work around this.
pub struct TimelineFetcher {
    source: Arc<dyn TimelineSource>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl TimelineFetcher {
    /// Create a new fetcher over the given source.
    pub fn new(source: Arc<dyn TimelineSource>, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            source,
            policy,
            sleeper,
        }
    }

    /// Fetch up to `count` tweets for `screen_name`.
    ///
    /// Stops early once a batch with more than one tweet is seen, or
    /// immediately when a single tweet was requested. A transport error is
    /// recorded and treated as an empty batch for that attempt. Returns
    /// whatever the last attempt retrieved, possibly empty.
    pub async fn fetch(&self, screen_name: &str, count: u32) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        for attempt in 1..=self.policy.max_attempts {
            outcome.tweets = match self.source.user_timeline(screen_name, count).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::error!(screen_name, attempt, error = %e, "error getting timeline");
                    outcome
                        .errors
                        .push(format!("timeline {screen_name} attempt {attempt}: {e}"));
                    Vec::new()
                }
            };

            tracing::debug!(
                screen_name,
                tweets = outcome.tweets.len(),
                attempt,
                "pulled down tweets"
            );
            if outcome.tweets.len() > 1 || count == 1 {
                break;
            }

            if attempt < self.policy.max_attempts {
                let backoff = self.policy.backoff(attempt);
                tracing::debug!(seconds = backoff.as_secs(), "retrying after backoff");
                self.sleeper.sleep(backoff).await;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::types::{Author, Tweet};
    use anyhow::anyhow;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn tweet(id: &str) -> Tweet {
        Tweet::new(
            id.to_string(),
            Author::new("9".to_string(), "alice".to_string(), "Alice".to_string()),
            "hello".to_string(),
            Utc::now(),
        )
    }

    struct ScriptedSource {
        calls: Mutex<usize>,
        batches: Mutex<VecDeque<Result<Vec<Tweet>>>>,
    }

    impl ScriptedSource {
        fn new(batches: Vec<Result<Vec<Tweet>>>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
                batches: Mutex::new(batches.into()),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl TimelineSource for ScriptedSource {
        async fn user_timeline(&self, _screen_name: &str, _count: u32) -> Result<Vec<Tweet>> {
            *self.calls.lock().unwrap() += 1;
            self.batches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn slept(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn stops_on_first_full_batch() {
        let source = ScriptedSource::new(vec![Ok(vec![tweet("1"), tweet("2"), tweet("3")])]);
        let sleeper = Arc::new(RecordingSleeper::default());
        let fetcher = TimelineFetcher::new(source.clone(), RetryPolicy::default(), sleeper.clone());

        let outcome = fetcher.fetch("alice", 50).await;

        assert_eq!(outcome.tweets.len(), 3);
        assert_eq!(source.calls(), 1);
        assert!(sleeper.slept().is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn retries_short_batches_with_growing_backoff() {
        let source = ScriptedSource::new(vec![
            Ok(vec![tweet("1")]),
            Ok(vec![tweet("1")]),
            Ok(vec![tweet("1"), tweet("2"), tweet("3")]),
        ]);
        let sleeper = Arc::new(RecordingSleeper::default());
        let fetcher = TimelineFetcher::new(source.clone(), RetryPolicy::default(), sleeper.clone());

        let outcome = fetcher.fetch("alice", 50).await;

        assert_eq!(outcome.tweets.len(), 3);
        assert_eq!(source.calls(), 3);
        assert_eq!(
            sleeper.slept(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn single_tweet_request_never_retries() {
        let source = ScriptedSource::new(vec![Ok(vec![tweet("1")])]);
        let sleeper = Arc::new(RecordingSleeper::default());
        let fetcher = TimelineFetcher::new(source.clone(), RetryPolicy::default(), sleeper.clone());

        let outcome = fetcher.fetch("alice", 1).await;

        assert_eq!(outcome.tweets.len(), 1);
        assert_eq!(source.calls(), 1);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn transport_error_counts_as_empty_attempt() {
        let source = ScriptedSource::new(vec![
            Err(anyhow!("connection reset")),
            Ok(vec![tweet("1"), tweet("2")]),
        ]);
        let sleeper = Arc::new(RecordingSleeper::default());
        let fetcher = TimelineFetcher::new(source.clone(), RetryPolicy::default(), sleeper.clone());

        let outcome = fetcher.fetch("alice", 50).await;

        assert_eq!(outcome.tweets.len(), 2);
        assert_eq!(source.calls(), 2);
        assert_eq!(sleeper.slept(), vec![Duration::from_secs(5)]);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let source = ScriptedSource::new(Vec::new());
        let sleeper = Arc::new(RecordingSleeper::default());
        let fetcher = TimelineFetcher::new(source.clone(), RetryPolicy::default(), sleeper.clone());

        let outcome = fetcher.fetch("alice", 50).await;

        assert!(outcome.tweets.is_empty());
        assert_eq!(source.calls(), 5);
        assert_eq!(
            sleeper.slept(),
            vec![
                Duration::from_secs(5),
                Duration::from_secs(10),
                Duration::from_secs(15),
                Duration::from_secs(20),
            ]
        );
        // An empty batch after all retries is a valid outcome, not an error.
        assert!(outcome.errors.is_empty());
    }
}
