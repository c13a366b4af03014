//! Digest inclusion policy.

use chrono::{DateTime, Local};

use crate::config::DigestRequest;
use crate::twitter::Tweet;

/// Filter a newest-first timeline down to the tweets eligible for the
/// digest, oldest first.
///
/// A tweet survives when its local creation time is strictly after
/// `now + lookback`, the retweet policy keeps it, and the reply policy
/// keeps it. Survivors are prepended while scanning the newest-first
/// input, which yields oldest-first output without sorting.
#[must_use]
pub fn filter(timeline: Vec<Tweet>, request: &DigestRequest, now: DateTime<Local>) -> Vec<Tweet> {
    let cutoff = now + request.lookback;

    let mut kept: Vec<Tweet> = Vec::with_capacity(timeline.len());
    for tweet in timeline {
        let created = tweet.created_at.with_timezone(&Local);
        if created <= cutoff {
            continue;
        }
        if !request.include_retweets && tweet.retweeted_status.is_some() {
            continue;
        }
        if !request.include_replies && tweet.is_reply_to_other() {
            continue;
        }
        kept.insert(0, tweet);
    }

    kept
}
