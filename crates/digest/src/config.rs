//! Run configuration.
//!
//! Mail and API settings come from the environment; the digest request is
//! assembled from the command line.

use anyhow::{bail, Context, Result};
use chrono::Duration;

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP settings for digest delivery.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
    /// Recipient addresses.
    pub to_emails: Vec<String>,
}

impl MailConfig {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `SMTP_HOST`: SMTP server hostname
    /// - `SMTP_USERNAME`: SMTP username
    /// - `SMTP_PASSWORD`: SMTP password
    /// - `DIGEST_TO_EMAIL`: recipient address(es), comma-separated
    ///
    /// # Optional Environment Variables
    /// - `SMTP_PORT`: server port (default: 587)
    /// - `DIGEST_FROM_EMAIL`: sender address (default: the SMTP username)
    /// - `DIGEST_FROM_NAME`: sender display name (default: "Tweet Digest")
    pub fn from_env() -> Result<Self> {
        let smtp_host =
            std::env::var("SMTP_HOST").context("SMTP_HOST environment variable not set")?;

        let smtp_port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SMTP_PORT);

        let smtp_username =
            std::env::var("SMTP_USERNAME").context("SMTP_USERNAME environment variable not set")?;

        let smtp_password =
            std::env::var("SMTP_PASSWORD").context("SMTP_PASSWORD environment variable not set")?;

        let from_email =
            std::env::var("DIGEST_FROM_EMAIL").unwrap_or_else(|_| smtp_username.clone());

        let from_name =
            std::env::var("DIGEST_FROM_NAME").unwrap_or_else(|_| "Tweet Digest".to_string());

        let to_emails: Vec<String> = std::env::var("DIGEST_TO_EMAIL")
            .context("DIGEST_TO_EMAIL environment variable not set")?
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(ToString::to_string)
            .collect();
        if to_emails.is_empty() {
            bail!("DIGEST_TO_EMAIL contains no addresses");
        }

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            from_name,
            to_emails,
        })
    }
}

/// Twitter API credentials.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bearer token for the timeline API.
    pub bearer_token: String,
}

impl ApiConfig {
    /// Create configuration from the `TWITTER_BEARER_TOKEN` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let bearer_token = std::env::var("TWITTER_BEARER_TOKEN")
            .context("TWITTER_BEARER_TOKEN environment variable not set")?;
        Ok(Self { bearer_token })
    }
}

/// Input configuration for one digest run.
#[derive(Debug, Clone)]
pub struct DigestRequest {
    /// Accounts to digest.
    pub handles: Vec<String>,
    /// Maximum tweets to request per account.
    pub tweet_count: u32,
    /// Inclusion cutoff offset added to "now"; a negative value walks
    /// backward (e.g. `-24h` keeps the last day).
    pub lookback: Duration,
    /// Keep retweets.
    pub include_retweets: bool,
    /// Keep replies to other accounts.
    pub include_replies: bool,
}

/// Parse a Go-style duration string such as `-24h`, `90m`, `30s` or `7d`.
pub fn parse_lookback(input: &str) -> Result<Duration> {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let unit_at = rest
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("duration {input:?} is missing a unit (s, m, h or d)"))?;
    let (digits, unit) = rest.split_at(unit_at);
    let value: i64 = digits
        .parse()
        .with_context(|| format!("duration {input:?} has no numeric value"))?;

    let seconds = match unit {
        "s" => value,
        "m" => value * 60,
        "h" => value * 3600,
        "d" => value * 86_400,
        _ => bail!("unsupported duration unit {unit:?} in {input:?}"),
    };

    Ok(Duration::seconds(if negative { -seconds } else { seconds }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_hours() {
        assert_eq!(parse_lookback("-24h").unwrap(), Duration::hours(-24));
    }

    #[test]
    fn parses_minutes_seconds_and_days() {
        assert_eq!(parse_lookback("90m").unwrap(), Duration::minutes(90));
        assert_eq!(parse_lookback("30s").unwrap(), Duration::seconds(30));
        assert_eq!(parse_lookback("-7d").unwrap(), Duration::days(-7));
    }

    #[test]
    fn parses_explicit_positive_sign() {
        assert_eq!(parse_lookback("+24h").unwrap(), Duration::hours(24));
    }

    #[test]
    fn rejects_missing_unit() {
        assert!(parse_lookback("24").is_err());
    }

    #[test]
    fn rejects_missing_value() {
        assert!(parse_lookback("h").is_err());
        assert!(parse_lookback("-").is_err());
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(parse_lookback("10x").is_err());
    }
}
