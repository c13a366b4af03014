//! tweetdigest CLI - compiles recent tweets into an email digest.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tweetdigest::config::{parse_lookback, ApiConfig, DigestRequest, MailConfig};
use tweetdigest::email::EmailSender;
use tweetdigest::enrichment::{LinkResolver, MetadataEnricher};
use tweetdigest::pipeline::Pipeline;
use tweetdigest::render::DigestRenderer;
use tweetdigest::twitter::{RetryPolicy, TimelineFetcher, TokioSleeper, TwitterClient};

/// Compiles tweets into an email digest.
#[derive(Parser)]
#[command(name = "tweetdigest")]
#[command(about = "Compiles tweets into an email digest")]
#[command(version)]
struct Cli {
    /// Twitter screen name(s) to digest
    #[arg(required = true, value_name = "SCREEN_NAME")]
    handles: Vec<String>,

    /// How far back to include tweets in the digest (example: "-24h")
    #[arg(
        short = 'd',
        long = "duration",
        allow_hyphen_values = true,
        value_parser = parse_duration_arg
    )]
    duration: chrono::Duration,

    /// Number of tweets to analyze per account (max 200)
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u32).range(1..=200))]
    tweet_count: u32,

    /// Include retweets in the digest
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    include_retweets: bool,

    /// Include replies in the digest
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    include_replies: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_duration_arg(value: &str) -> Result<chrono::Duration, String> {
    parse_lookback(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("tweetdigest=debug,info")
    } else {
        EnvFilter::new("tweetdigest=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let request = DigestRequest {
        handles: cli.handles,
        tweet_count: cli.tweet_count,
        lookback: cli.duration,
        include_retweets: cli.include_retweets,
        include_replies: cli.include_replies,
    };

    // Configuration problems abort here, before any network activity.
    let api = Arc::new(TwitterClient::new(ApiConfig::from_env()?.bearer_token)?);
    let sender = EmailSender::new(MailConfig::from_env()?);

    let fetcher = TimelineFetcher::new(api.clone(), RetryPolicy::default(), Arc::new(TokioSleeper));
    let resolver = Arc::new(LinkResolver::new()?);
    let enricher = Arc::new(MetadataEnricher::new(api)?);
    let renderer = DigestRenderer::new(resolver, enricher);

    let pipeline = Pipeline::new(fetcher, renderer, sender);
    let report = pipeline.run(&request).await?;

    println!("\nDigest Run Summary");
    println!("   Fetched: {}", report.fetched);
    println!("   Kept:    {}", report.kept);
    println!("   Sent:    {}", if report.sent { "yes" } else { "no" });

    if report.errors_encountered() {
        println!("   Errors:  {}", report.errors.len());
        for err in &report.errors {
            eprintln!("     - {err}");
        }
        // Soft errors surface through the exit status so schedulers can
        // detect partial failures.
        std::process::exit(1);
    }

    Ok(())
}
