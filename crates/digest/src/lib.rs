//! Tweet email digest pipeline.
//!
//! This crate provides:
//! - Bounded timeline fetching with retry/backoff
//! - Time-window and policy filtering of tweets
//! - Link resolution and page-metadata enrichment
//! - HTML digest rendering and SMTP delivery

pub mod config;
pub mod email;
pub mod enrichment;
pub mod filter;
pub mod pipeline;
pub mod render;
pub mod twitter;

// Re-export main types
pub use config::{ApiConfig, DigestRequest, MailConfig};
pub use email::EmailSender;
pub use enrichment::{EnrichUrl, Enrichment, LinkResolver, MetadataEnricher, ResolveUrl};
pub use pipeline::{Pipeline, RunReport};
pub use render::{DigestRenderer, RenderOutcome};
pub use twitter::{RetryPolicy, TimelineFetcher, Tweet, TwitterClient};
