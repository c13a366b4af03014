//! Twitter timeline access.
//!
//! Wire types, the v1.1 API client, and the retrying timeline fetcher.

mod client;
mod fetcher;
mod types;

pub use client::{Oembed, TwitterClient};
pub use fetcher::{
    FetchOutcome, RetryPolicy, Sleeper, TimelineFetcher, TimelineSource, TokioSleeper,
};
pub use types::{Author, Entities, MediaEntities, MediaEntity, Tweet, UrlEntity};
