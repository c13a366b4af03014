//! Link resolution and page-metadata enrichment.
//!
//! Invoked lazily by the renderer as it visits each link; a tweet with no
//! links triggers no network activity here.

mod metadata;
mod resolver;

pub use metadata::{EnrichUrl, Enrichment, MetadataEnricher};
pub use resolver::{LinkResolver, ResolveUrl};
