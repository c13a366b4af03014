//! HTML digest rendering.
//!
//! Builds the digest document one tweet at a time, resolving and enriching
//! links lazily as they are visited.

use chrono::Local;
use regex::Regex;
use std::fmt::Write;
use std::sync::Arc;

use crate::enrichment::{EnrichUrl, ResolveUrl};
use crate::twitter::Tweet;

const RETWEET_ICON: &str = "https://upload.wikimedia.org/wikipedia/commons/7/70/Retweet.png";
const LIKE_ICON: &str = "https://upload.wikimedia.org/wikipedia/commons/c/c9/Twitter_favorite.png";

/// Result of rendering a digest.
#[derive(Debug)]
pub struct RenderOutcome {
    /// The complete HTML document.
    pub html: String,
    /// Enrichment failures encountered along the way.
    pub errors: Vec<String>,
}

/// Renders tweets into an HTML digest document.
///
/// Link resolution and metadata enrichment happen here, per link, in
/// document order; a tweet with no links triggers no such calls.
pub struct DigestRenderer {
    resolver: Arc<dyn ResolveUrl>,
    enricher: Arc<dyn EnrichUrl>,
    url_pattern: Regex,
}

impl DigestRenderer {
    /// Create a renderer with the given resolution and enrichment
    /// capabilities.
    pub fn new(resolver: Arc<dyn ResolveUrl>, enricher: Arc<dyn EnrichUrl>) -> Self {
        Self {
            resolver,
            enricher,
            url_pattern: Regex::new(r"https?://[^\s]+").expect("Invalid URL pattern"),
        }
    }

    /// Render the digest document for the given tweets, in order.
    pub async fn render(&self, tweets: &[Tweet]) -> RenderOutcome {
        let mut errors = Vec::new();
        let mut rows = String::new();
        for tweet in tweets {
            let row = self.render_tweet(tweet, &mut errors).await;
            rows.push_str(&row);
        }

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: "Helvetica Neue", Helvetica, Arial, sans-serif; margin: 0; background-color: #fff; }}
        .container {{ table-layout: fixed; width: 100%; max-width: 600px; margin: 0 auto; border-collapse: collapse; }}
        .tweet {{ vertical-align: top; border: 1px solid #e2e6e6; border-bottom: none; padding: 5px; }}
        .byline {{ color: #4e555b; font-size: 13px; padding-bottom: 4px; }}
        .avatar {{ border-radius: 50%; height: 48px; width: 48px; }}
        .author {{ color: #000; text-decoration: none; }}
        .date {{ float: right; color: #4e555b; }}
        .text {{ margin: 0; padding: 5px 0; white-space: pre-wrap; }}
        .media {{ max-width: 100%; padding-bottom: 5px; }}
        .card {{ width: 100%; border: 1px solid #e2e6e6; border-radius: 12px; padding: 5px; margin: 5px 0; }}
        .card a {{ color: #000; text-decoration: none; }}
        .metrics {{ color: #4e555b; margin: 0; }}
        .metric-icon {{ height: 16px; vertical-align: text-top; }}
        .count {{ margin-right: 28px; }}
    </style>
</head>
<body>
    <table class="container">
{rows}    </table>
</body>
</html>"#
        );

        RenderOutcome { html, errors }
    }

    async fn render_tweet(&self, tweet: &Tweet, errors: &mut Vec<String>) -> String {
        // A retweet renders the nested original everywhere except the
        // byline, which names the account that retweeted it.
        let effective = tweet.effective();

        let byline = if tweet.retweeted_status.is_some() {
            format!(
                "                <div class=\"byline\"><img class=\"metric-icon\" src=\"{RETWEET_ICON}\" height=\"10\"> {} Retweeted</div>\n",
                html_escape(&tweet.user.screen_name),
            )
        } else {
            String::new()
        };

        let text = self.substitute_urls(&effective.text, errors).await;

        let mut media = String::new();
        for attachment in effective.media() {
            let _ = writeln!(
                media,
                "                        <img class=\"media\" src=\"{}\">",
                html_escape(&attachment.media_url_https)
            );
        }

        let mut cards = String::new();
        for link in &effective.entities.urls {
            let card = self.render_card(&link.expanded_url, errors).await;
            cards.push_str(&card);
        }

        format!(
            r#"        <tr>
            <td class="tweet">
{byline}                <table width="100%"><tr>
                    <td width="60" align="center" valign="top"><img class="avatar" src="{avatar}"></td>
                    <td valign="top">
                        <a class="author" href="{permalink}">
                            <strong>{name}</strong>
                            <span>@{handle}</span>
                            <span class="date">{date}</span>
                        </a>
                        <p class="text">{text}</p>
{media}{cards}                        <p class="metrics">
                            <span class="count"><img class="metric-icon" src="{RETWEET_ICON}"> {retweets}</span>
                            <span class="count"><img class="metric-icon" src="{LIKE_ICON}"> {likes}</span>
                        </p>
                    </td>
                </tr></table>
            </td>
        </tr>
"#,
            avatar = html_escape(&effective.user.profile_image_url_https),
            permalink = html_escape(&effective.permalink()),
            name = html_escape(&effective.user.name),
            handle = html_escape(&effective.user.screen_name),
            date = format_date(effective),
            retweets = effective.retweet_count,
            likes = effective.favorite_count,
        )
    }

    /// Render the card for one discovered link: resolve the URL, enrich
    /// it, and show the resolved URL as both target and label.
    async fn render_card(&self, expanded_url: &str, errors: &mut Vec<String>) -> String {
        let resolved = match self.resolver.resolve(expanded_url).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!(url = expanded_url, error = %e, "error resolving url");
                errors.push(format!("resolve {expanded_url}: {e}"));
                expanded_url.to_string()
            }
        };

        let enrichment = self.enricher.enrich(&resolved).await;
        errors.extend(enrichment.errors);

        // oEmbed markup is already HTML; preview images get wrapped here.
        let embed = enrichment.embed_html.unwrap_or_default();
        let image = enrichment.preview_image.map_or_else(String::new, |src| {
            format!("<img class=\"media\" src=\"{}\">", html_escape(&src))
        });

        format!(
            r#"                        <table class="card"><tr><td>
                            <a href="{href}" target="_blank">{embed}{image}<strong>{label}</strong></a>
                        </td></tr></table>
"#,
            href = html_escape(&resolved),
            label = html_escape(&resolved),
        )
    }

    /// Replace every raw URL occurrence in the text with its resolved
    /// form; URLs that fail to resolve are left unchanged.
    async fn substitute_urls(&self, text: &str, errors: &mut Vec<String>) -> String {
        let mut output = html_escape(text);
        let matches: Vec<String> = self
            .url_pattern
            .find_iter(text)
            .map(|found| found.as_str().to_string())
            .collect();

        for url in matches {
            match self.resolver.resolve(&url).await {
                Ok(resolved) => {
                    output = output.replace(&html_escape(&url), &html_escape(&resolved));
                }
                Err(e) => {
                    tracing::error!(url = %url, error = %e, "error resolving url in text");
                    errors.push(format!("resolve {url}: {e}"));
                }
            }
        }

        output
    }
}

fn format_date(tweet: &Tweet) -> String {
    tweet
        .created_at
        .with_timezone(&Local)
        .format("%b %-d")
        .to_string()
}

/// Simple HTML escaping for user content.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
