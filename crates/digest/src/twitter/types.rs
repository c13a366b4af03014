//! Twitter data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timeline entry, mapped from the v1.1 wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    /// Unique tweet ID.
    #[serde(rename = "id_str")]
    pub id: String,
    /// Tweet author.
    pub user: Author,
    /// Raw body text.
    #[serde(rename = "full_text", alias = "text")]
    pub text: String,
    /// When the tweet was posted. Consumers convert to local time for
    /// comparisons and display.
    #[serde(with = "twitter_date")]
    pub created_at: DateTime<Utc>,
    /// The original tweet when this entry is a retweet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retweeted_status: Option<Box<Tweet>>,
    /// Account ID this tweet replies to, if any.
    #[serde(
        rename = "in_reply_to_user_id_str",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub in_reply_to_user_id: Option<String>,
    /// URLs discovered in the text.
    #[serde(default)]
    pub entities: Entities,
    /// Attached media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_entities: Option<MediaEntities>,
    /// Times this tweet was retweeted.
    #[serde(default)]
    pub retweet_count: u64,
    /// Times this tweet was liked.
    #[serde(default)]
    pub favorite_count: u64,
}

impl Tweet {
    /// Create a tweet with minimal required fields.
    #[must_use]
    pub fn new(id: String, user: Author, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user,
            text,
            created_at,
            retweeted_status: None,
            in_reply_to_user_id: None,
            entities: Entities::default(),
            extended_entities: None,
            retweet_count: 0,
            favorite_count: 0,
        }
    }

    /// The tweet whose content is actually rendered: the nested original
    /// for a retweet, otherwise this tweet itself.
    #[must_use]
    pub fn effective(&self) -> &Tweet {
        self.retweeted_status.as_deref().unwrap_or(self)
    }

    /// Whether this tweet replies to a different account. A reply to
    /// oneself (a self-thread continuation) does not count.
    #[must_use]
    pub fn is_reply_to_other(&self) -> bool {
        self.in_reply_to_user_id
            .as_deref()
            .is_some_and(|id| !id.is_empty() && id != self.user.id)
    }

    /// Attached media image URLs, in order.
    #[must_use]
    pub fn media(&self) -> &[MediaEntity] {
        self.extended_entities
            .as_ref()
            .map_or(&[], |entities| entities.media.as_slice())
    }

    /// Canonical web permalink for this tweet.
    #[must_use]
    pub fn permalink(&self) -> String {
        format!(
            "https://twitter.com/{}/status/{}",
            self.user.screen_name, self.id
        )
    }
}

/// Author information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    /// Account ID.
    #[serde(rename = "id_str")]
    pub id: String,
    /// Handle (without @).
    pub screen_name: String,
    /// Display name.
    pub name: String,
    /// Profile image URL.
    #[serde(default)]
    pub profile_image_url_https: String,
}

impl Author {
    /// Create a new author.
    #[must_use]
    pub fn new(id: String, screen_name: String, name: String) -> Self {
        Self {
            id,
            screen_name,
            name,
            profile_image_url_https: String::new(),
        }
    }
}

/// Entities attached to a tweet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    /// URLs found in the tweet text.
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

/// A shortened/expanded URL pair from the tweet text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlEntity {
    /// Shortened URL as it appears in the text.
    pub url: String,
    /// Expanded URL reported by the platform.
    pub expanded_url: String,
}

/// Extended entities holding media attachments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaEntities {
    /// Attached media, in order.
    #[serde(default)]
    pub media: Vec<MediaEntity>,
}

/// A media attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEntity {
    /// HTTPS URL of the media image.
    pub media_url_https: String,
}

/// Serde adapter for Twitter's `"%a %b %d %H:%M:%S %z %Y"` timestamps.
mod twitter_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        DateTime::parse_from_str(&value, FORMAT)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
