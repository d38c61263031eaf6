use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One harvested feed post.
///
/// `id` is the only field guaranteed non-empty; everything else is
/// best-effort and defaults to an empty string or zero when the snapshot
/// did not render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub url: String,
    pub author_name: String,
    pub author_profile_url: String,
    pub author_headline: String,
    /// Free-text time label as rendered ("3d", "2 weeks ago"), not parsed.
    pub posted_label: String,
    /// Body text with paragraph breaks preserved as newlines.
    pub text: String,
    pub reactions: u64,
    pub comments: u64,
    pub impressions: u64,
    pub collected_at: DateTime<Utc>,
}

impl Post {
    /// A post carrying only its identifier; field extractors fill the rest.
    pub fn with_id(id: impl Into<String>, collected_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            author_name: String::new(),
            author_profile_url: String::new(),
            author_headline: String::new(),
            posted_label: String::new(),
            text: String::new(),
            reactions: 0,
            comments: 0,
            impressions: 0,
            collected_at,
        }
    }
}
