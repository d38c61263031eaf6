use chrono::Utc;
use scraper::{ElementRef, Html, Selector};

use harvest_logging::harvest_debug;
use postharvest_core::Post;

use crate::numeric::abbreviated_count;

/// Origin used to absolutize feed-relative links.
pub const FEED_ORIGIN: &str = "https://www.linkedin.com";

const ACTIVITY_MARKER: &str = "urn:li:activity:";
const POST_PATH_PREFIX: &str = "/feed/update/";
const PROFILE_PATH_PREFIX: &str = "/in/";

const WRAPPER: &str = "div.feed-shared-update-v2";
const DETAIL_LINK: &str = "a.update-components-mini-update-v2__link-to-details-page";
const ACTOR: &str = "div.update-components-actor__container";
const ACTOR_NAME: &str = "span.update-components-actor__title span[dir=\"ltr\"]";
const ACTOR_LINK: &str = "a.update-components-actor__meta-link";
const ACTOR_HEADLINE: &str = "span.update-components-actor__description";
const ACTOR_SUB: &str = "span.update-components-actor__sub-description";
const CONTENT: &str = "div.update-components-text";
const SOCIAL_COUNTS: &str = "div.social-details-social-counts";
const REACTIONS_ITEM: &str = "li.social-details-social-counts__reactions";
const COMMENTS_ITEM: &str = "li.social-details-social-counts__comments";
const ANALYTICS: &str = "span.analytics-entry-point";

/// Splits a document snapshot into feed fragments and extracts one `Post`
/// per fragment. A fragment that yields no stable activity id is dropped
/// entirely; every other field is best-effort with an empty/zero default.
#[derive(Debug, Default)]
pub struct SnapshotExtractor;

impl SnapshotExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Walk feed fragments in document order, handing each extracted post
    /// to `visit`. `visit` returns false to stop the walk early.
    pub fn walk(&self, html: &str, visit: &mut dyn FnMut(Post) -> bool) {
        let doc = Html::parse_document(html);
        let Ok(wrapper) = Selector::parse(WRAPPER) else {
            return;
        };
        for fragment in doc.select(&wrapper) {
            match extract_post(fragment) {
                Some(post) => {
                    if !visit(post) {
                        return;
                    }
                }
                None => harvest_debug!("dropping feed fragment without an activity id"),
            }
        }
    }

    /// Extract every post in the snapshot. Convenience over [`walk`](Self::walk).
    pub fn extract_all(&self, html: &str) -> Vec<Post> {
        let mut posts = Vec::new();
        self.walk(html, &mut |post| {
            posts.push(post);
            true
        });
        posts
    }
}

fn extract_post(fragment: ElementRef<'_>) -> Option<Post> {
    let detail_href = select_first(fragment, DETAIL_LINK)
        .and_then(|a| a.value().attr("href"))
        .map(str::trim);

    // Identifier resolution, first match wins: detail-link href, then the
    // wrapper's own data-urn attribute.
    let id = detail_href
        .and_then(activity_token)
        .or_else(|| fragment.value().attr("data-urn").and_then(activity_token))?;

    let mut post = Post::with_id(id, Utc::now());

    if let Some(href) = detail_href {
        post.url = absolutize(href, POST_PATH_PREFIX);
    }

    if let Some(actor) = select_first(fragment, ACTOR) {
        post.author_name = select_first(actor, ACTOR_NAME)
            .map(element_text)
            .unwrap_or_default();
        post.author_profile_url = select_first(actor, ACTOR_LINK)
            .and_then(|a| a.value().attr("href"))
            .map(|href| absolutize(href.trim(), PROFILE_PATH_PREFIX))
            .unwrap_or_default();
        post.author_headline = select_first(actor, ACTOR_HEADLINE)
            .map(element_text)
            .unwrap_or_default();
        post.posted_label = select_first(actor, ACTOR_SUB)
            .map(element_text)
            .unwrap_or_default();
    }

    if let Some(content) = select_first(fragment, CONTENT) {
        post.text = block_text(content);
    }

    if let Some(social) = select_first(fragment, SOCIAL_COUNTS) {
        post.reactions = labeled_count(social, REACTIONS_ITEM);
        post.comments = labeled_count(social, COMMENTS_ITEM);
    }

    post.impressions = impression_count(fragment);

    Some(post)
}

/// Token following the activity-URN marker, with path separators removed.
fn activity_token(text: &str) -> Option<String> {
    text.split(ACTIVITY_MARKER)
        .nth(1)
        .map(|tail| tail.replace('/', ""))
        .filter(|token| !token.is_empty())
}

/// Rewrite a feed-relative path against the feed origin; absolute URLs and
/// unrecognized paths pass through unchanged.
fn absolutize(href: &str, path_prefix: &str) -> String {
    if href.starts_with(path_prefix) {
        format!("{FEED_ORIGIN}{href}")
    } else {
        href.to_string()
    }
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Multi-line body text: each text chunk trimmed, empties dropped,
/// paragraph breaks preserved as newlines.
fn block_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Count from a social-counts sub-item whose button `aria-label` begins
/// with the magnitude string ("1.2K reactions on ..."). Absent item -> 0.
fn labeled_count(scope: ElementRef<'_>, item_css: &str) -> u64 {
    select_first(scope, item_css)
        .and_then(|item| select_first(item, "button"))
        .and_then(|button| button.value().attr("aria-label"))
        .and_then(|label| label.split_whitespace().next())
        .map(abbreviated_count)
        .unwrap_or(0)
}

/// Impression count from the analytics entry point, only trusted when the
/// label actually mentions impressions.
fn impression_count(fragment: ElementRef<'_>) -> u64 {
    let Some(span) = select_first(fragment, ANALYTICS) else {
        return 0;
    };
    let text = element_text(span).to_lowercase();
    if !text.contains("impressions") {
        return 0;
    }
    text.replace("impressions", "")
        .split_whitespace()
        .next()
        .map(abbreviated_count)
        .unwrap_or(0)
}
