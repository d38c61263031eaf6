use std::time::Duration;

use thiserror::Error;

use harvest_logging::{harvest_info, harvest_warn, set_cycle};
use postharvest_core::{HarvestLimits, HarvestState, Post};

use crate::cookies::CookieFileError;
use crate::extract::{SnapshotExtractor, FEED_ORIGIN};
use crate::session::{BrowserSession, SessionCookie, SessionError};

/// Structural marker confirming the session is authenticated and the feed
/// chrome has rendered.
pub const LOGIN_LANDMARK: &str = "#global-nav";

/// Pacing knobs for one harvest run. The delays are fixed sleeps, trusting
/// the feed's load latency rather than polling for content growth.
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Wait after first opening the feed origin, before injecting cookies.
    pub settle_delay: Duration,
    /// Wait after navigating to the profile, before the first snapshot.
    pub profile_load_delay: Duration,
    /// Wait after each load-more trigger.
    pub scroll_pause: Duration,
    /// Bound on the login-landmark readiness probe.
    pub landmark_timeout: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            profile_load_delay: Duration::from_secs(5),
            scroll_pause: Duration::from_secs(4),
            landmark_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Error)]
pub enum HarvestError {
    /// Fatal precondition: the session never became usable.
    #[error("session not ready: {0}")]
    NotReady(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    CookieFile(#[from] CookieFileError),
}

/// Run one complete harvest: bootstrap the session, then repeat
/// snapshot -> extract -> dedup -> scroll until the termination policy
/// fires. Returns posts in discovery order.
///
/// The session is closed before returning, on success and on every error
/// path alike.
pub async fn harvest_posts(
    session: &mut dyn BrowserSession,
    profile_url: &str,
    cookies: &[SessionCookie],
    limits: &HarvestLimits,
    settings: &HarvestSettings,
) -> Result<Vec<Post>, HarvestError> {
    let result = drive_harvest(session, profile_url, cookies, limits, settings).await;
    close_quietly(session).await;
    result
}

async fn drive_harvest(
    session: &mut dyn BrowserSession,
    profile_url: &str,
    cookies: &[SessionCookie],
    limits: &HarvestLimits,
    settings: &HarvestSettings,
) -> Result<Vec<Post>, HarvestError> {
    harvest_info!("opening feed origin {FEED_ORIGIN}");
    session.open(FEED_ORIGIN).await?;
    tokio::time::sleep(settings.settle_delay).await;

    session.apply_cookies(cookies).await?;
    session.refresh().await?;

    if !session
        .wait_for_landmark(LOGIN_LANDMARK, settings.landmark_timeout)
        .await?
    {
        return Err(HarvestError::NotReady(format!(
            "landmark {LOGIN_LANDMARK} not found within {:?}; cookies may be stale",
            settings.landmark_timeout
        )));
    }
    harvest_info!("session ready, navigating to {profile_url}");

    session.navigate(profile_url).await?;
    tokio::time::sleep(settings.profile_load_delay).await;

    let extractor = SnapshotExtractor::new();
    let mut state = HarvestState::new();

    let reason = loop {
        set_cycle(state.cycles_attempted() + 1);
        let html = session.page_source().await?;

        let mut novel = 0usize;
        extractor.walk(&html, &mut |post| {
            if state.posts().len() >= limits.target_posts {
                return false;
            }
            if state.admit(post) {
                novel += 1;
            }
            true
        });
        state.finish_cycle(novel);
        harvest_info!(
            "cycle {}: {novel} new posts, {} total",
            state.cycles_attempted() + 1,
            state.posts().len()
        );

        if let Some(reason) = state.stop_reason(limits) {
            break reason;
        }

        session.scroll_to_bottom().await?;
        state.record_scroll();
        tokio::time::sleep(settings.scroll_pause).await;
    };

    harvest_info!(
        "harvest finished: {} ({} posts, {} scrolls)",
        reason,
        state.posts().len(),
        state.cycles_attempted()
    );
    Ok(state.into_posts())
}

async fn close_quietly(session: &mut dyn BrowserSession) {
    if let Err(err) = session.close().await {
        harvest_warn!("failed to close browser session: {err}");
    }
}
