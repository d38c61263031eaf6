use std::time::Duration;

use postharvest_core::HarvestLimits;
use postharvest_engine::{
    harvest_posts, BrowserSession, HarvestError, HarvestSettings, SessionCookie, SessionError,
};
use pretty_assertions::assert_eq;

/// Fake session that replays a scripted sequence of document snapshots:
/// each scroll advances to the next snapshot, the last one repeats.
struct ScriptedSession {
    snapshots: Vec<String>,
    cursor: usize,
    landmark_present: bool,
    scrolls: u32,
    cookies_applied: usize,
    closed: bool,
    snapshots_served: usize,
    fail_snapshot_at: Option<usize>,
}

impl ScriptedSession {
    fn new(snapshots: Vec<String>) -> Self {
        Self {
            snapshots,
            cursor: 0,
            landmark_present: true,
            scrolls: 0,
            cookies_applied: 0,
            closed: false,
            snapshots_served: 0,
            fail_snapshot_at: None,
        }
    }

    fn without_landmark(mut self) -> Self {
        self.landmark_present = false;
        self
    }

    /// The n-th `page_source` call (1-based) fails with a transport error.
    fn failing_snapshot_at(mut self, n: usize) -> Self {
        self.fail_snapshot_at = Some(n);
        self
    }
}

#[async_trait::async_trait]
impl BrowserSession for ScriptedSession {
    async fn open(&mut self, _url: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn apply_cookies(&mut self, cookies: &[SessionCookie]) -> Result<(), SessionError> {
        self.cookies_applied += cookies.len();
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn wait_for_landmark(
        &mut self,
        _css: &str,
        _timeout: Duration,
    ) -> Result<bool, SessionError> {
        Ok(self.landmark_present)
    }

    async fn navigate(&mut self, _url: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, SessionError> {
        self.snapshots_served += 1;
        if self.fail_snapshot_at == Some(self.snapshots_served) {
            return Err(SessionError::Transport("connection reset".into()));
        }
        let idx = self.cursor.min(self.snapshots.len().saturating_sub(1));
        Ok(self.snapshots.get(idx).cloned().unwrap_or_default())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        self.scrolls += 1;
        self.cursor += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.closed = true;
        Ok(())
    }
}

fn fragment(id: &str) -> String {
    format!(r#"<div class="feed-shared-update-v2" data-urn="urn:li:activity:{id}"></div>"#)
}

fn snapshot(ids: &[&str]) -> String {
    let body: String = ids.iter().map(|id| fragment(id)).collect();
    format!("<html><body>{body}</body></html>")
}

fn fast_settings() -> HarvestSettings {
    HarvestSettings {
        settle_delay: Duration::ZERO,
        profile_load_delay: Duration::ZERO,
        scroll_pause: Duration::ZERO,
        landmark_timeout: Duration::from_millis(10),
    }
}

fn limits(target: usize, max_cycles: u32, max_stagnant: u32) -> HarvestLimits {
    HarvestLimits {
        target_posts: target,
        max_cycles,
        max_stagnant_cycles: max_stagnant,
    }
}

// Scenario A: a feed with 12 distinct fragments and a target of 5 returns
// exactly 5 posts without exhausting the feed.
#[tokio::test]
async fn target_count_stops_mid_snapshot() {
    harvest_logging::initialize_for_tests();
    let ids: Vec<String> = (0..12).map(|i| format!("73000000000{i:02}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut session = ScriptedSession::new(vec![snapshot(&refs)]);

    let posts = harvest_posts(
        &mut session,
        "https://www.linkedin.com/in/somebody/recent-activity/all/",
        &[],
        &limits(5, 40, 3),
        &fast_settings(),
    )
    .await
    .expect("harvest");

    assert_eq!(posts.len(), 5);
    let got: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(got, &refs[..5]);
    assert_eq!(session.scrolls, 0);
    assert!(session.closed);
}

// Scenario B: the feed re-renders the same three fragments every cycle;
// with a stagnation ceiling of 3 the loop issues exactly 3 scrolls and
// returns the 3 unique posts.
#[tokio::test]
async fn stagnant_feed_stops_after_exact_scroll_count() {
    let same = snapshot(&["1", "2", "3"]);
    let mut session = ScriptedSession::new(vec![same]);

    let posts = harvest_posts(
        &mut session,
        "https://www.linkedin.com/in/somebody/recent-activity/all/",
        &[],
        &limits(50, 40, 3),
        &fast_settings(),
    )
    .await
    .expect("harvest");

    assert_eq!(posts.len(), 3);
    assert_eq!(session.scrolls, 3);
}

#[tokio::test]
async fn growing_feed_deduplicates_across_cycles() {
    let mut session = ScriptedSession::new(vec![
        snapshot(&["a", "b"]),
        snapshot(&["a", "b", "c", "d"]),
    ]);

    let posts = harvest_posts(
        &mut session,
        "https://www.linkedin.com/in/somebody/recent-activity/all/",
        &[],
        &limits(4, 40, 3),
        &fast_settings(),
    )
    .await
    .expect("harvest");

    let got: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(got, ["a", "b", "c", "d"]);
    assert_eq!(session.scrolls, 1);
}

#[tokio::test]
async fn cycle_ceiling_caps_a_drip_feeding_source() {
    // Every scroll reveals exactly one new post; the ceiling fires first.
    let snapshots: Vec<String> = (0..10)
        .map(|n| {
            let ids: Vec<String> = (0..=n).map(|i| format!("id-{i}")).collect();
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            snapshot(&refs)
        })
        .collect();
    let mut session = ScriptedSession::new(snapshots);

    let posts = harvest_posts(
        &mut session,
        "https://www.linkedin.com/in/somebody/recent-activity/all/",
        &[],
        &limits(100, 4, 10),
        &fast_settings(),
    )
    .await
    .expect("harvest");

    assert_eq!(session.scrolls, 4);
    assert_eq!(posts.len(), 5);
}

#[tokio::test]
async fn missing_landmark_aborts_the_run() {
    let mut session = ScriptedSession::new(vec![snapshot(&["never-seen"])]).without_landmark();

    let err = harvest_posts(
        &mut session,
        "https://www.linkedin.com/in/somebody/recent-activity/all/",
        &[],
        &limits(5, 40, 3),
        &fast_settings(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HarvestError::NotReady(_)));
    assert!(session.closed, "session must be closed on abort");
}

#[tokio::test]
async fn mid_run_transport_failure_still_closes_session() {
    // A drip-feeding source that would keep the loop going, except the
    // second snapshot dies with a transport error.
    let mut session = ScriptedSession::new(vec![
        snapshot(&["a"]),
        snapshot(&["a", "b"]),
    ])
    .failing_snapshot_at(2);

    let err = harvest_posts(
        &mut session,
        "https://www.linkedin.com/in/somebody/recent-activity/all/",
        &[],
        &limits(10, 40, 3),
        &fast_settings(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HarvestError::Session(SessionError::Transport(_))));
    assert!(session.closed, "browser session left open after mid-loop error");
}

#[tokio::test]
async fn cookies_are_forwarded_to_the_session() {
    let mut session = ScriptedSession::new(vec![snapshot(&["x"])]);
    let cookies = vec![SessionCookie {
        name: "li_at".into(),
        value: "secret".into(),
        domain: ".linkedin.com".into(),
        path: "/".into(),
        secure: true,
        expiry: Some(1_900_000_000),
    }];

    let posts = harvest_posts(
        &mut session,
        "https://www.linkedin.com/in/somebody/recent-activity/all/",
        &cookies,
        &limits(1, 40, 3),
        &fast_settings(),
    )
    .await
    .expect("harvest");

    assert_eq!(posts.len(), 1);
    assert_eq!(session.cookies_applied, 1);
}
