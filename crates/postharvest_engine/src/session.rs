use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One authentication cookie to inject into the browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    /// Unix expiry timestamp; session cookies carry none.
    pub expiry: Option<i64>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session transport error: {0}")]
    Transport(String),
    #[error("session protocol error (status {status}): {message}")]
    Protocol { status: u16, message: String },
    #[error("unexpected session response: {0}")]
    Unexpected(String),
}

/// An authenticated browsing session over one document feed.
///
/// Exclusively owned and mutated by a single harvest run; sessions are
/// never shared across runs.
#[async_trait::async_trait]
pub trait BrowserSession: Send {
    /// Point the session at a URL (initial origin load).
    async fn open(&mut self, url: &str) -> Result<(), SessionError>;

    /// Inject authentication cookies. Implementations log and skip
    /// individual cookies that fail to apply rather than failing the run.
    async fn apply_cookies(&mut self, cookies: &[SessionCookie]) -> Result<(), SessionError>;

    /// Reload the current document so injected cookies take effect.
    async fn refresh(&mut self) -> Result<(), SessionError>;

    /// Readiness probe: true once an element matching `css` is present,
    /// false if it never appears within `timeout`.
    async fn wait_for_landmark(&mut self, css: &str, timeout: Duration)
        -> Result<bool, SessionError>;

    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Markup of the document as currently rendered.
    async fn page_source(&mut self) -> Result<String, SessionError>;

    /// Load-more trigger: scroll to the end of the document.
    async fn scroll_to_bottom(&mut self) -> Result<(), SessionError>;

    async fn close(&mut self) -> Result<(), SessionError>;
}
