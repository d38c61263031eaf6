use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::Instant;

use harvest_logging::harvest_warn;

use crate::session::{BrowserSession, SessionCookie, SessionError};

/// Connection settings for a WebDriver endpoint (chromedriver or a
/// Selenium-compatible remote).
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub endpoint: String,
    pub headless: bool,
    pub window_size: (u32, u32),
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Poll interval for the landmark readiness probe.
    pub poll_interval: Duration,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_string(),
            headless: true,
            window_size: (1920, 1080),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Browser session driven over the W3C WebDriver JSON wire protocol.
pub struct WebDriverSession {
    http: reqwest::Client,
    base: String,
    session_id: String,
    poll_interval: Duration,
}

impl WebDriverSession {
    /// Create a browser session against the configured endpoint.
    pub async fn start(config: &WebDriverConfig) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| SessionError::Transport(err.to_string()))?;
        let base = config.endpoint.trim_end_matches('/').to_string();

        let (width, height) = config.window_size;
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--window-size={width},{height}"),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let value = request(http.post(format!("{base}/session")).json(&capabilities)).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| SessionError::Unexpected("handshake reply lacks sessionId".into()))?
            .to_string();

        Ok(Self {
            http,
            base,
            session_id,
            poll_interval: config.poll_interval,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base, self.session_id, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, SessionError> {
        request(self.http.post(self.url(path)).json(&body)).await
    }

    async fn get(&self, path: &str) -> Result<Value, SessionError> {
        request(self.http.get(self.url(path))).await
    }

    /// Single probe for an element matching `css`. `Ok(false)` means the
    /// driver answered "no such element"; other protocol errors surface.
    async fn element_present(&self, css: &str) -> Result<bool, SessionError> {
        let probe = json!({ "using": "css selector", "value": css });
        match self.post("/element", probe).await {
            Ok(_) => Ok(true),
            Err(SessionError::Protocol { message, .. })
                if message.contains("no such element") =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait::async_trait]
impl BrowserSession for WebDriverSession {
    async fn open(&mut self, url: &str) -> Result<(), SessionError> {
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn apply_cookies(&mut self, cookies: &[SessionCookie]) -> Result<(), SessionError> {
        for cookie in cookies {
            let mut payload = json!({
                "name": cookie.name,
                "value": cookie.value,
                "domain": cookie.domain,
                "path": cookie.path,
                "secure": cookie.secure,
            });
            if let Some(expiry) = cookie.expiry {
                payload["expiry"] = json!(expiry);
            }
            if let Err(err) = self.post("/cookie", json!({ "cookie": payload })).await {
                harvest_warn!("failed to apply cookie {}: {err}", cookie.name);
            }
        }
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        self.post("/refresh", json!({})).await?;
        Ok(())
    }

    async fn wait_for_landmark(
        &mut self,
        css: &str,
        timeout: Duration,
    ) -> Result<bool, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.element_present(css).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, SessionError> {
        let value = self.get("/source").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SessionError::Unexpected("page source is not a string".into()))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        let script = json!({
            "script": "window.scrollTo(0, document.body.scrollHeight);",
            "args": []
        });
        self.post("/execute/sync", script).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        request(self.http.delete(self.url(""))).await?;
        Ok(())
    }
}

/// Issue one wire request and unwrap the W3C `{"value": ...}` envelope.
/// Error replies carry `{"value": {"error", "message"}}`.
async fn request(builder: reqwest::RequestBuilder) -> Result<Value, SessionError> {
    let response = builder
        .send()
        .await
        .map_err(|err| SessionError::Transport(err.to_string()))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if !status.is_success() {
        let code = value.get("error").and_then(Value::as_str);
        let detail = value.get("message").and_then(Value::as_str);
        let message = match (code, detail) {
            (Some(code), Some(detail)) if !detail.is_empty() => format!("{code}: {detail}"),
            (Some(code), _) => code.to_string(),
            (None, Some(detail)) => detail.to_string(),
            (None, None) => "unknown webdriver error".to_string(),
        };
        return Err(SessionError::Protocol {
            status: status.as_u16(),
            message,
        });
    }

    Ok(value)
}
