//! HTTP surface: one request/response endpoint wrapping the harvest loop.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use harvest_logging::{harvest_error, harvest_info};
use postharvest_core::{HarvestLimits, Post};
use postharvest_engine::{
    harvest_posts, load_cookie_file, HarvestSettings, WebDriverConfig, WebDriverSession,
};

pub struct AppState {
    pub cookies_file: PathBuf,
    pub webdriver: WebDriverConfig,
    pub settings: HarvestSettings,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub profile_url: String,
    pub num_posts: usize,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/scrape", post(scrape))
        .with_state(state)
}

async fn scrape(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, (StatusCode, Json<ErrorBody>)> {
    harvest_info!(
        "scrape request: {} ({} posts)",
        request.profile_url,
        request.num_posts
    );
    match run_harvest(&state, &request).await {
        Ok(posts) => Ok(Json(ScrapeResponse { posts })),
        Err(err) => {
            harvest_error!("scrape failed: {err}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    detail: err.to_string(),
                }),
            ))
        }
    }
}

async fn run_harvest(
    state: &AppState,
    request: &ScrapeRequest,
) -> Result<Vec<Post>, Box<dyn std::error::Error + Send + Sync>> {
    let cookies = load_cookie_file(&state.cookies_file)?;
    // Each request drives its own browser session; sessions are never
    // shared between concurrent scrapes.
    let mut session = WebDriverSession::start(&state.webdriver).await?;
    let limits = HarvestLimits::for_target(request.num_posts);
    let posts = harvest_posts(
        &mut session,
        &request.profile_url,
        &cookies,
        &limits,
        &state.settings,
    )
    .await?;
    Ok(posts)
}
