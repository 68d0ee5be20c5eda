//! HTTP front end for the fallback chain.
//!
//! Routes:
//!
//! - `GET /` — liveness text
//! - `GET /api/v1/dalle` — route probe text
//! - `POST /api/v1/dalle` — `{ "prompt": "..." }` → `200 { "photo" }`,
//!   `400 { "error" }` when the prompt is missing or empty,
//!   `500 { "error": "Failed to generate image" }` when every provider fails

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::chain::FallbackChain;
use crate::config::Config;
use crate::pipeline::{self, ErrorResponse};

/// Path of the image generation route.
pub const GENERATE_ROUTE: &str = "/api/v1/dalle";

/// Largest accepted request body.
const BODY_LIMIT: usize = 50 * 1024 * 1024;

const PROMPT_REQUIRED: &str = "Prompt is required";

#[derive(Clone)]
pub struct AppState {
    chain: Arc<FallbackChain>,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    prompt: Option<String>,
}

/// Build the router around an already configured chain.
pub fn router(chain: Arc<FallbackChain>) -> Router {
    Router::new()
        .route("/", get(root))
        .route(GENERATE_ROUTE, get(route_probe).post(generate_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(AppState { chain })
}

/// Bind to `config.server` and serve until the process is stopped.
pub async fn serve(config: &Config, chain: FallbackChain) -> Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    log::info!("Server has started on http://{addr}");
    axum::serve(listener, router(Arc::new(chain)))
        .await
        .context("HTTP server error")
}

async fn root() -> &'static str {
    "Hello from photo-chain"
}

async fn route_probe() -> &'static str {
    "Image generation route is working"
}

/// POST /api/v1/dalle
async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let prompt = match payload {
        Ok(Json(GenerateRequest { prompt: Some(p) })) if !p.is_empty() => p,
        Ok(_) => return bad_request(),
        Err(rejection) => {
            log::debug!("Rejected request body: {rejection}");
            return bad_request();
        }
    };

    match pipeline::generate_photo(&state.chain, &prompt).await {
        Ok(photo) => (StatusCode::OK, Json(photo)).into_response(),
        Err(error) => (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response(),
    }
}

fn bad_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(PROMPT_REQUIRED)),
    )
        .into_response()
}
