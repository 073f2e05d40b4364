//! REST API routes for the web server
//!
//! `POST /videos` runs the whole pipeline for one request: save the
//! uploaded video to a scratch file, invoke the external converter, and
//! stream the GIF back. `GET /health` reports version and tool status.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::convert::{ConvertError, GifConverter};
use crate::scratch::Scratch;

use super::server::ServerConfig;

/// Multipart form field carrying the video file.
pub const VIDEO_FIELD: &str = "video";

/// Application state shared across handlers
pub struct AppState {
    pub converter: GifConverter,
    pub scratch: Scratch,
    pub version: String,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let scratch = match &config.scratch_dir {
            Some(dir) => Scratch::at(dir)?,
            None => Scratch::new()?,
        };

        Ok(Self {
            converter: GifConverter::new(&config.tool, config.convert_timeout),
            scratch,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

/// Build the API router
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", post(upload_and_convert))
        .route("/health", get(health_check))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tools: ToolStatus,
}

#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub ffmpeg: bool,
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        tools: ToolStatus {
            ffmpeg: state.converter.tool_available(),
        },
    })
}

/// Upload a video and return its GIF rendition.
///
/// The scratch pair is removed on every exit path once the response
/// bytes are owned, success and failure alike.
async fn upload_and_convert(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<GifDownload, AppError> {
    tracing::info!("upload received");

    let video = read_video_field(multipart).await?;

    let pair = state.scratch.allocate();
    tokio::fs::write(pair.input(), &video)
        .await
        .map_err(|e| AppError::Internal(format!("failed to save upload: {e}")))?;

    state.converter.convert(pair.input(), pair.output()).await?;

    let gif = tokio::fs::read(pair.output())
        .await
        .map_err(|e| AppError::Internal(format!("failed to read conversion output: {e}")))?;

    tracing::info!(input_bytes = video.len(), gif_bytes = gif.len(), "converted successfully");

    Ok(GifDownload { data: gif })
}

/// Extract the bytes of the `video` form field.
async fn read_video_field(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some(VIDEO_FIELD) {
            let data = field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("failed to read field {VIDEO_FIELD:?}: {e}"))
            })?;
            return Ok(data.to_vec());
        }
    }

    Err(AppError::BadRequest(format!(
        "missing file field {VIDEO_FIELD:?}"
    )))
}

/// Successful conversion response
#[derive(Debug)]
pub struct GifDownload {
    data: Vec<u8>,
}

impl IntoResponse for GifDownload {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, [("Content-Type", "image/gif")], self.data).into_response()
    }
}

/// API error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Timeout(String),
    Internal(String),
}

impl From<ConvertError> for AppError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Timeout(_) => AppError::Timeout(err.to_string()),
            other => AppError::Internal(format!("conversion failed: {other}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(%status, "{message}");
        } else {
            tracing::warn!(%status, "{message}");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
