use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, ConnectInfo, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{HealthResponse, UploadResponse};
use crate::naming::{generate_filename, is_allowed_file, sanitize_filename};

use crate::AppState;

type AppResult<T> = Result<T, AppError>;

pub const API_KEY_HEADER: &str = "X-API-KEY";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/images/:filename", get(serve_image))
}

/// API key from the `X-API-KEY` header, empty values treated as absent.
pub fn api_key_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

// ─── Status ──────────────────────────────────────────────────────

async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut endpoints = serde_json::Map::new();
    endpoints.insert("upload".into(), json!("/upload (POST)"));
    endpoints.insert("images".into(), json!("/images/{filename} (GET)"));
    endpoints.insert("health".into(), json!("/health (GET)"));
    if state.config.enable_view {
        endpoints.insert("view".into(), json!("/view (GET)"));
    }

    Json(json!({
        "service": "ComfyUI Remote Image Upload Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        upload_dir: state.config.upload_dir.display().to_string(),
        config_loaded: state.config.config_loaded,
    })
}

// ─── Upload ──────────────────────────────────────────────────────

/// Body-limit overruns surface as multipart read errors; everything else is
/// a malformed request.
fn multipart_error(config: &Config, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            max_size: config.max_file_size_display(),
        }
    } else {
        AppError::Multipart(e.body_text())
    }
}

async fn upload(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let config = &state.config;
    tracing::info!("Upload request from {}", addr);

    match api_key_from(&headers) {
        None => {
            tracing::warn!("Missing API key from {}", addr);
            return Err(AppError::MissingApiKey);
        }
        Some(key) if key != config.api_key => {
            tracing::warn!("Invalid API key from {}", addr);
            return Err(AppError::InvalidApiKey);
        }
        Some(_) => {}
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(config, e))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                tracing::warn!("Empty filename from {}", addr);
                return Err(AppError::EmptyFilename);
            }
        };

        if !is_allowed_file(&original) {
            tracing::warn!("Rejected file type {:?} from {}", original, addr);
            return Err(AppError::DisallowedType(original));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(config, e))?;

        let safe_original = sanitize_filename(&original);
        let new_name = generate_filename(&safe_original);
        let (filename, size, path) = state.store.save(&new_name, &data).map_err(|e| {
            tracing::error!("Failed to save {}: {} (from {})", new_name, e, addr);
            AppError::SaveFailed(e)
        })?;

        tracing::info!("Stored {} ({} bytes) from {}", filename, size, addr);
        return Ok(Json(UploadResponse {
            message: "file uploaded successfully".to_string(),
            filename,
            size,
            path: path.display().to_string(),
        }));
    }

    tracing::warn!("No file field in upload from {}", addr);
    Err(AppError::MissingFile)
}

// ─── Image access ────────────────────────────────────────────────

async fn serve_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let safe = sanitize_filename(&filename);
    if safe.is_empty() || safe != filename {
        return Err(AppError::UnsafeFilename(filename));
    }
    if !is_allowed_file(&safe) {
        return Err(AppError::DisallowedType(safe));
    }

    let path = state.store.dir().join(&safe);
    if !path.is_file() {
        return Err(AppError::NotFound(safe));
    }

    // Read may still lose the race with an external delete.
    let data = fs::read(&path).map_err(|_| AppError::NotFound(safe.clone()))?;
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    Ok((
        [(header::CONTENT_TYPE, content_type.to_string())],
        data,
    )
        .into_response())
}
