pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod naming;
pub mod storage;
pub mod view;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::storage::ImageStore;

pub struct AppState {
    pub store: ImageStore,
    pub config: Config,
}

/// Build the full application router. The body limit enforces the configured
/// maximum upload size below the handlers, so oversized requests 413 before
/// any other validation.
pub fn app(state: Arc<AppState>) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .merge(handlers::routes())
        .merge(view::routes())
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
