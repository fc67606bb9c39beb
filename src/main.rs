use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comfy_upload_server::cli::Cli;
use comfy_upload_server::config::Config;
use comfy_upload_server::storage::ImageStore;
use comfy_upload_server::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "comfy_upload_server=debug,tower_http=debug"
    } else {
        "comfy_upload_server=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load(&cli);
    let store =
        ImageStore::new(&config.upload_dir).expect("Failed to create upload directory");

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("ComfyUI Remote Image Upload Server starting");
    tracing::info!("Listening on: {}", addr);
    tracing::info!("Upload directory: {}", config.upload_dir.display());
    tracing::info!("API key: {} (hidden)", "*".repeat(config.api_key.len()));
    tracing::info!("Max upload size: {}", config.max_file_size_display());
    tracing::info!(
        "Image view: {}",
        if config.enable_view { "enabled" } else { "disabled" }
    );

    let state = Arc::new(AppState {
        store,
        config: config.clone(),
    });
    let app = comfy_upload_server::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
