use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "comfy-upload-server",
    about = "Remote image upload server for ComfyUI nodes",
    version
)]
pub struct Cli {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// API key (overrides the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Path to the config file (defaults to config.json next to the binary)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
