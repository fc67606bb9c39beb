use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 65360;
pub const DEFAULT_API_KEY: &str = "default_secret_key_change_me";
pub const DEFAULT_UPLOAD_DIR: &str = "images";
pub const DEFAULT_MAX_FILE_SIZE: usize = 50 * 1024 * 1024; // 50MB

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Resolved application configuration. Built once at startup and shared
/// read-only with every handler.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    /// Absolute path of the managed upload directory.
    pub upload_dir: PathBuf,
    pub max_file_size: usize, // in bytes
    pub enable_view: bool,
    /// Whether a config file was found and parsed.
    pub config_loaded: bool,
}

/// Optional overrides read from `config.json` next to the executable.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    api_key: Option<String>,
    upload_dir: Option<String>,
    max_file_size: Option<usize>,
    enable_view: Option<bool>,
}

impl Config {
    /// Defaults, overlaid with the optional config file, overlaid with CLI
    /// flags. Config-file absence or parse failure is non-fatal.
    pub fn load(cli: &Cli) -> Self {
        let root = install_root();
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));

        let (file, config_loaded) = match fs::read_to_string(&config_path) {
            Ok(raw) => match serde_json::from_str::<FileConfig>(&raw) {
                Ok(file) => {
                    tracing::info!("Loaded config file: {}", config_path.display());
                    (file, true)
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse {}, using defaults: {}",
                        config_path.display(),
                        e
                    );
                    (FileConfig::default(), false)
                }
            },
            Err(_) => {
                tracing::info!("No config file at {}, using defaults", config_path.display());
                (FileConfig::default(), false)
            }
        };

        let upload_dir = resolve_upload_dir(
            &root,
            file.upload_dir.as_deref().unwrap_or(DEFAULT_UPLOAD_DIR),
        );

        Self {
            host: cli.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            api_key: cli
                .api_key
                .clone()
                .or(file.api_key)
                .unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            upload_dir,
            max_file_size: file.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
            enable_view: file.enable_view.unwrap_or(false),
            config_loaded,
        }
    }

    /// Human-readable upload limit, e.g. "50MB".
    pub fn max_file_size_display(&self) -> String {
        format!("{:.0}MB", self.max_file_size as f64 / (1024.0 * 1024.0))
    }
}

/// Directory the service is installed in: the executable's parent, falling
/// back to the current directory.
fn install_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_upload_dir(root: &Path, dir: &str) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_upload_dir_is_kept() {
        let root = Path::new("/opt/comfy");
        assert_eq!(
            resolve_upload_dir(root, "/srv/images"),
            PathBuf::from("/srv/images")
        );
    }

    #[test]
    fn relative_upload_dir_resolves_under_root() {
        let root = Path::new("/opt/comfy");
        assert_eq!(
            resolve_upload_dir(root, "images"),
            PathBuf::from("/opt/comfy/images")
        );
    }

    #[test]
    fn max_size_display_rounds_to_whole_megabytes() {
        let config = Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: DEFAULT_API_KEY.to_string(),
            upload_dir: PathBuf::from("/tmp"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            enable_view: false,
            config_loaded: false,
        };
        assert_eq!(config.max_file_size_display(), "50MB");
    }
}
