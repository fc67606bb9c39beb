use serde::Serialize;

/// An image present in the upload directory, derived from a directory scan.
/// No sidecar index exists; the filesystem is the authoritative record.
#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub filename: String,
    pub size: u64,
    /// Local modification time formatted as "YYYY-MM-DD HH:MM:SS".
    pub modified: String,
    /// Serving path, `/images/<filename>`.
    pub url: String,
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub size: u64,
    pub path: String,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub upload_dir: String,
    pub config_loaded: bool,
}
