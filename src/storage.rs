use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::models::StoredImage;
use crate::naming::is_allowed_file;

/// File-system backed image store. The upload directory is the only state;
/// every listing is a fresh scan.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating the upload directory if needed. Failure here
    /// is a startup fatal for the caller.
    pub fn new(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Apply the collision policy to a generated filename.
    ///
    /// If the target already exists, a `_YYYYMMDD_HHMMSS` local timestamp is
    /// inserted before the extension and the result is used as-is: a second
    /// collision within the same second overwrites, which is accepted.
    pub fn resolve(&self, filename: &str) -> (String, PathBuf) {
        let path = self.dir.join(filename);
        if !path.exists() {
            return (filename.to_string(), path);
        }

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let renamed = match filename.rsplit_once('.') {
            Some((stem, ext)) => format!("{}_{}.{}", stem, stamp, ext),
            None => format!("{}_{}", filename, stamp),
        };
        let path = self.dir.join(&renamed);
        (renamed, path)
    }

    /// Write uploaded bytes under `filename`, resolving collisions first.
    /// Returns the final filename, the on-disk size, and the full path.
    pub fn save(&self, filename: &str, data: &[u8]) -> io::Result<(String, u64, PathBuf)> {
        let (final_name, path) = self.resolve(filename);
        fs::write(&path, data)?;
        let size = fs::metadata(&path)?.len();
        Ok((final_name, size, path))
    }

    /// Scan the upload directory and return every allow-listed regular file,
    /// newest first. Best-effort: enumeration failures degrade to an empty
    /// list with a logged warning.
    pub fn list(&self) -> Vec<StoredImage> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cannot scan upload dir {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut images = Vec::new();
        for entry in entries.flatten() {
            let filename = entry.file_name().to_string_lossy().to_string();
            if !is_allowed_file(&filename) {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let modified = meta
                .modified()
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();

            images.push(StoredImage {
                url: format!("/images/{}", filename),
                filename,
                size: meta.len(),
                modified,
            });
        }

        // Descending on the formatted timestamp, which matches chronological
        // order at second granularity.
        images.sort_by(|a, b| b.modified.cmp(&a.modified));
        images
    }
}

pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }
    format!("{:.2} {}", size, UNITS[unit_idx])
}
