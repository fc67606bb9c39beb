use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use crate::naming::ALLOWED_EXTENSIONS;

#[derive(Debug)]
pub enum AppError {
    MissingApiKey,
    InvalidApiKey,
    MissingFile,
    EmptyFilename,
    DisallowedType(String),
    UnsafeFilename(String),
    PayloadTooLarge { max_size: String },
    NotFound(String),
    Multipart(String),
    SaveFailed(std::io::Error),
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, Value) {
        match self {
            AppError::MissingApiKey => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "missing API key" }),
            ),
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "invalid API key" }),
            ),
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "no file in request" }),
            ),
            AppError::EmptyFilename => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "empty filename" }),
            ),
            AppError::DisallowedType(name) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": format!("file type not allowed: {}", name),
                    "allowed_types": ALLOWED_EXTENSIONS,
                }),
            ),
            AppError::UnsafeFilename(name) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("unsafe filename: {}", name) }),
            ),
            AppError::PayloadTooLarge { max_size } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({
                    "error": "file size exceeds limit",
                    "max_size": max_size,
                }),
            ),
            AppError::NotFound(name) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("not found: {}", name) }),
            ),
            AppError::Multipart(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("malformed upload: {}", msg) }),
            ),
            AppError::SaveFailed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "failed to save file",
                    "details": e.to_string(),
                }),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, [("content-type", "application/json")], body.to_string()).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::SaveFailed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disallowed_type_lists_the_allow_list() {
        let (status, body) = AppError::DisallowedType("doc.pdf".into()).status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let types = body["allowed_types"].as_array().unwrap();
        assert_eq!(types.len(), 6);
        assert!(types.iter().any(|t| t == "png"));
    }

    #[test]
    fn payload_too_large_reports_the_limit() {
        let (status, body) = AppError::PayloadTooLarge {
            max_size: "50MB".into(),
        }
        .status_and_body();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["max_size"], "50MB");
    }
}
