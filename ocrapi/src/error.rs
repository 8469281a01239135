use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),
}

impl IntoResponse for OcrApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            OcrApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            OcrApiError::ImageDecode(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            OcrApiError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            OcrApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            OcrApiError::Ocr(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            OcrApiError::OcrUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, OcrApiError>;
