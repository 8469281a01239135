use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RapidOCR API",
        description = "HTTP adapter around a local OCR engine: text recognition and CAPTCHA reading.",
    ),
    paths(
        handlers::root::welcome,
        handlers::health::health_check,
        handlers::ocr::ocr,
        handlers::captcha::captcha,
        handlers::captcha::captcha_base64,
    ),
    components(schemas(
        dto::WelcomeResponse,
        dto::OcrResponse,
        dto::OcrResultFields,
        dto::CaptchaResponse,
        dto::ErrorResponse,
        dto::HealthData,
        dto::EngineStatus,
    )),
    tags(
        (name = "meta", description = "Welcome message and health check"),
        (name = "ocr", description = "Text recognition"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
