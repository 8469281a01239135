use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::openapi;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let recognition = Router::new()
        .route("/ocr", post(handlers::ocr))
        .route("/captcha", post(handlers::captcha))
        .route("/captcha/base64", post(handlers::captcha_base64))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.server.max_body_bytes));

    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router())
        .merge(recognition)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
