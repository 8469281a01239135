use axum::Json;

use crate::api::dto::WelcomeResponse;

pub const WELCOME_MESSAGE: &str = "Welcome to RapidOCR API Server!";

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses(
        (status = 200, description = "Welcome message", body = WelcomeResponse),
    )
)]
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}
