use axum::extract::State;
use axum::Json;

use crate::api::dto::{EngineStatus, HealthData};
use crate::api::state::AppState;

/// `GET /health`
#[utoipa::path(
    get,
    path = "/health",
    tag = "meta",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    let engine = if state.ocr.is_available() {
        EngineStatus {
            status: "available".to_string(),
            name: state.ocr.engine_name().map(str::to_string),
            reason: None,
        }
    } else {
        EngineStatus {
            status: "unavailable".to_string(),
            name: None,
            reason: state.ocr.unavailable_reason().map(str::to_string),
        }
    };

    Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine,
    })
}
