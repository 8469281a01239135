use axum::extract::State;
use axum::Json;
use tracing::debug;

use crate::api::dto::{ErrorResponse, OcrResponse};
use crate::api::extractors::OcrForm;
use crate::api::AppState;
use crate::error::{OcrApiError, Result};

use super::decode_input;

/// `POST /ocr`
///
/// Runs the engine once on `image_file` (or, failing that, `image_data`) and
/// returns the recognized text, the variant-specific result fields and a PNG
/// visualization.
#[utoipa::path(
    post,
    path = "/ocr",
    tag = "ocr",
    operation_id = "ocr.recognize",
    request_body(
        content_type = "multipart/form-data",
        content = String,
        description = "Fields: `image_file` (file) or `image_data` (base64). Optional booleans \
                       `use_det`, `use_cls`, `use_rec`, `word_box`. The same fields are accepted \
                       as url-encoded or JSON bodies."
    ),
    responses(
        (status = 200, description = "Recognition result", body = OcrResponse),
        (status = 400, description = "Missing or undecodable image, or invalid toggle", body = ErrorResponse),
        (status = 500, description = "Engine failure", body = ErrorResponse),
        (status = 503, description = "Engine not available", body = ErrorResponse),
    )
)]
pub async fn ocr(State(state): State<AppState>, mut form: OcrForm) -> Result<Json<OcrResponse>> {
    let input = form.take_image(false)?;
    let image = decode_input(input).await?;
    debug!(
        width = image.width(),
        height = image.height(),
        "received OCR request"
    );

    let run = state.ocr.ocr(image, form.toggles).await?;

    let response = tokio::task::spawn_blocking(move || OcrResponse::from_run(&run))
        .await
        .map_err(|e| OcrApiError::Internal(format!("Response rendering task failed: {e}")))??;

    Ok(Json(response))
}
