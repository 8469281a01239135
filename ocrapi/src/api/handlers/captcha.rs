use axum::extract::State;
use axum::Json;

use crate::api::dto::{CaptchaResponse, ErrorResponse};
use crate::api::extractors::OcrForm;
use crate::api::AppState;
use crate::error::Result;

use super::decode_input;

fn alphanumeric_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// `POST /captcha`
///
/// Recognizes a CAPTCHA image and keeps only ASCII letters and digits.
#[utoipa::path(
    post,
    path = "/captcha",
    tag = "ocr",
    operation_id = "captcha.recognize",
    request_body(
        content_type = "multipart/form-data",
        content = String,
        description = "Fields: `image_file` (file), `image_data` or `base64_img` (base64), \
                       tried in that order. Optional booleans `use_det`, `use_cls`, `use_rec`, \
                       `word_box`."
    ),
    responses(
        (status = 200, description = "Recognized characters", body = CaptchaResponse),
        (status = 400, description = "Missing or undecodable image, or invalid toggle", body = ErrorResponse),
        (status = 500, description = "Engine failure", body = ErrorResponse),
        (status = 503, description = "Engine not available", body = ErrorResponse),
    )
)]
pub async fn captcha(
    State(state): State<AppState>,
    mut form: OcrForm,
) -> Result<Json<CaptchaResponse>> {
    let input = form.take_image(true)?;
    let image = decode_input(input).await?;
    let run = state.ocr.ocr(image, form.toggles).await?;

    Ok(Json(CaptchaResponse {
        result: alphanumeric_only(&run.text()),
    }))
}

/// `POST /captcha/base64`
///
/// Same as `POST /captcha`.
#[utoipa::path(
    post,
    path = "/captcha/base64",
    tag = "ocr",
    operation_id = "captcha.recognizeBase64",
    request_body(
        content_type = "application/x-www-form-urlencoded",
        content = String,
        description = "Same fields as `POST /captcha`."
    ),
    responses(
        (status = 200, description = "Recognized characters", body = CaptchaResponse),
        (status = 400, description = "Missing or undecodable image, or invalid toggle", body = ErrorResponse),
        (status = 503, description = "Engine not available", body = ErrorResponse),
    )
)]
pub async fn captcha_base64(
    state: State<AppState>,
    form: OcrForm,
) -> Result<Json<CaptchaResponse>> {
    captcha(state, form).await
}
