pub mod captcha;
pub(crate) mod health;
pub mod ocr;
pub mod root;

pub use captcha::{captcha, captcha_base64};
pub use health::health_check;
pub use ocr::ocr;
pub use root::welcome;

use image::DynamicImage;

use crate::api::extractors::ImageInput;
use crate::error::{OcrApiError, Result};

/// Decode the request image off the async runtime.
pub(crate) async fn decode_input(input: ImageInput) -> Result<DynamicImage> {
    tokio::task::spawn_blocking(move || input.decode())
        .await
        .map_err(|e| OcrApiError::Internal(format!("Image decode task failed: {e}")))?
}
