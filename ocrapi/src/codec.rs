//! Image payload encoding for transport: base64 in, base64 PNG out.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};

use crate::error::{OcrApiError, Result};

/// Decode raw upload bytes, guessing the format from the content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OcrApiError::ImageDecode(format!("Failed to read image: {e}")))?;

    reader
        .decode()
        .map_err(|e| OcrApiError::ImageDecode(format!("Failed to decode image: {e}")))
}

/// Decode a base64 image string. A `data:<mime>;base64,` prefix and embedded
/// whitespace are tolerated.
pub fn decode_base64_image(data: &str) -> Result<DynamicImage> {
    let payload = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| OcrApiError::ImageDecode(format!("Invalid base64 image data: {e}")))?;

    decode_image(&bytes)
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| OcrApiError::Internal(format!("Failed to encode image: {e}")))?;
    Ok(output)
}

pub fn encode_png_base64(image: &RgbImage) -> Result<String> {
    Ok(STANDARD.encode(encode_png(image)?))
}
