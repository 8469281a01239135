use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat};

use crate::config::GlobalConfig;
use crate::error::{OcrApiError, Result};

/// An image resized for the engine, plus the factor that maps engine
/// coordinates back onto the caller's image.
#[derive(Debug, Clone)]
pub struct ScaledImage {
    pub image: DynamicImage,
    pub to_source: f32,
}

/// Fit an image into `[min_side_len, max_side_len]` while keeping its aspect ratio.
///
/// Large images are shrunk so the longer side equals `max_side_len`; images whose
/// shorter side is below `min_side_len` are enlarged. Everything else passes
/// through untouched.
pub fn scale_for_engine(img: &DynamicImage, global: &GlobalConfig) -> ScaledImage {
    let (width, height) = img.dimensions();
    let long_side = width.max(height);
    let short_side = width.min(height);

    let ratio = if long_side > global.max_side_len {
        global.max_side_len as f32 / long_side as f32
    } else if short_side > 0 && short_side < global.min_side_len {
        global.min_side_len as f32 / short_side as f32
    } else {
        1.0
    };

    if ratio == 1.0 {
        return ScaledImage {
            image: img.clone(),
            to_source: 1.0,
        };
    }

    let new_width = ((width as f32 * ratio).round() as u32).max(1);
    let new_height = ((height as f32 * ratio).round() as u32).max(1);

    // Lanczos3 for downscaling quality, Triangle is enough when enlarging
    let filter = if ratio < 1.0 {
        image::imageops::FilterType::Lanczos3
    } else {
        image::imageops::FilterType::Triangle
    };

    ScaledImage {
        image: img.resize_exact(new_width, new_height, filter),
        to_source: 1.0 / ratio,
    }
}

/// Grayscale, contrast-stretched PNG bytes ready for Tesseract.
pub fn encode_for_tesseract(img: &DynamicImage) -> Result<Vec<u8>> {
    let gray = enhance_grayscale_contrast(img.to_luma8());

    let mut output = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| OcrApiError::Ocr(format!("Failed to encode image: {e}")))?;

    Ok(output)
}

/// Enhance contrast on a grayscale image using histogram stretching
///
/// Maps the darkest pixel to 0 and the lightest to 255,
/// scaling all intermediate values linearly
fn enhance_grayscale_contrast(gray: GrayImage) -> GrayImage {
    let (min_val, max_val) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    // Flat images carry nothing to stretch
    if max_val <= min_val {
        return gray;
    }

    let range = (max_val - min_val) as f32;
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y);
        let normalized = (pixel[0] - min_val) as f32 / range;
        image::Luma([(normalized * 255.0) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_side_len: u32, min_side_len: u32) -> GlobalConfig {
        GlobalConfig {
            max_side_len,
            min_side_len,
            ..GlobalConfig::default()
        }
    }

    #[test]
    fn test_scale_no_change_within_limits() {
        let img = DynamicImage::new_rgb8(500, 300);
        let scaled = scale_for_engine(&img, &config(2000, 30));

        assert_eq!(scaled.image.dimensions(), (500, 300));
        assert_eq!(scaled.to_source, 1.0);
    }

    #[test]
    fn test_scale_down_width_exceeded() {
        let img = DynamicImage::new_rgb8(2000, 500);
        let scaled = scale_for_engine(&img, &config(1000, 30));

        assert_eq!(scaled.image.dimensions(), (1000, 250));
        assert_eq!(scaled.to_source, 2.0);
    }

    #[test]
    fn test_scale_down_height_exceeded() {
        let img = DynamicImage::new_rgb8(500, 2000);
        let scaled = scale_for_engine(&img, &config(1000, 30));

        assert_eq!(scaled.image.dimensions(), (250, 1000));
    }

    #[test]
    fn test_scale_up_small_image() {
        let img = DynamicImage::new_rgb8(100, 15);
        let scaled = scale_for_engine(&img, &config(2000, 30));

        assert_eq!(scaled.image.dimensions(), (200, 30));
        assert_eq!(scaled.to_source, 0.5);
    }

    #[test]
    fn test_encode_for_tesseract_outputs_grayscale_png() {
        let img = DynamicImage::new_rgba8(64, 32);
        let bytes = encode_for_tesseract(&img).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_enhance_grayscale_contrast_stretches_range() {
        let mut gray = GrayImage::new(10, 10);
        for (i, pixel) in gray.pixels_mut().enumerate() {
            pixel[0] = (50 + i % 90) as u8;
        }

        let enhanced = enhance_grayscale_contrast(gray);
        let min_val = enhanced.pixels().map(|p| p[0]).min().unwrap();
        let max_val = enhanced.pixels().map(|p| p[0]).max().unwrap();
        assert_eq!(min_val, 0);
        assert_eq!(max_val, 255);
    }

    #[test]
    fn test_enhance_grayscale_contrast_flat() {
        let gray = GrayImage::from_pixel(10, 10, image::Luma([100]));
        let enhanced = enhance_grayscale_contrast(gray);

        for pixel in enhanced.pixels() {
            assert_eq!(pixel[0], 100, "Flat image pixels should remain unchanged");
        }
    }
}
