use std::sync::Arc;

use image::DynamicImage;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{OcrApiError, Result};

use super::engine::OcrEngine;
use super::tesseract::TesseractEngine;
use super::types::{OcrOutput, OcrToggles};

#[derive(Clone)]
enum OcrBackend {
    Engine { engine: Arc<dyn OcrEngine> },
    Unavailable { reason: String },
}

/// Shared handle to the process-wide OCR engine.
#[derive(Clone)]
pub struct OcrProvider {
    backend: OcrBackend,
}

/// An engine call together with the image it ran on.
#[derive(Debug)]
pub struct OcrRun {
    pub image: DynamicImage,
    pub output: Option<OcrOutput>,
}

impl OcrRun {
    /// Recognized text, empty when the engine found nothing.
    pub fn text(&self) -> String {
        self.output.as_ref().map(OcrOutput::text).unwrap_or_default()
    }
}

impl OcrProvider {
    /// Start the configured engine, degrading to "unavailable" if it cannot load.
    pub fn new(config: &EngineConfig) -> Self {
        match TesseractEngine::new(config) {
            Ok(engine) => Self::from_engine(Arc::new(engine)),
            Err(e) => {
                let reason = e.to_string();
                warn!("{}", reason);
                Self::unavailable(reason)
            }
        }
    }

    pub fn from_engine(engine: Arc<dyn OcrEngine>) -> Self {
        info!(engine = engine.name(), "OCR engine ready");
        Self {
            backend: OcrBackend::Engine { engine },
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: OcrBackend::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }

    pub fn engine_name(&self) -> Option<&str> {
        match &self.backend {
            OcrBackend::Engine { engine } => Some(engine.name()),
            OcrBackend::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.backend {
            OcrBackend::Engine { .. } => None,
            OcrBackend::Unavailable { reason } => Some(reason.as_str()),
        }
    }

    /// Run the engine on the blocking pool.
    pub async fn ocr(&self, image: DynamicImage, toggles: OcrToggles) -> Result<OcrRun> {
        let engine = match &self.backend {
            OcrBackend::Engine { engine } => Arc::clone(engine),
            OcrBackend::Unavailable { reason } => {
                return Err(OcrApiError::OcrUnavailable(reason.clone()))
            }
        };

        tokio::task::spawn_blocking(move || -> Result<OcrRun> {
            let output = engine.run(&image, &toggles)?;
            Ok(OcrRun { image, output })
        })
        .await
        .map_err(|e| OcrApiError::Ocr(format!("OCR task panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::types::{DetectionOutput, Quad};

    struct FixedEngine;

    impl OcrEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn run(&self, _image: &DynamicImage, toggles: &OcrToggles) -> Result<Option<OcrOutput>> {
            if toggles.use_det == Some(false) {
                return Ok(None);
            }
            Ok(Some(OcrOutput::Detection(DetectionOutput {
                boxes: vec![Quad::from_rect(0.0, 0.0, 4.0, 4.0)],
                scores: vec![0.9],
                elapse: 0.0,
            })))
        }
    }

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        fn run(&self, _image: &DynamicImage, _toggles: &OcrToggles) -> Result<Option<OcrOutput>> {
            Err(OcrApiError::Ocr("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn test_ocr_unavailable_returns_error() {
        let provider = OcrProvider::unavailable("Test unavailable");
        assert!(!provider.is_available());
        assert_eq!(provider.unavailable_reason(), Some("Test unavailable"));

        let result = provider
            .ocr(DynamicImage::new_rgb8(8, 8), OcrToggles::default())
            .await;
        assert!(matches!(result, Err(OcrApiError::OcrUnavailable(_))));
    }

    #[tokio::test]
    async fn test_ocr_returns_image_and_output() {
        let provider = OcrProvider::from_engine(Arc::new(FixedEngine));
        assert!(provider.is_available());
        assert_eq!(provider.engine_name(), Some("fixed"));

        let run = provider
            .ocr(DynamicImage::new_rgb8(8, 6), OcrToggles::default())
            .await
            .unwrap();
        assert_eq!(run.image.width(), 8);
        assert_eq!(run.output.unwrap().kind(), "detection");
    }

    #[tokio::test]
    async fn test_toggles_reach_engine() {
        let provider = OcrProvider::from_engine(Arc::new(FixedEngine));
        let toggles = OcrToggles {
            use_det: Some(false),
            ..Default::default()
        };

        let run = provider
            .ocr(DynamicImage::new_rgb8(8, 8), toggles)
            .await
            .unwrap();
        assert!(run.output.is_none());
        assert_eq!(run.text(), "");
    }

    #[tokio::test]
    async fn test_engine_error_propagates_and_provider_stays_usable() {
        let provider = OcrProvider::from_engine(Arc::new(FailingEngine));

        for _ in 0..2 {
            let result = provider
                .ocr(DynamicImage::new_rgb8(8, 8), OcrToggles::default())
                .await;
            assert!(matches!(result, Err(OcrApiError::Ocr(_))));
        }
    }

    /// Panics on its first call and answers normally afterwards.
    struct PanicOnceEngine {
        panicked: std::sync::atomic::AtomicBool,
    }

    impl OcrEngine for PanicOnceEngine {
        fn name(&self) -> &str {
            "panic-once"
        }

        fn run(&self, _image: &DynamicImage, _toggles: &OcrToggles) -> Result<Option<OcrOutput>> {
            if !self.panicked.swap(true, std::sync::atomic::Ordering::SeqCst) {
                panic!("engine blew up");
            }
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_engine_panic_fails_one_request_only() {
        let provider = OcrProvider::from_engine(Arc::new(PanicOnceEngine {
            panicked: std::sync::atomic::AtomicBool::new(false),
        }));

        let first = provider
            .ocr(DynamicImage::new_rgb8(8, 8), OcrToggles::default())
            .await;
        assert!(matches!(first, Err(OcrApiError::Ocr(_))));

        let second = provider
            .ocr(DynamicImage::new_rgb8(8, 8), OcrToggles::default())
            .await
            .unwrap();
        assert!(second.output.is_none());
    }

    #[test]
    fn test_provider_clone_shares_backend() {
        let provider = OcrProvider::unavailable("offline");
        let cloned = provider.clone();
        assert_eq!(provider.is_available(), cloned.is_available());
    }
}
