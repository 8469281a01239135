//! OCR (Optical Character Recognition) Module
//!
//! Runs an OCR engine on decoded images and describes what it found.
//!
//! # Architecture
//!
//! - `OcrEngine` trait is the seam to the engine; it takes an image plus stage
//!   toggles and returns an `OcrOutput`, whose case depends on which stages ran
//! - `TesseractEngine` implements local OCR via leptess
//! - `OcrProvider` is the shared, once-initialized handle used by request
//!   handlers; it moves engine calls onto the blocking pool
//!
//! # Configuration
//!
//! Engine behavior is controlled via `EngineConfig` (see `config.rs`), loaded from
//! the file named by `CONFIG_PATH`:
//! - `global.use_det/use_cls/use_rec/return_word_box`: stage defaults
//! - `global.text_score`: minimum line score
//! - `global.max_side_len/min_side_len`: engine-side resize limits
//! - `tesseract.languages/data_path`: Tesseract model selection
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = OcrProvider::new(&config.engine);
//! let run = ocr.ocr(image, OcrToggles::default()).await?;
//! println!("{}", run.text());
//! ```

mod engine;
mod preprocessing;
mod provider;
mod tesseract;
mod tsv;
mod types;
mod vis;

pub use engine::{EngineMode, OcrEngine};
pub use provider::{OcrProvider, OcrRun};
pub use tesseract::TesseractEngine;
pub use types::{
    ClassificationOutput, ClsLabel, DetectionOutput, OcrOutput, OcrToggles, PipelineOutput, Quad,
    RecognitionOutput, Stages, WordResult,
};
pub use vis::draw_boxes;
