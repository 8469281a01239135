//! HTTP adapter that exposes a local OCR engine over a small REST API.

pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod ocr;
