#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex, Once};

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use ocrapi::api::{create_router, AppState};
use ocrapi::config::{Config, EngineConfig, ServerConfig};
use ocrapi::error::{OcrApiError, Result};
use ocrapi::ocr::{
    ClassificationOutput, ClsLabel, DetectionOutput, OcrEngine, OcrOutput, OcrProvider,
    OcrToggles, PipelineOutput, Quad, RecognitionOutput,
};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

// ── Scripted engine ───────────────────────────────────────────────────────

/// Engine that returns a fixed answer and records the toggles it was called with.
pub struct ScriptedEngine {
    output: std::result::Result<Option<OcrOutput>, String>,
    calls: Mutex<Vec<(u32, u32, OcrToggles)>>,
}

impl ScriptedEngine {
    pub fn returning(output: Option<OcrOutput>) -> Arc<Self> {
        Arc::new(Self {
            output: Ok(output),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            output: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// `(width, height, toggles)` of every call so far.
    pub fn calls(&self) -> Vec<(u32, u32, OcrToggles)> {
        self.calls.lock().unwrap().clone()
    }
}

impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn run(&self, image: &DynamicImage, toggles: &OcrToggles) -> Result<Option<OcrOutput>> {
        self.calls
            .lock()
            .unwrap()
            .push((image.width(), image.height(), *toggles));
        self.output.clone().map_err(OcrApiError::Ocr)
    }
}

// ── Canned results ────────────────────────────────────────────────────────

pub fn pipeline(txts: &[&str]) -> OcrOutput {
    OcrOutput::Pipeline(PipelineOutput {
        txts: txts.iter().map(|t| t.to_string()).collect(),
        boxes: txts
            .iter()
            .enumerate()
            .map(|(i, _)| Quad::from_rect(4.0, 4.0 + 12.0 * i as f32, 40.0, 10.0))
            .collect(),
        scores: vec![0.75; txts.len()],
        word_results: Vec::new(),
        elapse: 0.125,
    })
}

pub fn recognition(text: &str) -> OcrOutput {
    OcrOutput::Recognition(RecognitionOutput {
        txts: vec![text.to_string()],
        scores: vec![0.5],
        word_results: Vec::new(),
        elapse: 0.125,
    })
}

pub fn detection() -> OcrOutput {
    OcrOutput::Detection(DetectionOutput {
        boxes: vec![Quad::from_rect(2.0, 2.0, 20.0, 8.0)],
        scores: vec![0.5],
        elapse: 0.125,
    })
}

pub fn classification() -> OcrOutput {
    OcrOutput::Classification(ClassificationOutput {
        cls_res: vec![ClsLabel("0".to_string(), 0.5)],
        elapse: 0.125,
    })
}

// ── App wiring ────────────────────────────────────────────────────────────

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: 1,
            max_body_bytes: 4 * 1024 * 1024,
        },
        engine: EngineConfig::default(),
        engine_source: None,
    }
}

pub fn app_with_engine(engine: Arc<ScriptedEngine>) -> Router {
    init_test_logger();
    create_router(AppState::new(
        test_config(),
        OcrProvider::from_engine(engine),
    ))
}

pub fn app_without_engine() -> Router {
    init_test_logger();
    create_router(AppState::new(
        test_config(),
        OcrProvider::unavailable("Tesseract not available: no language data"),
    ))
}

// ── Images ────────────────────────────────────────────────────────────────

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .expect("encode png");
    output
}

pub fn png_base64(width: u32, height: u32) -> String {
    STANDARD.encode(png_bytes(width, height))
}

// ── Requests ──────────────────────────────────────────────────────────────

pub const BOUNDARY: &str = "ocrapi-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"image.png\"\r\n\
                         Content-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn form_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).expect("encode form body");
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
