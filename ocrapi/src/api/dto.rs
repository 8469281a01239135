//! Wire format of the HTTP endpoints.
//!
//! `OcrResultFields` flattens whichever `OcrOutput` case the engine produced into
//! a JSON object holding only that case's fields.

use serde::Serialize;
use utoipa::ToSchema;

use crate::codec;
use crate::error::Result;
use crate::ocr::{ClsLabel, OcrOutput, OcrRun, Quad, WordResult};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Variant fields of one engine result. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct OcrResultFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txts: Option<Vec<String>>,
    /// Four `[x, y]` points per text region, clockwise from top-left.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<Vec<f32>>>>)]
    pub boxes: Option<Vec<Quad>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f32>>,
    /// Per line, the `{text, score, box}` of each word.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<Object>>>)]
    pub word_results: Option<Vec<Vec<WordResult>>>,
    /// `[label, score]` pairs, label `"0"` or `"180"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<Object>>>)]
    pub cls_res: Option<Vec<ClsLabel>>,
    /// Seconds spent in the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapse: Option<f64>,
}

impl From<&OcrOutput> for OcrResultFields {
    fn from(output: &OcrOutput) -> Self {
        tracing::debug!(variant = output.kind(), "shaping OCR result");

        match output {
            OcrOutput::Pipeline(out) => Self {
                txts: Some(out.txts.clone()),
                boxes: Some(out.boxes.clone()),
                scores: Some(out.scores.clone()),
                word_results: Some(out.word_results.clone()),
                elapse: Some(out.elapse),
                ..Default::default()
            },
            OcrOutput::Recognition(out) => Self {
                txts: Some(out.txts.clone()),
                scores: Some(out.scores.clone()),
                word_results: Some(out.word_results.clone()),
                elapse: Some(out.elapse),
                ..Default::default()
            },
            OcrOutput::Detection(out) => Self {
                boxes: Some(out.boxes.clone()),
                scores: Some(out.scores.clone()),
                elapse: Some(out.elapse),
                ..Default::default()
            },
            OcrOutput::Classification(out) => Self {
                cls_res: Some(out.cls_res.clone()),
                elapse: Some(out.elapse),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OcrResponse {
    /// All recognized lines concatenated in order.
    pub txt: String,
    pub result: OcrResultFields,
    /// Base64 PNG of the input with detected regions outlined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl OcrResponse {
    pub fn empty() -> Self {
        Self {
            txt: String::new(),
            result: OcrResultFields::default(),
            image_base64: None,
        }
    }

    /// Shape an engine run, rendering its visualization.
    pub fn from_run(run: &OcrRun) -> Result<Self> {
        let Some(output) = &run.output else {
            return Ok(Self::empty());
        };

        let visualization = output.visualize(&run.image);
        Ok(Self {
            txt: output.text(),
            result: OcrResultFields::from(output),
            image_base64: Some(codec::encode_png_base64(&visualization)?),
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaptchaResponse {
    /// Recognized text with everything but ASCII letters and digits removed.
    pub result: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub engine: EngineStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EngineStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
