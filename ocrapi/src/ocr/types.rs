use serde::Serialize;

use crate::config::GlobalConfig;

/// Four corner points, clockwise from top-left, in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Quad(pub [[f32; 2]; 4]);

impl Quad {
    pub fn from_rect(left: f32, top: f32, width: f32, height: f32) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self([[left, top], [right, top], [right, bottom], [left, bottom]])
    }

    /// Axis-aligned extent as `(min_x, min_y, max_x, max_y)`.
    pub fn extent(&self) -> (f32, f32, f32, f32) {
        self.0.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(min_x, min_y, max_x, max_y), [x, y]| {
                (min_x.min(*x), min_y.min(*y), max_x.max(*x), max_y.max(*y))
            },
        )
    }

    /// Smallest axis-aligned quad covering both.
    pub fn union(&self, other: &Quad) -> Quad {
        let (a_min_x, a_min_y, a_max_x, a_max_y) = self.extent();
        let (b_min_x, b_min_y, b_max_x, b_max_y) = other.extent();
        let min_x = a_min_x.min(b_min_x);
        let min_y = a_min_y.min(b_min_y);
        Quad::from_rect(
            min_x,
            min_y,
            a_max_x.max(b_max_x) - min_x,
            a_max_y.max(b_max_y) - min_y,
        )
    }

    pub fn scale(&self, factor: f32) -> Quad {
        Quad(self.0.map(|[x, y]| [x * factor, y * factor]))
    }

    /// Map a quad found in a 180°-rotated `width` x `height` image back onto the
    /// unrotated image, keeping the clockwise-from-top-left point order.
    pub fn rotate_180(&self, width: f32, height: f32) -> Quad {
        let [p0, p1, p2, p3] = self.0.map(|[x, y]| [width - x, height - y]);
        Quad([p2, p3, p0, p1])
    }
}

/// One recognized word and where it sits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordResult {
    pub text: String,
    pub score: f32,
    #[serde(rename = "box")]
    pub bbox: Quad,
}

/// Orientation verdict, serialized as `[label, score]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClsLabel(pub String, pub f32);

impl ClsLabel {
    pub const UPRIGHT: &'static str = "0";
    pub const UPSIDE_DOWN: &'static str = "180";

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn score(&self) -> f32 {
        self.1
    }

    pub fn is_upside_down(&self) -> bool {
        self.0 == Self::UPSIDE_DOWN
    }
}

/// Detection, optional classification, then recognition of every line.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub txts: Vec<String>,
    pub boxes: Vec<Quad>,
    pub scores: Vec<f32>,
    /// One entry per line when word boxes were requested, empty otherwise.
    pub word_results: Vec<Vec<WordResult>>,
    pub elapse: f64,
}

/// Recognition of the whole image as a single text line.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOutput {
    pub txts: Vec<String>,
    pub scores: Vec<f32>,
    pub word_results: Vec<Vec<WordResult>>,
    pub elapse: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutput {
    pub boxes: Vec<Quad>,
    pub scores: Vec<f32>,
    pub elapse: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutput {
    pub cls_res: Vec<ClsLabel>,
    pub elapse: f64,
}

/// What the engine produced. The case depends on which stages ran.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrOutput {
    Pipeline(PipelineOutput),
    Recognition(RecognitionOutput),
    Detection(DetectionOutput),
    Classification(ClassificationOutput),
}

impl OcrOutput {
    pub fn kind(&self) -> &'static str {
        match self {
            OcrOutput::Pipeline(_) => "pipeline",
            OcrOutput::Recognition(_) => "recognition",
            OcrOutput::Detection(_) => "detection",
            OcrOutput::Classification(_) => "classification",
        }
    }

    pub fn txts(&self) -> &[String] {
        match self {
            OcrOutput::Pipeline(out) => &out.txts,
            OcrOutput::Recognition(out) => &out.txts,
            OcrOutput::Detection(_) | OcrOutput::Classification(_) => &[],
        }
    }

    /// All recognized lines joined in order without a separator.
    pub fn text(&self) -> String {
        self.txts().concat()
    }

    pub fn boxes(&self) -> &[Quad] {
        match self {
            OcrOutput::Pipeline(out) => &out.boxes,
            OcrOutput::Detection(out) => &out.boxes,
            OcrOutput::Recognition(_) | OcrOutput::Classification(_) => &[],
        }
    }

    pub fn elapse(&self) -> f64 {
        match self {
            OcrOutput::Pipeline(out) => out.elapse,
            OcrOutput::Recognition(out) => out.elapse,
            OcrOutput::Detection(out) => out.elapse,
            OcrOutput::Classification(out) => out.elapse,
        }
    }
}

/// Per-request stage switches. `None` defers to the engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcrToggles {
    pub use_det: Option<bool>,
    pub use_cls: Option<bool>,
    pub use_rec: Option<bool>,
    pub return_word_box: Option<bool>,
}

/// Stage switches after applying configuration defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub det: bool,
    pub cls: bool,
    pub rec: bool,
    pub word_box: bool,
}

impl OcrToggles {
    pub fn resolve(&self, defaults: &GlobalConfig) -> Stages {
        Stages {
            det: self.use_det.unwrap_or(defaults.use_det),
            cls: self.use_cls.unwrap_or(defaults.use_cls),
            rec: self.use_rec.unwrap_or(defaults.use_rec),
            word_box: self.return_word_box.unwrap_or(defaults.return_word_box),
        }
    }
}
