use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use leptess::{LepTess, Variable};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{EngineConfig, GlobalConfig};
use crate::error::{OcrApiError, Result};

use super::engine::{should_skip_detection, EngineMode, OcrEngine};
use super::preprocessing::{encode_for_tesseract, scale_for_engine};
use super::tsv::{group_lines, mean_confidence, parse_words, TextLine, TsvWord};
use super::types::{
    ClassificationOutput, ClsLabel, DetectionOutput, OcrOutput, OcrToggles, PipelineOutput,
    RecognitionOutput, Stages,
};

/// Tesseract page segmentation modes used by the engine.
#[derive(Debug, Clone, Copy)]
enum PageSeg {
    /// Full automatic layout analysis.
    Auto,
    /// Treat the image as one text line.
    SingleLine,
}

impl PageSeg {
    fn as_variable(self) -> &'static str {
        match self {
            PageSeg::Auto => "3",
            PageSeg::SingleLine => "7",
        }
    }
}

/// What Tesseract read, before it is shaped into an `OcrOutput`.
#[derive(Debug)]
enum Reading {
    /// Lines in engine-space coordinates of the upright image.
    Lines(Vec<TextLine>),
    Orientation(ClsLabel),
}

/// How engine-space lines become a response.
#[derive(Debug, Clone, Copy)]
struct Shaping {
    word_box: bool,
    /// Factor mapping engine-space coordinates onto the caller's image.
    to_source: f32,
    text_score: f32,
}

/// Local OCR through Tesseract. One handle, calls are serialized.
pub struct TesseractEngine {
    tesseract: Mutex<LepTess>,
    config: EngineConfig,
}

impl TesseractEngine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let tess = &config.tesseract;
        let lt = LepTess::new(tess.data_path.as_deref(), &tess.languages)
            .map_err(|e| OcrApiError::OcrUnavailable(format!("Tesseract not available: {e}")))?;

        info!(languages = %tess.languages, "Tesseract OCR initialized");

        Ok(Self {
            tesseract: Mutex::new(lt),
            config: config.clone(),
        })
    }

    fn read(
        &self,
        lt: &mut LepTess,
        img: &DynamicImage,
        mode: EngineMode,
        stages: &Stages,
    ) -> Result<Reading> {
        let reading = match mode {
            EngineMode::Pipeline if stages.cls => {
                let (label, lines) = read_both_orientations(lt, img, PageSeg::Auto)?;
                debug!(label = label.label(), score = label.score(), "page orientation");
                Reading::Lines(lines)
            }
            EngineMode::Pipeline | EngineMode::Detection => {
                Reading::Lines(group_lines(read_words(lt, img, PageSeg::Auto)?))
            }
            EngineMode::Recognition => {
                Reading::Lines(group_lines(read_words(lt, img, PageSeg::SingleLine)?))
            }
            EngineMode::Classification => {
                let (label, _) = read_both_orientations(lt, img, PageSeg::SingleLine)?;
                Reading::Orientation(label)
            }
        };
        Ok(reading)
    }
}

fn read_words(lt: &mut LepTess, img: &DynamicImage, mode: PageSeg) -> Result<Vec<TsvWord>> {
    lt.set_variable(Variable::TesseditPagesegMode, mode.as_variable())
        .map_err(|_| OcrApiError::Ocr("Failed to set page segmentation mode".to_string()))?;

    let bytes = encode_for_tesseract(img)?;
    lt.set_image_from_mem(&bytes)
        .map_err(|e| OcrApiError::Ocr(format!("Failed to set image: {e}")))?;

    let tsv = lt
        .get_tsv_text(0)
        .map_err(|e| OcrApiError::Ocr(format!("Failed to extract text: {e}")))?;

    Ok(parse_words(&tsv))
}

/// Read the image and its 180° rotation with the same segmentation and keep
/// the more confident reading.
fn read_both_orientations(
    lt: &mut LepTess,
    img: &DynamicImage,
    mode: PageSeg,
) -> Result<(ClsLabel, Vec<TextLine>)> {
    let upright = read_words(lt, img, mode)?;
    let flipped = read_words(lt, &img.rotate180(), mode)?;
    let (width, height) = img.dimensions();
    Ok(pick_orientation(
        upright,
        flipped,
        width as f32,
        height as f32,
    ))
}

/// Ties go to the upright reading. Flipped lines are mapped back onto the
/// upright `width` x `height` image.
fn pick_orientation(
    upright: Vec<TsvWord>,
    flipped: Vec<TsvWord>,
    width: f32,
    height: f32,
) -> (ClsLabel, Vec<TextLine>) {
    let upright_score = mean_confidence(&upright);
    let flipped_score = mean_confidence(&flipped);

    if flipped_score <= upright_score {
        return (
            ClsLabel(ClsLabel::UPRIGHT.to_string(), upright_score),
            group_lines(upright),
        );
    }

    let mut lines = group_lines(flipped);
    for line in &mut lines {
        line.bbox = line.bbox.rotate_180(width, height);
        for word in &mut line.words {
            word.bbox = word.bbox.rotate_180(width, height);
        }
    }
    (
        ClsLabel(ClsLabel::UPSIDE_DOWN.to_string(), flipped_score),
        lines,
    )
}

/// Resolve stages against config defaults and the image shape, then pick a mode.
fn plan(
    toggles: &OcrToggles,
    width: u32,
    height: u32,
    global: &GlobalConfig,
) -> (Stages, Option<EngineMode>) {
    let mut stages = toggles.resolve(global);
    if stages.det && should_skip_detection(width, height, global) {
        debug!(width, height, "image shape skips detection");
        stages.det = false;
    }
    (stages, EngineMode::select(&stages))
}

/// Map engine-space geometry back to the caller's image.
fn rescale_lines(lines: &mut [TextLine], to_source: f32) {
    if to_source == 1.0 {
        return;
    }
    for line in lines {
        line.bbox = line.bbox.scale(to_source);
        for word in &mut line.words {
            word.bbox = word.bbox.scale(to_source);
        }
    }
}

fn above_threshold(lines: Vec<TextLine>, text_score: f32) -> Vec<TextLine> {
    lines
        .into_iter()
        .filter(|line| !line.text.is_empty() && line.score >= text_score)
        .collect()
}

fn shape_output(
    mode: EngineMode,
    reading: Reading,
    shaping: &Shaping,
    elapse: f64,
) -> Option<OcrOutput> {
    match (mode, reading) {
        (EngineMode::Pipeline, Reading::Lines(lines)) => {
            let mut lines = above_threshold(lines, shaping.text_score);
            if lines.is_empty() {
                return None;
            }
            rescale_lines(&mut lines, shaping.to_source);

            let word_results = if shaping.word_box {
                lines.iter().map(|l| l.words.clone()).collect()
            } else {
                Vec::new()
            };
            Some(OcrOutput::Pipeline(PipelineOutput {
                txts: lines.iter().map(|l| l.text.clone()).collect(),
                boxes: lines.iter().map(|l| l.bbox).collect(),
                scores: lines.iter().map(|l| l.score).collect(),
                word_results,
                elapse,
            }))
        }
        (EngineMode::Detection, Reading::Lines(mut lines)) => {
            if lines.is_empty() {
                return None;
            }
            rescale_lines(&mut lines, shaping.to_source);
            Some(OcrOutput::Detection(DetectionOutput {
                boxes: lines.iter().map(|l| l.bbox).collect(),
                scores: lines.iter().map(|l| l.score).collect(),
                elapse,
            }))
        }
        (EngineMode::Recognition, Reading::Lines(mut lines)) => {
            rescale_lines(&mut lines, shaping.to_source);
            let text = lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let words: Vec<_> = lines.into_iter().flat_map(|l| l.words).collect();
            let score = if words.is_empty() {
                0.0
            } else {
                words.iter().map(|w| w.score).sum::<f32>() / words.len() as f32
            };
            if text.is_empty() || score < shaping.text_score {
                return None;
            }

            let word_results = if shaping.word_box {
                vec![words]
            } else {
                Vec::new()
            };
            Some(OcrOutput::Recognition(RecognitionOutput {
                txts: vec![text],
                scores: vec![score],
                word_results,
                elapse,
            }))
        }
        (EngineMode::Classification, Reading::Orientation(label)) => {
            Some(OcrOutput::Classification(ClassificationOutput {
                cls_res: vec![label],
                elapse,
            }))
        }
        (mode, reading) => {
            debug!(?mode, ?reading, "reading does not fit engine mode");
            None
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn run(&self, image: &DynamicImage, toggles: &OcrToggles) -> Result<Option<OcrOutput>> {
        let start = Instant::now();
        let global = &self.config.global;

        let (width, height) = image.dimensions();
        let (stages, mode) = plan(toggles, width, height, global);
        let Some(mode) = mode else {
            debug!("all OCR stages disabled");
            return Ok(None);
        };

        let scaled = scale_for_engine(image, global);
        let reading = {
            let mut lt = self.tesseract.blocking_lock();
            self.read(&mut lt, &scaled.image, mode, &stages)?
        };

        let shaping = Shaping {
            word_box: stages.word_box,
            to_source: scaled.to_source,
            text_score: global.text_score,
        };
        let output = shape_output(mode, reading, &shaping, start.elapsed().as_secs_f64());

        if let Some(output) = &output {
            debug!(
                kind = output.kind(),
                elapse = output.elapse(),
                "tesseract run finished"
            );
        }
        Ok(output)
    }
}
