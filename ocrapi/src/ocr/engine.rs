use image::DynamicImage;

use crate::config::GlobalConfig;
use crate::error::Result;

use super::types::{OcrOutput, OcrToggles, Stages};

/// An OCR engine shared by every request.
///
/// Implementations must tolerate concurrent callers. `run` returns `Ok(None)`
/// when nothing was found or every stage is switched off.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, image: &DynamicImage, toggles: &OcrToggles) -> Result<Option<OcrOutput>>;
}

/// Which output shape a call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Pipeline,
    Detection,
    Recognition,
    Classification,
}

impl EngineMode {
    pub fn select(stages: &Stages) -> Option<Self> {
        match (stages.det, stages.rec, stages.cls) {
            (true, true, _) => Some(Self::Pipeline),
            (true, false, _) => Some(Self::Detection),
            (false, true, _) => Some(Self::Recognition),
            (false, false, true) => Some(Self::Classification),
            (false, false, false) => None,
        }
    }
}

/// Very short or very long strips are treated as one line instead of being
/// run through layout detection.
pub fn should_skip_detection(width: u32, height: u32, global: &GlobalConfig) -> bool {
    if height < global.min_height {
        return true;
    }
    height > 0 && width as f32 / height as f32 > global.width_height_ratio
}
