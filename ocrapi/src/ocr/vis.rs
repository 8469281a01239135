//! Rendering of OCR results onto the input image for human inspection.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use super::types::{OcrOutput, Quad};

const BOX_COLOR: Rgb<u8> = Rgb([0, 200, 0]);

const BOX_THICKNESS: i32 = 2;

impl OcrOutput {
    /// Draw every detected box onto a copy of `source`. Variants without boxes
    /// render the image unchanged.
    pub fn visualize(&self, source: &DynamicImage) -> RgbImage {
        draw_boxes(source, self.boxes())
    }
}

pub fn draw_boxes(source: &DynamicImage, boxes: &[Quad]) -> RgbImage {
    let mut canvas = source.to_rgb8();
    for quad in boxes {
        draw_quad(&mut canvas, quad);
    }
    canvas
}

fn draw_quad(canvas: &mut RgbImage, quad: &Quad) {
    let points = quad.0;
    for offset in 0..BOX_THICKNESS {
        let shrink = offset as f32;
        for i in 0..points.len() {
            let [x1, y1] = points[i];
            let [x2, y2] = points[(i + 1) % points.len()];
            draw_line_segment_mut(
                canvas,
                inset(x1, y1, shrink, quad),
                inset(x2, y2, shrink, quad),
                BOX_COLOR,
            );
        }
    }
}

/// Move a corner `by` pixels towards the quad's center.
fn inset(x: f32, y: f32, by: f32, quad: &Quad) -> (f32, f32) {
    let (min_x, min_y, max_x, max_y) = quad.extent();
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    (x + by * (cx - x).signum(), y + by * (cy - y).signum())
}
