/// Icon composition: a source image scaled onto a white rounded-rectangle
/// canvas with a thin light-gray outline.
///
/// The rounded rectangle is rasterised from its signed distance field with one
/// pixel of anti-aliasing; the outline is stroked centred on the shape's edge,
/// so on the straight sides only its inner half lands on the canvas.
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder, Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

use crate::error::IconError;

pub const CANVAS_SIZE: u32 = 1024;
pub const CORNER_RADIUS: f64 = 180.0;
/// Fraction of the canvas width the source image spans.
pub const CONTENT_SCALE: f64 = 0.85;
pub const BORDER_WIDTH: f64 = 2.0;
/// Border gray level (0.85 white).
const BORDER_GRAY: f64 = 0.85;

/// Where the scaled source lands on the canvas, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    /// Fixes the width to [`CONTENT_SCALE`] of the canvas, derives the height
    /// from the source aspect ratio and centres the result on both axes.
    pub fn for_source(src_width: u32, src_height: u32) -> Self {
        let size = f64::from(CANVAS_SIZE);
        let width = size * CONTENT_SCALE;
        let height = f64::from(src_height) * (width / f64::from(src_width.max(1)));
        Self {
            x: (size - width) / 2.0,
            y: (size - height) / 2.0,
            width,
            height,
        }
    }

    /// Whole-pixel size of the scaled source (truncated, never zero).
    pub fn pixel_size(&self) -> (u32, u32) {
        ((self.width as u32).max(1), (self.height as u32).max(1))
    }
}

/// Signed distance from `(px, py)` to the edge of a `size`×`size` rounded
/// rectangle anchored at the origin. Negative inside.
fn rounded_rect_distance(px: f64, py: f64, size: f64, radius: f64) -> f64 {
    let half = size / 2.0;
    let qx = (px - half).abs() - (half - radius);
    let qy = (py - half).abs() - (half - radius);
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    outside + inside - radius
}

/// Source-over of two straight-alpha colours given as (gray, alpha).
fn over(top: (f64, f64), bottom: (f64, f64)) -> (f64, f64) {
    let alpha = top.1 + bottom.1 * (1.0 - top.1);
    if alpha <= 0.0 {
        return (0.0, 0.0);
    }
    let gray = (top.0 * top.1 + bottom.0 * bottom.1 * (1.0 - top.1)) / alpha;
    (gray, alpha)
}

fn to_channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Paints the white rounded rectangle and its outline onto a transparent canvas.
pub fn background() -> RgbaImage {
    let size = f64::from(CANVAS_SIZE);
    let mut canvas = RgbaImage::new(CANVAS_SIZE, CANVAS_SIZE);
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let d = rounded_rect_distance(f64::from(x) + 0.5, f64::from(y) + 0.5, size, CORNER_RADIUS);
        let fill = (0.5 - d).clamp(0.0, 1.0);
        let stroke = (BORDER_WIDTH / 2.0 + 0.5 - d.abs()).clamp(0.0, 1.0);
        let (gray, alpha) = over((BORDER_GRAY, stroke), (1.0, fill));
        let g = to_channel(gray);
        *pixel = Rgba([g, g, g, to_channel(alpha)]);
    }
    canvas
}

/// Composes the final icon for `source`.
pub fn compose(source: &DynamicImage) -> (RgbaImage, Layout) {
    let (src_w, src_h) = source.dimensions();
    let layout = Layout::for_source(src_w, src_h);
    let (w, h) = layout.pixel_size();
    let mut canvas = background();
    let x = layout.x.round() as i64;

    if h <= CANVAS_SIZE {
        let scaled = imageops::resize(&source.to_rgba8(), w, h, FilterType::Lanczos3);
        imageops::overlay(&mut canvas, &scaled, x, layout.y.round() as i64);
    } else {
        // Taller than the canvas: only scale the band of rows that can land on it.
        let band = visible_band(src_h, &layout);
        debug!(first_row = band.first_row, rows = band.rows, "cropping tall source");
        let rows = imageops::crop_imm(source, 0, band.first_row, src_w, band.rows).to_image();
        let scaled = imageops::resize(&rows, w, band.height, FilterType::Lanczos3);
        imageops::overlay(&mut canvas, &scaled, x, band.y);
    }
    (canvas, layout)
}

/// Rows of a source taller than the canvas that land on it once scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Band {
    first_row: u32,
    rows: u32,
    /// Scaled height of those rows.
    height: u32,
    /// Canvas row the band's first scaled row lands on.
    y: i64,
}

fn visible_band(src_height: u32, layout: &Layout) -> Band {
    let scale = layout.height / f64::from(src_height.max(1));
    let top = -layout.y / scale;
    let bottom = (f64::from(CANVAS_SIZE) - layout.y) / scale;

    let first_row = (top.floor().max(0.0) as u32).min(src_height.saturating_sub(1));
    let end_row = (bottom.ceil() as u32).clamp(first_row + 1, src_height.max(1));
    let rows = end_row - first_row;
    Band {
        first_row,
        rows,
        height: ((f64::from(rows) * scale) as u32).max(1),
        y: (layout.y + f64::from(first_row) * scale).round() as i64,
    }
}

pub fn load_source(path: &Path) -> Result<DynamicImage, IconError> {
    image::open(path).map_err(|source| IconError::Load {
        path: path.to_path_buf(),
        source,
    })
}

pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, IconError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(canvas.as_raw(), canvas.width(), canvas.height(), ColorType::Rgba8)
        .map_err(IconError::Encode)?;
    Ok(bytes)
}

/// Loads `source`, composes the icon and writes it to `output` as PNG.
pub fn generate_icon(source: &Path, output: &Path) -> Result<Layout, IconError> {
    let image = load_source(source)?;
    debug!(source = %source.display(), width = image.width(), height = image.height(), "loaded source");

    let (canvas, layout) = compose(&image);
    let bytes = encode_png(&canvas)?;
    std::fs::write(output, bytes).map_err(|source| IconError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    // ── Layout ────────────────────────────────────────────────────────────────

    #[test]
    fn layout_square_source() {
        let l = Layout::for_source(512, 512);
        assert!((l.width - 870.4).abs() < EPS);
        assert!((l.height - 870.4).abs() < EPS);
        assert!((l.x - 76.8).abs() < EPS);
        assert!((l.y - 76.8).abs() < EPS);
    }

    #[test]
    fn layout_preserves_aspect_ratio() {
        for (w, h) in [(200, 100), (300, 450), (1, 1), (4096, 1000)] {
            let l = Layout::for_source(w, h);
            let expected_w = 1024.0 * 0.85;
            let expected_h = f64::from(h) * (expected_w / f64::from(w));
            assert!((l.width - expected_w).abs() < EPS);
            assert!((l.height - expected_h).abs() < EPS);
            assert!((l.x - (1024.0 - l.width) / 2.0).abs() < EPS);
            assert!((l.y - (1024.0 - l.height) / 2.0).abs() < EPS);
        }
    }

    #[test]
    fn pixel_size_truncates() {
        assert_eq!(Layout::for_source(512, 512).pixel_size(), (870, 870));
        assert_eq!(Layout::for_source(200, 100).pixel_size(), (870, 435));
    }

    // ── background ────────────────────────────────────────────────────────────

    #[test]
    fn distance_is_negative_inside_and_positive_outside() {
        let size = 1024.0;
        assert!(rounded_rect_distance(512.0, 512.0, size, CORNER_RADIUS) < 0.0);
        assert!(rounded_rect_distance(0.5, 0.5, size, CORNER_RADIUS) > 0.0);
        // Straight edge: the boundary is the canvas edge itself.
        assert!((rounded_rect_distance(512.0, 0.0, size, CORNER_RADIUS)).abs() < EPS);
    }

    #[test]
    fn background_corners_are_transparent() {
        let bg = background();
        for (x, y) in [(0, 0), (1023, 0), (0, 1023), (1023, 1023), (20, 20)] {
            assert_eq!(bg.get_pixel(x, y).0[3], 0, "({x},{y}) should be transparent");
        }
    }

    #[test]
    fn background_interior_is_opaque_white() {
        let bg = background();
        assert_eq!(bg.get_pixel(512, 512).0, [255, 255, 255, 255]);
        assert_eq!(bg.get_pixel(512, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn background_edge_carries_gray_border() {
        let bg = background();
        let gray = to_channel(BORDER_GRAY);
        assert_eq!(bg.get_pixel(512, 0).0, [gray, gray, gray, 255]);
        assert_eq!(bg.get_pixel(0, 512).0, [gray, gray, gray, 255]);
        assert_eq!(bg.get_pixel(1023, 512).0, [gray, gray, gray, 255]);
    }

    // ── compose ───────────────────────────────────────────────────────────────

    #[test]
    fn compose_produces_full_canvas() {
        let (canvas, _) = compose(&solid(40, 20, [255, 0, 0, 255]));
        assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
    }

    #[test]
    fn compose_centres_source_within_margins() {
        let (canvas, layout) = compose(&solid(100, 100, [255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(512, 512).0, [255, 0, 0, 255]);
        // Left margin is ~77 px: inside the rounded rect but outside the source.
        assert_eq!(canvas.get_pixel(40, 512).0, [255, 255, 255, 255]);
        let right_edge = (layout.x + layout.width) as u32;
        assert_eq!(canvas.get_pixel(right_edge + 10, 512).0, [255, 255, 255, 255]);
    }

    #[test]
    fn compose_wide_source_leaves_vertical_margins() {
        let (canvas, _) = compose(&solid(200, 100, [0, 0, 255, 255]));
        // Content spans y ≈ 294..729.
        assert_eq!(canvas.get_pixel(512, 512).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(512, 200).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(512, 820).0, [255, 255, 255, 255]);
    }

    #[test]
    fn transparent_source_shows_background() {
        let (canvas, _) = compose(&solid(64, 64, [0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(512, 512).0, [255, 255, 255, 255]);
    }

    #[test]
    fn visible_band_covers_the_canvas() {
        let layout = Layout::for_source(2, 4000);
        let band = visible_band(4000, &layout);
        assert_eq!(band.first_row, 1998);
        assert_eq!(band.rows, 4);
        assert!(band.y <= 0);
        assert!(band.y + i64::from(band.height) >= i64::from(CANVAS_SIZE));
        assert!(band.height < 2 * CANVAS_SIZE);
    }

    #[test]
    fn compose_extreme_aspect_ratio_clips_to_canvas() {
        let (canvas, layout) = compose(&solid(2, 4000, [255, 0, 0, 255]));
        assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        // Layout keeps the exact geometry even though most of it is off-canvas.
        assert!((layout.height - 1_740_800.0).abs() < 1e-6);
        assert_eq!(canvas.get_pixel(512, 512).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(512, 2).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(512, 1021).0, [255, 0, 0, 255]);
        // Outside the content columns the background still shows.
        assert_eq!(canvas.get_pixel(40, 512).0, [255, 255, 255, 255]);
    }

    // ── files ─────────────────────────────────────────────────────────────────

    #[test]
    fn generate_icon_writes_1024_png() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.png");
        let output = dir.path().join("icon.png");
        solid(60, 30, [10, 200, 10, 255]).save(&source).unwrap();

        let layout = generate_icon(&source, &output).unwrap();
        assert_eq!(layout.pixel_size(), (870, 435));

        let written = image::open(&output).unwrap();
        assert_eq!(written.dimensions(), (1024, 1024));
    }

    #[test]
    fn generate_icon_missing_source_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_icon(&dir.path().join("missing.png"), &dir.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, IconError::Load { .. }));
        assert!(!dir.path().join("out.png").exists());
    }

    #[test]
    fn generate_icon_unwritable_output_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.png");
        solid(8, 8, [0, 0, 0, 255]).save(&source).unwrap();
        let output = dir.path().join("no-such-dir").join("icon.png");
        let err = generate_icon(&source, &output).unwrap_err();
        assert!(matches!(err, IconError::Write { .. }));
    }
}
