//! Caption rasterizer: renders a `Settings` value onto a transparent canvas.
//!
//! Layout follows the fixed-canvas model: the text is horizontally centered
//! across the full canvas width and vertically placed from the resolved
//! font's line height (`ceil(ascent + |descent|)`) plus a fixed edge margin.
//! The stroke is drawn first as an outward dilation of the glyph coverage,
//! then the fill goes on top, so the border visually scales with
//! `border_size` the way outlined text is expected to.
//!
//! This runs only when the active settings change. The per-frame path reads
//! the finished image from the overlay cell and never calls into here.

use ab_glyph::{point, Font, GlyphId, PxScale, ScaleFont};
use tracing::debug;

use cap_common::color::Rgb;
use cap_common::config::PipelineConfig;
use cap_common::error::RenderError;
use cap_common::frame::OverlayImage;
use cap_common::render::RenderOverlay;
use cap_common::settings::{CaptionPosition, Settings};
use cap_common::types::Resolution;

use crate::font::FontCatalog;

/// Renders caption overlays at a fixed canvas resolution.
pub struct OverlayRenderer {
    catalog: FontCatalog,
    canvas: Resolution,
    margin: u32,
}

impl OverlayRenderer {
    /// Create a renderer using the pipeline's canvas and margin settings.
    pub fn new(catalog: FontCatalog, config: &PipelineConfig) -> Self {
        Self::with_canvas(catalog, config.canvas, config.margin)
    }

    pub fn with_canvas(catalog: FontCatalog, canvas: Resolution, margin: u32) -> Self {
        Self {
            catalog,
            canvas,
            margin,
        }
    }

    pub fn canvas(&self) -> Resolution {
        self.canvas
    }

    /// Rasterize the caption described by `settings`.
    ///
    /// Empty text yields a fully transparent canvas without touching the
    /// font catalog. A missing font for non-empty text is an error the
    /// caller degrades on (the poller keeps the previous overlay).
    pub fn render(&self, settings: &Settings) -> Result<OverlayImage, RenderError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(RenderError::InvalidCanvas {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }

        if settings.text.is_empty() {
            return Ok(OverlayImage::transparent(self.canvas));
        }

        let font = self.catalog.resolve(&settings.font_name)?;
        // Wire values are unbounded integers; clamp so an absurd payload
        // degrades to "fills the canvas" instead of overflowing or stalling
        // the render.
        let size = settings.text_size.clamp(1, self.canvas.height) as f32;
        let scale = font
            .pt_to_px_scale(size)
            .unwrap_or_else(|| PxScale::from(size));
        let scaled = font.as_scaled(scale);

        let ascent = scaled.ascent();
        let descent = scaled.descent(); // negative
        let line_height = (ascent + descent.abs()).ceil();

        let top = vertical_top_offset(
            settings.position,
            self.canvas.height as f32,
            line_height,
            self.margin as f32,
        );
        let baseline = top + ascent;

        // Horizontal centering from summed advances + kerning.
        let text_width = line_width(&scaled, &settings.text);
        let x0 = (self.canvas.width as f32 - text_width) / 2.0;

        debug!(
            text = %settings.text,
            size = settings.text_size,
            line_height,
            baseline,
            text_width,
            "Rendering caption overlay"
        );

        // Glyph coverage mask for the whole line, clipped to the canvas.
        let mut mask = CoverageMask::new(self.canvas);
        let mut caret = x0;
        let mut last: Option<GlyphId> = None;
        for ch in settings.text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    mask.stamp(px, py, coverage);
                });
            }
            caret += scaled.h_advance(id);
            last = Some(id);
        }

        let mut image = OverlayImage::transparent(self.canvas);
        if settings.border_size > 0 {
            let radius = settings.border_size.min(self.canvas.width.min(self.canvas.height));
            let stroke = mask.dilate(radius);
            composite_mask(&mut image, &stroke, settings.border_color);
        }
        composite_mask(&mut image, &mask, settings.text_color);

        Ok(image)
    }
}

impl RenderOverlay for OverlayRenderer {
    fn render(&self, settings: &Settings) -> Result<OverlayImage, RenderError> {
        OverlayRenderer::render(self, settings)
    }
}

/// Raster-space top edge of the caption's line box.
///
/// Equivalent to the bottom-origin placement rules: bottom = fixed margin
/// from the bottom edge, top = fixed margin from the top edge, center =
/// vertically centered.
fn vertical_top_offset(
    position: CaptionPosition,
    canvas_height: f32,
    line_height: f32,
    margin: f32,
) -> f32 {
    match position {
        CaptionPosition::Top => margin,
        CaptionPosition::Center => (canvas_height - line_height) / 2.0,
        CaptionPosition::Bottom => canvas_height - margin - line_height,
    }
}

/// Advance width of a single line, including kerning.
fn line_width<SF, F>(scaled: &SF, text: &str) -> f32
where
    F: Font,
    SF: ScaleFont<F>,
{
    let mut width = 0.0;
    let mut last: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = scaled.font().glyph_id(ch);
        if let Some(prev) = last {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        last = Some(id);
    }
    width
}

/// Per-pixel glyph coverage for the canvas, with the occupied bounding box
/// tracked so dilation only touches the text region.
struct CoverageMask {
    data: Vec<u8>,
    resolution: Resolution,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl CoverageMask {
    fn new(resolution: Resolution) -> Self {
        Self {
            data: vec![0u8; resolution.pixel_count() as usize],
            resolution,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
        }
    }

    fn is_empty(&self) -> bool {
        self.max_x < self.min_x
    }

    #[inline]
    fn at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.resolution.width as i32 || y >= self.resolution.height as i32
        {
            return 0;
        }
        self.data[y as usize * self.resolution.width as usize + x as usize]
    }

    /// Max-combine `coverage` at (x, y), clipping to the canvas.
    fn stamp(&mut self, x: i32, y: i32, coverage: f32) {
        if x < 0 || y < 0 || x >= self.resolution.width as i32 || y >= self.resolution.height as i32
        {
            return;
        }
        let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
        if value == 0 {
            return;
        }
        let ix = y as usize * self.resolution.width as usize + x as usize;
        if value > self.data[ix] {
            self.data[ix] = value;
        }
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Outward dilation by a disc of the given radius (the stroke mask).
    fn dilate(&self, radius: u32) -> CoverageMask {
        let mut out = CoverageMask::new(self.resolution);
        if self.is_empty() || radius == 0 {
            return out;
        }

        // A radius beyond the canvas cannot add coverage; the clamp also
        // keeps the disc offsets within i32 range for any wire value.
        let r = radius
            .min(self.resolution.width.max(self.resolution.height))
            .min(i16::MAX as u32) as i32;
        let rr = r as i64 * r as i64;
        let mut offsets = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx as i64 * dx as i64 + dy as i64 * dy as i64 <= rr {
                    offsets.push((dx, dy));
                }
            }
        }

        // Stamp a disc around every covered pixel; cost scales with the
        // glyph coverage, not the canvas area.
        for y in self.min_y..=self.max_y {
            for x in self.min_x..=self.max_x {
                let v = self.at(x, y);
                if v == 0 {
                    continue;
                }
                let coverage = v as f32 / 255.0;
                for &(dx, dy) in &offsets {
                    out.stamp(x + dx, y + dy, coverage);
                }
            }
        }
        out
    }
}

/// Source-over a colored coverage mask onto a straight-alpha RGBA image.
fn composite_mask(image: &mut OverlayImage, mask: &CoverageMask, color: Rgb) {
    if mask.is_empty() {
        return;
    }
    let (sr, sg, sb) = (color.r.clamp(0.0, 1.0), color.g.clamp(0.0, 1.0), color.b.clamp(0.0, 1.0));
    for (px, &coverage) in image.pixels.chunks_exact_mut(4).zip(mask.data.iter()) {
        if coverage == 0 {
            continue;
        }
        let sa = coverage as f32 / 255.0;
        let da = px[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            continue;
        }
        // Straight-alpha source-over; result stays un-premultiplied.
        let over = |sc: f32, dc: u8| -> u8 {
            let dc = dc as f32 / 255.0;
            let c = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        px[0] = over(sr, px[0]);
        px[1] = over(sg, px[1]);
        px[2] = over(sb, px[2]);
        px[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}
