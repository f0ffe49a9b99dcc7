use std::path::Path;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};
use log::{debug, trace};

use crate::error::{RasterError, Result};

/// A TrueType/OpenType font loaded at a fixed size.
///
/// `size_px` is pixels per em, so a point size maps 1:1 onto pixels. The
/// `ab_glyph` scale is derived from it because `PxScale` measures the
/// ascent-to-descent height rather than the em square.
pub struct GlyphFont {
    font: FontVec,
    scale: PxScale,
    ascent: f32,
}

impl GlyphFont {
    /// Read and parse the font at `path`.
    pub fn load(path: impl AsRef<Path>, size_px: f32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| RasterError::FontLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes, size_px)
            .map_err(|_| RasterError::FontParse { path: path.to_path_buf() })
    }

    /// Parse an in-memory font file.
    pub fn from_bytes(bytes: Vec<u8>, size_px: f32) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|_| RasterError::FontParse { path: "<memory>".into() })?;

        let units_per_em = font
            .units_per_em()
            .ok_or_else(|| RasterError::FontParse { path: "<memory>".into() })?;
        let scale = PxScale::from(size_px * font.height_unscaled() / units_per_em);

        // Snap the baseline to the pixel grid so pixel fonts stay crisp.
        let ascent = font.as_scaled(scale).ascent().ceil();
        debug!(
            "font: {size_px}px/em, units_per_em={units_per_em}, px_scale={:.3}, ascent={ascent}",
            scale.y
        );

        Ok(Self { font, scale, ascent })
    }

    /// Scaled ascent in whole pixels.
    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    /// Whether the font maps `ch` to a real glyph rather than `.notdef`.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.glyph_id(ch) != GlyphId(0)
    }

    /// Draw `ch` with its layout box's top-left corner at `(x, y)`.
    ///
    /// Coverage becomes alpha in `fill`; pixels outside `canvas` are dropped and
    /// overlapping ink keeps the stronger alpha. Returns whether any pixel was set.
    pub fn draw_char(
        &self,
        canvas: &mut RgbaImage,
        ch: char,
        x: i32,
        y: i32,
        fill: [u8; 3],
    ) -> bool {
        let id = self.font.glyph_id(ch);
        if id == GlyphId(0) {
            debug!("font: no glyph for {ch:?} (U+{:04X}), drawing .notdef", ch as u32);
        }

        let baseline = y as f32 + self.ascent;
        let glyph = id.with_scale_and_position(self.scale, point(x as f32, baseline));
        let Some(outlined) = self.font.outline_glyph(glyph) else {
            trace!("font: {ch:?} has no outline");
            return false;
        };

        let bounds = outlined.px_bounds();
        let min_x = bounds.min.x as i32;
        let min_y = bounds.min.y as i32;
        let (canvas_w, canvas_h) = canvas.dimensions();
        let mut inked = false;

        outlined.draw(|gx, gy, coverage| {
            let px = min_x + gx as i32;
            let py = min_y + gy as i32;
            if px < 0 || py < 0 || px as u32 >= canvas_w || py as u32 >= canvas_h {
                return;
            }
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            if alpha == 0 {
                return;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            if alpha > pixel[3] {
                *pixel = Rgba([fill[0], fill[1], fill[2], alpha]);
            }
            inked = true;
        });

        inked
    }
}
