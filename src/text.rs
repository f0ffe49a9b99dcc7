use std::path::Path;

use image::{Rgba, RgbaImage};
use log::trace;

use crate::error::{RasterError, Result};
use crate::grid::{CellRect, CodeRange, GridLayout};
use crate::sheet::{SheetSpec, render};

/// Tint that leaves sheet pixels unchanged.
pub const WHITE: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

// ── SheetFont ────────────────────────────────────────────────────────────────

/// A rendered sprite sheet used as a fixed-cell bitmap font.
///
/// Glyphs are looked up by code through the sheet's [`GridLayout`] and copied
/// cell by cell, so every character advances by exactly one cell width.
pub struct SheetFont {
    image: RgbaImage,
    grid: GridLayout,
    range: CodeRange,
}

impl SheetFont {
    /// Wrap an already rendered sheet. The image must be exactly the grid's canvas size.
    pub fn new(image: RgbaImage, grid: GridLayout, range: CodeRange) -> Result<Self> {
        grid.validate().map_err(RasterError::InvalidGrid)?;
        let expected = grid.canvas_size();
        if expected != Some(image.dimensions()) {
            return Err(RasterError::InvalidGrid(format!(
                "sheet image is {}x{} but the grid needs {:?}",
                image.width(),
                image.height(),
                expected
            )));
        }
        Ok(Self { image, grid, range })
    }

    /// Load a sheet PNG previously written by [`rasterize`](crate::sheet::rasterize).
    pub fn load(path: impl AsRef<Path>, grid: GridLayout, range: CodeRange) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| RasterError::Image { path: path.to_path_buf(), source })?
            .to_rgba8();
        Self::new(image, grid, range)
    }

    /// Render `spec` in memory and use the result directly.
    pub fn from_spec(spec: &SheetSpec) -> Result<Self> {
        Self::new(render(spec)?, spec.grid, spec.range)
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub fn range(&self) -> CodeRange {
        self.range
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Where `ch` sits in the sheet, or `None` if the sheet does not carry it.
    pub fn glyph_rect(&self, ch: char) -> Option<CellRect> {
        self.grid.source_rect(self.range, ch as u32)
    }
}

// ── Pixel helpers ────────────────────────────────────────────────────────────

/// Multiply `src` channel-wise by `tint`, both in 0..=255.
fn tint_pixel(src: [u8; 4], tint: [u8; 4]) -> [u8; 4] {
    let mul = |a: u8, b: u8| ((a as u16 * b as u16 + 127) / 255) as u8;
    [mul(src[0], tint[0]), mul(src[1], tint[1]), mul(src[2], tint[2]), mul(src[3], tint[3])]
}

/// Source-over compositing of straight-alpha `src` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: [u8; 4]) {
    if src[3] == 0 {
        return;
    }
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

fn put(target: &mut RgbaImage, x: i64, y: i64, src: [u8; 4]) -> bool {
    if x < 0 || y < 0 || x >= target.width() as i64 || y >= target.height() as i64 {
        return false;
    }
    blend(target.get_pixel_mut(x as u32, y as u32), src);
    true
}

/// Blend a solid `w × h` rectangle onto `target`, clipped to its bounds.
pub fn fill_rect(target: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, color: [u8; 4]) {
    for dy in 0..h as i64 {
        for dx in 0..w as i64 {
            put(target, x as i64 + dx, y as i64 + dy, color);
        }
    }
}

// ── Drawing ──────────────────────────────────────────────────────────────────

/// Copy the cell for `ch` to `(x, y)`, multiplied by `tint`.
///
/// Characters missing from the sheet draw nothing. Returns whether any
/// non-transparent pixel landed on `target`.
pub fn draw_char(
    target: &mut RgbaImage,
    font: &SheetFont,
    ch: char,
    x: i32,
    y: i32,
    tint: [u8; 4],
) -> bool {
    draw_char_scaled(target, font, ch, x, y, tint, 1)
}

/// [`draw_char`] with each sheet pixel blown up to a `scale × scale` block.
pub fn draw_char_scaled(
    target: &mut RgbaImage,
    font: &SheetFont,
    ch: char,
    x: i32,
    y: i32,
    tint: [u8; 4],
    scale: u32,
) -> bool {
    let Some(rect) = font.glyph_rect(ch) else {
        trace!("text: {ch:?} is not on the sheet");
        return false;
    };
    let scale = scale.max(1) as i64;
    let mut inked = false;

    for sy in 0..rect.h {
        for sx in 0..rect.w {
            let src = font.image.get_pixel(rect.x + sx, rect.y + sy).0;
            let tinted = tint_pixel(src, tint);
            if tinted[3] == 0 {
                continue;
            }
            let base_x = x as i64 + sx as i64 * scale;
            let base_y = y as i64 + sy as i64 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    inked |= put(target, base_x + dx, base_y + dy, tinted);
                }
            }
        }
    }
    inked
}

/// Top-left pixel of the text cell `(col, row)` relative to `(x, y)`.
fn cell_origin(font: &SheetFont, x: i32, y: i32, col: u32, row: u32) -> (i32, i32) {
    let px = x as i64 + col as i64 * font.grid.cell_width as i64;
    let py = y as i64 + row as i64 * font.grid.cell_height as i64;
    (
        px.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        py.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
    )
}

/// Draw `text` left to right starting at `(x, y)`.
///
/// Every character, drawn or not, advances one cell. `'\n'` returns to `x`
/// and moves down one cell height.
pub fn draw_string(
    target: &mut RgbaImage,
    font: &SheetFont,
    text: &str,
    x: i32,
    y: i32,
    tint: [u8; 4],
) {
    let mut col = 0u32;
    let mut row = 0u32;
    for ch in text.chars() {
        if ch == '\n' {
            col = 0;
            row += 1;
            continue;
        }
        let (px, py) = cell_origin(font, x, y, col, row);
        draw_char(target, font, ch, px, py, tint);
        col += 1;
    }
}

/// Outline a `cols × rows` cell box at `(x, y)` with `+` corners, `-` and `|` edges.
pub fn draw_box(
    target: &mut RgbaImage,
    font: &SheetFont,
    x: i32,
    y: i32,
    cols: u32,
    rows: u32,
    tint: [u8; 4],
) {
    if cols == 0 || rows == 0 {
        return;
    }
    let (right, bottom) = (cols - 1, rows - 1);
    let mut at = |ch: char, col: u32, row: u32| {
        let (px, py) = cell_origin(font, x, y, col, row);
        draw_char(target, font, ch, px, py, tint);
    };

    for col in 1..right {
        at('-', col, 0);
        at('-', col, bottom);
    }
    for row in 1..bottom {
        at('|', 0, row);
        at('|', right, row);
    }
    at('+', 0, 0);
    at('+', right, 0);
    at('+', 0, bottom);
    at('+', right, bottom);
}
