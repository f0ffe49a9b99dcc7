use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use log::{info, trace};
use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};
use crate::font::GlyphFont;
use crate::grid::{CodeRange, GridLayout, Offset};

fn default_fill() -> [u8; 3] {
    [0xFF, 0xFF, 0xFF]
}

// ── SheetSpec ────────────────────────────────────────────────────────────────

/// Everything needed to produce one sprite sheet.
///
/// Deserialises from JSON such as:
///
/// ```json
/// {
///   "font": "PrintChar21.ttf", "output": "40col.png", "size": 8,
///   "grid": { "cell_width": 6, "cell_height": 8, "cells_x": 16, "cells_y": 6 },
///   "range": { "begin": 32, "end": 127 },
///   "offset": { "x": -1, "y": 0 }
/// }
/// ```
///
/// `offset` defaults to `(0, 0)`, `fill` to white and `glyph_map` to none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetSpec {
    /// Font file to rasterize.
    pub font: PathBuf,
    /// PNG to create or overwrite.
    pub output: PathBuf,
    /// Font size in pixels per em.
    pub size: f32,
    pub grid: GridLayout,
    pub range: CodeRange,
    #[serde(default)]
    pub offset: Offset,
    /// Glyph colour; coverage goes into alpha.
    #[serde(default = "default_fill")]
    pub fill: [u8; 3],
    /// Optional char-keyed JSON describing where each glyph landed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph_map: Option<PathBuf>,
}

impl SheetSpec {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        font: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        size: f32,
        cell_width: u32,
        cell_height: u32,
        cells_x: u32,
        cells_y: u32,
        begin: u32,
        end: u32,
    ) -> Self {
        Self {
            font: font.into(),
            output: output.into(),
            size,
            grid: GridLayout::new(cell_width, cell_height, cells_x, cells_y),
            range: CodeRange::new(begin, end),
            offset: Offset::default(),
            fill: default_fill(),
            glyph_map: None,
        }
    }

    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset = Offset::new(x, y);
        self
    }

    pub fn with_fill(mut self, fill: [u8; 3]) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_glyph_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.glyph_map = Some(path.into());
        self
    }

    /// Deserialise a single sheet from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the grid and range before any work is done.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate().map_err(RasterError::InvalidGrid)?;
        if self.range.begin > self.range.end {
            return Err(RasterError::InvalidGrid(format!(
                "range begins at {} but ends at {}",
                self.range.begin, self.range.end
            )));
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(RasterError::InvalidGrid(format!(
                "font size must be positive, got {}",
                self.size
            )));
        }
        Ok(())
    }
}

/// Read a JSON array of sheets from `path`.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<SheetSpec>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| RasterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

// ── render / rasterize ───────────────────────────────────────────────────────

/// Draw every in-range glyph onto a fresh transparent canvas.
pub fn render(spec: &SheetSpec) -> Result<RgbaImage> {
    spec.validate()?;
    let font = GlyphFont::load(&spec.font, spec.size)?;

    // validate() has already rejected overflowing grids.
    let (w, h) = spec
        .grid
        .canvas_size()
        .ok_or_else(|| RasterError::InvalidGrid("canvas overflows".into()))?;
    let mut canvas = RgbaImage::new(w, h);

    for cell in spec.grid.cells(spec.range) {
        let ch = char::from_u32(cell.code).ok_or(RasterError::InvalidCodePoint(cell.code))?;
        let (x, y) = spec.grid.origin(cell.col, cell.row, spec.offset);
        trace!("sheet: {ch:?} at cell ({}, {}) -> ({x}, {y})", cell.col, cell.row);
        font.draw_char(&mut canvas, ch, x, y, spec.fill);
    }

    Ok(canvas)
}

/// Render the sheet and write it to `spec.output` as PNG.
///
/// Also writes the glyph map when `spec.glyph_map` is set.
pub fn rasterize(spec: &SheetSpec) -> Result<()> {
    let canvas = render(spec)?;
    canvas
        .save_with_format(&spec.output, ImageFormat::Png)
        .map_err(|source| RasterError::Image { path: spec.output.clone(), source })?;
    info!(
        "sheet: wrote {:?} ({}x{}, {} glyphs from {:?})",
        spec.output,
        canvas.width(),
        canvas.height(),
        spec.grid.cells(spec.range).count(),
        spec.font
    );

    if let Some(map_path) = &spec.glyph_map {
        write_glyph_map(spec, map_path)?;
    }
    Ok(())
}

/// Rasterize each sheet in order, stopping at the first failure.
pub fn rasterize_all(specs: &[SheetSpec]) -> Result<()> {
    specs.iter().try_for_each(rasterize)
}

// ── Glyph map ────────────────────────────────────────────────────────────────

/// Pixel rectangle of one glyph in the sheet, keyed by its character in the map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasEntry {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Row-major cell index.
    pub index: u32,
}

/// Map every drawn character to its cell rectangle.
///
/// Codes that are not Unicode scalar values have no key and are left out. A grid
/// whose canvas overflows `u32` yields an empty map.
pub fn glyph_map(spec: &SheetSpec) -> BTreeMap<String, AtlasEntry> {
    let grid = &spec.grid;
    grid.cells(spec.range)
        .filter_map(|cell| {
            let ch = char::from_u32(cell.code)?;
            let rect = grid.source_rect(spec.range, cell.code)?;
            Some((ch.to_string(), AtlasEntry {
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
                index: cell.code - spec.range.begin,
            }))
        })
        .collect()
}

/// Write [`glyph_map`] to `path` as pretty-printed JSON.
pub fn write_glyph_map(spec: &SheetSpec, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&glyph_map(spec))?;
    std::fs::write(path, json).map_err(|source| RasterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("sheet: wrote glyph map {path:?}");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_fills_in_defaults() {
        let spec = SheetSpec::from_json(
            r#"{
                "font": "nes.ttf", "output": "nes.png", "size": 7,
                "grid": { "cell_width": 8, "cell_height": 8, "cells_x": 16, "cells_y": 6 },
                "range": { "begin": 32, "end": 127 }
            }"#,
        )
        .unwrap();
        assert_eq!(spec.offset, Offset::default());
        assert_eq!(spec.fill, [255, 255, 255]);
        assert!(spec.glyph_map.is_none());
        assert_eq!(spec, SheetSpec::new("nes.ttf", "nes.png", 7.0, 8, 8, 16, 6, 32, 127));
    }

    #[test]
    fn from_json_reads_offset_and_fill() {
        let spec = SheetSpec::from_json(
            r#"{
                "font": "a.ttf", "output": "a.png", "size": 8,
                "grid": { "cell_width": 6, "cell_height": 8, "cells_x": 16, "cells_y": 6 },
                "range": { "begin": 32, "end": 127 },
                "offset": { "x": -1, "y": 2 },
                "fill": [0, 255, 0]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.offset, Offset::new(-1, 2));
        assert_eq!(spec.fill, [0, 255, 0]);
    }

    #[test]
    fn from_json_missing_field_is_error() {
        assert!(SheetSpec::from_json(r#"{ "font": "a.ttf" }"#).is_err());
    }

    #[test]
    fn validate_rejects_reversed_range() {
        let spec = SheetSpec::new("a.ttf", "a.png", 8.0, 6, 8, 16, 6, 127, 32);
        assert!(matches!(spec.validate(), Err(RasterError::InvalidGrid(_))));
    }

    #[test]
    fn validate_rejects_non_positive_size() {
        let spec = SheetSpec::new("a.ttf", "a.png", 0.0, 6, 8, 16, 6, 32, 127);
        assert!(matches!(spec.validate(), Err(RasterError::InvalidGrid(_))));
    }

    #[test]
    fn glyph_map_keys_are_single_chars() {
        let spec = SheetSpec::new("a.ttf", "a.png", 8.0, 6, 8, 16, 6, 32, 127);
        let map = glyph_map(&spec);
        assert_eq!(map.len(), 96);
        assert!(map.keys().all(|k| k.chars().count() == 1));
        assert_eq!(map["A"], AtlasEntry { x: 6, y: 16, w: 6, h: 8, index: 33 });
    }

    #[test]
    fn glyph_map_of_overflowing_grid_is_empty() {
        let spec = SheetSpec::new("a.ttf", "a.png", 8.0, 1 << 31, 8, 3, 1, 0, 10);
        assert!(glyph_map(&spec).is_empty());
    }

    #[test]
    fn glyph_map_skips_surrogates() {
        let spec = SheetSpec::new("a.ttf", "a.png", 8.0, 6, 8, 4, 1, 0xD7FF, 0xD802);
        let map = glyph_map(&spec);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("\u{D7FF}"));
    }
}
