use serde::{Deserialize, Serialize};

// ── CodeRange / Offset ───────────────────────────────────────────────────────

/// Inclusive range of character codes placed on a sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRange {
    pub begin: u32,
    pub end: u32,
}

impl CodeRange {
    pub fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }

    pub fn contains(&self, code: u32) -> bool {
        self.begin <= code && code <= self.end
    }

    /// Number of codes in the range; zero when `begin > end`.
    pub fn len(&self) -> u32 {
        if self.begin > self.end { 0 } else { self.end - self.begin + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Signed pixel nudge applied to every glyph's draw position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ── Cell / CellRect ──────────────────────────────────────────────────────────

/// One drawable grid slot, as yielded by [`GridLayout::cells`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
    pub code: u32,
}

/// Pixel rectangle of a cell inside the sheet image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

// ── GridLayout ───────────────────────────────────────────────────────────────

/// Geometry of a fixed-grid sprite sheet.
///
/// Cells are numbered in row-major order: the cell at `(col, row)` holds code
/// `cells_x * row + col + range.begin`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub cell_width: u32,
    pub cell_height: u32,
    pub cells_x: u32,
    pub cells_y: u32,
}

impl GridLayout {
    pub fn new(cell_width: u32, cell_height: u32, cells_x: u32, cells_y: u32) -> Self {
        Self { cell_width, cell_height, cells_x, cells_y }
    }

    /// Sheet size in pixels, or `None` if it does not fit in `u32`.
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        let w = self.cell_width.checked_mul(self.cells_x)?;
        let h = self.cell_height.checked_mul(self.cells_y)?;
        Some((w, h))
    }

    /// Total number of slots on the sheet.
    pub fn cell_count(&self) -> u64 {
        self.cells_x as u64 * self.cells_y as u64
    }

    /// Rejects zero-sized cells or grids and canvases that overflow.
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(format!(
                "cell size must be positive, got {}x{}",
                self.cell_width, self.cell_height
            ));
        }
        if self.cells_x == 0 || self.cells_y == 0 {
            return Err(format!(
                "cell counts must be positive, got {}x{}",
                self.cells_x, self.cells_y
            ));
        }
        if self.canvas_size().is_none() {
            return Err(format!(
                "canvas of {}x{} cells at {}x{}px overflows",
                self.cells_x, self.cells_y, self.cell_width, self.cell_height
            ));
        }
        Ok(())
    }

    /// Code held by the slot at `(col, row)`, whether or not it is in range.
    pub fn code_at(&self, col: u32, row: u32, range: CodeRange) -> u64 {
        self.cells_x as u64 * row as u64 + col as u64 + range.begin as u64
    }

    /// In-range cells in row-major order.
    ///
    /// Slots whose code falls past `range.end` are skipped and stay blank.
    pub fn cells(&self, range: CodeRange) -> impl Iterator<Item = Cell> + '_ {
        (0..self.cells_y).flat_map(move |row| {
            (0..self.cells_x).filter_map(move |col| {
                let code = self.code_at(col, row, range);
                let code = u32::try_from(code).ok()?;
                range.contains(code).then_some(Cell { col, row, code })
            })
        })
    }

    /// Top-left draw position for the glyph in `(col, row)`.
    ///
    /// Saturates at the `i32` limits; anything that far out is off-canvas anyway.
    pub fn origin(&self, col: u32, row: u32, offset: Offset) -> (i32, i32) {
        let x = col as i64 * self.cell_width as i64 + offset.x as i64;
        let y = row as i64 * self.cell_height as i64 + offset.y as i64;
        (saturate_i32(x), saturate_i32(y))
    }

    /// Inverse of [`cells`](Self::cells): the `(col, row)` slot holding `code`.
    pub fn cell_for_code(&self, range: CodeRange, code: u32) -> Option<(u32, u32)> {
        if !range.contains(code) || self.cells_x == 0 {
            return None;
        }
        let index = code - range.begin;
        let col = index % self.cells_x;
        let row = index / self.cells_x;
        (row < self.cells_y).then_some((col, row))
    }

    /// Pixel rectangle of the cell holding `code`.
    ///
    /// `None` for grids whose canvas does not fit in `u32`.
    pub fn source_rect(&self, range: CodeRange, code: u32) -> Option<CellRect> {
        self.canvas_size()?;
        let (col, row) = self.cell_for_code(range, code)?;
        Some(CellRect {
            x: col * self.cell_width,
            y: row * self.cell_height,
            w: self.cell_width,
            h: self.cell_height,
        })
    }

    /// Returns (uv_min, uv_max) for the cell holding `code`.
    pub fn uv_for_code(&self, range: CodeRange, code: u32) -> Option<([f32; 2], [f32; 2])> {
        let rect = self.source_rect(range, code)?;
        let (total_w, total_h) = self.canvas_size()?;
        let total_w = total_w as f32;
        let total_h = total_h as f32;

        let u_min = rect.x as f32 / total_w;
        let v_min = rect.y as f32 / total_h;
        let u_max = (rect.x + rect.w) as f32 / total_w;
        let v_max = (rect.y + rect.h) as f32 / total_h;

        Some(([u_min, v_min], [u_max, v_max]))
    }
}

fn saturate_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> GridLayout {
        GridLayout::new(6, 8, 16, 6)
    }

    #[test]
    fn code_at_is_row_major_from_begin() {
        let g = apple();
        let r = CodeRange::new(32, 127);
        assert_eq!(g.code_at(0, 0, r), 32);
        assert_eq!(g.code_at(15, 0, r), 47);
        assert_eq!(g.code_at(0, 1, r), 48);
        assert_eq!(g.code_at(15, 5, r), 127);
    }

    #[test]
    fn cells_never_leave_the_grid() {
        let g = apple();
        for cell in g.cells(CodeRange::new(0, u32::MAX)) {
            assert!(cell.col < g.cells_x && cell.row < g.cells_y, "{cell:?} off grid");
        }
    }

    #[test]
    fn range_len_handles_reversed_bounds() {
        assert_eq!(CodeRange::new(5, 5).len(), 1);
        assert_eq!(CodeRange::new(6, 5).len(), 0);
        assert!(CodeRange::new(6, 5).is_empty());
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        assert!(GridLayout::new(0, 8, 16, 6).validate().is_err());
        assert!(GridLayout::new(6, 8, 16, 0).validate().is_err());
        assert!(apple().validate().is_ok());
    }

    #[test]
    fn origin_saturates_instead_of_wrapping() {
        let g = GridLayout::new(1 << 31, 1 << 31, 4, 4);
        assert_eq!(g.origin(3, 3, Offset::default()), (i32::MAX, i32::MAX));
        assert_eq!(g.origin(0, 0, Offset::new(-5, -5)), (-5, -5));
    }

    #[test]
    fn source_rect_on_overflowing_grid_is_none() {
        let g = GridLayout::new(1 << 31, 8, 3, 1);
        assert_eq!(g.source_rect(CodeRange::new(0, 10), 2), None);
        assert_eq!(g.uv_for_code(CodeRange::new(0, 10), 2), None);
    }

    #[test]
    fn validate_rejects_overflowing_canvas() {
        let g = GridLayout::new(u32::MAX, 8, 2, 1);
        assert!(g.canvas_size().is_none());
        assert!(g.validate().is_err());
    }
}
