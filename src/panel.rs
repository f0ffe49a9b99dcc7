use image::RgbaImage;
use log::debug;

use crate::text::{SheetFont, draw_char_scaled, fill_rect};

// ── Panel ────────────────────────────────────────────────────────────────────

/// A fixed-size character buffer drawn through a [`SheetFont`].
///
/// Text is written at a cursor that wraps at the right edge; writes past the
/// last row are dropped. Drawing optionally clears the panel's area first.
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    /// Top-left corner on the target image, in pixels.
    pub x: i32,
    pub y: i32,
    /// Tint applied to every glyph.
    pub font_color: [u8; 4],
    /// Background blended under the text, if any.
    pub erase_color: Option<[u8; 4]>,
    /// Integer pixel magnification.
    pub scale: u32,
    cols: u32,
    rows: u32,
    chars: Vec<Vec<char>>,
    cursor_x: u32,
    cursor_y: u32,
}

impl Panel {
    /// A blank `cols × rows` panel with the cursor at the top-left cell.
    pub fn new(
        x: i32,
        y: i32,
        cols: u32,
        rows: u32,
        font_color: [u8; 4],
        erase_color: Option<[u8; 4]>,
    ) -> Self {
        Self {
            x,
            y,
            font_color,
            erase_color,
            scale: 1,
            cols,
            rows,
            chars: vec![vec![' '; cols as usize]; rows as usize],
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cursor(&self) -> (u32, u32) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn set_cursor(&mut self, col: u32, row: u32) {
        self.cursor_x = col;
        self.cursor_y = row;
    }

    pub fn char_at(&self, col: u32, row: u32) -> Option<char> {
        self.chars.get(row as usize)?.get(col as usize).copied()
    }

    /// One row of the buffer as a string, trailing blanks included.
    pub fn row_text(&self, row: u32) -> Option<String> {
        self.chars.get(row as usize).map(|r| r.iter().collect())
    }

    /// Blank every cell and home the cursor.
    pub fn clear(&mut self) {
        for row in &mut self.chars {
            row.fill(' ');
        }
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    /// Store `ch` at `(col, row)` without touching the cursor.
    ///
    /// Returns `false` when the cell is outside the panel.
    pub fn put_char(&mut self, ch: char, col: u32, row: u32) -> bool {
        match self.chars.get_mut(row as usize).and_then(|r| r.get_mut(col as usize)) {
            Some(cell) => {
                *cell = ch;
                true
            }
            None => false,
        }
    }

    /// Write `s` at the cursor, wrapping at the right edge.
    ///
    /// `'\n'` starts a new row. Characters that would land below the last row
    /// are dropped.
    pub fn write_str(&mut self, s: &str) {
        for ch in s.chars() {
            if ch == '\n' {
                self.cursor_x = 0;
                self.cursor_y = self.cursor_y.saturating_add(1);
                continue;
            }
            if self.cursor_x >= self.cols {
                self.cursor_x = 0;
                self.cursor_y = self.cursor_y.saturating_add(1);
            }
            if !self.put_char(ch, self.cursor_x, self.cursor_y) {
                debug!(
                    "panel: dropping {ch:?} at ({}, {}) outside {}x{}",
                    self.cursor_x, self.cursor_y, self.cols, self.rows
                );
                return;
            }
            self.cursor_x += 1;
        }
    }

    /// Outline a `w × h` box of `+`, `-` and `|` whose top-left cell is `(col, row)`.
    ///
    /// Parts falling outside the panel are clipped.
    pub fn write_box(&mut self, col: u32, row: u32, w: u32, h: u32) {
        if w == 0 || h == 0 {
            return;
        }
        let right = col.saturating_add(w - 1);
        let bottom = row.saturating_add(h - 1);
        for cx in col.saturating_add(1)..right {
            self.put_char('-', cx, row);
            self.put_char('-', cx, bottom);
        }
        for cy in row.saturating_add(1)..bottom {
            self.put_char('|', col, cy);
            self.put_char('|', right, cy);
        }
        self.put_char('+', col, row);
        self.put_char('+', right, row);
        self.put_char('+', col, bottom);
        self.put_char('+', right, bottom);
    }

    /// Size of the drawn panel in pixels.
    pub fn pixel_size(&self, font: &SheetFont) -> (u32, u32) {
        let grid = font.grid();
        (
            self.cols.saturating_mul(grid.cell_width).saturating_mul(self.scale),
            self.rows.saturating_mul(grid.cell_height).saturating_mul(self.scale),
        )
    }

    /// Draw the buffer onto `target`, erasing the panel's area first if
    /// `erase_color` is set.
    pub fn draw(&self, target: &mut RgbaImage, font: &SheetFont) {
        if let Some(color) = self.erase_color {
            let (w, h) = self.pixel_size(font);
            fill_rect(target, self.x, self.y, w, h, color);
        }

        let grid = font.grid();
        let step_x = grid.cell_width as i64 * self.scale as i64;
        let step_y = grid.cell_height as i64 * self.scale as i64;
        for (row, line) in self.chars.iter().enumerate() {
            for (col, &ch) in line.iter().enumerate() {
                if ch == ' ' {
                    continue;
                }
                let px = self.x as i64 + col as i64 * step_x;
                let py = self.y as i64 + row as i64 * step_y;
                let (Ok(px), Ok(py)) = (i32::try_from(px), i32::try_from(py)) else {
                    continue;
                };
                draw_char_scaled(target, font, ch, px, py, self.font_color, self.scale);
            }
        }
    }
}
