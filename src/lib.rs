pub mod error;
pub mod font;
pub mod grid;
pub mod panel;
pub mod sheet;
pub mod text;

pub use error::{RasterError, Result};
pub use font::GlyphFont;
pub use grid::{Cell, CellRect, CodeRange, GridLayout, Offset};
pub use panel::Panel;
pub use sheet::{AtlasEntry, SheetSpec, glyph_map, load_manifest, rasterize, rasterize_all, render};
pub use text::{SheetFont, draw_box, draw_char, draw_string};

/// Set up `env_logger` for the sheet drivers; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
