// Apple II character sets: 40-column, 40-column block graphics, 80-column.
// Run from the directory holding PrintChar21.ttf and PRNumber3.ttf.

use glyphgrid::{SheetSpec, rasterize_all};

fn sheets() -> Vec<SheetSpec> {
    vec![
        SheetSpec::new("PrintChar21.ttf", "40col.png", 8.0, 6, 8, 16, 6, 32, 127)
            .with_offset(-1, 0),
        // Box drawing and block elements, U+2500..U+259F.
        SheetSpec::new("PrintChar21.ttf", "40col_hi.png", 8.0, 6, 8, 16, 10, 0x2500, 0x259F),
        SheetSpec::new("PRNumber3.ttf", "80col.png", 16.0, 6, 17, 16, 6, 32, 127),
    ]
}

fn main() {
    glyphgrid::init_logging();
    if let Err(e) = rasterize_all(&sheets()) {
        log::error!("make_apple_fonts: {e}");
        std::process::exit(1);
    }
}
