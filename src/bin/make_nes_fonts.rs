// NES arcade character set.
// Run from the directory holding nes-arcade-font-2-1-monospaced.ttf.

use glyphgrid::{SheetSpec, rasterize_all};

fn sheets() -> Vec<SheetSpec> {
    vec![
        SheetSpec::new("nes-arcade-font-2-1-monospaced.ttf", "nes.png", 7.0, 8, 8, 16, 6, 32, 127)
            .with_offset(0, -4),
    ]
}

fn main() {
    glyphgrid::init_logging();
    if let Err(e) = rasterize_all(&sheets()) {
        log::error!("make_nes_fonts: {e}");
        std::process::exit(1);
    }
}
