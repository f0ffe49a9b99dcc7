use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building a sprite sheet.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("failed to read font {path:?}: {source}")]
    FontLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} is not a usable TrueType/OpenType font")]
    FontParse { path: PathBuf },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("code {0:#x} is not a Unicode scalar value")]
    InvalidCodePoint(u32),

    #[error("failed to write image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("malformed sheet description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RasterError>;
