use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollideError {
    #[error("Failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error(
        "Atlas '{name}' ({width}x{height}) cannot be split into {columns}x{rows} equal cells"
    )]
    InvalidLayout {
        name: String,
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    },

    #[error("Cell ({column}, {row}) is outside the {columns}x{rows} sprite sheet")]
    InvalidCell {
        column: u32,
        row: u32,
        columns: u32,
        rows: u32,
    },

    #[error("Sprite position ({x}, {y}) is not a usable world coordinate")]
    InvalidPosition { x: f64, y: f64 },

    #[error("Opacity masks built with different thresholds ({a} and {b}) cannot be compared")]
    ThresholdMismatch { a: u8, b: u8 },

    #[error("Failed to allocate opacity mask for {width}x{height} atlas: {source}")]
    MaskAlloc {
        width: u32,
        height: u32,
        source: TryReserveError,
    },

    #[error("Sprite '{sprite}' references unknown atlas '{atlas}'")]
    UnknownAtlas { sprite: String, atlas: String },
}
