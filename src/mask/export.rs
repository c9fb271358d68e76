use std::io::Cursor;
use std::path::Path;

use anyhow::Result;
use image::{GrayImage, ImageFormat, Luma};

use super::OpacityMask;
use crate::error::CollideError;

/// Render a mask as a grayscale image, white where opaque
pub fn mask_to_image(mask: &OpacityMask) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.is_opaque(x, y) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Save a mask as a black and white PNG
pub fn write_mask_image(mask: &OpacityMask, path: &Path) -> Result<()> {
    let mut png_data = Cursor::new(Vec::new());
    mask_to_image(mask)
        .write_to(&mut png_data, ImageFormat::Png)
        .map_err(|e| CollideError::ImageSave {
            path: path.to_path_buf(),
            source: e,
        })?;

    std::fs::write(path, png_data.into_inner()).map_err(|e| CollideError::ImageSave {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;

    Ok(())
}
