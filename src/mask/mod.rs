mod bits;
mod export;

pub use bits::{DEFAULT_OPACITY_THRESHOLD, OpacityMask};
pub use export::{mask_to_image, write_mask_image};
