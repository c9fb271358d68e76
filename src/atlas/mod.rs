mod loader;
mod types;

pub use loader::{AtlasLoader, AtlasSource, preload_masks};
pub use types::{Cell, SheetLayout, TextureAtlas};
