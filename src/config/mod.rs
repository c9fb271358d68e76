mod load;
mod types;

pub use load::{LoadedConfig, NamedSprite};
pub use types::{AtlasEntry, SceneConfig, SpriteEntry};
