use serde::{Deserialize, Serialize};

use crate::mask::DEFAULT_OPACITY_THRESHOLD;

/// A sprite sheet used by the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasEntry {
    /// Name sprites refer to the atlas by
    pub name: String,
    /// Image path, relative to the scene file
    pub path: String,
    /// Number of cell columns in the sheet
    pub columns: u32,
    /// Number of cell rows in the sheet
    pub rows: u32,
}

impl Default for AtlasEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            path: String::new(),
            columns: 1,
            rows: 1,
        }
    }
}

/// One placed sprite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteEntry {
    /// Label used when reporting collisions
    pub name: String,
    /// Name of the atlas the sprite is drawn from
    pub atlas: String,
    /// Cell as [column, row]
    pub cell: [u32; 2],
    /// World-space bottom-left corner as [x, y]
    pub position: [f64; 2],
}

/// Scene file structure.
///
/// All paths in the scene are relative to the scene file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene file version (currently 1)
    pub version: u32,
    /// Alpha value at or below which texels are transparent
    pub opacity_threshold: u8,
    /// Sprite sheets to load
    pub atlases: Vec<AtlasEntry>,
    /// Sprites to test against each other
    pub sprites: Vec<SpriteEntry>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: 1,
            opacity_threshold: DEFAULT_OPACITY_THRESHOLD,
            atlases: Vec::new(),
            sprites: Vec::new(),
        }
    }
}
