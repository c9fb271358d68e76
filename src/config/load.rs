use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::DVec2;
use log::warn;

use super::types::SceneConfig;
use crate::atlas::{AtlasSource, Cell, TextureAtlas};
use crate::collision::SpriteRef;
use crate::error::CollideError;

/// A loaded scene file with its associated directory.
///
/// Paths in the scene are relative to the scene file location,
/// so we need to track where the scene was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed scene
    pub config: SceneConfig,
    /// The directory containing the scene file
    pub config_dir: PathBuf,
}

/// A scene sprite bound to its loaded atlas
#[derive(Debug)]
pub struct NamedSprite<'a> {
    pub name: String,
    pub sprite: SpriteRef<'a>,
}

impl LoadedConfig {
    /// Load a scene file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file: {}", path.display()))?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self::parse(&content, config_dir)
            .with_context(|| format!("failed to parse scene file: {}", path.display()))
    }

    /// Parse scene JSON whose relative paths start at `config_dir`.
    pub fn parse(content: &str, config_dir: PathBuf) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(content)?;

        if config.version != 1 {
            warn!(
                "Scene file version {} is not known, reading it as version 1",
                config.version
            );
        }

        Ok(Self { config, config_dir })
    }

    /// Atlas images to load, with paths resolved against the scene directory.
    pub fn atlas_sources(&self) -> Vec<AtlasSource> {
        self.config
            .atlases
            .iter()
            .map(|entry| AtlasSource {
                name: entry.name.clone(),
                path: self.config_dir.join(&entry.path),
                columns: entry.columns,
                rows: entry.rows,
            })
            .collect()
    }

    /// Bind every scene sprite to its atlas.
    ///
    /// Fails on sprites naming an atlas that is not loaded, or a cell that
    /// does not exist in it.
    pub fn resolve_sprites<'a>(
        &self,
        atlases: &'a [TextureAtlas],
    ) -> Result<Vec<NamedSprite<'a>>> {
        self.config
            .sprites
            .iter()
            .map(|entry| -> Result<NamedSprite<'a>> {
                let Some(atlas) = atlases.iter().find(|atlas| atlas.name() == entry.atlas)
                else {
                    warn!(
                        "Rejecting sprite '{}': atlas '{}' is not loaded",
                        entry.name, entry.atlas
                    );
                    return Err(CollideError::UnknownAtlas {
                        sprite: entry.name.clone(),
                        atlas: entry.atlas.clone(),
                    }
                    .into());
                };

                let cell = Cell::new(entry.cell[0], entry.cell[1]);
                if let Err(err) = atlas.layout().check_cell(cell) {
                    warn!("Rejecting sprite '{}': {}", entry.name, err);
                    return Err(anyhow::Error::new(err)
                        .context(format!("invalid cell for sprite '{}'", entry.name)));
                }

                Ok(NamedSprite {
                    name: entry.name.clone(),
                    sprite: SpriteRef::new(
                        atlas,
                        cell,
                        DVec2::new(entry.position[0], entry.position[1]),
                    ),
                })
            })
            .collect()
    }
}
