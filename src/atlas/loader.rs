use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageReader;
use log::{debug, info};
use rayon::prelude::*;

use super::TextureAtlas;
use crate::error::CollideError;
use crate::mask::DEFAULT_OPACITY_THRESHOLD;

/// Where to find one atlas and how it is sliced
#[derive(Debug, Clone)]
pub struct AtlasSource {
    pub name: String,
    pub path: PathBuf,
    pub columns: u32,
    pub rows: u32,
}

/// Loads atlas images with one opacity threshold for all of them.
///
/// With eager masks (the default) every mask is built while loading, so the
/// first collision test against an atlas does no allocation.
pub struct AtlasLoader {
    pub opacity_threshold: u8,
    pub eager_masks: bool,
}

impl Default for AtlasLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AtlasLoader {
    pub fn new() -> Self {
        Self {
            opacity_threshold: DEFAULT_OPACITY_THRESHOLD,
            eager_masks: true,
        }
    }

    pub fn opacity_threshold(mut self, threshold: u8) -> Self {
        self.opacity_threshold = threshold;
        self
    }

    pub fn eager_masks(mut self, eager: bool) -> Self {
        self.eager_masks = eager;
        self
    }

    /// Decode a single sprite sheet from disk
    pub fn load(
        &self,
        name: impl Into<String>,
        path: &Path,
        columns: u32,
        rows: u32,
    ) -> Result<TextureAtlas> {
        if !path.exists() {
            return Err(CollideError::InputNotFound(path.to_path_buf()).into());
        }

        let image = ImageReader::open(path)
            .map_err(|e| CollideError::ImageLoad {
                path: path.to_path_buf(),
                source: e.into(),
            })?
            .decode()
            .map_err(|e| CollideError::ImageLoad {
                path: path.to_path_buf(),
                source: e,
            })?
            .into_rgba8();

        self.prepare(name, image, columns, rows)
            .with_context(|| format!("failed to prepare atlas: {}", path.display()))
    }

    /// Wrap an already decoded image
    pub fn prepare(
        &self,
        name: impl Into<String>,
        image: image::RgbaImage,
        columns: u32,
        rows: u32,
    ) -> Result<TextureAtlas> {
        let atlas =
            TextureAtlas::with_threshold(name, image, columns, rows, self.opacity_threshold)?;

        if self.eager_masks {
            atlas.ensure_mask()?;
        }

        let layout = atlas.layout();
        debug!(
            "Loaded atlas '{}' ({}x{}, {}x{} cells of {}x{})",
            atlas.name(),
            atlas.width(),
            atlas.height(),
            layout.columns,
            layout.rows,
            layout.cell_width,
            layout.cell_height
        );

        Ok(atlas)
    }

    /// Load several atlases in parallel, preserving input order
    pub fn load_all(&self, sources: &[AtlasSource]) -> Result<Vec<TextureAtlas>> {
        info!("Loading {} atlases...", sources.len());

        let atlases: Result<Vec<_>> = sources
            .par_iter()
            .map(|source| self.load(&source.name, &source.path, source.columns, source.rows))
            .collect();

        atlases
    }
}

/// Build the masks of atlases that were loaded lazily
pub fn preload_masks(atlases: &[TextureAtlas]) -> Result<(), CollideError> {
    atlases
        .par_iter()
        .try_for_each(|atlas| atlas.ensure_mask().map(|_| ()))
}
