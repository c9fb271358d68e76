use std::sync::{Mutex, OnceLock, PoisonError};

use image::RgbaImage;
use log::debug;

use crate::error::CollideError;
use crate::mask::{DEFAULT_OPACITY_THRESHOLD, OpacityMask};
use crate::rect::PixelRect;

/// One frame slot of a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub column: u32,
    pub row: u32,
}

impl Cell {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Grid of equally sized cells covering an atlas image.
///
/// Cells are numbered row-major from the top-left corner of the image, the
/// same way the renderer slices sprite sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl SheetLayout {
    /// Split a `width` x `height` image into `columns` x `rows` cells.
    ///
    /// The image must divide evenly, otherwise cells would not line up with
    /// the frames the renderer draws.
    pub fn new(
        name: &str,
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    ) -> Result<Self, CollideError> {
        if columns == 0
            || rows == 0
            || width % columns != 0
            || height % rows != 0
            || width == 0
            || height == 0
        {
            return Err(CollideError::InvalidLayout {
                name: name.to_string(),
                width,
                height,
                columns,
                rows,
            });
        }

        Ok(Self {
            columns,
            rows,
            cell_width: width / columns,
            cell_height: height / rows,
        })
    }

    /// Reject cells outside the sheet
    pub fn check_cell(&self, cell: Cell) -> Result<(), CollideError> {
        if cell.column >= self.columns || cell.row >= self.rows {
            return Err(CollideError::InvalidCell {
                column: cell.column,
                row: cell.row,
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(())
    }

    /// Image-space rectangle covered by a cell
    pub fn cell_rect(&self, cell: Cell) -> PixelRect {
        PixelRect::new(
            i64::from(cell.column) * i64::from(self.cell_width),
            i64::from(cell.row) * i64::from(self.cell_height),
            self.cell_width,
            self.cell_height,
        )
    }

    /// Map an offset from a sprite's bottom-left corner to an image texel.
    ///
    /// World space is y-up while images are stored top row first, so the
    /// vertical offset is flipped inside the cell. Offsets are clamped to the
    /// cell, the result never lands in a neighbouring frame.
    #[inline]
    pub fn texel(&self, cell: Cell, dx: u32, dy: u32) -> (u32, u32) {
        let dx = dx.min(self.cell_width - 1);
        let dy = dy.min(self.cell_height - 1);
        (
            cell.column * self.cell_width + dx,
            cell.row * self.cell_height + (self.cell_height - 1 - dy),
        )
    }
}

/// A sprite-sheet image with its lazily built opacity mask.
///
/// The mask is built at most once for the lifetime of the atlas and never
/// changes afterwards, so any number of threads may read it.
#[derive(Debug)]
pub struct TextureAtlas {
    name: String,
    image: RgbaImage,
    layout: SheetLayout,
    threshold: u8,
    mask: OnceLock<OpacityMask>,
    build_lock: Mutex<()>,
}

impl TextureAtlas {
    /// Wrap a decoded image using the engine-wide opacity threshold
    pub fn from_image(
        name: impl Into<String>,
        image: RgbaImage,
        columns: u32,
        rows: u32,
    ) -> Result<Self, CollideError> {
        Self::with_threshold(name, image, columns, rows, DEFAULT_OPACITY_THRESHOLD)
    }

    pub(crate) fn with_threshold(
        name: impl Into<String>,
        image: RgbaImage,
        columns: u32,
        rows: u32,
        threshold: u8,
    ) -> Result<Self, CollideError> {
        let name = name.into();
        let layout = SheetLayout::new(&name, image.width(), image.height(), columns, rows)?;
        Ok(Self {
            name,
            image,
            layout,
            threshold,
            mask: OnceLock::new(),
            build_lock: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Build the opacity mask unless it already exists, and return it.
    ///
    /// Concurrent first calls wait on the build lock; only one of them scans
    /// the image. A failed build leaves no mask behind.
    pub fn ensure_mask(&self) -> Result<&OpacityMask, CollideError> {
        self.ensure_mask_with(OpacityMask::build)
    }

    fn ensure_mask_with<F>(&self, build: F) -> Result<&OpacityMask, CollideError>
    where
        F: FnOnce(&RgbaImage, u8) -> Result<OpacityMask, CollideError>,
    {
        if let Some(mask) = self.mask.get() {
            return Ok(mask);
        }

        // The guarded data is (), a poisoned lock carries no broken state
        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(mask) = self.mask.get() {
            return Ok(mask);
        }

        let mask = build(&self.image, self.threshold)?;
        debug!(
            "Built opacity mask for '{}' ({}x{}, {} opaque texels)",
            self.name,
            mask.width(),
            mask.height(),
            mask.opaque_count()
        );
        Ok(self.mask.get_or_init(|| mask))
    }

    /// The mask, if it has been built
    pub fn built_mask(&self) -> Option<&OpacityMask> {
        self.mask.get()
    }

    pub fn has_mask(&self) -> bool {
        self.mask.get().is_some()
    }

    /// Whether absolute atlas texel (x, y) is opaque.
    ///
    /// Reads as transparent before the mask is built and outside the image.
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        self.mask.get().is_some_and(|mask| mask.is_opaque(x, y))
    }
}
