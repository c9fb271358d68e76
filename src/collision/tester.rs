use glam::DVec2;

use crate::atlas::{Cell, SheetLayout, TextureAtlas};
use crate::error::CollideError;
use crate::mask::OpacityMask;
use crate::rect::PixelRect;

/// Largest distance from the origin a sprite may be placed at.
///
/// Every integer up to 2^53 is exact in an f64, and rectangle edges stay far
/// from the i64 limits.
pub const MAX_WORLD_COORDINATE: f64 = 9_007_199_254_740_992.0;

/// Anything the tester can read sprite-sheet geometry and opacity from
pub trait OpacitySource {
    fn layout(&self) -> &SheetLayout;

    /// The opacity mask, built on first use
    fn mask(&self) -> Result<&OpacityMask, CollideError>;
}

impl OpacitySource for TextureAtlas {
    fn layout(&self) -> &SheetLayout {
        TextureAtlas::layout(self)
    }

    fn mask(&self) -> Result<&OpacityMask, CollideError> {
        self.ensure_mask()
    }
}

/// One sprite instance as drawn this frame
#[derive(Debug)]
pub struct SpriteRef<'a, A: OpacitySource + ?Sized = TextureAtlas> {
    pub atlas: &'a A,
    pub cell: Cell,
    /// World-space bottom-left corner
    pub position: DVec2,
}

// Derived impls would require `A: Clone`
impl<A: OpacitySource + ?Sized> Clone for SpriteRef<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: OpacitySource + ?Sized> Copy for SpriteRef<'_, A> {}

impl<'a, A: OpacitySource + ?Sized> SpriteRef<'a, A> {
    pub fn new(atlas: &'a A, cell: Cell, position: DVec2) -> Self {
        Self {
            atlas,
            cell,
            position,
        }
    }

    /// World-space pixel rectangle covered by the sprite's cell.
    ///
    /// Fails for positions that are not finite or lie beyond
    /// [`MAX_WORLD_COORDINATE`].
    pub fn bounds(&self) -> Result<PixelRect, CollideError> {
        let DVec2 { x, y } = self.position;
        let (Some(px), Some(py)) = (snap(x), snap(y)) else {
            return Err(CollideError::InvalidPosition { x, y });
        };

        let layout = self.atlas.layout();
        Ok(PixelRect::new(px, py, layout.cell_width, layout.cell_height))
    }
}

/// Whether the opaque pixels of two sprites overlap.
///
/// Sprites whose rectangles are apart (or only touch) are rejected without
/// reading any opacity data. Otherwise the shared rectangle is scanned and
/// the first pixel that is opaque in both sprites ends the search.
///
/// A cell outside its atlas or an unusable position is an error, even when
/// the sprites are far apart. So is comparing masks built with different
/// opacity thresholds.
pub fn collide<A, B>(a: &SpriteRef<'_, A>, b: &SpriteRef<'_, B>) -> Result<bool, CollideError>
where
    A: OpacitySource + ?Sized,
    B: OpacitySource + ?Sized,
{
    let layout_a = a.atlas.layout();
    let layout_b = b.atlas.layout();
    layout_a.check_cell(a.cell)?;
    layout_b.check_cell(b.cell)?;

    let rect_a = a.bounds()?;
    let rect_b = b.bounds()?;
    if !rect_a.intersects(&rect_b) {
        return Ok(false);
    }
    let Some(overlap) = rect_a.intersection(&rect_b) else {
        return Ok(false);
    };

    let mask_a = a.atlas.mask()?;
    let mask_b = b.atlas.mask()?;
    if mask_a.threshold() != mask_b.threshold() {
        return Err(CollideError::ThresholdMismatch {
            a: mask_a.threshold(),
            b: mask_b.threshold(),
        });
    }

    for y in overlap.y..overlap.bottom() {
        let dy_a = offset(y - rect_a.y);
        let dy_b = offset(y - rect_b.y);

        for x in overlap.x..overlap.right() {
            let (ax, ay) = layout_a.texel(a.cell, offset(x - rect_a.x), dy_a);
            if !mask_a.is_opaque(ax, ay) {
                continue;
            }
            let (bx, by) = layout_b.texel(b.cell, offset(x - rect_b.x), dy_b);
            if mask_b.is_opaque(bx, by) {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// [`collide`] for callers holding loose atlas, cell and position values
pub fn collide_sprites(
    atlas_a: &TextureAtlas,
    cell_a: Cell,
    position_a: DVec2,
    atlas_b: &TextureAtlas,
    cell_b: Cell,
    position_b: DVec2,
) -> Result<bool, CollideError> {
    collide(
        &SpriteRef::new(atlas_a, cell_a, position_a),
        &SpriteRef::new(atlas_b, cell_b, position_b),
    )
}

/// Snap a world coordinate to the pixel containing it
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn snap(v: f64) -> Option<i64> {
    // Rejects NaN and infinities too
    if v.abs() <= MAX_WORLD_COORDINATE {
        Some(v.floor() as i64)
    } else {
        None
    }
}

/// Offset of a pixel inside a rectangle it belongs to
#[inline]
fn offset(d: i64) -> u32 {
    u32::try_from(d).unwrap_or(u32::MAX)
}
