/// An axis-aligned rectangle on the integer pixel grid.
///
/// Covers the half-open ranges `[x, x + width)` and `[y, y + height)`, so two
/// rectangles that only share an edge do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i64 {
        self.x + i64::from(self.width)
    }

    /// Exclusive far edge on the y axis
    pub fn bottom(&self) -> i64 {
        self.y + i64::from(self.height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Check if this rectangle shares a non-zero area with another
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Overlapping region of two rectangles, `None` when the overlap has zero area
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        // Both spans are positive and bounded by the narrower input
        Some(PixelRect {
            x,
            y,
            width: u32::try_from(right - x).ok()?,
            height: u32::try_from(bottom - y).ok()?,
        })
    }
}
