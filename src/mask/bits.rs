use image::RgbaImage;

use crate::error::CollideError;
use crate::rect::PixelRect;

/// Alpha value at or below which a texel counts as transparent.
///
/// Shared by every atlas so that all sprites collide under the same rule.
pub const DEFAULT_OPACITY_THRESHOLD: u8 = 0;

const WORD_BITS: u64 = 64;

/// One bit per texel of an atlas image, set where the texel is opaque.
///
/// Bits are stored row-major in image orientation (row 0 is the top of the
/// image), packed into 64-bit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpacityMask {
    width: u32,
    height: u32,
    threshold: u8,
    words: Vec<u64>,
}

impl OpacityMask {
    /// Threshold every texel's alpha channel into a packed bit mask.
    ///
    /// Storage is reserved up front; if that fails no mask is produced.
    pub fn build(image: &RgbaImage, threshold: u8) -> Result<Self, CollideError> {
        let (width, height) = image.dimensions();
        let texels = u64::from(width) * u64::from(height);
        // An unrepresentable length makes the reservation below fail
        let len = usize::try_from(texels.div_ceil(WORD_BITS)).unwrap_or(usize::MAX);

        let mut words = Vec::new();
        words
            .try_reserve_exact(len)
            .map_err(|source| CollideError::MaskAlloc {
                width,
                height,
                source,
            })?;
        words.resize(len, 0u64);

        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel[3] > threshold {
                let (word, bit) = Self::locate(width, x, y);
                words[word] |= 1u64 << bit;
            }
        }

        Ok(Self {
            width,
            height,
            threshold,
            words,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha threshold this mask was built with
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Whether texel (x, y) is opaque. Coordinates outside the image are transparent.
    #[inline]
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (word, bit) = Self::locate(self.width, x, y);
        self.words[word] & (1u64 << bit) != 0
    }

    /// Total number of opaque texels
    pub fn opaque_count(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Number of opaque texels inside `rect`, clipped to the image
    pub fn opaque_count_in(&self, rect: &PixelRect) -> u64 {
        let bounds = PixelRect::new(0, 0, self.width, self.height);
        let Some(clipped) = bounds.intersection(rect) else {
            return 0;
        };

        let mut count = 0;
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                // Clipped to the image, so both fit in u32
                if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y))
                    && self.is_opaque(x, y)
                {
                    count += 1;
                }
            }
        }
        count
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn locate(width: u32, x: u32, y: u32) -> (usize, u32) {
        let index = u64::from(y) * u64::from(width) + u64::from(x);
        // Word index is below the length reserved in `build`
        ((index / WORD_BITS) as usize, (index % WORD_BITS) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([255, 255, 255, 0])
            }
        })
    }

    #[test]
    fn test_build_checkerboard() {
        let mask = OpacityMask::build(&checkerboard(5, 3), DEFAULT_OPACITY_THRESHOLD).unwrap();

        assert_eq!(mask.width(), 5);
        assert_eq!(mask.height(), 3);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(mask.is_opaque(x, y), (x + y) % 2 == 0, "texel ({x}, {y})");
            }
        }
        assert_eq!(mask.opaque_count(), 8);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 100]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 101]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 1]));

        let mask = OpacityMask::build(&img, 100).unwrap();
        assert!(!mask.is_opaque(0, 0));
        assert!(mask.is_opaque(1, 0));
        assert!(!mask.is_opaque(2, 0));
        assert_eq!(mask.threshold(), 100);

        // The default counts any visible alpha as solid
        let mask = OpacityMask::build(&img, DEFAULT_OPACITY_THRESHOLD).unwrap();
        assert_eq!(mask.opaque_count(), 3);
    }

    #[test]
    fn test_out_of_bounds_is_transparent() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let mask = OpacityMask::build(&img, DEFAULT_OPACITY_THRESHOLD).unwrap();

        assert!(mask.is_opaque(3, 3));
        assert!(!mask.is_opaque(4, 0));
        assert!(!mask.is_opaque(0, 4));
        assert!(!mask.is_opaque(u32::MAX, u32::MAX));
    }

    #[test]
    fn test_bits_span_word_boundaries() {
        // 9x9 = 81 texels, the last row straddles the first word boundary
        let mut img = RgbaImage::new(9, 9);
        img.put_pixel(0, 7, Rgba([0, 0, 0, 255])); // index 63
        img.put_pixel(1, 7, Rgba([0, 0, 0, 255])); // index 64
        img.put_pixel(8, 8, Rgba([0, 0, 0, 255])); // index 80

        let mask = OpacityMask::build(&img, DEFAULT_OPACITY_THRESHOLD).unwrap();
        assert!(mask.is_opaque(0, 7));
        assert!(mask.is_opaque(1, 7));
        assert!(mask.is_opaque(8, 8));
        assert!(!mask.is_opaque(2, 7));
        assert_eq!(mask.opaque_count(), 3);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let img = checkerboard(13, 7);
        let first = OpacityMask::build(&img, DEFAULT_OPACITY_THRESHOLD).unwrap();
        let second = OpacityMask::build(&img, DEFAULT_OPACITY_THRESHOLD).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_opaque_count_in_clips_to_image() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let mask = OpacityMask::build(&img, DEFAULT_OPACITY_THRESHOLD).unwrap();

        assert_eq!(mask.opaque_count_in(&PixelRect::new(2, 2, 2, 2)), 4);
        assert_eq!(mask.opaque_count_in(&PixelRect::new(-2, -2, 4, 4)), 4);
        assert_eq!(mask.opaque_count_in(&PixelRect::new(10, 10, 4, 4)), 0);
    }

    #[test]
    fn test_empty_image() {
        let mask = OpacityMask::build(&RgbaImage::new(0, 0), DEFAULT_OPACITY_THRESHOLD).unwrap();
        assert_eq!(mask.opaque_count(), 0);
        assert!(!mask.is_opaque(0, 0));
    }
}
