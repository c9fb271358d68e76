use log::debug;
use rayon::prelude::*;

use super::{OpacitySource, SpriteRef, collide};
use crate::error::CollideError;

/// Index of the first target the sprite hits, testing targets in order
pub fn first_hit<A, B>(
    sprite: &SpriteRef<'_, A>,
    targets: &[SpriteRef<'_, B>],
) -> Result<Option<usize>, CollideError>
where
    A: OpacitySource + ?Sized,
    B: OpacitySource + ?Sized,
{
    for (index, target) in targets.iter().enumerate() {
        if collide(sprite, target)? {
            debug!("Sprite at {} hit target {}", sprite.position, index);
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Test many independent pairs in parallel, results in input order.
///
/// Masks that are not built yet are built by whichever pair needs them first.
pub fn collide_pairs<A, B>(
    pairs: &[(SpriteRef<'_, A>, SpriteRef<'_, B>)],
) -> Result<Vec<bool>, CollideError>
where
    A: OpacitySource + Sync + ?Sized,
    B: OpacitySource + Sync + ?Sized,
{
    pairs.par_iter().map(|(a, b)| collide(a, b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{Cell, TextureAtlas};
    use glam::DVec2;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32) -> TextureAtlas {
        TextureAtlas::from_image(
            "solid",
            RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            1,
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_first_hit_returns_earliest_target() {
        let bolt = solid(1, 3);
        let ship = solid(8, 8);

        let shot = SpriteRef::new(&bolt, Cell::default(), DVec2::new(10.0, 10.0));
        let targets = vec![
            SpriteRef::new(&ship, Cell::default(), DVec2::new(-50.0, 0.0)),
            SpriteRef::new(&ship, Cell::default(), DVec2::new(6.0, 6.0)),
            SpriteRef::new(&ship, Cell::default(), DVec2::new(8.0, 8.0)),
        ];

        assert_eq!(first_hit(&shot, &targets).unwrap(), Some(1));
        assert_eq!(first_hit(&shot, &targets[..1]).unwrap(), None);
        assert_eq!(first_hit(&shot, &targets[..0]).unwrap(), None);
    }

    #[test]
    fn test_first_hit_propagates_invalid_cell() {
        let bolt = solid(1, 3);
        let ship = solid(8, 8);

        let shot = SpriteRef::new(&bolt, Cell::default(), DVec2::ZERO);
        let targets = vec![SpriteRef::new(&ship, Cell::new(0, 3), DVec2::ZERO)];

        assert!(matches!(
            first_hit(&shot, &targets),
            Err(CollideError::InvalidCell { row: 3, .. })
        ));
    }

    #[test]
    fn test_collide_pairs_matches_sequential() {
        let a = solid(4, 4);
        let b = solid(4, 4);

        let pairs: Vec<_> = (0..16)
            .map(|i| {
                (
                    SpriteRef::new(&a, Cell::default(), DVec2::ZERO),
                    SpriteRef::new(&b, Cell::default(), DVec2::new(f64::from(i) * 0.5, 1.0)),
                )
            })
            .collect();

        let results = collide_pairs(&pairs).unwrap();
        let expected: Vec<bool> = pairs.iter().map(|(a, b)| collide(a, b).unwrap()).collect();
        assert_eq!(results, expected);
        // Offsets below 4 overlap, 4 and beyond only touch or miss
        assert_eq!(results.iter().filter(|&&r| r).count(), 8);
    }
}
