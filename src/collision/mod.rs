mod batch;
mod tester;

pub use batch::{collide_pairs, first_hit};
pub use tester::{MAX_WORLD_COORDINATE, OpacitySource, SpriteRef, collide, collide_sprites};
