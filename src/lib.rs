pub mod atlas;
pub mod cli;
pub mod collision;
pub mod config;
pub mod error;
pub mod mask;
pub mod rect;

pub use atlas::{AtlasLoader, Cell, SheetLayout, TextureAtlas};
pub use cli::{CliArgs, Command};
pub use collision::{OpacitySource, SpriteRef, collide, collide_sprites};
pub use error::CollideError;
pub use mask::OpacityMask;
pub use rect::PixelRect;
