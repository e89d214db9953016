//! Textures, sprites, shaders and fonts.
//!
//! Assets are created at startup through a [`RenderBackend`](crate::gfx::RenderBackend)
//! and kept in an [`AssetCache`]. The render path only reads them.

mod cache;
mod error;
mod font;
mod shader;
mod sprite;
mod texture;

pub use cache::AssetCache;
pub use error::AssetError;
pub use font::{Font, Glyph};
pub use shader::{Shader, validate_wgsl};
pub use sprite::{Sprite, SpriteSheet};
pub use texture::Texture;
