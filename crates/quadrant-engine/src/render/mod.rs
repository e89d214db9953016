//! Sprite batching and draw ordering.
//!
//! Game code queues quads on the [`Renderer`] every frame; the renderer packs
//! them into [`DrawableBatch`]es (shared shader, up to eight textures) and
//! [`DrawableSingle`]s (rounded corners), then flushes by [`DepthLayer`].
//!
//! Convention:
//! - geometry is in world units (top-left origin, +Y down)
//! - the camera's projection and view matrices map world units to clip space

mod batch;
mod depth;
mod drawable;
mod quad;
mod renderer;
pub mod shaders;
mod single;
mod text;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::{DrawableBatch, MAX_BATCH_SIZE, MAX_BATCH_TEXTURES};
pub use depth::DepthLayer;
pub use drawable::{Drawable, Transform};
pub use quad::{generate_indices, write_quad};
pub use renderer::{FrameStats, Renderer, RendererConfig};
pub use single::DrawableSingle;
pub use text::TextBatch;
