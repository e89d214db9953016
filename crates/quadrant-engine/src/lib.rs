//! Depth-layered 2D sprite batching on wgpu.
//!
//! Drawables (a color, a transform and an optional sprite) are queued on a
//! [`render::Renderer`] each frame. The renderer packs them into texture-aware
//! batches per [`render::DepthLayer`], draws rounded rectangles one at a time,
//! and draws text last.
//!
//! Rendering goes through [`gfx::RenderBackend`]: [`gfx::WgpuBackend`] on
//! real hardware, [`gfx::RecordingBackend`] headless. The [`window`] and
//! [`core`] modules provide an optional winit runtime around it.

pub mod assets;
pub mod camera;
pub mod coords;
pub mod core;
pub mod device;
pub mod gfx;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;

pub use winit;
