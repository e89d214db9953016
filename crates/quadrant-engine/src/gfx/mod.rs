//! GPU abstraction used by the batching layer.
//!
//! `RenderBackend` is the seam: `WgpuBackend` drives real hardware,
//! `RecordingBackend` captures calls for headless tests.

mod backend;
mod ids;
pub mod recording;
mod uniform;
pub mod vertex;
pub mod wgpu_backend;

pub use backend::{ProgramDesc, RenderBackend, TEXTURE_UNITS};
pub use ids::{BufferId, ProgramId, TextureId};
pub use recording::{GpuCommand, RecordedDraw, RecordingBackend};
pub use uniform::{UniformDecl, UniformKind, UniformLayout, UniformValue};
pub use wgpu_backend::{WgpuBackend, WgpuBackendConfig};

use crate::assets::AssetError;

/// Checks that `rgba` holds exactly `width * height` RGBA8 pixels.
pub(crate) fn check_texture_data(
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), AssetError> {
    if width == 0 || height == 0 {
        return Err(AssetError::EmptyTexture { name: label.to_string() });
    }

    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(AssetError::TextureSize {
            name: label.to_string(),
            expected,
            actual: rgba.len(),
        });
    }
    Ok(())
}
