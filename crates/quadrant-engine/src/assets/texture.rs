use crate::gfx::{RenderBackend, TextureId};

/// Uploaded RGBA8 image.
///
/// Two textures are equal only when they are the same upload. Handles are
/// never reused, so equal keys or pixels do not make textures equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    pub(crate) fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    /// Uploads `rgba` through `gpu` and wraps the resulting handle.
    pub fn upload<B: RenderBackend + ?Sized>(
        gpu: &mut B,
        source: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Self, super::AssetError> {
        let id = gpu.create_texture(source, width, height, rgba)?;
        log::debug!("texture '{}' uploaded ({}x{}, {:?})", source, width, height, id);
        Ok(Self::new(id, width, height))
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Makes this texture the sampling source of `unit`.
    pub fn bind<B: RenderBackend + ?Sized>(&self, gpu: &mut B, unit: u32) {
        gpu.bind_texture(unit, self.id);
    }

    pub fn unbind<B: RenderBackend + ?Sized>(&self, gpu: &mut B, unit: u32) {
        gpu.unbind_texture(unit);
    }
}
