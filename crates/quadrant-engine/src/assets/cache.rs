use std::collections::HashMap;
use std::rc::Rc;

use crate::gfx::{ProgramDesc, RenderBackend};
use crate::render::shaders;

use super::{AssetError, Font, Shader, Texture};

/// Loaded textures, shaders and fonts, keyed by name.
///
/// Populate it at startup, then share it read-only (`Rc<AssetCache>`) with the
/// renderer. Loading an existing key returns the cached asset without
/// touching the GPU.
#[derive(Debug, Default)]
pub struct AssetCache {
    textures: HashMap<String, Rc<Texture>>,
    shaders: HashMap<String, Rc<Shader>>,
    fonts: HashMap<String, Rc<Font>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads RGBA8 pixels under `name`.
    pub fn load_texture<B: RenderBackend + ?Sized>(
        &mut self,
        gpu: &mut B,
        name: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Rc<Texture>, AssetError> {
        if let Some(t) = self.textures.get(name) {
            return Ok(Rc::clone(t));
        }

        let texture = Rc::new(Texture::upload(gpu, name, width, height, rgba)?);
        self.textures.insert(name.to_string(), Rc::clone(&texture));
        Ok(texture)
    }

    /// Compiles `desc` and stores it under `desc.label`.
    pub fn load_shader<B: RenderBackend + ?Sized>(
        &mut self,
        gpu: &mut B,
        desc: &ProgramDesc<'_>,
    ) -> Result<Rc<Shader>, AssetError> {
        if let Some(s) = self.shaders.get(desc.label) {
            return Ok(Rc::clone(s));
        }

        let shader = Rc::new(Shader::compile(gpu, desc)?);
        self.shaders.insert(desc.label.to_string(), Rc::clone(&shader));
        Ok(shader)
    }

    /// Loads the sprite-batch and rounded-rect programs the renderer needs.
    pub fn load_builtin_shaders<B: RenderBackend + ?Sized>(
        &mut self,
        gpu: &mut B,
    ) -> Result<(), AssetError> {
        for desc in shaders::builtin_programs() {
            self.load_shader(gpu, &desc)?;
        }
        Ok(())
    }

    /// Stores `font` under its own name, replacing any previous one.
    pub fn insert_font(&mut self, font: Font) -> Rc<Font> {
        let font = Rc::new(font);
        if self.fonts.insert(font.name().to_string(), Rc::clone(&font)).is_some() {
            log::debug!("font '{}' replaced", font.name());
        }
        font
    }

    pub fn texture(&self, name: &str) -> Option<Rc<Texture>> {
        self.textures.get(name).cloned()
    }

    pub fn shader(&self, name: &str) -> Option<Rc<Shader>> {
        self.shaders.get(name).cloned()
    }

    /// Like [`shader`](Self::shader) but a missing name is an error.
    pub fn require_shader(&self, name: &str) -> Result<Rc<Shader>, AssetError> {
        self.shader(name).ok_or_else(|| AssetError::MissingShader(name.to_string()))
    }

    pub fn font(&self, name: &str) -> Option<Rc<Font>> {
        self.fonts.get(name).cloned()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{GpuCommand, RecordingBackend};

    fn creates(gpu: &RecordingBackend) -> usize {
        gpu.count(|c| {
            matches!(c, GpuCommand::CreateTexture { .. } | GpuCommand::CreateProgram { .. })
        })
    }

    #[test]
    fn loading_is_idempotent_per_key() {
        let mut gpu = RecordingBackend::new();
        let mut cache = AssetCache::new();

        let a = cache.load_texture(&mut gpu, "grass", 1, 1, &[0, 255, 0, 255]).unwrap();
        let b = cache.load_texture(&mut gpu, "grass", 1, 1, &[0, 255, 0, 255]).unwrap();
        assert!(Rc::ptr_eq(&a, &b));

        cache.load_builtin_shaders(&mut gpu).unwrap();
        cache.load_builtin_shaders(&mut gpu).unwrap();
        assert_eq!(creates(&gpu), 3);
        assert!(cache.shader(shaders::SPRITE_BATCH).is_some());
        assert!(cache.shader(shaders::ROUND_RECT).is_some());
    }

    #[test]
    fn missing_shader_is_an_error() {
        let cache = AssetCache::new();
        assert!(matches!(
            cache.require_shader("nope"),
            Err(AssetError::MissingShader(name)) if name == "nope"
        ));
    }

    #[test]
    fn bad_pixels_are_not_cached() {
        let mut gpu = RecordingBackend::new();
        let mut cache = AssetCache::new();
        assert!(cache.load_texture(&mut gpu, "bad", 2, 2, &[0; 3]).is_err());
        assert!(cache.texture("bad").is_none());
        assert_eq!(cache.texture_count(), 0);
    }
}
