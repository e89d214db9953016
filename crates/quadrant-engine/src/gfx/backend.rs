use crate::assets::AssetError;

use super::{BufferId, ProgramId, TextureId, UniformDecl, UniformValue};

/// Texture units a single draw call can sample from.
///
/// Unit 0 is reserved for "no texture"; units `1..TEXTURE_UNITS` carry batch
/// textures.
pub const TEXTURE_UNITS: usize = 9;

/// Everything a backend needs to build a program.
#[derive(Debug, Copy, Clone)]
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    /// WGSL source with `vs_main` / `fs_main` entry points.
    pub wgsl: &'a str,
    /// Uniform block members, in declaration order.
    pub uniforms: &'a [UniformDecl],
}

/// Logical GPU contract the batching layer renders through.
///
/// The interface is deliberately state-machine shaped: callers bind a
/// program, textures and buffers, set uniforms, then issue `draw_indexed`.
/// Draws are fire-and-forget; nothing here waits on GPU completion.
pub trait RenderBackend {
    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramId, AssetError>;

    /// Uploads tightly packed RGBA8 pixels.
    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, AssetError>;

    fn create_vertex_buffer(&mut self, label: &str, size_bytes: u64) -> BufferId;

    /// Creates an immutable index buffer.
    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> BufferId;

    /// Replaces the start of `buffer` with `data`.
    fn write_vertices(&mut self, buffer: BufferId, data: &[f32]);

    fn use_program(&mut self, program: ProgramId);
    fn detach_program(&mut self, program: ProgramId);
    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue);

    fn bind_texture(&mut self, unit: u32, texture: TextureId);
    fn unbind_texture(&mut self, unit: u32);

    fn bind_buffers(&mut self, vertices: BufferId, indices: BufferId);
    fn unbind_buffers(&mut self);

    /// Draws `index_count` indices from the bound buffers with the bound program.
    fn draw_indexed(&mut self, index_count: u32);
}
