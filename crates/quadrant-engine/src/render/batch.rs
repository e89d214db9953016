use std::rc::Rc;

use crate::assets::{Shader, Texture};
use crate::camera::Camera;
use crate::gfx::vertex::{INDICES_PER_QUAD, QUAD_FLOATS};
use crate::gfx::{BufferId, RenderBackend, TEXTURE_UNITS};

use super::quad::{generate_indices, write_quad};
use super::{DepthLayer, Drawable};

/// Quads one batch can hold.
pub const MAX_BATCH_SIZE: usize = 1000;
/// Distinct textures one batch can reference. Unit 0 stays reserved for
/// untextured quads, so batch textures occupy units `1..=MAX_BATCH_TEXTURES`.
pub const MAX_BATCH_TEXTURES: usize = TEXTURE_UNITS - 1;

/// Texture-unit table uploaded to `u_textures`: unit `i` samples slot `i`.
const TEXTURE_SLOTS: [i32; TEXTURE_UNITS] = {
    let mut slots = [0i32; TEXTURE_UNITS];
    let mut i = 0;
    while i < TEXTURE_UNITS {
        slots[i] = i as i32;
        i += 1;
    }
    slots
};

/// Up to [`MAX_BATCH_SIZE`] quads on one depth layer, drawn with one call.
///
/// Vertices are written eagerly by [`add_drawable`](Self::add_drawable);
/// [`render`](Self::render) only uploads and draws. The index buffer is built
/// once at construction and reused for the batch's whole life.
pub struct DrawableBatch {
    layer: DepthLayer,
    shader: Rc<Shader>,

    drawables: Box<[Drawable]>,
    count: usize,
    vertices: Vec<f32>,
    textures: Vec<Rc<Texture>>,

    vertex_buffer: BufferId,
    index_buffer: BufferId,
}

impl DrawableBatch {
    pub fn new<B: RenderBackend + ?Sized>(
        gpu: &mut B,
        shader: Rc<Shader>,
        layer: DepthLayer,
    ) -> Self {
        let vertex_bytes = (MAX_BATCH_SIZE * QUAD_FLOATS * std::mem::size_of::<f32>()) as u64;
        let vertex_buffer = gpu.create_vertex_buffer("quadrant batch vbo", vertex_bytes);
        let index_buffer =
            gpu.create_index_buffer("quadrant batch ibo", &generate_indices(MAX_BATCH_SIZE));

        Self {
            layer,
            shader,
            drawables: vec![Drawable::default(); MAX_BATCH_SIZE].into_boxed_slice(),
            count: 0,
            vertices: vec![0.0; MAX_BATCH_SIZE * QUAD_FLOATS],
            textures: Vec::with_capacity(MAX_BATCH_TEXTURES),
            vertex_buffer,
            index_buffer,
        }
    }

    /// Copies `drawable` into the next slot and emits its vertices.
    ///
    /// Returns `false`, leaving the batch untouched, when the batch is full or
    /// the drawable needs a texture slot the batch no longer has.
    pub fn add_drawable(&mut self, drawable: &Drawable) -> bool {
        if !self.has_room() {
            return false;
        }

        let slot = match drawable.sprite.texture() {
            None => 0,
            Some(texture) => match self.texture_slot(texture) {
                Some(slot) => slot,
                None if self.has_texture_room() => {
                    self.textures.push(Rc::clone(texture));
                    self.textures.len()
                }
                None => return false,
            },
        };

        let at = self.count * QUAD_FLOATS;
        write_quad(&mut self.vertices[at..at + QUAD_FLOATS], drawable, slot as f32);
        self.drawables[self.count] = drawable.clone();
        self.count += 1;
        true
    }

    /// Whether [`add_drawable`](Self::add_drawable) would take `drawable`.
    pub fn accepts(&self, drawable: &Drawable) -> bool {
        self.has_room()
            && drawable
                .sprite
                .texture()
                .is_none_or(|t| self.has_texture(t) || self.has_texture_room())
    }

    #[inline]
    pub fn has_room(&self) -> bool {
        self.count < MAX_BATCH_SIZE
    }

    #[inline]
    pub fn has_texture_room(&self) -> bool {
        self.textures.len() < MAX_BATCH_TEXTURES
    }

    pub fn has_texture(&self, texture: &Texture) -> bool {
        self.textures.iter().any(|t| **t == *texture)
    }

    /// Texture unit assigned to `texture`, if tracked.
    fn texture_slot(&self, texture: &Texture) -> Option<usize> {
        self.textures.iter().position(|t| **t == *texture).map(|i| i + 1)
    }

    /// Uploads the queued quads and draws them. Returns the quad count.
    pub fn render<B: RenderBackend + ?Sized>(&self, gpu: &mut B, camera: &Camera) -> usize {
        if self.count == 0 {
            return 0;
        }

        gpu.write_vertices(self.vertex_buffer, &self.vertices[..self.count * QUAD_FLOATS]);

        let shader = &self.shader;
        shader.use_program(gpu);
        shader.upload_mat4(gpu, "u_projection", camera.projection());
        shader.upload_mat4(gpu, "u_view", camera.view());

        for (i, texture) in self.textures.iter().enumerate() {
            texture.bind(gpu, i as u32 + 1);
        }
        shader.upload_int_array(gpu, "u_textures", &TEXTURE_SLOTS);

        gpu.bind_buffers(self.vertex_buffer, self.index_buffer);
        gpu.draw_indexed((self.count * INDICES_PER_QUAD) as u32);

        gpu.unbind_buffers();
        for (i, texture) in self.textures.iter().enumerate() {
            texture.unbind(gpu, i as u32 + 1);
        }
        shader.detach(gpu);

        self.count
    }

    /// Returns the batch to its freshly constructed state, keeping GPU buffers.
    pub fn clear(&mut self) {
        self.drawables[..self.count].fill(Drawable::default());
        self.vertices[..self.count * QUAD_FLOATS].fill(0.0);
        self.textures.clear();
        self.count = 0;
    }

    /// [`render`](Self::render) then [`clear`](Self::clear).
    pub fn flush<B: RenderBackend + ?Sized>(&mut self, gpu: &mut B, camera: &Camera) -> usize {
        let quads = self.render(gpu, camera);
        self.clear();
        quads
    }

    #[inline]
    pub fn layer(&self) -> DepthLayer {
        self.layer
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Snapshots of the queued drawables, in insertion order.
    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables[..self.count]
    }

    /// The whole CPU vertex array, including unused slots.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Tracked textures; the texture at index `i` samples from unit `i + 1`.
    pub fn textures(&self) -> &[Rc<Texture>] {
        &self.textures
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> BufferId {
        self.index_buffer
    }
}

impl std::fmt::Debug for DrawableBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawableBatch")
            .field("layer", &self.layer)
            .field("count", &self.count)
            .field("textures", &self.textures.len())
            .field("vertex_buffer", &self.vertex_buffer)
            .finish()
    }
}
