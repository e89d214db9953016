use std::rc::Rc;

use nalgebra::Vector2;

use crate::assets::Shader;
use crate::camera::Camera;
use crate::gfx::vertex::{INDICES_PER_QUAD, QUAD_FLOATS};
use crate::gfx::{BufferId, RenderBackend};

use super::quad::{generate_indices, write_quad};
use super::{DepthLayer, Drawable};

/// Texture unit a single's sprite is bound to. Unit 0 means untextured.
const SINGLE_TEXTURE_UNIT: u32 = 1;

/// One rounded-corner quad drawn on its own.
///
/// The radius and quad size go to the shader as uniforms, which a shared
/// batch cannot do per quad. Singles are pooled: [`flush`](Self::flush)
/// makes the single available again.
pub struct DrawableSingle {
    layer: DepthLayer,
    shader: Rc<Shader>,

    drawable: Drawable,
    radius: f32,
    available: bool,
    vertices: [f32; QUAD_FLOATS],

    vertex_buffer: BufferId,
    index_buffer: BufferId,
}

impl DrawableSingle {
    pub fn new<B: RenderBackend + ?Sized>(gpu: &mut B, shader: Rc<Shader>) -> Self {
        let vertex_bytes = (QUAD_FLOATS * std::mem::size_of::<f32>()) as u64;
        let vertex_buffer = gpu.create_vertex_buffer("quadrant single vbo", vertex_bytes);
        let index_buffer = gpu.create_index_buffer("quadrant single ibo", &generate_indices(1));

        Self {
            layer: DepthLayer::default(),
            shader,
            drawable: Drawable::default(),
            radius: 0.0,
            available: true,
            vertices: [0.0; QUAD_FLOATS],
            vertex_buffer,
            index_buffer,
        }
    }

    /// Takes a copy of `drawable` and marks the single as in use.
    ///
    /// Negative radii are clamped to 0. Radii larger than half the shorter
    /// side are clamped by the shader.
    pub fn set_drawable(&mut self, drawable: &Drawable, layer: DepthLayer, radius: f32) {
        if radius < 0.0 {
            log::debug!("DrawableSingle: negative radius {} clamped to 0", radius);
        }

        let slot = if drawable.sprite.is_blank() { 0.0 } else { SINGLE_TEXTURE_UNIT as f32 };
        write_quad(&mut self.vertices, drawable, slot);

        self.drawable = drawable.clone();
        self.layer = layer;
        self.radius = radius.max(0.0);
        self.available = false;
    }

    /// Draws the held quad. Does nothing while available.
    pub fn render<B: RenderBackend + ?Sized>(&self, gpu: &mut B, camera: &Camera) -> bool {
        if self.available {
            return false;
        }

        gpu.write_vertices(self.vertex_buffer, &self.vertices);

        let shader = &self.shader;
        let scale = self.drawable.transform.scale;
        shader.use_program(gpu);
        shader.upload_mat4(gpu, "u_projection", camera.projection());
        shader.upload_mat4(gpu, "u_view", camera.view());
        shader.upload_vec2(gpu, "u_dimensions", &Vector2::new(scale.x, scale.y));
        shader.upload_float(gpu, "u_radius", self.radius);

        let texture = self.drawable.sprite.texture();
        match texture {
            Some(t) => {
                t.bind(gpu, SINGLE_TEXTURE_UNIT);
                shader.upload_texture(gpu, "u_texture", SINGLE_TEXTURE_UNIT);
            }
            None => shader.upload_texture(gpu, "u_texture", 0),
        }

        gpu.bind_buffers(self.vertex_buffer, self.index_buffer);
        gpu.draw_indexed(INDICES_PER_QUAD as u32);

        gpu.unbind_buffers();
        if let Some(t) = texture {
            t.unbind(gpu, SINGLE_TEXTURE_UNIT);
        }
        shader.detach(gpu);
        true
    }

    pub fn clear(&mut self) {
        self.drawable = Drawable::default();
        self.vertices = [0.0; QUAD_FLOATS];
        self.radius = 0.0;
        self.available = true;
    }

    /// [`render`](Self::render) then [`clear`](Self::clear).
    pub fn flush<B: RenderBackend + ?Sized>(&mut self, gpu: &mut B, camera: &Camera) -> bool {
        let drawn = self.render(gpu, camera);
        self.clear();
        drawn
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.available
    }

    #[inline]
    pub fn layer(&self) -> DepthLayer {
        self.layer
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex_buffer
    }
}

impl std::fmt::Debug for DrawableSingle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawableSingle")
            .field("layer", &self.layer)
            .field("available", &self.available)
            .field("radius", &self.radius)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::gfx::{GpuCommand, RecordingBackend, UniformValue};
    use crate::paint::Color;
    use crate::render::Transform;
    use crate::render::test_support::{round_rect_shader, textured, textures};

    fn camera() -> Camera {
        Camera::new(Viewport::new(320.0, 240.0))
    }

    fn panel() -> Drawable {
        Drawable::rectangle(Color::rgb(20, 40, 60), Transform::from_xywh(10.0, 10.0, 100.0, 50.0))
    }

    #[test]
    fn set_and_flush_cycle_availability() {
        let mut gpu = RecordingBackend::new();
        let shader = round_rect_shader(&mut gpu);
        let mut single = DrawableSingle::new(&mut gpu, shader);
        assert!(single.is_available());

        single.set_drawable(&panel(), DepthLayer::Foreground, 8.0);
        assert!(!single.is_available());
        assert_eq!(single.layer(), DepthLayer::Foreground);

        assert!(single.flush(&mut gpu, &camera()));
        assert!(single.is_available());
        assert_eq!(*single.drawable(), Drawable::default());
    }

    #[test]
    fn uploads_dimensions_and_radius() {
        let mut gpu = RecordingBackend::new();
        let shader = round_rect_shader(&mut gpu);
        let mut single = DrawableSingle::new(&mut gpu, shader);
        single.set_drawable(&panel(), DepthLayer::Middleground, 8.0);
        single.render(&mut gpu, &camera());

        let draws = gpu.draws();
        assert_eq!(draws.len(), 1);
        let draw = &draws[0];
        assert_eq!(draw.quad_count(), 1);
        assert_eq!(draw.uniforms.get("u_dimensions"), Some(&UniformValue::Vec2([100.0, 50.0])));
        assert_eq!(draw.uniforms.get("u_radius"), Some(&UniformValue::Float(8.0)));
        assert_eq!(draw.uniforms.get("u_texture"), Some(&UniformValue::Sampler(0)));
        assert!(draw.textures.is_empty());
        // Top-left corner.
        assert_eq!(&draw.vertex(0, 2)[..2], &[10.0, 10.0]);
    }

    #[test]
    fn textured_single_uses_unit_one() {
        let mut gpu = RecordingBackend::new();
        let shader = round_rect_shader(&mut gpu);
        let [t] = textures(&mut gpu);
        let mut single = DrawableSingle::new(&mut gpu, shader);
        single.set_drawable(&textured(&t), DepthLayer::Middleground, 4.0);
        single.render(&mut gpu, &camera());

        let draw = &gpu.draws()[0];
        assert_eq!(draw.textures.len(), 1);
        assert_eq!(draw.textures.get(&1), Some(&t.id()));
        assert_eq!(draw.uniforms.get("u_texture"), Some(&UniformValue::Sampler(1)));
        assert_eq!(draw.vertex(0, 0)[8], 1.0);
        assert!(gpu.commands().contains(&GpuCommand::UnbindTexture { unit: 1 }));
    }

    #[test]
    fn negative_radius_is_clamped() {
        let mut gpu = RecordingBackend::new();
        let shader = round_rect_shader(&mut gpu);
        let mut single = DrawableSingle::new(&mut gpu, shader);
        single.set_drawable(&panel(), DepthLayer::Middleground, -3.0);
        assert_eq!(single.radius(), 0.0);
    }

    #[test]
    fn available_single_draws_nothing() {
        let mut gpu = RecordingBackend::new();
        let shader = round_rect_shader(&mut gpu);
        let single = DrawableSingle::new(&mut gpu, shader);
        assert!(!single.render(&mut gpu, &camera()));
        assert!(gpu.draws().is_empty());
    }
}
