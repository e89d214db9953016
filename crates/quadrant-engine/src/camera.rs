//! Orthographic 2D camera.
//!
//! World space has its origin at the top-left with +Y down. The camera's
//! `position` is the world point shown at the top-left screen corner.
//! Screen coordinates are normalized: `(0, 0)` is the top-left corner and
//! `(1, 1)` the bottom-right.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::coords::{Vec2, Viewport};

const Z_NEAR: f32 = 0.0;
const Z_FAR: f32 = 100.0;
/// Height the view is taken from; drawables sit on z = 0.
const EYE_Z: f32 = 20.0;

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    screen: Viewport,
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
}

impl Camera {
    /// Camera at the world origin covering `screen`.
    pub fn new(screen: Viewport) -> Self {
        let mut camera = Self {
            position: Vec2::zero(),
            screen: Viewport::new(1.0, 1.0),
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
        };
        camera.adjust_projection(screen.width, screen.height);
        camera.adjust_position(Vec2::zero());
        camera
    }

    /// Rebuilds the projection for a `width` x `height` screen.
    ///
    /// Invalid sizes (zero, negative, non-finite) keep the previous projection.
    pub fn adjust_projection(&mut self, width: f32, height: f32) {
        let screen = Viewport::new(width, height);
        if !screen.is_valid() {
            log::debug!("Camera: ignoring projection size {}x{}", width, height);
            return;
        }

        // bottom = height, top = 0 flips Y so the origin is the top-left.
        self.projection = Matrix4::new_orthographic(0.0, width, height, 0.0, Z_NEAR, Z_FAR);
        self.screen = screen;
    }

    /// Moves the top-left corner of the view to `position`.
    pub fn adjust_position(&mut self, position: Vec2) {
        self.position = position;

        let eye = Point3::new(position.x, position.y, EYE_Z);
        let target = Point3::new(position.x, position.y, -1.0);
        self.view = Matrix4::look_at_rh(&eye, &target, &Vector3::y());
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn screen(&self) -> Viewport {
        self.screen
    }

    #[inline]
    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    #[inline]
    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    /// Normalized screen point to world units.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.position + screen.component_mul(self.screen.size())
    }

    /// World point to normalized screen coordinates.
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position).component_div(self.screen.size())
    }

    pub fn screen_width_to_world_width(&self, width: f32) -> f32 {
        width * self.screen.width
    }

    pub fn world_width_to_screen_width(&self, width: f32) -> f32 {
        width / self.screen.width
    }

    pub fn screen_height_to_world_height(&self, height: f32) -> f32 {
        height * self.screen.height
    }

    pub fn world_height_to_screen_height(&self, height: f32) -> f32 {
        height / self.screen.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    fn camera() -> Camera {
        let mut c = Camera::new(Viewport::new(800.0, 600.0));
        c.adjust_position(Vec2::new(120.0, -40.0));
        c
    }

    /// World point through view and projection, in NDC.
    fn to_ndc(c: &Camera, p: Vec2) -> Vector4<f32> {
        c.projection() * c.view() * Vector4::new(p.x, p.y, 0.0, 1.0)
    }

    #[test]
    fn top_left_of_view_maps_to_ndc_top_left() {
        let c = camera();

        let tl = to_ndc(&c, c.position());
        assert_relative_eq!(tl.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(tl.y, 1.0, epsilon = 1e-5);

        let br = to_ndc(&c, c.position() + Vec2::new(800.0, 600.0));
        assert_relative_eq!(br.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(br.y, -1.0, epsilon = 1e-5);

        // Drawables at z = 0 stay inside the clip volume.
        assert!(tl.z > -1.0 && tl.z < 1.0);
    }

    #[test]
    fn conversions_are_mutually_inverse() {
        let c = camera();
        for p in [Vec2::new(0.0, 0.0), Vec2::new(0.25, 0.75), Vec2::new(-3.5, 12.0)] {
            let back = c.world_to_screen(c.screen_to_world(p));
            assert_relative_eq!(back.x, p.x, epsilon = 1e-5);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-5);
        }

        for w in [Vec2::new(120.0, -40.0), Vec2::new(999.0, 3.25)] {
            let back = c.screen_to_world(c.world_to_screen(w));
            assert_relative_eq!(back.x, w.x, epsilon = 1e-3);
            assert_relative_eq!(back.y, w.y, epsilon = 1e-3);
        }
    }

    #[test]
    fn screen_center_is_offset_by_position() {
        let c = camera();
        assert_eq!(c.screen_to_world(Vec2::new(0.5, 0.5)), Vec2::new(520.0, 260.0));
    }

    #[test]
    fn length_helpers_scale_by_screen() {
        let c = camera();
        assert_relative_eq!(c.screen_width_to_world_width(0.5), 400.0);
        assert_relative_eq!(c.world_width_to_screen_width(400.0), 0.5);
        assert_relative_eq!(c.screen_height_to_world_height(0.5), 300.0);
        assert_relative_eq!(c.world_height_to_screen_height(300.0), 0.5);
    }

    #[test]
    fn adjustments_are_idempotent() {
        let mut c = camera();
        let (p, v) = (*c.projection(), *c.view());
        c.adjust_projection(800.0, 600.0);
        c.adjust_position(Vec2::new(120.0, -40.0));
        assert_eq!(*c.projection(), p);
        assert_eq!(*c.view(), v);
    }

    #[test]
    fn invalid_size_keeps_previous_projection() {
        let mut c = camera();
        let p = *c.projection();
        c.adjust_projection(0.0, 600.0);
        assert_eq!(*c.projection(), p);
        assert_eq!(c.screen(), Viewport::new(800.0, 600.0));
    }
}
