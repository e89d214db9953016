use crate::assets::Sprite;
use crate::coords::Vec2;
use crate::paint::Color;

/// Placement of a quad in world units.
///
/// `position` is the top-left corner, `scale` the width and height.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
}

impl Transform {
    #[inline]
    pub const fn new(position: Vec2, scale: Vec2) -> Self {
        Self { position, scale }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(width, height))
    }
}

/// A colored, optionally textured quad.
///
/// `Clone` is a full copy: batches store clones, so callers may keep
/// mutating their own drawable after submitting it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawable {
    pub color: Color,
    pub transform: Transform,
    pub sprite: Sprite,
}

impl Drawable {
    pub fn new(color: Color, transform: Transform, sprite: Sprite) -> Self {
        Self { color, transform, sprite }
    }

    /// Untextured rectangle.
    pub fn rectangle(color: Color, transform: Transform) -> Self {
        Self::new(color, transform, Sprite::blank())
    }

    /// Sprite tinted white, sized to `transform`.
    pub fn sprite(sprite: Sprite, transform: Transform) -> Self {
        Self::new(Color::WHITE, transform, sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_do_not_alias_the_source() {
        let mut live = Drawable::rectangle(Color::WHITE, Transform::from_xywh(1.0, 2.0, 3.0, 4.0));
        let snapshot = live.clone();

        live.transform.position.x = 50.0;
        live.color = Color::BLACK;

        assert_eq!(snapshot.transform.position, Vec2::new(1.0, 2.0));
        assert_eq!(snapshot.color, Color::WHITE);
    }

    #[test]
    fn default_is_a_blank_zero_quad() {
        let d = Drawable::default();
        assert!(d.sprite.is_blank());
        assert_eq!(d.transform, Transform::default());
        assert_eq!(d.color, Color::TRANSPARENT);
    }
}
