//! Fixtures shared by the render tests.

use std::rc::Rc;

use crate::assets::{AssetCache, Font, Shader, Sprite, Texture};
use crate::gfx::RecordingBackend;
use crate::paint::Color;

use super::{Drawable, Transform, shaders};

pub(crate) fn batch_shader(gpu: &mut RecordingBackend) -> Rc<Shader> {
    Rc::new(Shader::compile(gpu, &shaders::sprite_batch()).unwrap())
}

pub(crate) fn round_rect_shader(gpu: &mut RecordingBackend) -> Rc<Shader> {
    Rc::new(Shader::compile(gpu, &shaders::round_rect()).unwrap())
}

/// `N` distinct 1x1 textures.
pub(crate) fn textures<const N: usize>(gpu: &mut RecordingBackend) -> [Rc<Texture>; N] {
    std::array::from_fn(|i| {
        Rc::new(Texture::upload(gpu, &format!("tex{i}"), 1, 1, &[255; 4]).unwrap())
    })
}

pub(crate) fn textured(texture: &Rc<Texture>) -> Drawable {
    Drawable::sprite(Sprite::from_texture(texture), Transform::from_xywh(0.0, 0.0, 16.0, 16.0))
}

/// 3x5 cells with 1px spacing: "ABCDEFG?".
pub(crate) fn grid_font(gpu: &mut RecordingBackend) -> Rc<Font> {
    let texture = Rc::new(Texture::upload(gpu, "font", 12, 10, &[255; 12 * 10 * 4]).unwrap());
    Rc::new(Font::from_grid("mini", &texture, 3, 5, 1, "ABCDEFG?"))
}

/// Cache with the built-in shaders and the grid font, plus a backend that
/// has only seen the loads.
pub(crate) fn assets() -> (RecordingBackend, Rc<AssetCache>) {
    let mut gpu = RecordingBackend::new();
    let mut cache = AssetCache::new();
    cache.load_builtin_shaders(&mut gpu).unwrap();
    let font = grid_font(&mut gpu);
    cache.insert_font((*font).clone());
    (gpu, Rc::new(cache))
}

pub(crate) fn red_rect(x: f32, y: f32) -> Drawable {
    Drawable::rectangle(Color::rgb(255, 0, 0), Transform::from_xywh(x, y, 10.0, 10.0))
}
