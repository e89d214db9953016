//! Built-in WGSL programs.
//!
//! Both programs share the vertex layout in [`crate::gfx::vertex`] and the
//! backend's bind-group convention: uniforms at binding 0, texture unit `n`
//! at binding `n + 1`, the sampler at binding 10.

use crate::gfx::{ProgramDesc, TEXTURE_UNITS, UniformDecl, UniformKind};

/// Asset-cache key of the batched sprite program.
pub const SPRITE_BATCH: &str = "sprite_batch";
/// Asset-cache key of the rounded-rectangle program.
pub const ROUND_RECT: &str = "round_rect";

const SPRITE_BATCH_WGSL: &str = include_str!("shaders/sprite_batch.wgsl");
const ROUND_RECT_WGSL: &str = include_str!("shaders/round_rect.wgsl");

const SPRITE_BATCH_UNIFORMS: [UniformDecl; 3] = [
    UniformDecl::new("u_projection", UniformKind::Mat4),
    UniformDecl::new("u_view", UniformKind::Mat4),
    UniformDecl::new("u_textures", UniformKind::IntArray(TEXTURE_UNITS)),
];

const ROUND_RECT_UNIFORMS: [UniformDecl; 5] = [
    UniformDecl::new("u_projection", UniformKind::Mat4),
    UniformDecl::new("u_view", UniformKind::Mat4),
    UniformDecl::new("u_dimensions", UniformKind::Vec2),
    UniformDecl::new("u_radius", UniformKind::Float),
    UniformDecl::new("u_texture", UniformKind::Sampler),
];

pub fn sprite_batch() -> ProgramDesc<'static> {
    ProgramDesc { label: SPRITE_BATCH, wgsl: SPRITE_BATCH_WGSL, uniforms: &SPRITE_BATCH_UNIFORMS }
}

pub fn round_rect() -> ProgramDesc<'static> {
    ProgramDesc { label: ROUND_RECT, wgsl: ROUND_RECT_WGSL, uniforms: &ROUND_RECT_UNIFORMS }
}

pub fn builtin_programs() -> [ProgramDesc<'static>; 2] {
    [sprite_batch(), round_rect()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::validate_wgsl;
    use crate::gfx::UniformLayout;

    #[test]
    fn builtin_programs_validate() {
        for desc in builtin_programs() {
            if let Err(e) = validate_wgsl(desc.label, desc.wgsl) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn uniform_blocks_match_wgsl_struct_sizes() {
        // mat4 + mat4 + array<vec4<i32>, 9>
        assert_eq!(UniformLayout::new(sprite_batch().uniforms).size(), 272);
        // mat4 + mat4 + three @align(16) members
        let round = UniformLayout::new(round_rect().uniforms);
        assert_eq!(round.size(), 176);
        assert_eq!(round.offset_of("u_dimensions"), Some(128));
        assert_eq!(round.offset_of("u_radius"), Some(144));
        assert_eq!(round.offset_of("u_texture"), Some(160));
    }
}
