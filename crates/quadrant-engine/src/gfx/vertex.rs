//! Vertex layout shared by every program.
//!
//! One vertex is `VERTEX_SIZE` floats:
//!
//!  offset  0  position  [f32; 2]  loc 0
//!  offset  8  color     [f32; 4]  loc 1  (straight alpha, 0..1)
//!  offset 24  uv        [f32; 2]  loc 2
//!  offset 32  tex slot  f32       loc 3  (0 = untextured)

const F32_BYTES: usize = std::mem::size_of::<f32>();

pub const POSITION_SIZE: usize = 2;
pub const COLOR_SIZE: usize = 4;
pub const UV_SIZE: usize = 2;
pub const TEX_SLOT_SIZE: usize = 1;

pub const POSITION_OFFSET: usize = 0;
pub const COLOR_OFFSET: usize = POSITION_OFFSET + POSITION_SIZE * F32_BYTES;
pub const UV_OFFSET: usize = COLOR_OFFSET + COLOR_SIZE * F32_BYTES;
pub const TEX_SLOT_OFFSET: usize = UV_OFFSET + UV_SIZE * F32_BYTES;

/// Floats per vertex.
pub const VERTEX_SIZE: usize = POSITION_SIZE + COLOR_SIZE + UV_SIZE + TEX_SLOT_SIZE;
/// Bytes per vertex.
pub const VERTEX_STRIDE: usize = VERTEX_SIZE * F32_BYTES;

pub const VERTICES_PER_QUAD: usize = 4;
pub const INDICES_PER_QUAD: usize = 6;

/// Floats occupied by one quad in a vertex array.
pub const QUAD_FLOATS: usize = VERTICES_PER_QUAD * VERTEX_SIZE;
