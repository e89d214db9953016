//! Quad emission shared by batches and singles.
//!
//! Corners are emitted bottom-right, top-right, top-left, bottom-left in
//! screen space (y down). Triangles are `(3, 2, 0)` and `(0, 2, 1)`. Back-face
//! culling is disabled, so winding does not affect visibility.

use crate::gfx::vertex::{INDICES_PER_QUAD, QUAD_FLOATS, VERTEX_SIZE, VERTICES_PER_QUAD};

use super::Drawable;

/// Corner offsets as fractions of the quad size, in emission order.
const CORNERS: [[f32; 2]; VERTICES_PER_QUAD] = [[1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0]];

const QUAD_INDICES: [u32; INDICES_PER_QUAD] = [3, 2, 0, 0, 2, 1];

/// Writes the four vertices of `drawable` into `out`.
///
/// `out` must hold at least `QUAD_FLOATS` floats. `slot` is the texture unit
/// the batch assigned (0 = untextured).
pub fn write_quad(out: &mut [f32], drawable: &Drawable, slot: f32) {
    let out = &mut out[..QUAD_FLOATS];
    let t = &drawable.transform;
    let color = drawable.color.normalized();
    let uvs = drawable.sprite.uvs();

    for (i, vertex) in out.chunks_exact_mut(VERTEX_SIZE).enumerate() {
        let [cx, cy] = CORNERS[i];
        vertex[0] = t.position.x + cx * t.scale.x;
        vertex[1] = t.position.y + cy * t.scale.y;
        vertex[2..6].copy_from_slice(&color);
        vertex[6..8].copy_from_slice(&uvs[i]);
        vertex[8] = slot;
    }
}

/// Index list for `quads` quads, generated once per buffer.
pub fn generate_indices(quads: usize) -> Vec<u32> {
    (0..quads as u32)
        .flat_map(|q| QUAD_INDICES.iter().map(move |i| i + q * VERTICES_PER_QUAD as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;
    use crate::render::Transform;

    #[test]
    fn vertices_follow_emission_order() {
        let d = Drawable::rectangle(
            Color::rgba(255, 0, 0, 51),
            Transform::from_xywh(10.0, 20.0, 100.0, 50.0),
        );
        let mut out = [0.0f32; QUAD_FLOATS];
        write_quad(&mut out, &d, 3.0);

        let positions: Vec<[f32; 2]> =
            out.chunks_exact(VERTEX_SIZE).map(|v| [v[0], v[1]]).collect();
        assert_eq!(positions, vec![[110.0, 70.0], [110.0, 20.0], [10.0, 20.0], [10.0, 70.0]]);

        let first = &out[..VERTEX_SIZE];
        assert_eq!(&first[2..6], &[1.0, 0.0, 0.0, 0.2]);
        assert_eq!(&first[6..8], &[1.0, 1.0]);
        assert_eq!(first[8], 3.0);
    }

    #[test]
    fn indices_offset_per_quad() {
        let idx = generate_indices(2);
        assert_eq!(idx, vec![3, 2, 0, 0, 2, 1, 7, 6, 4, 4, 6, 5]);
        assert!(generate_indices(0).is_empty());
    }
}
