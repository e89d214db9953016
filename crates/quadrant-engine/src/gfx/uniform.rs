use nalgebra::{Matrix3, Matrix4};

/// Shape of a declared uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Mat4,
    Mat3,
    Vec4,
    Vec3,
    Vec2,
    Float,
    Int,
    /// Texture-unit index a sampler reads from.
    Sampler,
    /// Fixed-length `i32` array, one element per 16-byte slot.
    IntArray(usize),
}

impl UniformKind {
    /// Bytes the uniform occupies in a packed block.
    pub const fn size(self) -> usize {
        match self {
            UniformKind::Mat4 => 64,
            UniformKind::Mat3 => 48,
            UniformKind::IntArray(len) => 16 * len,
            _ => 16,
        }
    }

    fn accepts(self, value: &UniformValue) -> bool {
        match (self, value) {
            (UniformKind::IntArray(_), UniformValue::IntArray(_)) => true,
            (kind, value) => kind == value.kind(),
        }
    }
}

/// Value uploaded to a program uniform.
///
/// Matrices are column-major.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Mat4([[f32; 4]; 4]),
    Mat3([[f32; 3]; 3]),
    Vec4([f32; 4]),
    Vec3([f32; 3]),
    Vec2([f32; 2]),
    Float(f32),
    Int(i32),
    Sampler(u32),
    IntArray(Vec<i32>),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Mat4(_) => UniformKind::Mat4,
            UniformValue::Mat3(_) => UniformKind::Mat3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Sampler(_) => UniformKind::Sampler,
            UniformValue::IntArray(v) => UniformKind::IntArray(v.len()),
        }
    }

    pub fn mat4(m: &Matrix4<f32>) -> Self {
        let mut cols = [[0.0f32; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, v) in col.iter_mut().enumerate() {
                *v = m[(r, c)];
            }
        }
        UniformValue::Mat4(cols)
    }

    pub fn mat3(m: &Matrix3<f32>) -> Self {
        let mut cols = [[0.0f32; 3]; 3];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, v) in col.iter_mut().enumerate() {
                *v = m[(r, c)];
            }
        }
        UniformValue::Mat3(cols)
    }
}

/// A uniform a program declares, in block order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformDecl {
    pub name: &'static str,
    pub kind: UniformKind,
}

impl UniformDecl {
    pub const fn new(name: &'static str, kind: UniformKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone)]
struct LayoutEntry {
    name: &'static str,
    kind: UniformKind,
    offset: usize,
}

/// Byte layout of a program's uniform block.
///
/// Every member starts on a 16-byte boundary. WGSL declarations match by
/// putting `@align(16)` on scalar and `vec2` members; `vec3`, `vec4`,
/// matrices and `array<vec4<i32>, N>` are already 16-aligned.
#[derive(Debug, Clone)]
pub struct UniformLayout {
    entries: Vec<LayoutEntry>,
    size: usize,
}

impl UniformLayout {
    pub fn new(decls: &[UniformDecl]) -> Self {
        let mut offset = 0usize;
        let entries = decls
            .iter()
            .map(|d| {
                let entry = LayoutEntry { name: d.name, kind: d.kind, offset };
                offset += d.kind.size();
                entry
            })
            .collect();

        Self { entries, size: offset.max(16) }
    }

    /// Total block size in bytes (never zero).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.entry(name).map(|e| e.offset)
    }

    /// Writes `value` into `block` at the slot declared for `name`.
    ///
    /// Returns `false` (and leaves `block` untouched) for undeclared names and
    /// kind mismatches. Int arrays longer than declared are truncated.
    pub fn write(&self, block: &mut [u8], name: &str, value: &UniformValue) -> bool {
        let Some(entry) = self.entry(name) else { return false };
        if !entry.kind.accepts(value) || block.len() < self.size {
            return false;
        }

        let at = entry.offset;
        match value {
            UniformValue::Mat4(m) => put(block, at, bytemuck::bytes_of(m)),
            UniformValue::Mat3(m) => {
                for (c, col) in m.iter().enumerate() {
                    put(block, at + 16 * c, bytemuck::bytes_of(col));
                }
            }
            UniformValue::Vec4(v) => put(block, at, bytemuck::bytes_of(v)),
            UniformValue::Vec3(v) => put(block, at, bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => put(block, at, bytemuck::bytes_of(v)),
            UniformValue::Float(v) => put(block, at, bytemuck::bytes_of(v)),
            UniformValue::Int(v) => put(block, at, bytemuck::bytes_of(v)),
            UniformValue::Sampler(unit) => put(block, at, bytemuck::bytes_of(&(*unit as i32))),
            UniformValue::IntArray(values) => {
                let UniformKind::IntArray(len) = entry.kind else { return false };
                for (i, v) in values.iter().take(len).enumerate() {
                    put(block, at + 16 * i, bytemuck::bytes_of(v));
                }
            }
        }
        true
    }

    fn entry(&self, name: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[inline]
fn put(block: &mut [u8], offset: usize, bytes: &[u8]) {
    block[offset..offset + bytes.len()].copy_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> UniformLayout {
        UniformLayout::new(&[
            UniformDecl::new("u_projection", UniformKind::Mat4),
            UniformDecl::new("u_normal", UniformKind::Mat3),
            UniformDecl::new("u_radius", UniformKind::Float),
            UniformDecl::new("u_textures", UniformKind::IntArray(3)),
            UniformDecl::new("u_tint", UniformKind::Vec3),
        ])
    }

    fn read_f32(block: &[u8], at: usize) -> f32 {
        f32::from_le_bytes(block[at..at + 4].try_into().unwrap())
    }

    fn read_i32(block: &[u8], at: usize) -> i32 {
        i32::from_le_bytes(block[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn members_start_on_16_byte_boundaries() {
        let l = layout();
        assert_eq!(l.offset_of("u_projection"), Some(0));
        assert_eq!(l.offset_of("u_normal"), Some(64));
        assert_eq!(l.offset_of("u_radius"), Some(112));
        assert_eq!(l.offset_of("u_textures"), Some(128));
        assert_eq!(l.offset_of("u_tint"), Some(176));
        assert_eq!(l.size(), 192);
    }

    #[test]
    fn empty_layout_still_has_a_binding_size() {
        assert_eq!(UniformLayout::new(&[]).size(), 16);
    }

    #[test]
    fn mat4_is_written_column_major() {
        let l = layout();
        let mut block = vec![0u8; l.size()];
        let m = Matrix4::new_translation(&nalgebra::Vector3::new(3.0, 4.0, 5.0));
        assert!(l.write(&mut block, "u_projection", &UniformValue::mat4(&m)));

        // Translation lives in the fourth column.
        assert_eq!(read_f32(&block, 48), 3.0);
        assert_eq!(read_f32(&block, 52), 4.0);
        assert_eq!(read_f32(&block, 56), 5.0);
        assert_eq!(read_f32(&block, 60), 1.0);
    }

    #[test]
    fn mat3_columns_are_padded() {
        let l = layout();
        let mut block = vec![0u8; l.size()];
        let value = UniformValue::Mat3([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert!(l.write(&mut block, "u_normal", &value));

        assert_eq!(read_f32(&block, 64), 1.0);
        assert_eq!(read_f32(&block, 64 + 16), 4.0);
        assert_eq!(read_f32(&block, 64 + 32 + 8), 9.0);
    }

    #[test]
    fn int_array_uses_one_slot_per_element() {
        let l = layout();
        let mut block = vec![0u8; l.size()];
        assert!(l.write(&mut block, "u_textures", &UniformValue::IntArray(vec![7, 8, 9, 10])));

        assert_eq!(read_i32(&block, 128), 7);
        assert_eq!(read_i32(&block, 144), 8);
        assert_eq!(read_i32(&block, 160), 9);
        // Truncated to the declared length; the next member is untouched.
        assert_eq!(read_f32(&block, 176), 0.0);
    }

    #[test]
    fn rejects_unknown_names_and_kind_mismatches() {
        let l = layout();
        let mut block = vec![0u8; l.size()];
        assert!(!l.write(&mut block, "u_missing", &UniformValue::Float(1.0)));
        assert!(!l.write(&mut block, "u_radius", &UniformValue::Int(1)));
        assert!(block.iter().all(|b| *b == 0));
    }
}
