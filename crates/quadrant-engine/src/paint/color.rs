/// Straight-alpha RGBA color, one byte per channel (`0`–`255`).
///
/// Channels are sRGB encoded, like the texels of a color texture. Vertex
/// emission converts to `[0, 1]` floats; shaders decode them to linear and
/// premultiply before blending.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Returns the same color with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Channels scaled to `[0, 1]`, in `r, g, b, a` order.
    #[inline]
    pub fn normalized(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Channels decoded to linear light. Alpha is already linear.
    pub fn linear(self) -> [f32; 4] {
        let [r, g, b, a] = self.normalized();
        [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
    }

    /// Converts to the `f64` color type wgpu uses for clear values.
    ///
    /// Clear values are written to the target as-is, so they are linearized
    /// the same way vertex colors are in the shaders.
    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.linear();
        wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 }
    }
}

/// sRGB transfer function, inverted. `c` is in `[0, 1]`.
///
/// Must match `srgb_to_linear` in the WGSL shaders.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_maps_byte_range_to_unit_range() {
        assert_eq!(Color::WHITE.normalized(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(Color::TRANSPARENT.normalized(), [0.0; 4]);

        let [r, g, b, a] = Color::rgba(51, 102, 0, 255).normalized();
        assert!((r - 0.2).abs() < 1e-6);
        assert!((g - 0.4).abs() < 1e-6);
        assert_eq!(b, 0.0);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn srgb_decode_keeps_endpoints_and_darkens_midtones() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214_041).abs() < 1e-4);
        // Linear segment near black.
        assert!((srgb_to_linear(0.04) - 0.04 / 12.92).abs() < 1e-7);
    }

    #[test]
    fn clear_color_is_linearized_like_texels() {
        // An sRGB target re-encodes 0.2159 back to 128, as it does a decoded
        // texel of 128.
        let c = Color::rgba(128, 128, 128, 128).to_wgpu();
        assert!((c.r - 0.215_861).abs() < 1e-4);
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);

        let [r, _, _, a] = Color::WHITE.linear();
        assert!((r - 1.0).abs() < 1e-6);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = Color::rgb(10, 20, 30).with_alpha(40);
        assert_eq!(c, Color::rgba(10, 20, 30, 40));
    }
}
