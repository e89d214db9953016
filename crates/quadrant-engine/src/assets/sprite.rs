use std::rc::Rc;

use super::Texture;

/// UVs of a blank sprite, in quad-emission order.
const FULL_UVS: [[f32; 2]; 4] = [[1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0]];

/// A rectangle of a texture.
///
/// `uvs` holds one normalized coordinate per quad corner, in the order quads
/// are emitted: bottom-right, top-right, top-left, bottom-left (screen space,
/// y down). `v = 0` is the first uploaded pixel row.
///
/// A sprite without a texture is *blank*: it covers the unit square and the
/// batch shader fills it with the drawable's color.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    texture: Option<Rc<Texture>>,
    uvs: [[f32; 2]; 4],
    width: u32,
    height: u32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self::blank()
    }
}

impl Sprite {
    pub fn blank() -> Self {
        Self { texture: None, uvs: FULL_UVS, width: 1, height: 1 }
    }

    /// The whole texture.
    pub fn from_texture(texture: &Rc<Texture>) -> Self {
        Self {
            texture: Some(Rc::clone(texture)),
            uvs: FULL_UVS,
            width: texture.width(),
            height: texture.height(),
        }
    }

    /// A pixel rectangle of `texture`, `(x, y)` being its top-left pixel.
    ///
    /// The rectangle is not clamped; regions past the edge sample clamped
    /// texels.
    pub fn from_region(texture: &Rc<Texture>, x: u32, y: u32, width: u32, height: u32) -> Self {
        let tw = texture.width().max(1) as f32;
        let th = texture.height().max(1) as f32;

        let (x, y) = (x as f32, y as f32);
        let u0 = x / tw;
        let u1 = (x + width as f32) / tw;
        let v0 = y / th;
        let v1 = (y + height as f32) / th;

        Self {
            texture: Some(Rc::clone(texture)),
            uvs: [[u1, v1], [u1, v0], [u0, v0], [u0, v1]],
            width,
            height,
        }
    }

    #[inline]
    pub fn texture(&self) -> Option<&Rc<Texture>> {
        self.texture.as_ref()
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        self.texture.is_none()
    }

    #[inline]
    pub fn uvs(&self) -> &[[f32; 2]; 4] {
        &self.uvs
    }

    /// Native width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Native height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// A texture cut into equally sized cells, read left to right, top to bottom.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    texture: Rc<Texture>,
    sprites: Vec<Sprite>,
    columns: u32,
}

impl SpriteSheet {
    /// Slices `texture` into `cell_width` x `cell_height` cells.
    ///
    /// `spacing` pixels separate neighbouring cells. Partial cells at the
    /// right and bottom edges are skipped.
    pub fn new(texture: &Rc<Texture>, cell_width: u32, cell_height: u32, spacing: u32) -> Self {
        let step_x = cell_width.saturating_add(spacing);
        let step_y = cell_height.saturating_add(spacing);
        let fits = |extent: u32, cell: u32, step: u32| {
            if cell == 0 || extent < cell { 0 } else { (extent - cell) / step + 1 }
        };
        let columns = fits(texture.width(), cell_width, step_x);
        let rows = fits(texture.height(), cell_height, step_y);

        let mut sprites = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for col in 0..columns {
                sprites.push(Sprite::from_region(
                    texture,
                    col * step_x,
                    row * step_y,
                    cell_width,
                    cell_height,
                ));
            }
        }

        Self { texture: Rc::clone(texture), sprites, columns }
    }

    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    pub fn get(&self, index: usize) -> Option<&Sprite> {
        self.sprites.get(index)
    }

    /// Cell at `(column, row)`.
    pub fn cell(&self, column: u32, row: u32) -> Option<&Sprite> {
        if column >= self.columns {
            return None;
        }
        self.sprites.get((row * self.columns + column) as usize)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::TextureId;
    use approx::assert_relative_eq;

    fn texture(w: u32, h: u32) -> Rc<Texture> {
        Rc::new(Texture::new(TextureId(0), w, h))
    }

    #[test]
    fn blank_sprite_covers_unit_square() {
        let s = Sprite::blank();
        assert!(s.is_blank());
        assert_eq!(s.uvs(), &FULL_UVS);
        assert_eq!((s.width(), s.height()), (1, 1));
    }

    #[test]
    fn region_uvs_follow_emission_order() {
        let t = texture(64, 32);
        let s = Sprite::from_region(&t, 16, 8, 16, 8);

        let [br, tr, tl, bl] = *s.uvs();
        assert_relative_eq!(tl[0], 0.25);
        assert_relative_eq!(tl[1], 0.25);
        assert_relative_eq!(br[0], 0.5);
        assert_relative_eq!(br[1], 0.5);
        assert_eq!(tr, [br[0], tl[1]]);
        assert_eq!(bl, [tl[0], br[1]]);
        assert_eq!((s.width(), s.height()), (16, 8));
    }

    #[test]
    fn sheet_reads_rows_top_to_bottom() {
        let t = texture(34, 16);
        // Two 16px columns with 2px spacing, one row.
        let sheet = SpriteSheet::new(&t, 16, 16, 2);
        assert_eq!(sheet.len(), 2);

        let second = sheet.cell(1, 0).unwrap();
        assert_relative_eq!(second.uvs()[2][0], 18.0 / 34.0);
        assert!(sheet.cell(2, 0).is_none());
        assert!(sheet.cell(0, 1).is_none());
    }

    #[test]
    fn region_at_the_u32_limit_does_not_overflow() {
        let t = texture(64, 64);
        let s = Sprite::from_region(&t, u32::MAX - 2, u32::MAX - 2, 8, 8);
        assert!(s.uvs().iter().flatten().all(|c| c.is_finite()));
        assert_eq!((s.width(), s.height()), (8, 8));
    }

    #[test]
    fn huge_spacing_keeps_only_the_first_cell() {
        let sheet = SpriteSheet::new(&texture(32, 32), 16, 16, u32::MAX);
        assert_eq!(sheet.len(), 1);
        assert_relative_eq!(sheet.cell(0, 0).unwrap().uvs()[0][0], 0.5);
    }

    #[test]
    fn zero_cell_size_yields_empty_sheet() {
        let sheet = SpriteSheet::new(&texture(8, 8), 0, 8, 0);
        assert!(sheet.is_empty());
    }
}
