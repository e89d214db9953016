use std::collections::HashMap;
use std::rc::Rc;

use crate::coords::Vec2;

use super::{Sprite, Texture};

/// One character of a bitmap font.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub sprite: Sprite,
    /// Horizontal pen advance at scale 1.
    pub advance: f32,
    /// Offset of the glyph quad from the pen position at scale 1.
    pub offset: Vec2,
}

impl Glyph {
    /// Quad size at scale 1.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.sprite.width() as f32, self.sprite.height() as f32)
    }
}

/// Bitmap font: one texture plus a glyph table.
///
/// Characters without a glyph render as the fallback glyph when one is set,
/// and are skipped otherwise.
#[derive(Debug, Clone)]
pub struct Font {
    name: String,
    texture: Rc<Texture>,
    glyphs: HashMap<char, Glyph>,
    line_height: f32,
    fallback: Option<char>,
}

impl Font {
    pub fn new(name: impl Into<String>, texture: &Rc<Texture>, line_height: f32) -> Self {
        Self {
            name: name.into(),
            texture: Rc::clone(texture),
            glyphs: HashMap::new(),
            line_height,
            fallback: None,
        }
    }

    /// Builds a monospace font from a texture laid out as a grid.
    ///
    /// `charset` lists the characters cell by cell, left to right, top to
    /// bottom. Characters past the last full cell are ignored. Glyphs advance
    /// by `cell_width + spacing`; lines are `cell_height + spacing` apart.
    pub fn from_grid(
        name: impl Into<String>,
        texture: &Rc<Texture>,
        cell_width: u32,
        cell_height: u32,
        spacing: u32,
        charset: &str,
    ) -> Self {
        let columns = if cell_width == 0 { 0 } else { texture.width() / cell_width };
        let rows = if cell_height == 0 { 0 } else { texture.height() / cell_height };
        let cells = (columns * rows) as usize;

        let mut font = Self::new(name, texture, (cell_height + spacing) as f32);
        for (i, ch) in charset.chars().take(cells).enumerate() {
            let i = i as u32;
            let (col, row) = (i % columns, i / columns);
            font.insert_glyph(
                ch,
                Glyph {
                    sprite: Sprite::from_region(
                        texture,
                        col * cell_width,
                        row * cell_height,
                        cell_width,
                        cell_height,
                    ),
                    advance: (cell_width + spacing) as f32,
                    offset: Vec2::zero(),
                },
            );
        }
        font
    }

    pub fn with_fallback(mut self, ch: char) -> Self {
        self.fallback = Some(ch);
        self
    }

    pub fn insert_glyph(&mut self, ch: char, glyph: Glyph) {
        self.glyphs.insert(ch, glyph);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Glyph for `ch`, or the fallback glyph.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs
            .get(&ch)
            .or_else(|| self.fallback.and_then(|f| self.glyphs.get(&f)))
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Size of the box `text` occupies at `scale`.
    ///
    /// Width is the widest line; height is one line height per line.
    pub fn measure(&self, text: &str, scale: f32) -> Vec2 {
        let mut widest = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let width: f32 = line.chars().filter_map(|c| self.glyph(c)).map(|g| g.advance).sum();
            widest = widest.max(width);
        }
        Vec2::new(widest * scale, lines as f32 * self.line_height * scale)
    }
}
