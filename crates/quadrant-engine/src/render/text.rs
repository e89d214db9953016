use std::rc::Rc;

use crate::assets::{Font, Shader};
use crate::camera::Camera;
use crate::coords::Vec2;
use crate::gfx::RenderBackend;
use crate::paint::Color;

use super::{DepthLayer, Drawable, DrawableBatch, Transform};

/// Glyph quads queued for one font.
///
/// A font lives in a single texture, so batches here only ever fill up on
/// quad count. Glyphs draw in the order they were queued.
pub struct TextBatch {
    font: Rc<Font>,
    shader: Rc<Shader>,
    batches: Vec<DrawableBatch>,
    current: usize,
}

impl TextBatch {
    pub fn new(font: Rc<Font>, shader: Rc<Shader>) -> Self {
        Self { font, shader, batches: Vec::new(), current: 0 }
    }

    pub fn font(&self) -> &Rc<Font> {
        &self.font
    }

    /// Lays out `text` with its top-left at `(x, y)` and queues its glyphs.
    ///
    /// `'\n'` starts a new line. Characters the font cannot draw are skipped.
    /// Returns the number of glyph quads queued.
    pub fn add_string<B: RenderBackend + ?Sized>(
        &mut self,
        gpu: &mut B,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
        color: Color,
    ) -> usize {
        let font = Rc::clone(&self.font);
        let mut pen = Vec2::new(x, y);
        let mut queued = 0;

        for ch in text.chars() {
            if ch == '\n' {
                pen = Vec2::new(x, pen.y + font.line_height() * scale);
                continue;
            }
            let Some(glyph) = font.glyph(ch) else {
                log::trace!("font '{}' has no glyph for {:?}", font.name(), ch);
                continue;
            };

            let quad = Drawable::new(
                color,
                Transform::new(pen + glyph.offset * scale, glyph.size() * scale),
                glyph.sprite.clone(),
            );
            self.push(gpu, &quad);
            pen.x += glyph.advance * scale;
            queued += 1;
        }
        queued
    }

    fn push<B: RenderBackend + ?Sized>(&mut self, gpu: &mut B, quad: &Drawable) {
        loop {
            if let Some(batch) = self.batches.get_mut(self.current) {
                if batch.add_drawable(quad) {
                    return;
                }
                self.current += 1;
            } else {
                log::debug!("font '{}': allocating text batch {}", self.font.name(), self.current);
                self.batches.push(DrawableBatch::new(
                    gpu,
                    Rc::clone(&self.shader),
                    DepthLayer::Foreground,
                ));
            }
        }
    }

    /// Number of glyphs queued this frame.
    pub fn len(&self) -> usize {
        self.batches.iter().map(DrawableBatch::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(DrawableBatch::is_empty)
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Draws and clears every non-empty batch.
    ///
    /// Returns `(draw_calls, glyphs)`.
    pub fn flush<B: RenderBackend + ?Sized>(&mut self, gpu: &mut B, camera: &Camera) -> (usize, usize) {
        let mut calls = 0;
        let mut glyphs = 0;
        for batch in self.batches.iter_mut().filter(|b| !b.is_empty()) {
            glyphs += batch.flush(gpu, camera);
            calls += 1;
        }
        self.current = 0;
        (calls, glyphs)
    }
}

impl std::fmt::Debug for TextBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBatch")
            .field("font", &self.font.name())
            .field("batches", &self.batches.len())
            .field("glyphs", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::gfx::RecordingBackend;
    use crate::gfx::vertex::{QUAD_FLOATS, VERTEX_SIZE};
    use crate::render::MAX_BATCH_SIZE;
    use crate::render::test_support::{batch_shader, grid_font};

    #[test]
    fn glyphs_advance_and_wrap() {
        let mut gpu = RecordingBackend::new();
        let shader = batch_shader(&mut gpu);
        let font = grid_font(&mut gpu);
        let mut text = TextBatch::new(font, shader);

        // 'Z' is not in the font.
        let queued = text.add_string(&mut gpu, "AZB\nC", 10.0, 20.0, 2.0, Color::WHITE);
        assert_eq!(queued, 3);
        assert_eq!(text.len(), 3);

        let cam = Camera::new(Viewport::new(100.0, 100.0));
        assert_eq!(text.flush(&mut gpu, &cam), (1, 3));

        let draw = &gpu.draws()[0];
        let top_left = |quad: usize| {
            let v = &draw.vertices[quad * QUAD_FLOATS + 2 * VERTEX_SIZE..];
            (v[0], v[1])
        };
        // Cells are 3x5 with 1px spacing, scaled by 2.
        assert_eq!(top_left(0), (10.0, 20.0));
        assert_eq!(top_left(1), (18.0, 20.0));
        assert_eq!(top_left(2), (10.0, 32.0));
        assert!(text.is_empty());
    }

    #[test]
    fn long_strings_spill_into_more_batches() {
        let mut gpu = RecordingBackend::new();
        let shader = batch_shader(&mut gpu);
        let font = grid_font(&mut gpu);
        let mut text = TextBatch::new(font, shader);

        let s = "A".repeat(MAX_BATCH_SIZE + 5);
        text.add_string(&mut gpu, &s, 0.0, 0.0, 1.0, Color::WHITE);
        assert_eq!(text.batch_count(), 2);

        let cam = Camera::new(Viewport::new(100.0, 100.0));
        assert_eq!(text.flush(&mut gpu, &cam), (2, MAX_BATCH_SIZE + 5));

        // Pooled batches are reused the next frame.
        text.add_string(&mut gpu, "AB", 0.0, 0.0, 1.0, Color::WHITE);
        assert_eq!(text.batch_count(), 2);
        assert_eq!(text.flush(&mut gpu, &cam), (1, 2));
    }
}
