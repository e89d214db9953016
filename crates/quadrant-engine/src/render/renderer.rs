use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use crate::assets::{AssetCache, AssetError, Shader};
use crate::camera::Camera;
use crate::gfx::RenderBackend;
use crate::paint::Color;

use super::{DepthLayer, Drawable, DrawableBatch, DrawableSingle, TextBatch, Transform, shaders};

/// Which cached shaders the renderer draws with.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Program used by batches and text.
    pub batch_shader: String,
    /// Program used by rounded-rectangle singles.
    pub round_rect_shader: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            batch_shader: shaders::SPRITE_BATCH.to_string(),
            round_rect_shader: shaders::ROUND_RECT.to_string(),
        }
    }
}

/// What one [`Renderer::render`] call submitted.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub draw_calls: usize,
    /// Batched and single quads, text excluded.
    pub quads: usize,
    /// Sprite batches flushed.
    pub batches: usize,
    /// Rounded-rectangle singles flushed.
    pub singles: usize,
    /// Glyph quads drawn by the text pass.
    pub glyphs: usize,
}

/// Routes drawables into batches and singles and flushes them once per frame.
///
/// Every frame: queue everything visible with the `add_*` calls, then call
/// [`render`](Self::render). Layers draw back to front; text draws last.
/// Batches and singles are pooled for the renderer's lifetime.
pub struct Renderer<B: RenderBackend> {
    gpu: B,
    assets: Rc<AssetCache>,
    camera: Camera,

    batch_shader: Rc<Shader>,
    round_rect_shader: Rc<Shader>,

    batches: Vec<DrawableBatch>,
    singles: Vec<DrawableSingle>,
    /// Batch currently being filled, per layer. Routing only moves forward
    /// from it, so submission order survives batch boundaries.
    cursors: [Option<usize>; DepthLayer::COUNT],

    text: BTreeMap<String, TextBatch>,
    missing_fonts: HashSet<String>,
    last_stats: FrameStats,
}

impl<B: RenderBackend> Renderer<B> {
    /// Fails if either configured shader is not in `assets`.
    pub fn new(
        gpu: B,
        assets: Rc<AssetCache>,
        camera: Camera,
        config: RendererConfig,
    ) -> Result<Self, AssetError> {
        let batch_shader = assets.require_shader(&config.batch_shader)?;
        let round_rect_shader = assets.require_shader(&config.round_rect_shader)?;

        Ok(Self {
            gpu,
            assets,
            camera,
            batch_shader,
            round_rect_shader,
            batches: Vec::new(),
            singles: Vec::new(),
            cursors: [None; DepthLayer::COUNT],
            text: BTreeMap::new(),
            missing_fonts: HashSet::new(),
            last_stats: FrameStats::default(),
        })
    }

    /// Queues a copy of `drawable` on `layer`.
    pub fn add_drawable(&mut self, drawable: &Drawable, layer: DepthLayer) {
        let start = self.cursors[layer.index()].unwrap_or(0);
        let found = self
            .batches
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, b)| b.layer() == layer && b.accepts(drawable))
            .map(|(i, _)| i);

        let index = match found {
            Some(i) => i,
            None => {
                self.batches.push(DrawableBatch::new(
                    &mut self.gpu,
                    Rc::clone(&self.batch_shader),
                    layer,
                ));
                log::debug!("Renderer: allocated batch {} on {:?}", self.batches.len() - 1, layer);
                self.batches.len() - 1
            }
        };

        self.cursors[layer.index()] = Some(index);
        let added = self.batches[index].add_drawable(drawable);
        debug_assert!(added, "routed batch refused a drawable it accepted");
    }

    /// Queues an untextured rectangle.
    pub fn add_rectangle(&mut self, color: Color, transform: Transform, layer: DepthLayer) {
        self.add_drawable(&Drawable::rectangle(color, transform), layer);
    }

    /// Queues an untextured rectangle with rounded corners.
    pub fn add_round_rectangle(
        &mut self,
        color: Color,
        transform: Transform,
        layer: DepthLayer,
        radius: f32,
    ) {
        self.add_round_drawable(&Drawable::rectangle(color, transform), layer, radius);
    }

    /// Queues any drawable with rounded corners. Always drawn on its own.
    pub fn add_round_drawable(&mut self, drawable: &Drawable, layer: DepthLayer, radius: f32) {
        let index = match self.singles.iter().position(DrawableSingle::is_available) {
            Some(i) => i,
            None => {
                self.singles
                    .push(DrawableSingle::new(&mut self.gpu, Rc::clone(&self.round_rect_shader)));
                log::debug!("Renderer: allocated single {}", self.singles.len() - 1);
                self.singles.len() - 1
            }
        };
        self.singles[index].set_drawable(drawable, layer, radius);
    }

    /// Queues `text` with its top-left at `(x, y)`, drawn above every layer.
    ///
    /// Unknown fonts are reported once and the text is dropped.
    pub fn add_string(&mut self, text: &str, x: f32, y: f32, scale: f32, color: Color, font: &str) {
        if !self.text.contains_key(font) {
            let Some(f) = self.assets.font(font) else {
                if self.missing_fonts.insert(font.to_string()) {
                    log::warn!("Renderer: unknown font '{}'; text dropped", font);
                }
                return;
            };
            self.text.insert(font.to_string(), TextBatch::new(f, Rc::clone(&self.batch_shader)));
        }

        if let Some(batch) = self.text.get_mut(font) {
            batch.add_string(&mut self.gpu, text, x, y, scale, color);
        }
    }

    /// Flushes everything queued this frame.
    pub fn render(&mut self) -> FrameStats {
        let mut stats = FrameStats::default();
        let gpu = &mut self.gpu;
        let camera = &self.camera;

        for layer in DepthLayer::ALL {
            for batch in self.batches.iter_mut().filter(|b| b.layer() == layer && !b.is_empty()) {
                stats.quads += batch.flush(gpu, camera);
                stats.batches += 1;
            }
            for single in self.singles.iter_mut().filter(|s| s.layer() == layer) {
                if single.flush(gpu, camera) {
                    stats.quads += 1;
                    stats.singles += 1;
                }
            }
        }
        stats.draw_calls = stats.batches + stats.singles;

        for text in self.text.values_mut() {
            let (calls, glyphs) = text.flush(gpu, camera);
            stats.draw_calls += calls;
            stats.glyphs += glyphs;
        }

        self.cursors = [None; DepthLayer::COUNT];
        log::trace!("Renderer: {:?}", stats);
        self.last_stats = stats;
        stats
    }

    /// Stats of the most recent [`render`](Self::render).
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn backend(&self) -> &B {
        &self.gpu
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.gpu
    }

    pub fn assets(&self) -> &Rc<AssetCache> {
        &self.assets
    }

    /// Pooled batches across all layers, text excluded.
    pub fn batches(&self) -> &[DrawableBatch] {
        &self.batches
    }

    pub fn singles(&self) -> &[DrawableSingle] {
        &self.singles
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn single_count(&self) -> usize {
        self.singles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Texture;
    use crate::coords::{Vec2, Viewport};
    use crate::gfx::vertex::{QUAD_FLOATS, VERTEX_SIZE};
    use crate::gfx::{ProgramId, RecordedDraw, RecordingBackend};
    use crate::render::MAX_BATCH_SIZE;
    use crate::render::test_support::{assets, red_rect, textured, textures};

    fn renderer() -> Renderer<RecordingBackend> {
        let (gpu, cache) = assets();
        let camera = Camera::new(Viewport::new(800.0, 600.0));
        Renderer::new(gpu, cache, camera, RendererConfig::default()).unwrap()
    }

    fn upload<const N: usize>(r: &mut Renderer<RecordingBackend>) -> [Rc<Texture>; N] {
        textures(r.backend_mut())
    }

    /// Draws recorded since the last `clear_commands`.
    fn draws(r: &Renderer<RecordingBackend>) -> Vec<RecordedDraw> {
        r.backend().draws()
    }

    fn program(r: &Renderer<RecordingBackend>, name: &str) -> ProgramId {
        r.assets().shader(name).unwrap().program()
    }

    /// x of the top-left corner of every quad, in draw order.
    fn quad_xs(draws: &[RecordedDraw]) -> Vec<f32> {
        draws
            .iter()
            .flat_map(|d| {
                (0..d.quad_count()).map(move |q| d.vertices[q * QUAD_FLOATS + 2 * VERTEX_SIZE])
            })
            .collect()
    }

    #[test]
    fn missing_shader_fails_construction() {
        let (gpu, cache) = assets();
        let config = RendererConfig { batch_shader: "nope".into(), ..Default::default() };
        let camera = Camera::new(Viewport::new(1.0, 1.0));
        assert!(matches!(
            Renderer::new(gpu, cache, camera, config),
            Err(AssetError::MissingShader(name)) if name == "nope"
        ));
    }

    #[test]
    fn thousand_and_one_quads_need_two_batches() {
        let mut r = renderer();
        let [t] = upload(&mut r);
        let d = textured(&t);
        for _ in 0..=MAX_BATCH_SIZE {
            r.add_drawable(&d, DepthLayer::Middleground);
        }
        assert_eq!(r.batch_count(), 2);

        let stats = r.render();
        assert_eq!(stats.quads, MAX_BATCH_SIZE + 1);
        assert_eq!(stats.batches, 2);

        let counts: Vec<usize> = draws(&r).iter().map(RecordedDraw::quad_count).collect();
        assert_eq!(counts, vec![MAX_BATCH_SIZE, 1]);
    }

    #[test]
    fn nine_textures_split_batches_and_repeats_are_free() {
        let mut r = renderer();
        let all: [_; 9] = upload(&mut r);
        for t in &all {
            r.add_drawable(&textured(t), DepthLayer::Background);
        }
        assert!(r.batch_count() >= 2);
        assert_eq!(r.batches()[0].textures().len(), 8);

        // Already tracked by the batch being filled.
        r.add_drawable(&textured(&all[8]), DepthLayer::Background);
        assert_eq!(r.batches()[1].textures().len(), 1);
        assert_eq!(r.batches()[1].len(), 2);
        assert_eq!(r.batch_count(), 2);
    }

    #[test]
    fn insertion_order_survives_batch_boundaries() {
        let mut r = renderer();
        let all: [_; 9] = upload(&mut r);

        // The ninth texture forces a second batch; the later untextured quad
        // must not slip back into the first one.
        for (i, t) in all.iter().enumerate() {
            let mut d = textured(t);
            d.transform.position.x = i as f32;
            r.add_drawable(&d, DepthLayer::Middleground);
        }
        r.add_drawable(&red_rect(9.0, 0.0), DepthLayer::Middleground);

        r.backend_mut().clear_commands();
        r.render();
        let xs = quad_xs(&draws(&r));
        assert_eq!(xs, (0..10).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn layers_draw_back_to_front_regardless_of_submission() {
        let mut r = renderer();
        r.add_drawable(&red_rect(2.0, 0.0), DepthLayer::Foreground);
        r.add_drawable(&red_rect(1.0, 0.0), DepthLayer::Middleground);
        r.add_round_rectangle(
            Color::WHITE,
            Transform::from_xywh(3.0, 0.0, 5.0, 5.0),
            DepthLayer::Background,
            1.0,
        );
        r.add_drawable(&red_rect(0.0, 0.0), DepthLayer::Background);

        r.backend_mut().clear_commands();
        let stats = r.render();
        assert_eq!(stats.draw_calls, 4);

        let d = draws(&r);
        // Background batch, then the background single, then the rest.
        assert_eq!(quad_xs(&d), vec![0.0, 3.0, 1.0, 2.0]);
        assert_eq!(d[1].program, Some(program(&r, shaders::ROUND_RECT)));
    }

    #[test]
    fn round_rectangle_uses_a_single_only() {
        let mut r = renderer();
        r.add_round_rectangle(
            Color::rgb(0, 128, 255),
            Transform::from_xywh(0.0, 0.0, 100.0, 50.0),
            DepthLayer::Foreground,
            8.0,
        );
        assert_eq!(r.batch_count(), 0);
        assert_eq!(r.single_count(), 1);

        r.backend_mut().clear_commands();
        let stats = r.render();
        assert_eq!((stats.quads, stats.singles, stats.batches), (1, 1, 0));

        let d = draws(&r);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].quad_count(), 1);
        assert_eq!(d[0].program, Some(program(&r, shaders::ROUND_RECT)));
        assert!(r.batches().iter().all(DrawableBatch::is_empty));
    }

    #[test]
    fn singles_are_reused_after_flush() {
        let mut r = renderer();
        let panel = Transform::from_xywh(0.0, 0.0, 10.0, 10.0);

        r.add_round_rectangle(Color::WHITE, panel, DepthLayer::Middleground, 2.0);
        r.add_round_rectangle(Color::WHITE, panel, DepthLayer::Middleground, 2.0);
        assert_eq!(r.single_count(), 2);
        r.render();
        assert!(r.singles().iter().all(DrawableSingle::is_available));

        r.add_round_rectangle(Color::WHITE, panel, DepthLayer::Middleground, 2.0);
        assert_eq!(r.single_count(), 2);
        assert!(!r.singles()[0].is_available());
    }

    #[test]
    fn pooled_batches_are_reused_next_frame() {
        let mut r = renderer();
        for i in 0..3 {
            r.add_drawable(&red_rect(i as f32, 0.0), DepthLayer::Middleground);
        }
        r.render();
        r.add_drawable(&red_rect(0.0, 0.0), DepthLayer::Middleground);
        assert_eq!(r.batch_count(), 1);
        assert_eq!(r.batches()[0].len(), 1);
    }

    #[test]
    fn submission_is_a_snapshot() {
        let mut r = renderer();
        let mut live = red_rect(5.0, 0.0);
        r.add_drawable(&live, DepthLayer::Middleground);
        live.transform.position = Vec2::new(400.0, 400.0);

        r.backend_mut().clear_commands();
        r.render();
        assert_eq!(quad_xs(&draws(&r)), vec![5.0]);
    }

    #[test]
    fn text_draws_after_every_layer() {
        let mut r = renderer();
        r.add_string("AB", 0.0, 0.0, 1.0, Color::WHITE, "mini");
        r.add_drawable(&red_rect(0.0, 0.0), DepthLayer::Foreground);

        r.backend_mut().clear_commands();
        let stats = r.render();
        assert_eq!(stats.glyphs, 2);
        assert_eq!(stats.draw_calls, 2);

        let d = draws(&r);
        assert_eq!(d[0].quad_count(), 1);
        assert_eq!(d[1].quad_count(), 2);
        let font = r.assets().font("mini").unwrap();
        assert_eq!(d[1].textures.get(&1), Some(&font.texture().id()));
    }

    #[test]
    fn unknown_font_drops_text() {
        let mut r = renderer();
        r.add_string("hello", 0.0, 0.0, 1.0, Color::WHITE, "missing");
        r.add_string("again", 0.0, 0.0, 1.0, Color::WHITE, "missing");
        r.backend_mut().clear_commands();
        assert_eq!(r.render(), FrameStats::default());
    }

    #[test]
    fn empty_frame_issues_no_draws() {
        let mut r = renderer();
        r.backend_mut().clear_commands();
        assert_eq!(r.render(), FrameStats::default());
        assert!(r.backend().commands().is_empty());
    }

    #[test]
    fn uploads_current_camera_matrices() {
        let mut r = renderer();
        r.camera_mut().adjust_position(Vec2::new(50.0, 25.0));
        r.add_drawable(&red_rect(0.0, 0.0), DepthLayer::Middleground);
        r.backend_mut().clear_commands();
        r.render();

        let d = &draws(&r)[0];
        assert_eq!(
            d.uniforms.get("u_view"),
            Some(&crate::gfx::UniformValue::mat4(r.camera().view()))
        );
    }
}
