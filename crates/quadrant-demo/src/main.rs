//! Thousands of bouncing sprites over more textures than one batch can hold,
//! a few rounded panels and a live stats overlay.
//!
//! Arrow keys pan the camera, Space pauses, Escape quits.

mod procedural;

use std::rc::Rc;

use anyhow::Context;
use rand::Rng;

use quadrant_engine::assets::{AssetCache, Sprite};
use quadrant_engine::camera::Camera;
use quadrant_engine::coords::{Vec2, Viewport};
use quadrant_engine::core::{App, AppControl, FrameCtx};
use quadrant_engine::device::{Gpu, GpuInit};
use quadrant_engine::gfx::{WgpuBackend, WgpuBackendConfig};
use quadrant_engine::logging::{LoggingConfig, init_logging};
use quadrant_engine::paint::Color;
use quadrant_engine::render::{DepthLayer, Drawable, FrameStats, Renderer, RendererConfig, Transform};
use quadrant_engine::window::{Runtime, RuntimeConfig};
use quadrant_engine::winit::event::{ElementState, WindowEvent};
use quadrant_engine::winit::keyboard::{KeyCode, PhysicalKey};
use quadrant_engine::winit::window::WindowId;

const SPRITES: usize = 4000;
const TILE_TEXTURES: usize = 12;
const PAN_SPEED: f32 = 400.0;
/// Sprites bounce inside this world rectangle, larger than the window.
const WORLD: Vec2 = Vec2::new(2400.0, 1400.0);

const CLEAR: Color = Color::rgb(18, 20, 28);
const PANEL: Color = Color::rgba(30, 34, 48, 220);
const TEXT: Color = Color::rgb(235, 235, 220);

struct Mover {
    drawable: Drawable,
    velocity: Vec2,
    layer: DepthLayer,
}

#[derive(Default)]
struct Pan {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl Pan {
    fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

#[derive(Default)]
struct Demo {
    renderer: Option<Renderer<WgpuBackend>>,
    movers: Vec<Mover>,
    pan: Pan,
    paused: bool,
    fps: f32,
}

impl Demo {
    fn spawn(&mut self, tiles: &[Sprite]) {
        let mut rng = rand::thread_rng();
        self.movers = (0..SPRITES)
            .map(|i| {
                let size = rng.gen_range(8.0..28.0);
                let transform = Transform::from_xywh(
                    rng.gen_range(0.0..WORLD.x - size),
                    rng.gen_range(0.0..WORLD.y - size),
                    size,
                    size,
                );
                let sprite = tiles[rng.gen_range(0..tiles.len())].clone();
                // Every tenth mover is an untextured tinted square.
                let drawable = if i % 10 == 0 {
                    Drawable::rectangle(Color::rgba(255, 255, 255, 90), transform)
                } else {
                    Drawable::sprite(sprite, transform)
                };
                let speed = rng.gen_range(20.0..160.0);
                let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
                Mover {
                    drawable,
                    velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                    layer: if i % 3 == 0 { DepthLayer::Background } else { DepthLayer::Middleground },
                }
            })
            .collect();
    }

    fn step(&mut self, dt: f32) {
        for m in &mut self.movers {
            let t = &mut m.drawable.transform;
            t.position += m.velocity * dt;

            let max = WORLD - t.scale;
            if t.position.x < 0.0 || t.position.x > max.x {
                m.velocity.x = -m.velocity.x;
                t.position.x = t.position.x.clamp(0.0, max.x);
            }
            if t.position.y < 0.0 || t.position.y > max.y {
                m.velocity.y = -m.velocity.y;
                t.position.y = t.position.y.clamp(0.0, max.y);
            }
        }
    }

    fn queue_overlay(renderer: &mut Renderer<WgpuBackend>, screen: Viewport, fps: f32, last: FrameStats) {
        // Panels follow the camera so they stay on screen while panning.
        let origin = renderer.camera().position();

        renderer.add_round_rectangle(
            PANEL,
            Transform::new(origin + Vec2::new(12.0, 12.0), Vec2::new(300.0, 96.0)),
            DepthLayer::Foreground,
            10.0,
        );
        renderer.add_round_rectangle(
            Color::rgba(90, 160, 255, 200),
            Transform::new(
                origin + Vec2::new(12.0, screen.height - 44.0),
                Vec2::new(screen.width - 24.0, 32.0),
            ),
            DepthLayer::Foreground,
            16.0,
        );

        let lines = [
            "QUADRANT".to_string(),
            format!("FPS: {fps:.0}"),
            format!("DRAWS: {}  BATCHES: {}", last.draw_calls, last.batches),
            format!("QUADS: {}  GLYPHS: {}", last.quads, last.glyphs),
        ];
        for (i, line) in lines.iter().enumerate() {
            let at = origin + Vec2::new(24.0, 22.0 + 18.0 * i as f32);
            renderer.add_string(line, at.x, at.y, 2.0, TEXT, procedural::FONT_NAME);
        }

        let hint = origin + Vec2::new(28.0, screen.height - 36.0);
        renderer.add_string(
            "ARROWS: PAN   SPACE: PAUSE   ESC: QUIT",
            hint.x,
            hint.y,
            3.0,
            Color::BLACK,
            procedural::FONT_NAME,
        );
    }
}

impl App for Demo {
    fn on_gpu_ready(&mut self, _window_id: WindowId, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let mut backend = WgpuBackend::new(
            gpu.device(),
            gpu.queue(),
            gpu.surface_format(),
            WgpuBackendConfig::default(),
        );

        let mut assets = AssetCache::new();
        assets.load_builtin_shaders(&mut backend)?;
        let tiles: Vec<Sprite> = procedural::tile_textures(&mut backend, &mut assets, TILE_TEXTURES)?
            .iter()
            .map(Sprite::from_texture)
            .collect();
        procedural::tiny_font(&mut backend, &mut assets)?;

        let camera = Camera::new(Viewport::from(gpu.size()));
        let renderer = Renderer::new(backend, Rc::new(assets), camera, RendererConfig::default())
            .context("renderer setup")?;

        self.spawn(&tiles);
        self.renderer = Some(renderer);
        log::info!("spawned {} sprites over {} textures", SPRITES, TILE_TEXTURES);
        Ok(())
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        let PhysicalKey::Code(code) = event.physical_key else {
            return AppControl::Continue;
        };

        let down = event.state == ElementState::Pressed;
        match code {
            KeyCode::Escape if down => return AppControl::Exit,
            KeyCode::Space if down && !event.repeat => self.paused = !self.paused,
            KeyCode::ArrowLeft => self.pan.left = down,
            KeyCode::ArrowRight => self.pan.right = down,
            KeyCode::ArrowUp => self.pan.up = down,
            KeyCode::ArrowDown => self.pan.down = down,
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let dt = ctx.time.dt;
        self.fps = self.fps * 0.95 + (1.0 / dt) * 0.05;
        if !self.paused {
            self.step(dt);
        }

        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Continue;
        };

        let screen = ctx.window.logical_size();
        let camera = renderer.camera_mut();
        camera.adjust_projection(screen.width, screen.height);
        let target = camera.position() + self.pan.direction() * (PAN_SPEED * dt);
        camera.adjust_position(target);

        for m in &self.movers {
            renderer.add_drawable(&m.drawable, m.layer);
        }
        let last = renderer.last_stats();
        Demo::queue_overlay(renderer, screen, self.fps, last);

        ctx.render(renderer, CLEAR)
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig { title: "quadrant demo".to_string(), ..Default::default() };
    Runtime::run(config, GpuInit::default(), Demo::default())
}
