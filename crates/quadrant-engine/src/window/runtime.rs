use std::collections::HashMap;

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

use super::commands::{Command, RuntimeCtx};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Redraw whenever the loop goes idle. When `false`, frames are drawn
    /// only on resize and on [`RuntimeCtx::request_redraw`].
    pub continuous: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "quadrant".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            continuous: true,
        }
    }
}

pub struct Runtime;

impl Runtime {
    /// Opens the `initial` window and runs `app` until every window is
    /// closed or the app asks to exit.
    pub fn run<A: App + 'static>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut host = Host { initial, gpu_init, app, windows: HashMap::new(), exit_requested: false };

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    continuous: bool,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowEntry {
    fn open(window: Window, gpu_init: GpuInit, continuous: bool) -> Result<Self> {
        WindowEntryTryBuilder {
            clock: FrameClock::default(),
            continuous,
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }

    fn request_redraw(&self) {
        self.with_window(|w| w.request_redraw());
    }

    /// `None` re-reads the window's current size.
    fn resize(&mut self, size: Option<PhysicalSize<u32>>) {
        let size = size.unwrap_or_else(|| self.with_window(|w| w.inner_size()));
        self.with_gpu_mut(|gpu| gpu.resize(size));
        self.request_redraw();
    }
}

/// winit handler driving an [`App`].
struct Host<A: App> {
    initial: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    windows: HashMap<WindowId, WindowEntry>,
    exit_requested: bool,
}

impl<A: App> Host<A> {
    fn open_window(&mut self, event_loop: &ActiveEventLoop, config: RuntimeConfig) -> Result<WindowId> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        let id = window.id();

        let entry = WindowEntry::open(window, self.gpu_init.clone(), config.continuous)
            .with_context(|| format!("GPU initialization failed for window {:?}", config.title))?;

        let app = &mut self.app;
        entry
            .with_gpu(|gpu| app.on_gpu_ready(id, gpu))
            .context("application failed to set up GPU resources")?;

        entry.request_redraw();
        self.windows.insert(id, entry);
        log::debug!("window {id:?} opened");
        Ok(id)
    }

    fn close_window(&mut self, id: WindowId) {
        if self.windows.remove(&id).is_some() {
            log::debug!("window {id:?} closed");
        }
        if self.windows.is_empty() {
            self.exit_requested = true;
        }
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, ctx: RuntimeCtx) {
        for cmd in ctx.commands {
            match cmd {
                Command::CreateWindow(config) => {
                    if let Err(e) = self.open_window(event_loop, config) {
                        log::error!("failed to create window: {e:#}");
                        self.exit_requested = true;
                    }
                }
                Command::CloseWindow(id) => self.close_window(id),
                Command::Redraw(id) => {
                    if let Some(entry) = self.windows.get(&id) {
                        entry.request_redraw();
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let mut runtime = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        let app = &mut self.app;
        if let Some(entry) = self.windows.get_mut(&window_id) {
            entry.with_mut(|fields| {
                let mut ctx = FrameCtx {
                    window: WindowCtx { id: window_id, window: fields.window },
                    gpu: fields.gpu,
                    time: fields.clock.tick(),
                    runtime: &mut runtime,
                };
                control = app.on_frame(&mut ctx);
            });
        }

        if control == AppControl::Exit {
            runtime.exit();
        }
        self.apply(event_loop, runtime);
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            return;
        }

        if let Err(e) = self.open_window(event_loop, self.initial.clone()) {
            log::error!("failed to create initial window: {e:#}");
            self.exit_requested = true;
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);
        for entry in self.windows.values().filter(|e| e.with_continuous(|c| *c)) {
            entry.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if !self.exit_requested && self.windows.contains_key(&window_id) {
            if self.app.on_window_event(window_id, &event) == AppControl::Exit {
                self.exit_requested = true;
            } else {
                self.dispatch(event_loop, window_id, &event);
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}

impl<A: App> Host<A> {
    fn dispatch(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_window(window_id),
            WindowEvent::Resized(size) => {
                if let Some(entry) = self.windows.get_mut(&window_id) {
                    entry.resize(Some(*size));
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.windows.get_mut(&window_id) {
                    entry.resize(None);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop, window_id),
            _ => {}
        }
    }
}
