use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::gfx::WgpuBackend;
use crate::paint::Color;
use crate::render::Renderer;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Inner size in logical pixels.
    pub fn logical_size(&self) -> Viewport {
        let logical: winit::dpi::LogicalSize<f32> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        Viewport::new(logical.width, logical.height)
    }

    pub fn physical_size(&self) -> Viewport {
        Viewport::from(self.window.inner_size())
    }
}

/// Per-frame context handed to [`App::on_frame`](super::App::on_frame).
///
/// `'a` spans the callback; `'w` is the window borrow held by [`Gpu`].
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Acquires the surface, clears it to `clear`, flushes everything queued
    /// on `renderer` and presents.
    ///
    /// Surface errors skip the frame; only fatal ones return
    /// [`AppControl::Exit`].
    pub fn render(&mut self, renderer: &mut Renderer<WgpuBackend>, clear: Color) -> AppControl {
        let GpuFrame { surface_texture, view } = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("unrecoverable surface error; exiting");
                        AppControl::Exit
                    }
                    _ => AppControl::Continue,
                };
            }
        };

        renderer.backend_mut().begin_frame(view, Some(clear));
        renderer.render();
        renderer.backend_mut().end_frame();

        self.window.window.pre_present_notify();
        self.gpu.present(surface_texture);

        AppControl::Continue
    }
}
