use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// What the runtime should do after an app callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

pub trait App {
    /// Called once per window, right after its GPU is created.
    ///
    /// GPU resources (a [`WgpuBackend`](crate::gfx::WgpuBackend), the asset
    /// cache, the renderer) are built here. An error closes the runtime.
    fn on_gpu_ready(&mut self, window_id: WindowId, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let _ = (window_id, gpu);
        Ok(())
    }

    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
