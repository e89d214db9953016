//! Contract between the window runtime and an application.
//!
//! The runtime owns windows and their GPUs; an [`App`] builds its renderer
//! once the GPU is ready and draws through [`FrameCtx`] every frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
