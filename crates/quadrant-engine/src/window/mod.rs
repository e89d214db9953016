//! winit event loop with one [`Gpu`](crate::device::Gpu) per window.

mod commands;
mod runtime;

pub use commands::RuntimeCtx;
pub use runtime::{Runtime, RuntimeConfig};
