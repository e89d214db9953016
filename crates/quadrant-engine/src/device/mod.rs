//! GPU device and surface ownership.
//!
//! One [`Gpu`] per window: it creates the wgpu instance, adapter, device and
//! queue, keeps the surface configured across resizes, and hands out surface
//! frames for the renderer's backend to draw into.

mod error;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
