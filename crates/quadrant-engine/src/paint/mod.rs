//! Colors, as stored on drawables and emitted into vertices.

mod color;

pub use color::Color;
