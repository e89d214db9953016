//! 2D vectors and screen extents.
//!
//! World space is measured in world units with the origin at the top-left and
//! +Y pointing down. With the default camera one unit is one logical pixel.

mod vec2;
mod viewport;

pub use vec2::Vec2;
pub use viewport::Viewport;
