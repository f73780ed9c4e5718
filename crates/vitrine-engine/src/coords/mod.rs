//! Viewport and colour types shared by input, effects and the renderer.
//!
//! Canonical CPU space for pointer input:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Effects work in normalized screen space (`[0, 1]^2`, origin bottom-left)
//! using `glam::Vec2`.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
