//! Full-screen interactive effects.
//!
//! Effects are stateful: input writes targets, the per-frame update eases the
//! shader-visible values toward them with a frame-rate independent law.

mod latch;
mod pixelation;
mod smoothing;
mod stage;

pub use latch::PointerLatch;
pub use pixelation::{EffectState, PixelationConfig, PixelationEffect};
pub use smoothing::{damp, damp_vec2};
pub use stage::Effect;
