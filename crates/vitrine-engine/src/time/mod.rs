//! Time subsystem.
//!
//! - `FrameClock` measures clamped, monotonic frame deltas.
//! - `Ticker` owns a clock and dispatches per-frame callbacks against an
//!   explicitly owned context object.
//!
//! Intended usage: one `Ticker` per scene, `start()` once, `tick()` once per
//! presented frame.

mod frame_clock;
mod ticker;

pub use frame_clock::{FrameClock, FrameTime};
pub use ticker::{Ticker, TickerId};
