//! GPU device and window surface.
//!
//! `Gpu` owns the wgpu device/queue and the swapchain of one window, acquires
//! frames, and hands out the context the compositor draws with.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
