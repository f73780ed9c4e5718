//! Render orchestration.
//!
//! [`Renderer`] owns the scene graph, the camera and the [`Composer`]; each
//! frame it records a [`FramePlan`] and then runs the registered updatables.
//! Plans are device-independent; [`Compositor`] executes them with wgpu.
//!
//! Convention:
//! - World space is right-handed, +Y up; the camera looks down -Z.
//! - Screen-space effect coordinates are normalized with the origin bottom-left.

mod camera;
mod composer;
mod ctx;
mod gpu;
mod plan;
mod renderer;

pub use camera::{CameraBounds, OrthoCamera};
pub use composer::{Composer, PassId};
pub use ctx::{RenderCtx, RenderTarget};
pub use gpu::Compositor;
pub use plan::{EffectFrame, FramePlan, MeshDraw};
pub use renderer::{EffectHandle, Renderer, RendererConfig};
