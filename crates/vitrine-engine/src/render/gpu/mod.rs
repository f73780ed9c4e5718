//! wgpu backend that executes frame plans.

mod compositor;
mod effect_pass;
mod mesh_pass;
mod resources;

pub use compositor::Compositor;
