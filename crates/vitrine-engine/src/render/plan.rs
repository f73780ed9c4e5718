use std::sync::Arc;

use glam::Mat4;

use crate::assets::{EnvironmentMap, TextureData};
use crate::coords::{ColorRgba, Viewport};
use crate::scene::{MeshRef, NodeId};

use super::composer::PassId;

/// One mesh instance to draw in the scene pass.
#[derive(Debug, Clone)]
pub struct MeshDraw {
    pub node: NodeId,
    pub mesh: MeshRef,
    pub world: Mat4,
}

/// Snapshot of one effect stage.
#[derive(Debug, Clone)]
pub struct EffectFrame {
    pub pass: PassId,
    pub label: &'static str,
    pub shader: &'static str,
    pub uniforms: Vec<u8>,
    pub texture: Option<Arc<TextureData>>,
}

/// Everything the GPU backend needs to draw one frame.
///
/// Plans are plain data: they can be produced and inspected without a device.
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub dt: f32,
    pub viewport: Viewport,
    /// Size of the composer's internal buffers, in physical pixels.
    pub size: (u32, u32),
    /// Bumped whenever `size` changes.
    pub generation: u64,
    pub clear: ColorRgba,
    pub view_proj: Mat4,
    pub draws: Vec<MeshDraw>,
    /// Sum of every ambient light in the scene (linear RGB).
    pub ambient: [f32; 3],
    pub environment: Option<Arc<EnvironmentMap>>,
    /// Effect stages after the scene pass, in execution order.
    pub effects: Vec<EffectFrame>,
}
