use crate::coords::Viewport;
use crate::render::{CameraBounds, OrthoCamera};

use super::graph::{NodeId, SceneGraph};
use super::node::Node;
use super::transform::Transform;

/// Viewport change delivered to every registered [`Updatable`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResizeEvent {
    /// New viewport in logical pixels.
    pub viewport: Viewport,
    pub scale_factor: f32,
    /// Camera extents already recomputed for the new aspect ratio.
    pub camera: CameraBounds,
}

/// Access handed to an [`Updatable`] while one of its hooks runs.
///
/// Nodes may be edited but not inserted or removed, which keeps the update
/// registry in step with the graph.
pub struct NodeCtx<'a> {
    id: NodeId,
    graph: &'a mut SceneGraph,
    camera: &'a OrthoCamera,
}

impl<'a> NodeCtx<'a> {
    pub(crate) fn new(id: NodeId, graph: &'a mut SceneGraph, camera: &'a OrthoCamera) -> Self {
        Self { id, graph, camera }
    }

    /// Id of the node the hooks belong to.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn camera(&self) -> &OrthoCamera {
        self.camera
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.graph.get_mut(id)
    }

    /// Searches the subtree owned by this node.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.graph.find(self.id, name)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.graph.get_mut(id).map(|n| &mut n.transform)
    }
}

/// Per-frame hooks attached to a scene node.
///
/// The renderer resolves this capability once, when the node is inserted;
/// nodes without hooks are never visited by the update loop.
///
/// Errors returned from a hook are logged and isolated: other nodes still
/// receive their callbacks and the hook is invoked again next time.
pub trait Updatable: 'static {
    /// Called once when the node joins the update registry.
    fn attach(&mut self, ctx: &mut NodeCtx<'_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per frame with elapsed seconds.
    fn update(&mut self, dt: f32, ctx: &mut NodeCtx<'_>) -> anyhow::Result<()>;

    /// Called after every viewport change. Relative order between nodes is
    /// unspecified.
    fn resize(&mut self, event: &ResizeEvent, ctx: &mut NodeCtx<'_>) -> anyhow::Result<()> {
        let _ = (event, ctx);
        Ok(())
    }
}
