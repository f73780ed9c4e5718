use std::fmt;
use std::sync::Arc;

use crate::assets::ModelData;

use super::graph::NodeId;
use super::transform::Transform;
use super::updatable::Updatable;

/// Reference to one mesh of a loaded model.
#[derive(Debug, Clone)]
pub struct MeshRef {
    pub model: Arc<ModelData>,
    pub mesh: usize,
}

/// What a node contributes to the frame.
#[derive(Debug, Clone, Default)]
pub enum Content {
    /// Pure grouping node.
    #[default]
    Group,
    Mesh(MeshRef),
    /// Uniform light added to every lit surface.
    AmbientLight { color: [f32; 3], intensity: f32 },
}

/// Owned description of a subtree, handed to the renderer for insertion.
///
/// Builder-style: construct with [`Renderable::new`] or
/// [`Renderable::from_model`], then chain `with_*` calls.
pub struct Renderable {
    pub name: String,
    pub transform: Transform,
    pub content: Content,
    pub(crate) behavior: Option<Box<dyn Updatable>>,
    pub children: Vec<Renderable>,
}

impl Renderable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            content: Content::Group,
            behavior: None,
            children: Vec::new(),
        }
    }

    pub fn ambient_light(name: impl Into<String>, color: [f32; 3], intensity: f32) -> Self {
        Self::new(name).with_content(Content::AmbientLight { color, intensity })
    }

    /// Instantiates a model's node hierarchy under a group named `name`.
    ///
    /// Every model node becomes one renderable with the node's name and local
    /// transform; nodes carrying a mesh reference it by index.
    pub fn from_model(name: impl Into<String>, model: &Arc<ModelData>) -> Self {
        let mut group = Self::new(name);
        for &root in &model.roots {
            if let Some(child) = Self::from_model_node(model, root, 0) {
                group.children.push(child);
            }
        }
        group
    }

    fn from_model_node(model: &Arc<ModelData>, index: usize, depth: usize) -> Option<Self> {
        // glTF forbids cycles, but a malformed file should not overflow the stack.
        if depth > 256 {
            log::warn!("model hierarchy deeper than 256 levels; truncated");
            return None;
        }
        let node = model.nodes.get(index)?;

        let mut out = Self::new(node.name.clone()).with_transform(node.transform);
        if let Some(mesh) = node.mesh {
            out.content = Content::Mesh(MeshRef {
                model: Arc::clone(model),
                mesh,
            });
        }
        out.children = node
            .children
            .iter()
            .filter_map(|&c| Self::from_model_node(model, c, depth + 1))
            .collect();
        Some(out)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    /// Gives the root of this subtree per-frame `update` / `resize` hooks.
    pub fn with_behavior(mut self, behavior: impl Updatable) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub fn with_child(mut self, child: Renderable) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: Renderable) {
        self.children.push(child);
    }

    pub fn is_updatable(&self) -> bool {
        self.behavior.is_some()
    }
}

impl fmt::Debug for Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderable")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("content", &self.content)
            .field("updatable", &self.is_updatable())
            .field("children", &self.children)
            .finish()
    }
}

/// A node owned by the [`SceneGraph`](super::SceneGraph).
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub content: Content,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) behavior: Option<Box<dyn Updatable>>,
    pub(crate) updatable: bool,
}

impl Node {
    pub(crate) fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            content: Content::Group,
            parent: None,
            children: Vec::new(),
            behavior: None,
            updatable: false,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node carries per-frame hooks. Stays `true` while the hooks
    /// are temporarily checked out for a callback.
    pub fn is_updatable(&self) -> bool {
        self.updatable
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("content", &self.content)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("updatable", &self.updatable)
            .finish()
    }
}
