use std::sync::Arc;

use glam::Mat4;

use crate::assets::EnvironmentMap;
use crate::error::{EngineError, Result};

use super::node::{Node, Renderable};
use super::updatable::Updatable;

/// Stable handle to a node in a [`SceneGraph`].
///
/// Handles are generational: once a node is removed its handle never resolves
/// again, even if the slot is reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed node tree. The graph owns every node; removing a node frees
/// its whole subtree.
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    environment: Option<Arc<EnvironmentMap>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId { index: 0, generation: 0 };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::group("root")),
            }],
            free: Vec::new(),
            root,
            environment: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub fn environment(&self) -> Option<&Arc<EnvironmentMap>> {
        self.environment.as_ref()
    }

    pub fn set_environment(&mut self, env: Arc<EnvironmentMap>) {
        self.environment = Some(env);
    }

    /// Moves `subtree` into the graph as the last child of `parent`.
    ///
    /// Returns the id of the subtree's root.
    pub fn insert(&mut self, parent: NodeId, subtree: Renderable) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(EngineError::UnknownNode(parent));
        }
        let id = self.insert_rec(parent, subtree);
        Ok(id)
    }

    fn insert_rec(&mut self, parent: NodeId, r: Renderable) -> NodeId {
        let Renderable {
            name,
            transform,
            content,
            behavior,
            children,
        } = r;

        let id = self.alloc(Node {
            name,
            transform,
            content,
            parent: Some(parent),
            children: Vec::with_capacity(children.len()),
            updatable: behavior.is_some(),
            behavior,
        });
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }

        for child in children {
            self.insert_rec(id, child);
        }
        id
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId { index, generation: 0 }
    }

    /// Detaches `id` from its parent and frees the whole subtree.
    ///
    /// Returns the number of nodes freed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize> {
        if id == self.root {
            return Err(EngineError::RootRemoval);
        }
        let parent = self
            .get(id)
            .ok_or(EngineError::UnknownNode(id))?
            .parent;

        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }

        let doomed = self.descendants(id);
        for d in &doomed {
            let slot = &mut self.slots[d.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(d.index);
        }
        Ok(doomed.len())
    }

    /// Pre-order list of `id` and everything below it. Empty if `id` is stale.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }

        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            if let Some(node) = self.get(cur) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// First node named `name` in the subtree rooted at `from` (pre-order).
    pub fn find(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(from)
            .into_iter()
            .find(|id| self.get(*id).is_some_and(|n| n.name == name))
    }

    /// Whether walking up from `id` ends at the root.
    pub fn is_reachable(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.get(cur).and_then(|n| n.parent) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Composed transform from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut m = self.get(id)?.transform.matrix();
        let mut cur = self.get(id)?.parent;
        while let Some(p) = cur {
            let node = self.get(p)?;
            m = node.transform.matrix() * m;
            cur = node.parent;
        }
        Some(m)
    }

    /// Every node under the root that carries per-frame hooks.
    pub fn updatable_nodes(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(Node::is_updatable))
            .collect()
    }

    /// Checks the hooks of `id` out of the graph so they can run with
    /// mutable access to the rest of it.
    pub(crate) fn take_behavior(&mut self, id: NodeId) -> Option<Box<dyn Updatable>> {
        self.get_mut(id)?.behavior.take()
    }

    pub(crate) fn restore_behavior(&mut self, id: NodeId, behavior: Box<dyn Updatable>) {
        if let Some(node) = self.get_mut(id) {
            node.behavior = Some(behavior);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;
    use glam::Vec3;

    fn tree() -> Renderable {
        Renderable::new("group")
            .with_transform(Transform::from_translation(Vec3::new(0.0, -0.6, 0.0)))
            .with_child(
                Renderable::new("plant")
                    .with_transform(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0))),
            )
            .with_child(Renderable::new("ground"))
    }

    // ── insert ────────────────────────────────────────────────────────────

    #[test]
    fn insert_links_parent_and_children() {
        let mut g = SceneGraph::new();
        let group = g.insert(g.root(), tree()).expect("insert");

        assert_eq!(g.len(), 4);
        assert_eq!(g.get(group).and_then(Node::parent), Some(g.root()));
        assert_eq!(g.get(g.root()).map(|n| n.children().len()), Some(1));

        let names: Vec<&str> = g
            .descendants(group)
            .into_iter()
            .filter_map(|id| g.get(id).map(|n| n.name.as_str()))
            .collect();
        assert_eq!(names, ["group", "plant", "ground"]);
    }

    #[test]
    fn insert_under_stale_parent_fails() {
        let mut g = SceneGraph::new();
        let group = g.insert(g.root(), tree()).expect("insert");
        g.remove(group).expect("remove");

        let err = g.insert(group, Renderable::new("orphan")).unwrap_err();
        assert!(matches!(err, EngineError::UnknownNode(id) if id == group));
    }

    // ── remove ────────────────────────────────────────────────────────────

    #[test]
    fn remove_frees_subtree_and_invalidates_handles() {
        let mut g = SceneGraph::new();
        let group = g.insert(g.root(), tree()).expect("insert");
        let plant = g.find(group, "plant").expect("plant");

        assert_eq!(g.remove(group).expect("remove"), 3);
        assert_eq!(g.len(), 1);
        assert!(!g.contains(plant));
        assert!(g.get(g.root()).is_some_and(|n| n.children().is_empty()));

        // The reused slot gets a fresh generation.
        let again = g.insert(g.root(), Renderable::new("again")).expect("reinsert");
        assert_ne!(again, group);
        assert!(!g.contains(group));
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut g = SceneGraph::new();
        assert!(matches!(g.remove(g.root()), Err(EngineError::RootRemoval)));
    }

    // ── queries ───────────────────────────────────────────────────────────

    #[test]
    fn world_matrix_composes_parents() {
        let mut g = SceneGraph::new();
        let group = g.insert(g.root(), tree()).expect("insert");
        let plant = g.find(group, "plant").expect("plant");

        let p = g
            .world_matrix(plant)
            .expect("live node")
            .transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, -0.6, 0.0)).length() < 1e-6);
    }

    #[test]
    fn find_is_scoped_to_subtree() {
        let mut g = SceneGraph::new();
        let a = g.insert(g.root(), tree()).expect("a");
        let b = g.insert(g.root(), Renderable::new("other")).expect("b");

        assert!(g.find(a, "plant").is_some());
        assert!(g.find(b, "plant").is_none());
        assert!(g.is_reachable(b));
    }
}
