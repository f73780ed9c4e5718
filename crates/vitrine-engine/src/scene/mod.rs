//! Scene graph.
//!
//! Responsibilities:
//! - own node lifetime in a generational arena (`SceneGraph`)
//! - describe insertable subtrees (`Renderable`), including model instancing
//! - carry the optional per-frame hooks of a node (`Updatable`)

mod graph;
mod node;
mod transform;
mod updatable;

pub use graph::{NodeId, SceneGraph};
pub use node::{Content, MeshRef, Node, Renderable};
pub use transform::Transform;
pub use updatable::{NodeCtx, ResizeEvent, Updatable};
