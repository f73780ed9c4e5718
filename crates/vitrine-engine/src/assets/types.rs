use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};

use crate::scene::Transform;

use super::AssetId;

/// Closed set of asset kinds the pipeline knows how to decode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AssetKind {
    Texture,
    Model,
    EnvironmentMap,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Texture => "texture",
            AssetKind::Model => "model",
            AssetKind::EnvironmentMap => "environment map",
        })
    }
}

/// A queued load: consumed exactly once by `AssetPipeline::load`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub id: AssetId,
    pub path: String,
    pub kind: AssetKind,
}

/// Decoded asset handle.
///
/// Payloads are reference-counted so every lookup of an id hands out the same
/// allocation.
#[derive(Debug, Clone)]
pub enum Asset {
    Texture(Arc<TextureData>),
    Model(Arc<ModelData>),
    EnvironmentMap(Arc<EnvironmentMap>),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Texture(_) => AssetKind::Texture,
            Asset::Model(_) => AssetKind::Model,
            Asset::EnvironmentMap(_) => AssetKind::EnvironmentMap,
        }
    }

    pub fn as_texture(&self) -> Option<&Arc<TextureData>> {
        match self {
            Asset::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Arc<ModelData>> {
        match self {
            Asset::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_environment_map(&self) -> Option<&Arc<EnvironmentMap>> {
        match self {
            Asset::EnvironmentMap(e) => Some(e),
            _ => None,
        }
    }
}

/// 8-bit RGBA image, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// How an environment image maps onto directions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EnvMapping {
    Equirectangular,
}

/// High dynamic range environment image used for image-based lighting.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 4]>,
    pub mapping: EnvMapping,
}

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
}

/// One glTF mesh with all of its primitives merged.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuMesh {
    pub name: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
}

/// Node of a model's hierarchy. `mesh` and `children` index into the owning
/// [`ModelData`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<usize>,
    pub children: Vec<usize>,
}

static NEXT_MODEL_KEY: AtomicU64 = AtomicU64::new(1);

/// Decoded model: meshes plus the named node hierarchy that references them.
#[derive(Debug, Clone)]
pub struct ModelData {
    key: u64,
    pub meshes: Vec<CpuMesh>,
    pub nodes: Vec<ModelNode>,
    pub roots: Vec<usize>,
}

impl ModelData {
    pub fn new(meshes: Vec<CpuMesh>, nodes: Vec<ModelNode>, roots: Vec<usize>) -> Self {
        Self {
            key: NEXT_MODEL_KEY.fetch_add(1, Ordering::Relaxed),
            meshes,
            nodes,
            roots,
        }
    }

    /// Process-unique key, used by the GPU backend to cache uploaded meshes.
    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }
}
