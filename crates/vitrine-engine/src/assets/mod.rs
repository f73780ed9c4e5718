//! Asset pipeline.
//!
//! Requests are queued by id and kind, resolved concurrently behind a single
//! load barrier, and exposed afterwards as an immutable id → handle table.
//!
//! Decoding formats are fixed and closed: images for textures, binary glTF for
//! models, Radiance HDR for equirectangular environment maps.

mod decode;
mod id;
mod pipeline;
mod source;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use decode::decode;
pub use id::AssetId;
pub use pipeline::{AssetPipeline, AssetTable};
pub use source::{AssetSource, DirSource, MemorySource};
pub use types::{
    Asset, AssetKind, AssetRequest, CpuMesh, EnvMapping, EnvironmentMap, ModelData, ModelNode,
    TextureData, Vertex,
};
