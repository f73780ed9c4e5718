//! Engine error taxonomy.
//!
//! Configuration errors are programmer mistakes (duplicate ids, lookups before
//! the load barrier, stale handles) and are never retried. Load errors come from
//! fetching or decoding asset bytes and abort scene construction as a unit.
//! Per-frame callback failures are not represented here: they are `anyhow`
//! errors that the ticker and the renderer log and isolate.

use crate::assets::{AssetId, AssetKind};
use crate::render::PassId;
use crate::scene::NodeId;

/// Result alias carrying [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Broad class of an [`EngineError`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorClass {
    Configuration,
    Load,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("asset `{0}` is already queued")]
    DuplicateAsset(AssetId),

    #[error("asset `{0}` is unknown or has not been loaded")]
    UnknownAsset(AssetId),

    #[error("asset `{id}` is a {actual}, expected a {expected}")]
    AssetKindMismatch {
        id: AssetId,
        expected: AssetKind,
        actual: AssetKind,
    },

    #[error("asset pipeline has already run its load")]
    AlreadyLoaded,

    #[error("failed to load {kind} `{id}` from `{path}`")]
    Load {
        id: AssetId,
        kind: AssetKind,
        path: String,
        #[source]
        source: LoadFailure,
    },

    #[error("scene node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("the scene root cannot be removed")]
    RootRemoval,

    #[error("render pass {0:?} does not exist")]
    UnknownPass(PassId),
}

impl EngineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            EngineError::Load { .. } => ErrorClass::Load,
            _ => ErrorClass::Configuration,
        }
    }
}

/// Underlying cause of a failed asset fetch or decode.
#[derive(Debug, thiserror::Error)]
pub enum LoadFailure {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Gltf(#[from] gltf::Error),

    #[error("{0}")]
    Invalid(String),
}

impl LoadFailure {
    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::Invalid(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_are_the_only_load_class() {
        let load = EngineError::Load {
            id: AssetId::from_static("glass"),
            kind: AssetKind::Texture,
            path: "textures/glass.webp".into(),
            source: LoadFailure::invalid("truncated"),
        };
        assert_eq!(load.class(), ErrorClass::Load);
        assert_eq!(EngineError::AlreadyLoaded.class(), ErrorClass::Configuration);
        assert_eq!(
            EngineError::UnknownAsset(AssetId::from_static("x")).class(),
            ErrorClass::Configuration
        );
    }

    #[test]
    fn load_error_keeps_its_cause() {
        use std::error::Error as _;

        let err = EngineError::Load {
            id: AssetId::from_static("plant"),
            kind: AssetKind::Model,
            path: "models/monstera.glb".into(),
            source: LoadFailure::invalid("no scene"),
        };
        assert!(err.to_string().contains("models/monstera.glb"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("no scene"));
    }
}
