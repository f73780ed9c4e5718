use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{EngineError, LoadFailure, Result};

use super::decode::decode;
use super::source::AssetSource;
use super::types::{Asset, AssetKind, AssetRequest, EnvironmentMap, ModelData, TextureData};
use super::AssetId;

/// Resolved id → handle mapping. Immutable once published.
#[derive(Debug, Default)]
pub struct AssetTable {
    entries: HashMap<AssetId, Asset>,
}

impl AssetTable {
    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &AssetId> {
        self.entries.keys()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    Queueing,
    Loaded,
    Failed,
}

/// Queue of typed load requests resolved behind a single barrier.
///
/// Lifecycle:
/// 1. `add_*` enqueues requests (no I/O).
/// 2. `load()` fetches and decodes every request concurrently and returns once
///    all of them settled.
/// 3. `get_asset()` reads the published table.
///
/// The table is all-or-nothing: if any request fails, no id resolves.
pub struct AssetPipeline {
    source: Arc<dyn AssetSource>,
    queue: Vec<AssetRequest>,
    table: Option<AssetTable>,
    phase: Phase,
}

impl AssetPipeline {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    pub fn with_shared_source(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            queue: Vec::new(),
            table: None,
            phase: Phase::Queueing,
        }
    }

    pub fn add_texture(&mut self, id: impl Into<AssetId>, path: impl Into<String>) -> Result<()> {
        self.enqueue(id.into(), path.into(), AssetKind::Texture)
    }

    pub fn add_model(&mut self, id: impl Into<AssetId>, path: impl Into<String>) -> Result<()> {
        self.enqueue(id.into(), path.into(), AssetKind::Model)
    }

    pub fn add_environment_map(
        &mut self,
        id: impl Into<AssetId>,
        path: impl Into<String>,
    ) -> Result<()> {
        self.enqueue(id.into(), path.into(), AssetKind::EnvironmentMap)
    }

    fn enqueue(&mut self, id: AssetId, path: String, kind: AssetKind) -> Result<()> {
        if self.phase != Phase::Queueing {
            return Err(EngineError::AlreadyLoaded);
        }
        if self.queue.iter().any(|r| r.id == id) {
            return Err(EngineError::DuplicateAsset(id));
        }

        log::trace!("queued {kind} `{id}` at `{path}`");
        self.queue.push(AssetRequest { id, path, kind });
        Ok(())
    }

    /// Number of requests waiting for `load()`.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.phase == Phase::Loaded
    }

    /// Resolves every queued request and publishes the table.
    ///
    /// Requests are decoded on the rayon pool; this call blocks until each one
    /// has either produced a handle or failed. On failure the first error in
    /// queue order is returned and the table stays unset. There is no timeout:
    /// a stalled source stalls the caller.
    pub fn load(&mut self) -> Result<&AssetTable> {
        if self.phase != Phase::Queueing {
            return Err(EngineError::AlreadyLoaded);
        }

        let requests = std::mem::take(&mut self.queue);
        let count = requests.len();
        let source = &*self.source;

        let settled: Vec<(AssetRequest, Result<Asset>)> = requests
            .into_par_iter()
            .map(|req| {
                let outcome = resolve(source, &req);
                (req, outcome)
            })
            .collect();

        let mut entries = HashMap::with_capacity(count);
        let mut failures = Vec::new();
        for (req, outcome) in settled {
            match outcome {
                Ok(asset) => {
                    log::debug!("loaded {} `{}`", req.kind, req.id);
                    entries.insert(req.id, asset);
                }
                Err(err) => failures.push(err),
            }
        }

        let failed = failures.len();
        let mut failures = failures.into_iter();
        if let Some(first) = failures.next() {
            // Only the first failure reaches the caller.
            for other in failures {
                log::error!("{:#}", anyhow::Error::from(other));
            }
            log::error!("asset load failed: {failed} of {count} request(s) did not resolve");
            self.phase = Phase::Failed;
            return Err(first);
        }

        log::info!("asset pipeline resolved {count} asset(s)");
        self.phase = Phase::Loaded;
        Ok(self.table.insert(AssetTable { entries }))
    }

    /// Looks up a resolved asset.
    ///
    /// Fails with `UnknownAsset` for ids that were never queued, and for every
    /// id until `load()` has succeeded.
    pub fn get_asset(&self, id: &AssetId) -> Result<&Asset> {
        self.table
            .as_ref()
            .and_then(|t| t.get(id))
            .ok_or_else(|| EngineError::UnknownAsset(id.clone()))
    }

    pub fn texture(&self, id: &AssetId) -> Result<Arc<TextureData>> {
        let asset = self.get_asset(id)?;
        asset
            .as_texture()
            .cloned()
            .ok_or_else(|| mismatch(id, AssetKind::Texture, asset))
    }

    pub fn model(&self, id: &AssetId) -> Result<Arc<ModelData>> {
        let asset = self.get_asset(id)?;
        asset
            .as_model()
            .cloned()
            .ok_or_else(|| mismatch(id, AssetKind::Model, asset))
    }

    pub fn environment_map(&self, id: &AssetId) -> Result<Arc<EnvironmentMap>> {
        let asset = self.get_asset(id)?;
        asset
            .as_environment_map()
            .cloned()
            .ok_or_else(|| mismatch(id, AssetKind::EnvironmentMap, asset))
    }

    pub fn table(&self) -> Option<&AssetTable> {
        self.table.as_ref()
    }
}

fn resolve(source: &dyn AssetSource, req: &AssetRequest) -> Result<Asset> {
    let wrap = |cause: LoadFailure| EngineError::Load {
        id: req.id.clone(),
        kind: req.kind,
        path: req.path.clone(),
        source: cause,
    };

    let bytes = source.read(&req.path).map_err(|e| wrap(e.into()))?;
    decode(req.kind, &bytes).map_err(wrap)
}

fn mismatch(id: &AssetId, expected: AssetKind, actual: &Asset) -> EngineError {
    EngineError::AssetKindMismatch {
        id: id.clone(),
        expected,
        actual: actual.kind(),
    }
}
