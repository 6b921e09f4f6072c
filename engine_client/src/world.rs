//! World-cell loading.
//!
//! Pulls a batch of structure keys through the resource cache. A failing
//! asset means that one cell is unavailable; it is logged and counted, and
//! the rest of the batch still loads.

use std::sync::Arc;

use engine_assets::asset::Asset;
use engine_assets::cache::ResourceCache;
use engine_assets::key::ResourceKey;
use serde::Serialize;
use tracing::{info, warn};

/// One failed cell in a load batch.
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub key: ResourceKey,
    pub error: String,
}

/// Summary of one load batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn all_loaded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Batch loader for world-cell structures.
pub struct CellLoader {
    cache: Arc<ResourceCache>,
    /// Structures loaded so far, in request order.
    pub cells: Vec<Arc<Asset>>,
}

impl CellLoader {
    pub fn new(cache: Arc<ResourceCache>) -> Self {
        Self {
            cache,
            cells: Vec::new(),
        }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Loads every key in the batch, degrading per cell on failure.
    pub fn load_cells(&mut self, keys: &[ResourceKey]) -> LoadReport {
        let mut report = LoadReport::default();
        for &key in keys {
            match self.cache.get(key).and_then(|handle| {
                handle.as_structure()?;
                Ok(handle)
            }) {
                Ok(handle) => {
                    self.cells.push(handle);
                    report.loaded += 1;
                }
                Err(err) => {
                    warn!(%key, error = %err, "cell unavailable");
                    report.failures.push(LoadFailure {
                        key,
                        error: err.to_string(),
                    });
                }
            }
        }
        info!(
            loaded = report.loaded,
            failed = report.failures.len(),
            "cell batch done"
        );
        report
    }
}
