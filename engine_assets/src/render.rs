//! Render-data side table.
//!
//! GPU-side artifacts derived from decoded assets live here, not inside the
//! asset cache: the decoded asset and its GPU artifact have independent
//! lifetimes, and this crate never talks to a graphics backend itself. An
//! uploader implementation builds the artifact on first use; the table
//! memoizes it per key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::asset::Asset;
use crate::key::ResourceKey;

/// Marker for backend-owned artifacts (GPU buffers, texture handles, ...).
pub trait RenderData: Send + Sync {}

/// Builds the backend artifact for one decoded asset.
pub trait RenderUploader: Send + Sync {
    fn upload(&self, key: ResourceKey, asset: &Asset) -> anyhow::Result<Arc<dyn RenderData>>;
}

/// A no-op uploader useful for headless runs and tests.
#[derive(Default)]
pub struct NullUploader;

struct NullData;
impl RenderData for NullData {}

impl RenderUploader for NullUploader {
    fn upload(&self, _key: ResourceKey, _asset: &Asset) -> anyhow::Result<Arc<dyn RenderData>> {
        Ok(Arc::new(NullData))
    }
}

/// Lazily built, per-key artifact cache.
#[derive(Default)]
pub struct RenderDataTable {
    entries: Mutex<HashMap<ResourceKey, Arc<dyn RenderData>>>,
}

impl RenderDataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the artifact for `key`, building it on first request.
    pub fn get_or_build(
        &self,
        key: ResourceKey,
        asset: &Asset,
        uploader: &dyn RenderUploader,
    ) -> anyhow::Result<Arc<dyn RenderData>> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(data) = entries.get(&key) {
            return Ok(data.clone());
        }
        let data = uploader.upload(key, asset)?;
        entries.insert(key, data.clone());
        Ok(data)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animation;
    use crate::key::ResourceKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingUploader(AtomicUsize);

    impl RenderUploader for CountingUploader {
        fn upload(&self, _key: ResourceKey, _asset: &Asset) -> anyhow::Result<Arc<dyn RenderData>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NullData))
        }
    }

    #[test]
    fn artifact_is_built_once_per_key() {
        let key = ResourceKey::new(ResourceKind::Animation, 1);
        let asset = Asset::Animation(Animation {
            key,
            frame_count: 0,
            floats_per_frame: 0,
            frames: Vec::new(),
        });
        let uploader = CountingUploader(AtomicUsize::new(0));
        let table = RenderDataTable::new();

        let first = table.get_or_build(key, &asset, &uploader).unwrap();
        let second = table.get_or_build(key, &asset, &uploader).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(uploader.0.load(Ordering::SeqCst), 1);
        assert_eq!(table.len(), 1);
    }
}
