//! The memoizing resource cache.
//!
//! `ResourceCache::get` is the front door for every asset: first request
//! fetches bytes from the provider and decodes, every later request returns
//! the same shared handle. At most one decode runs per key at a time, even
//! with concurrent requesters; a decode that loops back onto a key still
//! being decoded, on this thread or through a chain of other threads, is
//! reported as a cyclic reference. Failed decodes are never memoized, so a
//! later `get` may retry.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::animation::Animation;
use crate::asset::Asset;
use crate::error::AssetError;
use crate::geometry::StructureGeometry;
use crate::key::{ResourceKey, ResourceKind};
use crate::motion::MotionTable;
use crate::script::PhysicsScript;
use crate::structure::Structure;
use crate::texture::{Texture, TextureLookup};

/// Source of raw blob bytes, keyed by resource key.
///
/// The provider is the single source of truth for whether a key exists;
/// its storage format is not this crate's concern.
pub trait ByteProvider: Send + Sync {
    fn fetch(&self, key: ResourceKey) -> Result<Bytes, AssetError>;
}

/// HashMap-backed provider for tests and in-memory tooling.
///
/// Counts fetches per key so callers can assert the cache touched the
/// provider exactly once.
#[derive(Default)]
pub struct MemoryProvider {
    blobs: HashMap<ResourceKey, Bytes>,
    fetches: Mutex<HashMap<ResourceKey, usize>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ResourceKey, blob: impl Into<Bytes>) {
        self.blobs.insert(key, blob.into());
    }

    /// How many times `fetch` was called for `key`.
    pub fn fetch_count(&self, key: ResourceKey) -> usize {
        lock(&self.fetches).get(&key).copied().unwrap_or(0)
    }
}

impl ByteProvider for MemoryProvider {
    fn fetch(&self, key: ResourceKey) -> Result<Bytes, AssetError> {
        *lock(&self.fetches).entry(key).or_insert(0) += 1;
        self.blobs
            .get(&key)
            .cloned()
            .ok_or(AssetError::NotFound(key))
    }
}

struct CacheState {
    assets: HashMap<ResourceKey, Arc<Asset>>,
    /// Keys currently decoding, with the thread doing the work. A same-
    /// thread hit here is a reference cycle; another thread's hit means
    /// wait for the result.
    in_flight: HashMap<ResourceKey, ThreadId>,
    /// Which in-flight key each blocked thread is waiting for. Together
    /// with `in_flight` this is the waits-for graph; a wait that would
    /// close a cycle in it is refused as a cyclic reference.
    waiting_on: HashMap<ThreadId, ResourceKey>,
}

impl CacheState {
    /// True if `me` blocking on the key held by `owner` would close a
    /// waits-for cycle. Walks owner -> awaited key -> that key's owner.
    /// No thread ever starts a wait that closes a cycle, so the chain
    /// always terminates.
    fn wait_would_cycle(&self, me: ThreadId, mut owner: ThreadId) -> bool {
        loop {
            if owner == me {
                return true;
            }
            let Some(next_key) = self.waiting_on.get(&owner) else {
                return false;
            };
            match self.in_flight.get(next_key) {
                Some(&next) if next != owner => owner = next,
                _ => return false,
            }
        }
    }
}

/// Memoizing, reference-resolving asset cache.
pub struct ResourceCache {
    provider: Arc<dyn ByteProvider>,
    state: Mutex<CacheState>,
    decoded: Condvar,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ResourceCache {
    pub fn new(provider: Arc<dyn ByteProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(CacheState {
                assets: HashMap::new(),
                in_flight: HashMap::new(),
                waiting_on: HashMap::new(),
            }),
            decoded: Condvar::new(),
        }
    }

    /// Returns the shared handle for `key`, decoding it on first request.
    pub fn get(&self, key: ResourceKey) -> Result<Arc<Asset>, AssetError> {
        let kind = key.kind()?;

        let me = thread::current().id();
        let mut state = lock(&self.state);
        loop {
            if let Some(handle) = state.assets.get(&key) {
                return Ok(handle.clone());
            }
            match state.in_flight.get(&key) {
                Some(&owner) if owner == me => {
                    return Err(AssetError::CyclicReference(key));
                }
                Some(&owner) => {
                    // A cycle spread over several threads never resolves;
                    // the thread whose wait would close it reports it.
                    if state.wait_would_cycle(me, owner) {
                        return Err(AssetError::CyclicReference(key));
                    }
                    // Another thread is decoding this key; wait for it and
                    // re-check. If its decode failed we take over the miss.
                    state.waiting_on.insert(me, key);
                    state = self
                        .decoded
                        .wait(state)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    state.waiting_on.remove(&me);
                }
                None => break,
            }
        }
        state.in_flight.insert(key, me);
        drop(state);

        let result = self.fetch_and_decode(key, kind);

        let mut state = lock(&self.state);
        state.in_flight.remove(&key);
        if let Ok(handle) = &result {
            state.assets.insert(key, handle.clone());
        }
        drop(state);
        self.decoded.notify_all();

        result
    }

    /// `get` plus a kind check on the result.
    pub fn get_of_kind(
        &self,
        key: ResourceKey,
        expected: ResourceKind,
    ) -> Result<Arc<Asset>, AssetError> {
        let handle = self.get(key)?;
        if handle.kind() != expected {
            return Err(AssetError::KindMismatch {
                key,
                expected,
                actual: handle.kind(),
            });
        }
        Ok(handle)
    }

    /// Files a bytes-less texture lookup under `key`, wrapping a texture
    /// handle already in hand. Returns the existing handle if the key is
    /// already cached.
    pub fn insert_texture_lookup(
        &self,
        key: ResourceKey,
        texture: Arc<Asset>,
    ) -> Result<Arc<Asset>, AssetError> {
        let lookup = TextureLookup::from_texture(key, texture)?;
        let mut state = lock(&self.state);
        let handle = state
            .assets
            .entry(key)
            .or_insert_with(|| Arc::new(Asset::TextureLookup(lookup)))
            .clone();
        Ok(handle)
    }

    /// Number of memoized assets. Mostly for diagnostics and tests.
    pub fn len(&self) -> usize {
        lock(&self.state).assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fetch_and_decode(
        &self,
        key: ResourceKey,
        kind: ResourceKind,
    ) -> Result<Arc<Asset>, AssetError> {
        let blob = self.provider.fetch(key)?;
        debug!(%key, ?kind, len = blob.len(), "decoding asset");

        let decoded = match kind {
            ResourceKind::Animation => Animation::decode(key, &blob).map(Asset::Animation),
            ResourceKind::Texture => Texture::decode(key, &blob).map(Asset::Texture),
            ResourceKind::TextureLookup => {
                TextureLookup::decode(key, &blob, self).map(Asset::TextureLookup)
            }
            ResourceKind::MotionTable => MotionTable::decode(key, &blob).map(Asset::MotionTable),
            ResourceKind::StructureGeometry => {
                StructureGeometry::decode(key, &blob).map(Asset::StructureGeometry)
            }
            ResourceKind::Structure => Structure::decode(key, &blob, self).map(Asset::Structure),
            ResourceKind::PhysicsScript => {
                PhysicsScript::decode(key, &blob).map(Asset::PhysicsScript)
            }
        };

        match decoded {
            Ok(asset) => Ok(Arc::new(asset)),
            Err(err) => {
                warn!(%key, error = %err, "asset decode failed");
                Err(err)
            }
        }
    }
}
