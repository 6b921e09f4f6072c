//! Directory-backed byte provider.
//!
//! One file per key, named by the key's zero-padded hex form with a `.bin`
//! suffix. This stands in for the real archive format, which is outside the
//! asset core; the provider is the source of truth for key existence, so
//! any unreadable file surfaces as "not found" after a logged warning.

use std::fs;
use std::path::PathBuf;

use bytes::Bytes;
use engine_assets::cache::ByteProvider;
use engine_assets::error::AssetError;
use engine_assets::key::ResourceKey;
use tracing::warn;

/// Byte provider reading `<dir>/<key>.bin` files.
pub struct DirProvider {
    dir: PathBuf,
}

impl DirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: ResourceKey) -> PathBuf {
        self.dir.join(format!("{key}.bin"))
    }
}

impl ByteProvider for DirProvider {
    fn fetch(&self, key: ResourceKey) -> Result<Bytes, AssetError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(key))
            }
            Err(err) => {
                warn!(%key, path = %path.display(), error = %err, "blob unreadable");
                Err(AssetError::NotFound(key))
            }
        }
    }
}
