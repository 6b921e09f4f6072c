//! `engine_assets`
//!
//! Asset decoding core shared by every consumer of game data:
//! - Bounds-checked binary cursor and compact varint codec.
//! - One typed decoder per asset kind, each validating its format
//!   invariants and consuming its blob exactly.
//! - A memoizing resource cache that decodes each key at most once and
//!   resolves inter-asset references while decoding.
//! - A side table for lazily built render artifacts.
//!
//! No `unsafe`. Decoded assets are immutable and freely shareable.

pub mod animation;
pub mod asset;
pub mod cache;
pub mod error;
pub mod geometry;
pub mod key;
pub mod math;
pub mod motion;
pub mod reader;
pub mod render;
pub mod script;
pub mod structure;
pub mod texture;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::asset::Asset;
    pub use crate::cache::{ByteProvider, MemoryProvider, ResourceCache};
    pub use crate::error::AssetError;
    pub use crate::key::{ResourceKey, ResourceKind};
    pub use crate::math::{Quat, Vec3};
    pub use crate::reader::{BlobReader, BlobWriter};
}
