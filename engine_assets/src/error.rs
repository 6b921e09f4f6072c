//! Decode and cache error taxonomy.
//!
//! Every failure a caller can act on is a distinct variant; nothing here is
//! auto-corrected or silently dropped. A failed decode never enters the
//! cache, so any of these may be retried by a later `get`.

use crate::key::{ResourceKey, ResourceKind};

/// Errors surfaced by the byte cursor, the typed decoders, and the cache.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    #[error("read overrun at offset {offset}: wanted {wanted} bytes, {remaining} remain")]
    Overrun {
        offset: usize,
        wanted: usize,
        remaining: usize,
    },

    #[error("{remaining} trailing bytes after end of blob")]
    TrailingData { remaining: usize },

    #[error("embedded id {found:#010x} does not match requested key {expected}")]
    IdMismatch { expected: ResourceKey, found: u32 },

    #[error("invalid flags {flags:#x} in {key}")]
    InvalidFlags { key: ResourceKey, flags: u32 },

    #[error("no data for key {0}")]
    NotFound(ResourceKey),

    #[error("key {key} is a {actual:?}, not a {expected:?}")]
    KindMismatch {
        key: ResourceKey,
        expected: ResourceKind,
        actual: ResourceKind,
    },

    #[error("cyclic reference while decoding {0}")]
    CyclicReference(ResourceKey),

    #[error("unknown kind tag {tag:#04x} in key {key}")]
    UnknownKind { key: ResourceKey, tag: u8 },

    #[error("unknown animation hook tag {tag:#x} in {key}")]
    UnknownHook { key: ResourceKey, tag: u32 },

    #[error("duplicate motion id {motion:#x} in {key}")]
    DuplicateMotion { key: ResourceKey, motion: u16 },

    #[error("vertex index {index} out of range ({limit} vertices) in {key}")]
    IndexOutOfRange {
        key: ResourceKey,
        index: u32,
        limit: u32,
    },

    #[error("varint value {0:#x} exceeds 15 bits")]
    VarIntRange(u32),
}
