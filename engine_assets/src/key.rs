//! Resource keys.
//!
//! Every asset is addressed by a 32-bit key whose high byte carries the
//! asset-kind tag and whose low 24 bits carry a kind-local index. Keys come
//! from the asset files themselves; this crate never mints new ones.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// 32-bit asset key: kind tag in the high byte, index in the low 24 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey(pub u32);

impl ResourceKey {
    pub const fn new(kind: ResourceKind, index: u32) -> Self {
        ResourceKey((kind as u32) << 24 | (index & 0x00FF_FFFF))
    }

    pub const fn from_raw(raw: u32) -> Self {
        ResourceKey(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The raw kind tag byte, whether or not it names a known kind.
    pub const fn tag(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Kind-local index (low 24 bits).
    pub const fn index(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Resolves the tag byte to a known kind.
    pub fn kind(self) -> Result<ResourceKind, AssetError> {
        ResourceKind::from_tag(self.tag()).ok_or(AssetError::UnknownKind {
            key: self,
            tag: self.tag(),
        })
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Closed set of decodable asset kinds with their key tags.
///
/// 0x08 and 0x0D are the tags the structure format widens its 16-bit texture
/// and geometry ids into; the rest are fixed by this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResourceKind {
    Animation = 0x03,
    Texture = 0x06,
    TextureLookup = 0x08,
    MotionTable = 0x09,
    StructureGeometry = 0x0D,
    Structure = 0x0E,
    PhysicsScript = 0x33,
}

impl ResourceKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x03 => Some(ResourceKind::Animation),
            0x06 => Some(ResourceKind::Texture),
            0x08 => Some(ResourceKind::TextureLookup),
            0x09 => Some(ResourceKind::MotionTable),
            0x0D => Some(ResourceKind::StructureGeometry),
            0x0E => Some(ResourceKind::Structure),
            0x33 => Some(ResourceKind::PhysicsScript),
            _ => None,
        }
    }
}
