//! The decoded asset sum type.
//!
//! One variant per decodable kind. Handles are shared as `Arc<Asset>`;
//! getting at a concrete kind goes through the checked accessors, so a
//! wrong-kind access is a typed error instead of a panic.

use crate::animation::Animation;
use crate::error::AssetError;
use crate::geometry::StructureGeometry;
use crate::key::{ResourceKey, ResourceKind};
use crate::motion::MotionTable;
use crate::script::PhysicsScript;
use crate::structure::Structure;
use crate::texture::{Texture, TextureLookup};

/// A fully decoded, immutable asset.
#[derive(Debug, Clone)]
pub enum Asset {
    Animation(Animation),
    Texture(Texture),
    TextureLookup(TextureLookup),
    MotionTable(MotionTable),
    StructureGeometry(StructureGeometry),
    Structure(Structure),
    PhysicsScript(PhysicsScript),
}

macro_rules! checked_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        pub fn $fn_name(&self) -> Result<&$ty, AssetError> {
            match self {
                Asset::$variant(inner) => Ok(inner),
                other => Err(AssetError::KindMismatch {
                    key: other.key(),
                    expected: ResourceKind::$variant,
                    actual: other.kind(),
                }),
            }
        }
    };
}

impl Asset {
    /// The key this asset was decoded under.
    pub fn key(&self) -> ResourceKey {
        match self {
            Asset::Animation(a) => a.key,
            Asset::Texture(t) => t.key,
            Asset::TextureLookup(t) => t.key,
            Asset::MotionTable(m) => m.key,
            Asset::StructureGeometry(g) => g.key,
            Asset::Structure(s) => s.key,
            Asset::PhysicsScript(p) => p.key,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Asset::Animation(_) => ResourceKind::Animation,
            Asset::Texture(_) => ResourceKind::Texture,
            Asset::TextureLookup(_) => ResourceKind::TextureLookup,
            Asset::MotionTable(_) => ResourceKind::MotionTable,
            Asset::StructureGeometry(_) => ResourceKind::StructureGeometry,
            Asset::Structure(_) => ResourceKind::Structure,
            Asset::PhysicsScript(_) => ResourceKind::PhysicsScript,
        }
    }

    checked_accessor!(as_animation, Animation, Animation);
    checked_accessor!(as_texture, Texture, Texture);
    checked_accessor!(as_texture_lookup, TextureLookup, TextureLookup);
    checked_accessor!(as_motion_table, MotionTable, MotionTable);
    checked_accessor!(as_structure_geometry, StructureGeometry, StructureGeometry);
    checked_accessor!(as_structure, Structure, Structure);
    checked_accessor!(as_physics_script, PhysicsScript, PhysicsScript);
}
