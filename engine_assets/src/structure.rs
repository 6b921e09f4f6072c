//! World-cell structures (kind tag 0x0E).
//!
//! The structure format is the one conditional layout in the repertoire:
//! a flags word read up front gates the doodad list and one trailing field.
//! Texture and geometry references are 16-bit ids widened into full keys
//! (tags 0x08 and 0x0D) and resolved through the cache while decoding, as
//! the source format expects.

use std::sync::Arc;

use bitflags::bitflags;

use crate::asset::Asset;
use crate::cache::ResourceCache;
use crate::error::AssetError;
use crate::key::{ResourceKey, ResourceKind};
use crate::math::{Quat, Vec3};
use crate::reader::BlobReader;

bitflags! {
    /// Structure flags word. Only bits 0-3 are meaningful; any other bit
    /// set fails the decode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StructureFlags: u32 {
        const ABOVE_GROUND = 0x1;
        /// Doodad list present after the visibility records.
        const HAS_DOODADS = 0x2;
        const UNKNOWN_4 = 0x4;
        /// One extra u32 trails the doodad section.
        const HAS_EXTRA = 0x8;
    }
}

/// Link to a neighboring cell. Fields stored verbatim from the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityRecord {
    pub neighbor_cell: u16,
    pub neighbor_portal: u16,
    pub structure_index: u16,
    pub flags: u16,
}

/// Decorative sub-object placed inside a structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Doodad {
    /// Referenced object asset. Kept lazy.
    pub object: ResourceKey,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Doodad {
    fn read(reader: &mut BlobReader<'_>) -> Result<Self, AssetError> {
        let object = ResourceKey::from_raw(reader.read_u32()?);
        let position = read_vec3(reader)?;
        let rotation = read_quat(reader)?;
        Ok(Doodad {
            object,
            position,
            rotation,
        })
    }
}

fn read_vec3(reader: &mut BlobReader<'_>) -> Result<Vec3, AssetError> {
    Ok(Vec3::new(
        reader.read_f32()?,
        reader.read_f32()?,
        reader.read_f32()?,
    ))
}

/// Quaternions are stored w,x,y,z.
fn read_quat(reader: &mut BlobReader<'_>) -> Result<Quat, AssetError> {
    let w = reader.read_f32()?;
    let x = reader.read_f32()?;
    let y = reader.read_f32()?;
    let z = reader.read_f32()?;
    Ok(Quat::new(w, x, y, z))
}

/// Decoded world-cell structure.
#[derive(Debug, Clone)]
pub struct Structure {
    pub key: ResourceKey,
    pub flags: StructureFlags,
    /// Texture lookup handles, in format order.
    pub textures: Vec<Arc<Asset>>,
    /// Structure geometry handle.
    pub geometry: Arc<Asset>,
    pub part_number: u16,
    pub position: Vec3,
    pub rotation: Quat,
    pub connectivity: Vec<ConnectivityRecord>,
    /// Indices of structures visible from this one.
    pub visible: Vec<u16>,
    /// Present only when `HAS_DOODADS` is set; empty otherwise.
    pub doodads: Vec<Doodad>,
    /// Trailing field gated by `HAS_EXTRA`. Semantics unknown; the value is
    /// preserved at the position observed in the format.
    pub extra: Option<u32>,
}

impl Structure {
    pub fn decode(
        key: ResourceKey,
        data: &[u8],
        cache: &ResourceCache,
    ) -> Result<Self, AssetError> {
        let mut reader = BlobReader::new(data);

        let embedded = reader.read_u32()?;
        if embedded != key.raw() {
            return Err(AssetError::IdMismatch {
                expected: key,
                found: embedded,
            });
        }

        let raw_flags = reader.read_u32()?;
        let flags = StructureFlags::from_bits(raw_flags).ok_or(AssetError::InvalidFlags {
            key,
            flags: raw_flags,
        })?;

        // The format repeats the id immediately after the flags.
        let repeated = reader.read_u32()?;
        if repeated != embedded {
            return Err(AssetError::IdMismatch {
                expected: key,
                found: repeated,
            });
        }

        let texture_count = reader.read_u8()? as usize;
        let connected_count = reader.read_u8()? as usize;
        let visible_count = reader.read_u16()? as usize;

        let mut textures = Vec::with_capacity(texture_count);
        for _ in 0..texture_count {
            let id = reader.read_u16()? as u32;
            textures.push(cache.get(ResourceKey::new(ResourceKind::TextureLookup, id))?);
        }

        let geometry_id = reader.read_u16()? as u32;
        let geometry = cache.get(ResourceKey::new(ResourceKind::StructureGeometry, geometry_id))?;

        let part_number = reader.read_u16()?;
        let position = read_vec3(&mut reader)?;
        let rotation = read_quat(&mut reader)?;

        let mut connectivity = Vec::with_capacity(connected_count);
        for _ in 0..connected_count {
            connectivity.push(ConnectivityRecord {
                neighbor_cell: reader.read_u16()?,
                neighbor_portal: reader.read_u16()?,
                structure_index: reader.read_u16()?,
                flags: reader.read_u16()?,
            });
        }

        let visible = reader.read_u16s(visible_count)?;

        let mut doodads = Vec::new();
        if flags.contains(StructureFlags::HAS_DOODADS) {
            let count = reader.read_u32()? as usize;
            doodads.reserve(count.min(1024));
            for _ in 0..count {
                doodads.push(Doodad::read(&mut reader)?);
            }
        }

        let extra = if flags.contains(StructureFlags::HAS_EXTRA) {
            Some(reader.read_u32()?)
        } else {
            None
        };

        reader.assert_end()?;

        Ok(Structure {
            key,
            flags,
            textures,
            geometry,
            part_number,
            position,
            rotation,
            connectivity,
            visible,
            doodads,
            extra,
        })
    }

    /// The structure's geometry, typed.
    pub fn geometry(&self) -> Result<&crate::geometry::StructureGeometry, AssetError> {
        self.geometry.as_structure_geometry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryProvider;
    use crate::reader::BlobWriter;

    const TEXTURE_ID: u16 = 0x21;
    const GEOMETRY_ID: u16 = 0x31;

    fn structure_key() -> ResourceKey {
        ResourceKey::new(ResourceKind::Structure, 0x0141)
    }

    /// Provider pre-seeded with the referenced lookup, texture, and
    /// geometry blobs.
    fn provider_with_references() -> MemoryProvider {
        let mut provider = MemoryProvider::new();

        let tex_key = ResourceKey::new(ResourceKind::Texture, 0x11);
        let mut w = BlobWriter::new();
        w.put_u32(tex_key.raw())
            .put_u32(1)
            .put_u32(1)
            .put_u32(0)
            .put_bytes(&[10, 20, 30]);
        provider.insert(tex_key, w.freeze());

        let lookup_key = ResourceKey::new(ResourceKind::TextureLookup, TEXTURE_ID as u32);
        let mut w = BlobWriter::new();
        w.put_u32(lookup_key.raw()).put_u32(tex_key.raw());
        provider.insert(lookup_key, w.freeze());

        let geom_key = ResourceKey::new(ResourceKind::StructureGeometry, GEOMETRY_ID as u32);
        let mut w = BlobWriter::new();
        w.put_u32(geom_key.raw()).put_u32(1);
        w.put_f32(0.0).put_f32(0.0).put_f32(0.0);
        w.put_u32(0);
        provider.insert(geom_key, w.freeze());

        provider
    }

    fn structure_blob(flags: u32, doodad_count: u32, extra: Option<u32>) -> bytes::Bytes {
        let mut w = BlobWriter::new();
        w.put_u32(structure_key().raw());
        w.put_u32(flags);
        w.put_u32(structure_key().raw());
        w.put_u8(1); // textures
        w.put_u8(1); // connected
        w.put_u16(2); // visible
        w.put_u16(TEXTURE_ID);
        w.put_u16(GEOMETRY_ID);
        w.put_u16(5); // part number
        w.put_f32(10.0).put_f32(20.0).put_f32(30.0);
        w.put_f32(1.0).put_f32(0.0).put_f32(0.0).put_f32(0.0);
        w.put_u16(0x0142).put_u16(1).put_u16(7).put_u16(0);
        w.put_u16(3).put_u16(4);
        if flags & 0x2 != 0 {
            w.put_u32(doodad_count);
            for i in 0..doodad_count {
                w.put_u32(0x0300_0100 + i);
                w.put_f32(i as f32).put_f32(0.0).put_f32(0.0);
                w.put_f32(1.0).put_f32(0.0).put_f32(0.0).put_f32(0.0);
            }
        }
        if let Some(value) = extra {
            w.put_u32(value);
        }
        w.freeze()
    }

    fn decode(blob: &[u8]) -> Result<Structure, AssetError> {
        let cache = ResourceCache::new(Arc::new(provider_with_references()));
        Structure::decode(structure_key(), blob, &cache)
    }

    #[test]
    fn decodes_all_sections() {
        let blob = structure_blob(0x1, 0, None);
        let s = decode(&blob).unwrap();

        assert_eq!(s.flags, StructureFlags::ABOVE_GROUND);
        assert_eq!(s.textures.len(), 1);
        assert_eq!(s.textures[0].kind(), ResourceKind::TextureLookup);
        assert_eq!(s.geometry().unwrap().vertices.len(), 1);
        assert_eq!(s.part_number, 5);
        assert_eq!(s.position, Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(s.rotation, Quat::IDENTITY);
        assert_eq!(
            s.connectivity,
            vec![ConnectivityRecord {
                neighbor_cell: 0x0142,
                neighbor_portal: 1,
                structure_index: 7,
                flags: 0,
            }]
        );
        assert_eq!(s.visible, vec![3, 4]);
        assert!(s.doodads.is_empty());
        assert_eq!(s.extra, None);
    }

    #[test]
    fn doodads_present_only_when_flagged() {
        let blob = structure_blob(0x3, 3, None);
        let s = decode(&blob).unwrap();
        assert_eq!(s.doodads.len(), 3);
        assert_eq!(s.doodads[2].object.raw(), 0x0300_0102);
        assert_eq!(s.doodads[1].position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn doodad_bytes_without_flag_are_trailing_data() {
        // Same bytes as a flagged blob, but the flag is clear: the decoder
        // must not interpret the doodad section, so the blob fails the
        // full-consumption check instead.
        let flagged = structure_blob(0x3, 1, None);
        let mut unflagged = flagged.to_vec();
        unflagged[4] = 0x1; // clear HAS_DOODADS, keep ABOVE_GROUND
        assert!(matches!(
            decode(&unflagged),
            Err(AssetError::TrailingData { .. })
        ));
    }

    #[test]
    fn extra_field_gated_by_bit_3() {
        let blob = structure_blob(0x9, 0, Some(0xCAFE));
        let s = decode(&blob).unwrap();
        assert_eq!(s.extra, Some(0xCAFE));

        // Without the bit, the same trailing word is rejected.
        let blob = structure_blob(0x1, 0, Some(0xCAFE));
        assert!(matches!(
            decode(&blob),
            Err(AssetError::TrailingData { .. })
        ));
    }

    #[test]
    fn reserved_flag_bits_rejected() {
        let blob = structure_blob(0x10, 0, None);
        let err = decode(&blob).unwrap_err();
        assert_eq!(
            err,
            AssetError::InvalidFlags {
                key: structure_key(),
                flags: 0x10,
            }
        );
    }

    #[test]
    fn repeated_id_must_match() {
        let blob = structure_blob(0x1, 0, None);
        let mut bad = blob.to_vec();
        bad[8] ^= 0xFF; // corrupt the repeated id
        assert!(matches!(decode(&bad), Err(AssetError::IdMismatch { .. })));
    }

    #[test]
    fn embedded_id_must_match_requested_key() {
        let blob = structure_blob(0x1, 0, None);
        let cache = ResourceCache::new(Arc::new(provider_with_references()));
        let other = ResourceKey::new(ResourceKind::Structure, 0x0142);
        assert!(matches!(
            Structure::decode(other, &blob, &cache),
            Err(AssetError::IdMismatch { .. })
        ));
    }

    #[test]
    fn truncated_structure_never_succeeds() {
        let blob = structure_blob(0x3, 2, None);
        for len in 0..blob.len() {
            let err = decode(&blob[..len]).unwrap_err();
            assert!(
                matches!(
                    err,
                    AssetError::Overrun { .. } | AssetError::TrailingData { .. }
                ),
                "prefix of {len} bytes gave {err:?}"
            );
        }
    }
}
