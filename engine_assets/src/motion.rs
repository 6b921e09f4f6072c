//! Motion tables (kind tag 0x09).
//!
//! A motion table maps small motion identifiers onto animation data three
//! ways: base cycles, modifiers layered on top of a cycle, and two-level
//! links describing transitions from one motion to another. Motion ids are
//! stored with the compact varint encoding.

use std::collections::HashMap;

use crate::animation::AnimationStrip;
use crate::error::AssetError;
use crate::key::ResourceKey;
use crate::reader::BlobReader;

/// Per-motion payload: playback flags plus the strips to run.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionData {
    pub flags: u32,
    pub strips: Vec<AnimationStrip>,
}

impl MotionData {
    fn read(reader: &mut BlobReader<'_>) -> Result<Self, AssetError> {
        let flags = reader.read_u32()?;
        let count = reader.read_var_u16()? as usize;
        let mut strips = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            strips.push(AnimationStrip::read(reader)?);
        }
        Ok(MotionData { flags, strips })
    }
}

/// Decoded motion table.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionTable {
    pub key: ResourceKey,
    pub cycles: HashMap<u16, MotionData>,
    pub modifiers: HashMap<u16, MotionData>,
    /// Source motion id -> target motion id -> transition data.
    pub links: HashMap<u16, HashMap<u16, MotionData>>,
}

impl MotionTable {
    pub fn decode(key: ResourceKey, data: &[u8]) -> Result<Self, AssetError> {
        let mut reader = BlobReader::new(data);

        let embedded = reader.read_u32()?;
        if embedded != key.raw() {
            return Err(AssetError::IdMismatch {
                expected: key,
                found: embedded,
            });
        }

        let cycles = Self::read_mapping(&mut reader, key)?;
        let modifiers = Self::read_mapping(&mut reader, key)?;

        let outer_count = reader.read_var_u16()? as usize;
        let mut links: HashMap<u16, HashMap<u16, MotionData>> = HashMap::new();
        for _ in 0..outer_count {
            let source = reader.read_var_u16()?;
            if links.contains_key(&source) {
                return Err(AssetError::DuplicateMotion {
                    key,
                    motion: source,
                });
            }
            links.insert(source, Self::read_mapping(&mut reader, key)?);
        }

        reader.assert_end()?;

        Ok(MotionTable {
            key,
            cycles,
            modifiers,
            links,
        })
    }

    /// One (motion id, motion data) mapping level. A repeated id within the
    /// level is a format error, never a silent overwrite.
    fn read_mapping(
        reader: &mut BlobReader<'_>,
        key: ResourceKey,
    ) -> Result<HashMap<u16, MotionData>, AssetError> {
        let count = reader.read_var_u16()? as usize;
        let mut mapping = HashMap::with_capacity(count.min(128));
        for _ in 0..count {
            let motion = reader.read_var_u16()?;
            let data = MotionData::read(reader)?;
            if mapping.insert(motion, data).is_some() {
                return Err(AssetError::DuplicateMotion { key, motion });
            }
        }
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResourceKind;
    use crate::reader::BlobWriter;

    fn put_motion_data(w: &mut BlobWriter, flags: u32) {
        w.put_u32(flags);
        w.put_var_u16(1).unwrap();
        // One strip with a single segment.
        w.put_u16(1).put_u16(0);
        w.put_var_u16(1).unwrap();
        w.put_u32(0x0300_0010).put_u32(0).put_u32(10).put_f32(30.0);
    }

    fn table_key() -> ResourceKey {
        ResourceKey::new(ResourceKind::MotionTable, 0x22)
    }

    fn table_blob(cycle_ids: &[u16]) -> bytes::Bytes {
        let mut w = BlobWriter::new();
        w.put_u32(table_key().raw());
        w.put_var_u16(cycle_ids.len() as u16).unwrap();
        for &id in cycle_ids {
            w.put_var_u16(id).unwrap();
            put_motion_data(&mut w, 0);
        }
        // No modifiers, one link: 1 -> 2.
        w.put_var_u16(0).unwrap();
        w.put_var_u16(1).unwrap();
        w.put_var_u16(1).unwrap();
        w.put_var_u16(1).unwrap();
        w.put_var_u16(2).unwrap();
        put_motion_data(&mut w, 7);
        w.freeze()
    }

    #[test]
    fn decodes_all_three_mappings() {
        let blob = table_blob(&[4, 0x1F0]);
        let table = MotionTable::decode(table_key(), &blob).unwrap();

        assert_eq!(table.cycles.len(), 2);
        assert!(table.cycles.contains_key(&4));
        assert!(table.cycles.contains_key(&0x1F0));
        assert!(table.modifiers.is_empty());
        assert_eq!(table.links.len(), 1);
        let link = &table.links[&1][&2];
        assert_eq!(link.flags, 7);
        assert_eq!(link.strips.len(), 1);
        assert_eq!(link.strips[0].segments[0].animation.raw(), 0x0300_0010);
    }

    #[test]
    fn duplicate_cycle_id_rejected() {
        let blob = table_blob(&[4, 4]);
        assert_eq!(
            MotionTable::decode(table_key(), &blob),
            Err(AssetError::DuplicateMotion {
                key: table_key(),
                motion: 4,
            })
        );
    }

    #[test]
    fn id_mismatch_rejected() {
        let blob = table_blob(&[4]);
        let wrong = ResourceKey::new(ResourceKind::MotionTable, 0x23);
        assert!(matches!(
            MotionTable::decode(wrong, &blob),
            Err(AssetError::IdMismatch { .. })
        ));
    }

    #[test]
    fn truncated_table_never_succeeds() {
        let blob = table_blob(&[4]);
        for len in 0..blob.len() {
            let err = MotionTable::decode(table_key(), &blob[..len]).unwrap_err();
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
