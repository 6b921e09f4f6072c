//! Structure geometry (kind tag 0x0D).
//!
//! Vertex positions plus indexed triangles, handed to the render
//! collaborator as-is. Indices are validated at decode time so downstream
//! never has to range-check.

use crate::error::AssetError;
use crate::key::ResourceKey;
use crate::math::Vec3;
use crate::reader::BlobReader;

#[derive(Debug, Clone, PartialEq)]
pub struct StructureGeometry {
    pub key: ResourceKey,
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u16; 3]>,
    /// Radius of the bounding sphere around the origin.
    pub bounding_radius: f32,
}

impl StructureGeometry {
    pub fn decode(key: ResourceKey, data: &[u8]) -> Result<Self, AssetError> {
        let mut reader = BlobReader::new(data);

        let embedded = reader.read_u32()?;
        if embedded != key.raw() {
            return Err(AssetError::IdMismatch {
                expected: key,
                found: embedded,
            });
        }

        let vertex_count = reader.read_u32()? as usize;
        let floats = reader.read_f32s(vertex_count.saturating_mul(3))?;
        let vertices: Vec<Vec3> = floats
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();

        let triangle_count = reader.read_u32()? as usize;
        let indices = reader.read_u16s(triangle_count.saturating_mul(3))?;
        let mut triangles = Vec::with_capacity(triangle_count);
        for tri in indices.chunks_exact(3) {
            for &index in tri {
                if index as usize >= vertices.len() {
                    return Err(AssetError::IndexOutOfRange {
                        key,
                        index: index as u32,
                        limit: vertices.len() as u32,
                    });
                }
            }
            triangles.push([tri[0], tri[1], tri[2]]);
        }

        reader.assert_end()?;

        let bounding_radius = vertices
            .iter()
            .map(|v| v.len_sq())
            .fold(0.0f32, f32::max)
            .sqrt();

        Ok(StructureGeometry {
            key,
            vertices,
            triangles,
            bounding_radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResourceKind;
    use crate::reader::BlobWriter;

    fn geom_key() -> ResourceKey {
        ResourceKey::new(ResourceKind::StructureGeometry, 9)
    }

    fn geom_blob(indices: &[u16]) -> bytes::Bytes {
        let mut w = BlobWriter::new();
        w.put_u32(geom_key().raw()).put_u32(3);
        for v in [0.0f32, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 3.0, 0.0] {
            w.put_f32(v);
        }
        w.put_u32((indices.len() / 3) as u32);
        for &i in indices {
            w.put_u16(i);
        }
        w.freeze()
    }

    #[test]
    fn decodes_vertices_and_triangles() {
        let blob = geom_blob(&[0, 1, 2]);
        let geom = StructureGeometry::decode(geom_key(), &blob).unwrap();
        assert_eq!(geom.vertices.len(), 3);
        assert_eq!(geom.triangles, vec![[0, 1, 2]]);
        assert_eq!(geom.vertices[1], Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(geom.bounding_radius, 4.0);
    }

    #[test]
    fn out_of_range_index_rejected() {
        let blob = geom_blob(&[0, 1, 3]);
        assert!(matches!(
            StructureGeometry::decode(geom_key(), &blob),
            Err(AssetError::IndexOutOfRange {
                index: 3,
                limit: 3,
                ..
            })
        ));
    }

    #[test]
    fn truncated_geometry_overruns() {
        let blob = geom_blob(&[0, 1, 2]);
        assert!(matches!(
            StructureGeometry::decode(geom_key(), &blob[..blob.len() - 1]),
            Err(AssetError::Overrun { .. })
        ));
    }
}
