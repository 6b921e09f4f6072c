//! Texture assets.
//!
//! `Texture` (kind tag 0x06) holds decoded pixel data; `TextureLookup`
//! (kind tag 0x08) is the indirection other formats reference, pointing at
//! one underlying texture. A lookup normally decodes from bytes, but it can
//! also be built directly around a texture handle already in hand, with no
//! backing blob.

use std::sync::Arc;

use crate::asset::Asset;
use crate::cache::ResourceCache;
use crate::error::AssetError;
use crate::key::{ResourceKey, ResourceKind};
use crate::reader::BlobReader;

/// Pixel layout of a decoded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    fn from_raw(key: ResourceKey, raw: u32) -> Result<Self, AssetError> {
        match raw {
            0 => Ok(TextureFormat::Rgb8),
            1 => Ok(TextureFormat::Rgba8),
            other => Err(AssetError::InvalidFlags { key, flags: other }),
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
        }
    }
}

/// Decoded texture image.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub key: ResourceKey,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// `width * height * bytes_per_pixel` bytes, row-major, copied out of
    /// the source blob.
    pub pixels: Vec<u8>,
}

impl Texture {
    pub fn decode(key: ResourceKey, data: &[u8]) -> Result<Self, AssetError> {
        let mut reader = BlobReader::new(data);

        let embedded = reader.read_u32()?;
        if embedded != key.raw() {
            return Err(AssetError::IdMismatch {
                expected: key,
                found: embedded,
            });
        }

        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let format = TextureFormat::from_raw(key, reader.read_u32()?)?;

        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(format.bytes_per_pixel());
        let pixels = reader.read_bytes(len)?.to_vec();

        reader.assert_end()?;

        Ok(Texture {
            key,
            width,
            height,
            format,
            pixels,
        })
    }
}

/// Indirection from a lookup key to one underlying texture.
#[derive(Debug, Clone)]
pub struct TextureLookup {
    pub key: ResourceKey,
    /// Shared handle to the underlying `Texture` asset.
    pub texture: Arc<Asset>,
}

impl TextureLookup {
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

        let texture_key = ResourceKey::from_raw(reader.read_u32()?);
        let kind = texture_key.kind()?;
        if kind != ResourceKind::Texture {
            return Err(AssetError::KindMismatch {
                key: texture_key,
                expected: ResourceKind::Texture,
                actual: kind,
            });
        }

        reader.assert_end()?;

        let texture = cache.get(texture_key)?;

        Ok(TextureLookup { key, texture })
    }

    /// Wraps an already decoded texture handle with no backing bytes.
    ///
    /// The handle must actually be a `Texture`.
    pub fn from_texture(key: ResourceKey, texture: Arc<Asset>) -> Result<Self, AssetError> {
        texture.as_texture()?;
        Ok(TextureLookup { key, texture })
    }

    /// The underlying texture.
    pub fn texture(&self) -> Result<&Texture, AssetError> {
        self.texture.as_texture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::BlobWriter;

    fn texture_key() -> ResourceKey {
        ResourceKey::new(ResourceKind::Texture, 0x51)
    }

    fn texture_blob(format: u32, pixels: &[u8]) -> bytes::Bytes {
        let mut w = BlobWriter::new();
        w.put_u32(texture_key().raw())
            .put_u32(2)
            .put_u32(1)
            .put_u32(format)
            .put_bytes(pixels);
        w.freeze()
    }

    #[test]
    fn texture_decodes_pixels() {
        let blob = texture_blob(1, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let tex = Texture::decode(texture_key(), &blob).unwrap();
        assert_eq!(tex.width, 2);
        assert_eq!(tex.height, 1);
        assert_eq!(tex.format, TextureFormat::Rgba8);
        assert_eq!(tex.pixels, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn texture_rejects_unknown_format() {
        let blob = texture_blob(9, &[]);
        assert!(matches!(
            Texture::decode(texture_key(), &blob),
            Err(AssetError::InvalidFlags { flags: 9, .. })
        ));
    }

    #[test]
    fn texture_rejects_short_pixel_payload() {
        // RGBA 2x1 wants 8 bytes; give 5.
        let blob = texture_blob(1, &[1, 2, 3, 4, 5]);
        assert!(matches!(
            Texture::decode(texture_key(), &blob),
            Err(AssetError::Overrun { .. })
        ));
    }

    #[test]
    fn texture_rejects_long_pixel_payload() {
        let blob = texture_blob(0, &[0; 7]);
        assert_eq!(
            Texture::decode(texture_key(), &blob),
            Err(AssetError::TrailingData { remaining: 1 })
        );
    }
}
