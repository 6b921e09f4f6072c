//! Animation assets.
//!
//! Two shapes live here: the standalone `Animation` resource (raw frame
//! data, kind tag 0x03) and the embedded `AnimationStrip` record that motion
//! tables carry. A strip names its animation by key only; the reference is
//! resolved on first use by the consumer, never at decode time.

use crate::error::AssetError;
use crate::key::ResourceKey;
use crate::reader::BlobReader;

/// One segment of an animation strip: which animation to play and how.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimSegment {
    /// Referenced animation asset. Kept lazy.
    pub animation: ResourceKey,
    pub first_frame: u32,
    pub last_frame: u32,
    pub frames_per_second: f32,
}

/// Ordered sequence of animation segments for one stance.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationStrip {
    pub id: u16,
    pub stance_id: u16,
    pub segments: Vec<AnimSegment>,
}

impl AnimationStrip {
    /// Decodes one strip from the cursor, leaving the cursor just past it.
    ///
    /// Strips are embedded records (motion data contains them inline), so
    /// there is no full-consumption assert here; the enclosing decode owns
    /// that.
    pub fn read(reader: &mut BlobReader<'_>) -> Result<Self, AssetError> {
        let id = reader.read_u16()?;
        let stance_id = reader.read_u16()?;

        let count = reader.read_var_u16()? as usize;
        let mut segments = Vec::with_capacity(count.min(256));
        for _ in 0..count {
            segments.push(AnimSegment {
                animation: ResourceKey::from_raw(reader.read_u32()?),
                first_frame: reader.read_u32()?,
                last_frame: reader.read_u32()?,
                frames_per_second: reader.read_f32()?,
            });
        }

        Ok(AnimationStrip {
            id,
            stance_id,
            segments,
        })
    }
}

/// Standalone animation resource: frames of raw float channel data.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub key: ResourceKey,
    pub frame_count: u32,
    pub floats_per_frame: u32,
    /// `frame_count * floats_per_frame` values, frame-major.
    pub frames: Vec<f32>,
}

impl Animation {
    pub fn decode(key: ResourceKey, data: &[u8]) -> Result<Self, AssetError> {
        let mut reader = BlobReader::new(data);

        let embedded = reader.read_u32()?;
        if embedded != key.raw() {
            return Err(AssetError::IdMismatch {
                expected: key,
                found: embedded,
            });
        }

        let frame_count = reader.read_u32()?;
        let floats_per_frame = reader.read_u32()?;
        let total = (frame_count as usize).saturating_mul(floats_per_frame as usize);
        let frames = reader.read_f32s(total)?;

        reader.assert_end()?;

        Ok(Animation {
            key,
            frame_count,
            floats_per_frame,
            frames,
        })
    }
}
