//! Physics scripts (kind tag 0x33).
//!
//! A script is an ordered list of (start time, animation hook) pairs. Hooks
//! are kind-tagged variants; the tag dispatch is closed, and an unknown tag
//! fails the whole decode.

use crate::error::AssetError;
use crate::key::ResourceKey;
use crate::reader::BlobReader;

/// One animation hook variant.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationHook {
    /// Play a sound effect.
    Sound { sound_id: u32 },
    /// Scale the object over time.
    Scale { scale: f32, time: f32 },
    /// Toggle visibility. The raw word is kept; zero means hidden.
    Visibility { visible: u32 },
    /// Chain into another physics script. Kept lazy.
    CallScript { script: ResourceKey },
}

impl AnimationHook {
    /// Decodes one tagged hook, advancing the cursor past exactly its bytes.
    fn read(reader: &mut BlobReader<'_>, key: ResourceKey) -> Result<Self, AssetError> {
        let tag = reader.read_u32()?;
        match tag {
            0x01 => Ok(AnimationHook::Sound {
                sound_id: reader.read_u32()?,
            }),
            0x02 => Ok(AnimationHook::Scale {
                scale: reader.read_f32()?,
                time: reader.read_f32()?,
            }),
            0x03 => Ok(AnimationHook::Visibility {
                visible: reader.read_u32()?,
            }),
            0x04 => Ok(AnimationHook::CallScript {
                script: ResourceKey::from_raw(reader.read_u32()?),
            }),
            tag => Err(AssetError::UnknownHook { key, tag }),
        }
    }
}

/// One timed hook within a script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptHook {
    /// Seconds from script start. Currently unused downstream but preserved.
    pub start_time: f64,
    pub hook: AnimationHook,
}

/// Decoded physics script.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsScript {
    pub key: ResourceKey,
    pub hooks: Vec<ScriptHook>,
}

impl PhysicsScript {
    pub fn decode(key: ResourceKey, data: &[u8]) -> Result<Self, AssetError> {
        let mut reader = BlobReader::new(data);

        let embedded = reader.read_u32()?;
        if embedded != key.raw() {
            return Err(AssetError::IdMismatch {
                expected: key,
                found: embedded,
            });
        }

        let count = reader.read_u32()? as usize;
        let mut hooks = Vec::with_capacity(count.min(256));
        for _ in 0..count {
            let start_time = reader.read_f64()?;
            let hook = AnimationHook::read(&mut reader, key)?;
            hooks.push(ScriptHook { start_time, hook });
        }

        reader.assert_end()?;

        Ok(PhysicsScript { key, hooks })
    }
}
