//! Bounds-checked binary cursor.
//!
//! Asset blobs are format-by-convention: field order is fixed and nothing is
//! self-describing, so every read is forward-only and sequential. A read past
//! the end is an error, and every top-level decode must finish with
//! [`BlobReader::assert_end`] so a partially consumed blob is caught at the
//! decode site instead of corrupting whatever reads the next field.
//!
//! All fixed-size fields are little-endian.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::AssetError;

/// Sequential reader over a fixed byte buffer.
pub struct BlobReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BlobReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current read offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    fn take(&mut self, wanted: usize) -> Result<&'a [u8], AssetError> {
        let remaining = self.remaining();
        if wanted > remaining {
            return Err(AssetError::Overrun {
                offset: self.position,
                wanted,
                remaining,
            });
        }
        let slice = &self.data[self.position..self.position + wanted];
        self.position += wanted;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, AssetError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, AssetError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, AssetError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, AssetError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_f32(&mut self) -> Result<f32, AssetError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, AssetError> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(f64::from_le_bytes(raw))
    }

    /// Borrows `count` raw bytes without copying.
    ///
    /// The view is tied to the blob's lifetime; decoders that keep the data
    /// must copy it out before returning.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], AssetError> {
        self.take(count)
    }

    /// Reads `count` consecutive little-endian f32s.
    pub fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>, AssetError> {
        let raw = self.take(count.saturating_mul(4))?;
        Ok(raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Reads `count` consecutive little-endian u16s.
    pub fn read_u16s(&mut self, count: usize) -> Result<Vec<u16>, AssetError> {
        let raw = self.take(count.saturating_mul(2))?;
        Ok(raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect())
    }

    /// One-or-two-byte compact unsigned integer, big-endian across bytes.
    ///
    /// If the first byte's high bit is set, the value is the remaining seven
    /// bits followed by the whole second byte (15 bits total, up to 0x7FFF);
    /// otherwise the first byte is the value (0..=127).
    pub fn read_var_u16(&mut self) -> Result<u16, AssetError> {
        let first = self.read_u8()? as u16;
        if first & 0x80 != 0 {
            let second = self.read_u8()? as u16;
            Ok((first & 0x7F) << 8 | second)
        } else {
            Ok(first)
        }
    }

    /// Fails unless the cursor has consumed the entire buffer.
    pub fn assert_end(&self) -> Result<(), AssetError> {
        if self.position < self.data.len() {
            return Err(AssetError::TrailingData {
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Encoding counterpart of [`BlobReader`], used by tools and tests to author
/// synthetic blobs.
#[derive(Debug, Default)]
pub struct BlobWriter {
    buf: BytesMut,
}

impl BlobWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.put_u8(v);
        self
    }

    pub fn put_u16(&mut self, v: u16) -> &mut Self {
        self.buf.put_u16_le(v);
        self
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.buf.put_u32_le(v);
        self
    }

    pub fn put_f32(&mut self, v: f32) -> &mut Self {
        self.buf.put_f32_le(v);
        self
    }

    pub fn put_f64(&mut self, v: f64) -> &mut Self {
        self.buf.put_f64_le(v);
        self
    }

    pub fn put_bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    /// Writes the compact integer form read by [`BlobReader::read_var_u16`].
    pub fn put_var_u16(&mut self, v: u16) -> Result<&mut Self, AssetError> {
        if v > 0x7FFF {
            return Err(AssetError::VarIntRange(v as u32));
        }
        if v >= 0x80 {
            self.buf.put_u8(0x80 | (v >> 8) as u8);
            self.buf.put_u8(v as u8);
        } else {
            self.buf.put_u8(v as u8);
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
