//! Growable dual-cursor binary stream.

use std::str;

use crate::StreamError;

/// Extra bytes allocated beyond the requested size when the buffer grows.
pub const DEFAULT_MARGIN: usize = 2048;

/// A growable byte buffer with independent write and read cursors.
///
/// Writes append at `write_pos` and never move `read_pos`; reads consume at
/// `read_pos` and never move `write_pos`. Reads are bounded by the write
/// cursor, so a consumer can only ever see bytes a producer has already
/// written.
///
/// # Example
///
/// ```
/// use amf_buffers::ByteStream;
///
/// let mut stream = ByteStream::new();
/// stream.write_u16(0x0102);
/// stream.write_u8(0x03);
/// assert_eq!(stream.read_u16(), Ok(0x0102));
/// assert_eq!(stream.read_u8(), Ok(0x03));
/// ```
#[derive(Debug, Clone)]
pub struct ByteStream {
    /// The underlying storage.
    pub data: Vec<u8>,
    /// Position of the next write.
    pub write_pos: usize,
    /// Position of the next read.
    pub read_pos: usize,
}

impl Default for ByteStream {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStream {
    /// Creates a stream with the default 2048-byte storage.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MARGIN)
    }

    /// Creates a stream whose storage starts at `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            write_pos: 0,
            read_pos: 0,
        }
    }

    /// Creates a stream seeded with foreign bytes; the whole payload is
    /// immediately readable.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let write_pos = bytes.len();
        Self {
            data: bytes,
            write_pos,
            read_pos: 0,
        }
    }

    /// Returns the written prefix of the storage.
    pub fn written(&self) -> &[u8] {
        &self.data[..self.write_pos]
    }

    /// Number of bytes available to the read cursor.
    pub fn remaining(&self) -> usize {
        self.write_pos - self.read_pos
    }

    fn can_write(&self, length: usize) -> bool {
        self.data.len() - self.write_pos >= length
    }

    /// Grows the storage to `old_length + DEFAULT_MARGIN + requested`,
    /// copying existing contents. Cursors are unaffected.
    fn scale(&mut self, requested: usize) {
        let new_len = self.data.len() + DEFAULT_MARGIN + requested;
        let mut new_data = vec![0u8; new_len];
        new_data[..self.data.len()].copy_from_slice(&self.data);
        self.data = new_data;
    }

    #[inline]
    fn ensure(&mut self, length: usize) {
        if !self.can_write(length) {
            self.scale(length);
        }
    }

    #[inline]
    fn check(&self, length: usize) -> Result<(), StreamError> {
        if self.read_pos + length > self.write_pos {
            Err(StreamError::EndOfStream)
        } else {
            Ok(())
        }
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn write_i8(&mut self, val: i8) {
        self.write_u8(val as u8);
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn write_u8(&mut self, val: u8) {
        self.ensure(1);
        self.data[self.write_pos] = val;
        self.write_pos += 1;
    }

    /// Writes a signed 16-bit integer (big-endian).
    #[inline]
    pub fn write_i16(&mut self, val: i16) {
        self.ensure(2);
        self.data[self.write_pos..self.write_pos + 2].copy_from_slice(&val.to_be_bytes());
        self.write_pos += 2;
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn write_u16(&mut self, val: u16) {
        self.ensure(2);
        self.data[self.write_pos..self.write_pos + 2].copy_from_slice(&val.to_be_bytes());
        self.write_pos += 2;
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn write_u32(&mut self, val: u32) {
        self.ensure(4);
        self.data[self.write_pos..self.write_pos + 4].copy_from_slice(&val.to_be_bytes());
        self.write_pos += 4;
    }

    /// Writes a 64-bit floating point number (big-endian).
    #[inline]
    pub fn write_f64(&mut self, val: f64) {
        self.ensure(8);
        self.data[self.write_pos..self.write_pos + 8].copy_from_slice(&val.to_be_bytes());
        self.write_pos += 8;
    }

    /// Writes a byte slice.
    pub fn write_buf(&mut self, buf: &[u8]) {
        self.ensure(buf.len());
        self.data[self.write_pos..self.write_pos + buf.len()].copy_from_slice(buf);
        self.write_pos += buf.len();
    }

    /// Writes raw UTF-8 bytes with no length prefix.
    pub fn write_utf_bytes(&mut self, s: &str) {
        self.write_buf(s.as_bytes());
    }

    /// Writes a UTF-8 string with a u16 byte-length prefix.
    ///
    /// Byte lengths over 65535 do not fit the prefix and fail.
    pub fn write_utf(&mut self, s: &str) -> Result<(), StreamError> {
        let length = s.len();
        if length > 65535 {
            return Err(StreamError::OutOfRange(
                "UTF length can't be greater than 65535".to_owned(),
            ));
        }
        self.write_u16(length as u16);
        self.write_buf(s.as_bytes());
        Ok(())
    }

    /// Writes a variable-length unsigned 29-bit integer.
    ///
    /// One to three 7-bit groups with the continuation bit set on all but
    /// the last; a fourth group, when present, carries a full 8 bits.
    pub fn write_u29(&mut self, val: u32) -> Result<(), StreamError> {
        if val < 0x80 {
            self.write_u8(val as u8);
        } else if val < 0x4000 {
            self.write_u8((((val >> 7) & 0x7f) | 0x80) as u8);
            self.write_u8((val & 0x7f) as u8);
        } else if val < 0x20_0000 {
            self.write_u8((((val >> 14) & 0x7f) | 0x80) as u8);
            self.write_u8((((val >> 7) & 0x7f) | 0x80) as u8);
            self.write_u8((val & 0x7f) as u8);
        } else if val < 0x4000_0000 {
            self.write_u8((((val >> 22) & 0x7f) | 0x80) as u8);
            self.write_u8((((val >> 15) & 0x7f) | 0x80) as u8);
            self.write_u8((((val >> 8) & 0x7f) | 0x80) as u8);
            self.write_u8((val & 0xff) as u8);
        } else {
            return Err(StreamError::OutOfRange(format!(
                "integer out of UInt29 range: {val}"
            )));
        }
        Ok(())
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, StreamError> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, StreamError> {
        self.check(1)?;
        let val = self.data[self.read_pos];
        self.read_pos += 1;
        Ok(val)
    }

    /// Reads a signed 16-bit integer (big-endian).
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16, StreamError> {
        self.check(2)?;
        let val = i16::from_be_bytes([self.data[self.read_pos], self.data[self.read_pos + 1]]);
        self.read_pos += 2;
        Ok(val)
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, StreamError> {
        self.check(2)?;
        let val = u16::from_be_bytes([self.data[self.read_pos], self.data[self.read_pos + 1]]);
        self.read_pos += 2;
        Ok(val)
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, StreamError> {
        self.check(4)?;
        let val = u32::from_be_bytes([
            self.data[self.read_pos],
            self.data[self.read_pos + 1],
            self.data[self.read_pos + 2],
            self.data[self.read_pos + 3],
        ]);
        self.read_pos += 4;
        Ok(val)
    }

    /// Reads a 64-bit floating point number (big-endian).
    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, StreamError> {
        self.check(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.data[self.read_pos..self.read_pos + 8]);
        self.read_pos += 8;
        Ok(f64::from_be_bytes(bytes))
    }

    /// Reads `length` raw bytes.
    pub fn read_buf(&mut self, length: usize) -> Result<&[u8], StreamError> {
        self.check(length)?;
        let start = self.read_pos;
        self.read_pos += length;
        Ok(&self.data[start..start + length])
    }

    /// Reads `length` bytes as UTF-8 text.
    pub fn read_utf_bytes(&mut self, length: usize) -> Result<String, StreamError> {
        let bytes = self.read_buf(length)?;
        str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| StreamError::InvalidUtf8)
    }

    /// Reads a u16-length-prefixed UTF-8 string.
    pub fn read_utf(&mut self) -> Result<String, StreamError> {
        let length = self.read_u16()? as usize;
        self.read_utf_bytes(length)
    }

    /// Reads a variable-length unsigned 29-bit integer.
    pub fn read_u29(&mut self) -> Result<u32, StreamError> {
        let b = self.read_u8()? as u32;
        if b < 128 {
            return Ok(b);
        }
        let mut result = (b & 0x7f) << 7;
        let b = self.read_u8()? as u32;
        if b < 128 {
            return Ok(result | b);
        }
        result = (result | (b & 0x7f)) << 7;
        let b = self.read_u8()? as u32;
        if b < 128 {
            return Ok(result | b);
        }
        result = (result | (b & 0x7f)) << 8;
        let b = self.read_u8()? as u32;
        Ok(result | b)
    }
}
