//! Little-endian writer producing record bodies readable by [`BinaryReader`].
//!
//! [`BinaryReader`]: crate::BinaryReader

use byteorder::{ByteOrder, LittleEndian};

/// An append-only little-endian byte writer.
///
/// # Example
///
/// ```
/// use datlens_common::{BinaryReader, BinaryWriter};
///
/// let mut writer = BinaryWriter::new();
/// writer.write_u32(0x0E00_000E);
/// writer.write_pstring("Strength Other I");
///
/// let bytes = writer.into_inner();
/// let mut reader = BinaryReader::new(&bytes);
/// assert_eq!(reader.read_u32().unwrap(), 0x0E00_000E);
/// assert_eq!(reader.read_pstring().unwrap(), "Strength Other I");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Write a boolean as one byte.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.data.push(value as u8);
    }

    /// Write a little-endian u16.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, value);
        self.data.extend_from_slice(&buf);
    }

    /// Write a little-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.data.extend_from_slice(&buf);
    }

    /// Write a little-endian i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_i32(&mut buf, value);
        self.data.extend_from_slice(&buf);
    }

    /// Write a little-endian u64.
    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_u64(&mut buf, value);
        self.data.extend_from_slice(&buf);
    }

    /// Write a little-endian f32.
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_f32(&mut buf, value);
        self.data.extend_from_slice(&buf);
    }

    /// Write a string prefixed with its u16 byte length.
    ///
    /// Strings longer than `u16::MAX` bytes are truncated at a char boundary.
    pub fn write_pstring(&mut self, value: &str) {
        let mut end = value.len().min(u16::MAX as usize);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        self.write_u16(end as u16);
        self.write_bytes(&value.as_bytes()[..end]);
    }

    /// Write a u32-count-prefixed list of u32 values.
    pub fn write_u32_slice(&mut self, values: &[u32]) {
        self.write_u32(values.len() as u32);
        for &value in values {
            self.write_u32(value);
        }
    }

    /// Consume the writer and return the written bytes.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Borrow the written bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
