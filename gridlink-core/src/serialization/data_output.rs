//! Data output stream for the grid's binary serialization format.

use bytes::{BufMut, BytesMut};

use super::byte_order::ByteOrder;
use super::envelope::Envelope;
use crate::error::Result;

/// Length value written for a null string or null byte sequence.
pub const NULL_ARRAY_LENGTH: i32 = -1;

/// A growable buffer that writes primitives in the stream's byte order.
///
/// All multi-byte values honor the `ByteOrder` fixed at construction.
#[derive(Debug)]
pub struct DataOutput {
    buffer: BytesMut,
    byte_order: ByteOrder,
}

impl DataOutput {
    /// Creates a new output stream with the given byte order.
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
            byte_order,
        }
    }

    /// Creates a new output stream with the given byte order and capacity.
    pub fn with_capacity(byte_order: ByteOrder, capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            byte_order,
        }
    }

    /// Returns the byte order of this stream.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns the written bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the output and returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Writes a single byte (i8).
    pub fn write_byte(&mut self, v: i8) -> Result<()> {
        self.buffer.put_i8(v);
        Ok(())
    }

    /// Writes a boolean as a single byte (0 for false, 1 for true).
    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.buffer.put_u8(if v { 1 } else { 0 });
        Ok(())
    }

    /// Writes a 16-bit signed integer.
    pub fn write_short(&mut self, v: i16) -> Result<()> {
        match self.byte_order {
            ByteOrder::BigEndian => self.buffer.put_i16(v),
            ByteOrder::LittleEndian => self.buffer.put_i16_le(v),
        }
        Ok(())
    }

    /// Writes a 32-bit signed integer.
    pub fn write_int(&mut self, v: i32) -> Result<()> {
        match self.byte_order {
            ByteOrder::BigEndian => self.buffer.put_i32(v),
            ByteOrder::LittleEndian => self.buffer.put_i32_le(v),
        }
        Ok(())
    }

    /// Writes a 64-bit signed integer.
    pub fn write_long(&mut self, v: i64) -> Result<()> {
        match self.byte_order {
            ByteOrder::BigEndian => self.buffer.put_i64(v),
            ByteOrder::LittleEndian => self.buffer.put_i64_le(v),
        }
        Ok(())
    }

    /// Writes a 32-bit floating point value.
    pub fn write_float(&mut self, v: f32) -> Result<()> {
        match self.byte_order {
            ByteOrder::BigEndian => self.buffer.put_f32(v),
            ByteOrder::LittleEndian => self.buffer.put_f32_le(v),
        }
        Ok(())
    }

    /// Writes a 64-bit floating point value.
    pub fn write_double(&mut self, v: f64) -> Result<()> {
        match self.byte_order {
            ByteOrder::BigEndian => self.buffer.put_f64(v),
            ByteOrder::LittleEndian => self.buffer.put_f64_le(v),
        }
        Ok(())
    }

    /// Writes raw bytes without a length prefix.
    pub fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.buffer.put_slice(v);
        Ok(())
    }

    /// Writes a string as a 4-byte length prefix followed by UTF-8 bytes.
    pub fn write_string(&mut self, v: &str) -> Result<()> {
        let bytes = v.as_bytes();
        self.write_int(bytes.len() as i32)?;
        self.write_bytes(bytes)
    }

    /// Writes a nullable string; `None` is written as the null length sentinel.
    pub fn write_nullable_string(&mut self, v: Option<&str>) -> Result<()> {
        match v {
            Some(s) => self.write_string(s),
            None => self.write_int(NULL_ARRAY_LENGTH),
        }
    }

    /// Writes a byte sequence with a 4-byte length prefix.
    pub fn write_byte_array(&mut self, v: &[u8]) -> Result<()> {
        self.write_int(v.len() as i32)?;
        self.write_bytes(v)
    }

    /// Writes a nested envelope as a length-prefixed byte sequence.
    pub fn write_data(&mut self, envelope: &Envelope) -> Result<()> {
        self.write_byte_array(envelope.to_bytes())
    }
}
