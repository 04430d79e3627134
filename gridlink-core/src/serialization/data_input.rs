//! Data input stream for the grid's binary serialization format.

use bytes::Buf;
use std::io::Cursor;

use super::byte_order::ByteOrder;
use super::data_output::NULL_ARRAY_LENGTH;
use super::envelope::Envelope;
use crate::error::{GridlinkError, Result};

/// A cursor over a byte slice that reads primitives in the stream's byte order.
///
/// Every read checks the buffer's declared bounds first; consuming past them
/// fails with [`GridlinkError::OutOfRange`] and leaves the cursor untouched.
#[derive(Debug)]
pub struct DataInput<'a> {
    cursor: Cursor<&'a [u8]>,
    byte_order: ByteOrder,
}

impl<'a> DataInput<'a> {
    /// Creates a new input stream over the given bytes.
    pub fn new(data: &'a [u8], byte_order: ByteOrder) -> Self {
        Self {
            cursor: Cursor::new(data),
            byte_order,
        }
    }

    /// Returns the byte order of this stream.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns the number of bytes remaining to be read.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Returns the current position in the buffer.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Moves the cursor to an absolute position.
    pub fn set_position(&mut self, position: u64) {
        self.cursor.set_position(position);
    }

    fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.cursor.remaining() < n {
            Err(GridlinkError::OutOfRange(format!(
                "need {} bytes, have {}",
                n,
                self.cursor.remaining()
            )))
        } else {
            Ok(())
        }
    }

    /// Reads a single byte (i8).
    pub fn read_byte(&mut self) -> Result<i8> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_i8())
    }

    /// Reads a boolean from a single byte.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_u8() != 0)
    }

    /// Reads a 16-bit signed integer.
    pub fn read_short(&mut self) -> Result<i16> {
        self.ensure_remaining(2)?;
        Ok(match self.byte_order {
            ByteOrder::BigEndian => self.cursor.get_i16(),
            ByteOrder::LittleEndian => self.cursor.get_i16_le(),
        })
    }

    /// Reads a 32-bit signed integer.
    pub fn read_int(&mut self) -> Result<i32> {
        self.ensure_remaining(4)?;
        Ok(match self.byte_order {
            ByteOrder::BigEndian => self.cursor.get_i32(),
            ByteOrder::LittleEndian => self.cursor.get_i32_le(),
        })
    }

    /// Reads a 64-bit signed integer.
    pub fn read_long(&mut self) -> Result<i64> {
        self.ensure_remaining(8)?;
        Ok(match self.byte_order {
            ByteOrder::BigEndian => self.cursor.get_i64(),
            ByteOrder::LittleEndian => self.cursor.get_i64_le(),
        })
    }

    /// Reads a 32-bit floating point value.
    pub fn read_float(&mut self) -> Result<f32> {
        self.ensure_remaining(4)?;
        Ok(match self.byte_order {
            ByteOrder::BigEndian => self.cursor.get_f32(),
            ByteOrder::LittleEndian => self.cursor.get_f32_le(),
        })
    }

    /// Reads a 64-bit floating point value.
    pub fn read_double(&mut self) -> Result<f64> {
        self.ensure_remaining(8)?;
        Ok(match self.byte_order {
            ByteOrder::BigEndian => self.cursor.get_f64(),
            ByteOrder::LittleEndian => self.cursor.get_f64_le(),
        })
    }

    /// Reads the specified number of raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure_remaining(len)?;
        let mut buf = vec![0u8; len];
        self.cursor.copy_to_slice(&mut buf);
        Ok(buf)
    }

    /// Reads a 4-byte length prefix followed by UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_int()?;
        if len < 0 {
            return Err(GridlinkError::Serialization(format!(
                "invalid string length: {}",
                len
            )));
        }
        let bytes = self.read_bytes(len as usize)?;
        String::from_utf8(bytes)
            .map_err(|e| GridlinkError::Serialization(format!("invalid UTF-8 string: {}", e)))
    }

    /// Reads a nullable string; the null length sentinel yields `None`.
    pub fn read_nullable_string(&mut self) -> Result<Option<String>> {
        let len = self.read_int()?;
        if len == NULL_ARRAY_LENGTH {
            return Ok(None);
        }
        if len < 0 {
            return Err(GridlinkError::Serialization(format!(
                "invalid string length: {}",
                len
            )));
        }
        let bytes = self.read_bytes(len as usize)?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| GridlinkError::Serialization(format!("invalid UTF-8 string: {}", e)))
    }

    /// Reads a length-prefixed byte sequence.
    pub fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        let len = self.read_int()?;
        if len < 0 {
            return Err(GridlinkError::Serialization(format!(
                "invalid byte array length: {}",
                len
            )));
        }
        self.read_bytes(len as usize)
    }

    /// Reads a nested envelope from a length-prefixed byte sequence.
    pub fn read_data(&mut self) -> Result<Envelope> {
        let bytes = self.read_byte_array()?;
        Envelope::from_bytes(bytes, self.byte_order)
    }
}
