//! The self-contained binary representation of one serialized value.

use bytes::Bytes;

use super::byte_order::ByteOrder;
use crate::error::{GridlinkError, Result};

/// Offset of the partition hash field.
const PARTITION_HASH_OFFSET: usize = 0;

/// Offset of the type tag field.
const TYPE_TAG_OFFSET: usize = 4;

/// Offset of the serialized payload; also the envelope header size.
pub const ENVELOPE_HEADER_SIZE: usize = 8;

/// One serialized value: `[4B partition hash][4B type tag][payload]`.
///
/// The type tag identifies the decoder required to interpret the payload;
/// the partition hash is derived routing metadata and never inspected by
/// decoders. The envelope is an opaque carrier between the serialization
/// engine and the message layer; construction never validates the payload.
///
/// Equality is byte-equality of the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    bytes: Bytes,
    byte_order: ByteOrder,
}

impl Envelope {
    /// Wraps a partition hash, type tag, and payload into an envelope.
    pub fn wrap(
        partition_hash: i32,
        type_tag: i32,
        payload: &[u8],
        byte_order: ByteOrder,
    ) -> Self {
        let mut buf = Vec::with_capacity(ENVELOPE_HEADER_SIZE + payload.len());
        match byte_order {
            ByteOrder::BigEndian => {
                buf.extend_from_slice(&partition_hash.to_be_bytes());
                buf.extend_from_slice(&type_tag.to_be_bytes());
            }
            ByteOrder::LittleEndian => {
                buf.extend_from_slice(&partition_hash.to_le_bytes());
                buf.extend_from_slice(&type_tag.to_le_bytes());
            }
        }
        buf.extend_from_slice(payload);
        Self {
            bytes: Bytes::from(buf),
            byte_order,
        }
    }

    /// Reconstructs an envelope from its flat transport bytes.
    ///
    /// Fails if the buffer is shorter than the envelope header.
    pub fn from_bytes(bytes: Vec<u8>, byte_order: ByteOrder) -> Result<Self> {
        if bytes.len() < ENVELOPE_HEADER_SIZE {
            return Err(GridlinkError::Serialization(format!(
                "envelope too short: {} bytes, header needs {}",
                bytes.len(),
                ENVELOPE_HEADER_SIZE
            )));
        }
        Ok(Self {
            bytes: Bytes::from(bytes),
            byte_order,
        })
    }

    fn read_i32_at(&self, offset: usize) -> i32 {
        let raw = [
            self.bytes[offset],
            self.bytes[offset + 1],
            self.bytes[offset + 2],
            self.bytes[offset + 3],
        ];
        match self.byte_order {
            ByteOrder::BigEndian => i32::from_be_bytes(raw),
            ByteOrder::LittleEndian => i32::from_le_bytes(raw),
        }
    }

    /// Returns the partition hash used for cluster routing.
    pub fn partition_hash(&self) -> i32 {
        self.read_i32_at(PARTITION_HASH_OFFSET)
    }

    /// Returns the type tag that identifies the payload's decoder.
    pub fn type_tag(&self) -> i32 {
        self.read_i32_at(TYPE_TAG_OFFSET)
    }

    /// Returns the type-specific payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[ENVELOPE_HEADER_SIZE..]
    }

    /// Returns the flat byte sequence for transport.
    pub fn to_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the total envelope size on the wire.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the envelope is header-only with an empty payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.len() == ENVELOPE_HEADER_SIZE
    }

    /// Returns the byte order this envelope's header was written in.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_layout_big_endian() {
        let env = Envelope::wrap(0x01020304, -11, &[0xAA, 0xBB], ByteOrder::BigEndian);
        assert_eq!(
            env.to_bytes(),
            &[0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xF5, 0xAA, 0xBB]
        );
    }

    #[test]
    fn test_wrap_layout_little_endian() {
        let env = Envelope::wrap(1, 2, &[], ByteOrder::LittleEndian);
        assert_eq!(env.to_bytes(), &[1, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_accessors() {
        let env = Envelope::wrap(42, -4, &[1], ByteOrder::BigEndian);
        assert_eq!(env.partition_hash(), 42);
        assert_eq!(env.type_tag(), -4);
        assert_eq!(env.payload(), &[1]);
        assert_eq!(env.len(), 9);
        assert!(!env.is_empty());
    }

    #[test]
    fn test_empty_payload() {
        let env = Envelope::wrap(0, 0, &[], ByteOrder::BigEndian);
        assert!(env.is_empty());
        assert_eq!(env.payload(), &[] as &[u8]);
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let env = Envelope::wrap(7, -10, &[1, 2, 3], ByteOrder::BigEndian);
        let rebuilt =
            Envelope::from_bytes(env.to_bytes().to_vec(), ByteOrder::BigEndian).unwrap();
        assert_eq!(env, rebuilt);
        assert_eq!(rebuilt.partition_hash(), 7);
        assert_eq!(rebuilt.type_tag(), -10);
        assert_eq!(rebuilt.payload(), &[1, 2, 3]);
    }

    #[test]
    fn test_from_bytes_too_short() {
        let result = Envelope::from_bytes(vec![1, 2, 3], ByteOrder::BigEndian);
        assert!(result.is_err());
    }

    #[test]
    fn test_equality_is_byte_equality() {
        let a = Envelope::wrap(1, 2, &[3], ByteOrder::BigEndian);
        let b = Envelope::wrap(1, 2, &[3], ByteOrder::BigEndian);
        let c = Envelope::wrap(1, 2, &[4], ByteOrder::BigEndian);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_negative_partition_hash() {
        let env = Envelope::wrap(-123456, 0, &[], ByteOrder::BigEndian);
        assert_eq!(env.partition_hash(), -123456);
    }
}
