//! The framed protocol message exchanged with a cluster member.

use bytes::{BufMut, BytesMut};

use super::constants::*;
use crate::error::{GridlinkError, Result};
use crate::serialization::{ByteOrder, Envelope};

/// Length value written for a null string or null data field.
const NULL_FIELD_LENGTH: i32 = -1;

/// A single-buffer protocol message: fixed little-endian header followed by
/// body fields in operation-defined order.
///
/// The declared frame length always equals the actual buffer length once a
/// request is finalized. Reads consume body fields in order from an internal
/// cursor that starts at the header's data offset.
#[derive(Debug, Clone)]
pub struct Message {
    buffer: BytesMut,
    read_offset: usize,
}

// Equality is byte-equality of the buffer; the read cursor is transient
// decode state, not part of the message.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer
    }
}

impl Eq for Message {}

impl Message {
    /// Creates a request message with its header written and an exact-size
    /// buffer reservation.
    ///
    /// The frame length field holds a placeholder until
    /// [`update_frame_length`](Self::update_frame_length) patches it; the
    /// correlation id starts at 0 and is owned by the invocation layer.
    pub fn create_for_encode(size: usize, message_type: u16, retryable: bool) -> Self {
        let mut buffer = BytesMut::with_capacity(size.max(HEADER_SIZE));
        let mut flags = BEGIN_END_FLAGS;
        if retryable {
            flags |= RETRYABLE_FLAG;
        }
        buffer.put_i32_le(0); // frame length, patched on finalize
        buffer.put_u8(PROTOCOL_VERSION);
        buffer.put_u8(flags);
        buffer.put_u16_le(message_type);
        buffer.put_i64_le(0); // correlation id, set by the invocation layer
        buffer.put_i32_le(PARTITION_ID_ANY);
        buffer.put_u16_le(HEADER_SIZE as u16);
        Self {
            buffer,
            read_offset: HEADER_SIZE,
        }
    }

    /// Reconstructs a message from received frame bytes.
    ///
    /// Validates that the buffer holds a complete header and that the
    /// declared frame length equals the actual buffer length.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(GridlinkError::Protocol(format!(
                "message too short: {} bytes, header needs {}",
                bytes.len(),
                HEADER_SIZE
            )));
        }
        let buffer = BytesMut::from(&bytes[..]);
        let declared = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        if declared != bytes.len() {
            return Err(GridlinkError::Protocol(format!(
                "declared frame length {} does not match buffer length {}",
                declared,
                bytes.len()
            )));
        }
        let data_offset =
            u16::from_le_bytes([bytes[DATA_OFFSET_FIELD_OFFSET], bytes[DATA_OFFSET_FIELD_OFFSET + 1]])
                as usize;
        if data_offset < HEADER_SIZE || data_offset > bytes.len() {
            return Err(GridlinkError::Protocol(format!(
                "invalid data offset: {}",
                data_offset
            )));
        }
        Ok(Self {
            buffer,
            read_offset: data_offset,
        })
    }

    fn read_u16_at(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.buffer[offset], self.buffer[offset + 1]])
    }

    fn read_i32_at(&self, offset: usize) -> i32 {
        i32::from_le_bytes([
            self.buffer[offset],
            self.buffer[offset + 1],
            self.buffer[offset + 2],
            self.buffer[offset + 3],
        ])
    }

    fn read_i64_at(&self, offset: usize) -> i64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.buffer[offset..offset + 8]);
        i64::from_le_bytes(raw)
    }

    /// Returns the declared frame length.
    pub fn frame_length(&self) -> i32 {
        self.read_i32_at(FRAME_LENGTH_OFFSET)
    }

    /// Returns the protocol version byte.
    pub fn version(&self) -> u8 {
        self.buffer[VERSION_OFFSET]
    }

    /// Returns the flags byte.
    pub fn flags(&self) -> u8 {
        self.buffer[FLAGS_OFFSET]
    }

    /// Returns true if the retryable flag is set.
    pub fn is_retryable(&self) -> bool {
        self.flags() & RETRYABLE_FLAG != 0
    }

    /// Returns true if the listener event flag is set.
    pub fn is_event(&self) -> bool {
        self.flags() & LISTENER_EVENT_FLAG != 0
    }

    /// Returns the message type.
    pub fn message_type(&self) -> u16 {
        self.read_u16_at(TYPE_OFFSET)
    }

    /// Returns the correlation id.
    pub fn correlation_id(&self) -> i64 {
        self.read_i64_at(CORRELATION_ID_OFFSET)
    }

    /// Sets the correlation id; owned by the external invocation layer.
    pub fn set_correlation_id(&mut self, correlation_id: i64) {
        self.buffer[CORRELATION_ID_OFFSET..CORRELATION_ID_OFFSET + 8]
            .copy_from_slice(&correlation_id.to_le_bytes());
    }

    /// Returns the partition id.
    pub fn partition_id(&self) -> i32 {
        self.read_i32_at(PARTITION_ID_OFFSET)
    }

    /// Sets the partition id.
    pub fn set_partition_id(&mut self, partition_id: i32) {
        self.buffer[PARTITION_ID_OFFSET..PARTITION_ID_OFFSET + 4]
            .copy_from_slice(&partition_id.to_le_bytes());
    }

    /// Returns the offset where body fields begin.
    pub fn data_offset(&self) -> usize {
        self.read_u16_at(DATA_OFFSET_FIELD_OFFSET) as usize
    }

    /// Patches the frame length field to the actual buffer length.
    pub fn update_frame_length(&mut self) {
        let len = self.buffer.len() as i32;
        self.buffer[FRAME_LENGTH_OFFSET..FRAME_LENGTH_OFFSET + 4]
            .copy_from_slice(&len.to_le_bytes());
    }

    /// Returns the message's total byte length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the message holds nothing beyond a header.
    pub fn is_empty(&self) -> bool {
        self.buffer.len() <= HEADER_SIZE
    }

    /// Returns the full message bytes for transport.
    pub fn to_bytes(&self) -> &[u8] {
        &self.buffer
    }

    // -- body field appends, little-endian, in operation order --

    /// Appends a boolean body field.
    pub fn append_bool(&mut self, v: bool) {
        self.buffer.put_u8(if v { 1 } else { 0 });
    }

    /// Appends a single-byte body field.
    pub fn append_byte(&mut self, v: u8) {
        self.buffer.put_u8(v);
    }

    /// Appends a 32-bit integer body field.
    pub fn append_int(&mut self, v: i32) {
        self.buffer.put_i32_le(v);
    }

    /// Appends a 64-bit integer body field.
    pub fn append_long(&mut self, v: i64) {
        self.buffer.put_i64_le(v);
    }

    /// Appends a nullable string body field (4-byte length + UTF-8 bytes).
    pub fn append_string(&mut self, v: Option<&str>) {
        match v {
            Some(s) => {
                self.buffer.put_i32_le(s.len() as i32);
                self.buffer.put_slice(s.as_bytes());
            }
            None => self.buffer.put_i32_le(NULL_FIELD_LENGTH),
        }
    }

    /// Appends a serialized envelope body field (4-byte length + bytes).
    pub fn append_data(&mut self, envelope: &Envelope) {
        let bytes = envelope.to_bytes();
        self.buffer.put_i32_le(bytes.len() as i32);
        self.buffer.put_slice(bytes);
    }

    // -- body field reads, consumed in the operation's fixed order --

    fn ensure_readable(&self, n: usize) -> Result<()> {
        if self.read_offset + n > self.buffer.len() {
            Err(GridlinkError::OutOfRange(format!(
                "message read past frame: need {} bytes at offset {}, frame is {}",
                n,
                self.read_offset,
                self.buffer.len()
            )))
        } else {
            Ok(())
        }
    }

    /// Reads the next boolean body field.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.ensure_readable(1)?;
        let v = self.buffer[self.read_offset] != 0;
        self.read_offset += 1;
        Ok(v)
    }

    /// Reads the next 32-bit integer body field.
    pub fn read_int(&mut self) -> Result<i32> {
        self.ensure_readable(4)?;
        let v = self.read_i32_at(self.read_offset);
        self.read_offset += 4;
        Ok(v)
    }

    /// Reads the next 64-bit integer body field.
    pub fn read_long(&mut self) -> Result<i64> {
        self.ensure_readable(8)?;
        let v = self.read_i64_at(self.read_offset);
        self.read_offset += 8;
        Ok(v)
    }

    /// Reads the next nullable string body field.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let len = self.read_int()?;
        if len == NULL_FIELD_LENGTH {
            return Ok(None);
        }
        if len < 0 {
            return Err(GridlinkError::Protocol(format!(
                "invalid string field length: {}",
                len
            )));
        }
        self.ensure_readable(len as usize)?;
        let bytes = &self.buffer[self.read_offset..self.read_offset + len as usize];
        let s = std::str::from_utf8(bytes)
            .map_err(|e| GridlinkError::Protocol(format!("invalid UTF-8 in string field: {}", e)))?
            .to_string();
        self.read_offset += len as usize;
        Ok(Some(s))
    }

    /// Reads the next envelope body field.
    ///
    /// The serialization byte order is supplied by the caller; the message
    /// layer transports envelopes opaquely.
    pub fn read_data(&mut self, byte_order: ByteOrder) -> Result<Envelope> {
        let len = self.read_int()?;
        if len < 0 {
            return Err(GridlinkError::Protocol(format!(
                "invalid data field length: {}",
                len
            )));
        }
        self.ensure_readable(len as usize)?;
        let bytes = self.buffer[self.read_offset..self.read_offset + len as usize].to_vec();
        self.read_offset += len as usize;
        Envelope::from_bytes(bytes, byte_order)
    }

    // -- size contributions, matching the append encodings exactly --

    /// Size contribution of a boolean body field.
    pub fn bool_size() -> usize {
        1
    }

    /// Size contribution of a 32-bit integer body field.
    pub fn int_size() -> usize {
        4
    }

    /// Size contribution of a 64-bit integer body field.
    pub fn long_size() -> usize {
        8
    }

    /// Size contribution of a nullable string body field.
    pub fn string_size(v: Option<&str>) -> usize {
        4 + v.map_or(0, str::len)
    }

    /// Size contribution of an envelope body field.
    pub fn data_size(envelope: &Envelope) -> usize {
        4 + envelope.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_for_encode_header() {
        let msg = Message::create_for_encode(HEADER_SIZE, MAP_GET, true);
        assert_eq!(msg.len(), HEADER_SIZE);
        assert_eq!(msg.version(), PROTOCOL_VERSION);
        assert_eq!(msg.message_type(), MAP_GET);
        assert!(msg.is_retryable());
        assert_eq!(msg.correlation_id(), 0);
        assert_eq!(msg.partition_id(), PARTITION_ID_ANY);
        assert_eq!(msg.data_offset(), HEADER_SIZE);
    }

    #[test]
    fn test_non_retryable_flag() {
        let msg = Message::create_for_encode(HEADER_SIZE, MAP_PUT, false);
        assert!(!msg.is_retryable());
        assert_eq!(msg.flags() & BEGIN_END_FLAGS, BEGIN_END_FLAGS);
    }

    #[test]
    fn test_update_frame_length() {
        let mut msg = Message::create_for_encode(HEADER_SIZE + 4, MAP_SIZE, true);
        msg.append_int(7);
        msg.update_frame_length();
        assert_eq!(msg.frame_length() as usize, msg.len());
        assert_eq!(msg.len(), HEADER_SIZE + 4);
    }

    #[test]
    fn test_set_correlation_and_partition() {
        let mut msg = Message::create_for_encode(HEADER_SIZE, MAP_GET, true);
        msg.set_correlation_id(424242);
        msg.set_partition_id(17);
        assert_eq!(msg.correlation_id(), 424242);
        assert_eq!(msg.partition_id(), 17);
    }

    #[test]
    fn test_append_and_read_primitives() {
        let mut msg = Message::create_for_encode(64, MAP_PUT, false);
        msg.append_bool(true);
        msg.append_int(-5);
        msg.append_long(1 << 40);
        msg.append_string(Some("map-name"));
        msg.append_string(None);
        msg.update_frame_length();

        assert!(msg.read_bool().unwrap());
        assert_eq!(msg.read_int().unwrap(), -5);
        assert_eq!(msg.read_long().unwrap(), 1 << 40);
        assert_eq!(msg.read_string().unwrap(), Some("map-name".to_string()));
        assert_eq!(msg.read_string().unwrap(), None);
    }

    #[test]
    fn test_append_and_read_data() {
        let envelope = Envelope::wrap(0, -7, &[0, 0, 0, 14], ByteOrder::BigEndian);
        let mut msg = Message::create_for_encode(64, MAP_PUT, false);
        msg.append_data(&envelope);
        msg.update_frame_length();

        let restored = msg.read_data(ByteOrder::BigEndian).unwrap();
        assert_eq!(restored, envelope);
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let mut msg = Message::create_for_encode(64, MAP_CONTAINS_KEY, true);
        msg.append_string(Some("users"));
        msg.set_correlation_id(9);
        msg.update_frame_length();

        let wire = msg.to_bytes().to_vec();
        let mut decoded = Message::from_bytes(wire).unwrap();
        assert_eq!(decoded.message_type(), MAP_CONTAINS_KEY);
        assert_eq!(decoded.correlation_id(), 9);
        assert!(decoded.is_retryable());
        assert_eq!(decoded.read_string().unwrap(), Some("users".to_string()));
    }

    #[test]
    fn test_from_bytes_too_short() {
        let err = Message::from_bytes(vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, GridlinkError::Protocol(_)));
    }

    #[test]
    fn test_from_bytes_length_mismatch() {
        let mut msg = Message::create_for_encode(HEADER_SIZE, MAP_GET, true);
        msg.append_int(1);
        // frame length deliberately not patched
        let err = Message::from_bytes(msg.to_bytes().to_vec()).unwrap_err();
        assert!(matches!(err, GridlinkError::Protocol(_)));
    }

    #[test]
    fn test_read_past_frame_fails() {
        let mut msg = Message::create_for_encode(HEADER_SIZE, MAP_GET, true);
        msg.update_frame_length();
        let err = msg.read_int().unwrap_err();
        assert!(matches!(err, GridlinkError::OutOfRange(_)));
    }

    #[test]
    fn test_size_helpers_match_appends() {
        let envelope = Envelope::wrap(0, -11, &[0, 0, 0, 1, b'x'], ByteOrder::BigEndian);
        let mut msg = Message::create_for_encode(128, MAP_PUT, false);
        let before = msg.len();
        msg.append_bool(true);
        msg.append_int(0);
        msg.append_long(0);
        msg.append_string(Some("abc"));
        msg.append_string(None);
        msg.append_data(&envelope);

        let expected = Message::bool_size()
            + Message::int_size()
            + Message::long_size()
            + Message::string_size(Some("abc"))
            + Message::string_size(None)
            + Message::data_size(&envelope);
        assert_eq!(msg.len() - before, expected);
    }

    #[test]
    fn test_equality_ignores_read_position() {
        let mut msg = Message::create_for_encode(64, MAP_GET, true);
        msg.append_string(Some("users"));
        msg.update_frame_length();

        let mut advanced = msg.clone();
        advanced.read_string().unwrap();
        assert_eq!(msg, advanced);

        let mut other = msg.clone();
        other.set_correlation_id(1);
        assert_ne!(msg, other);
    }

    #[test]
    fn test_header_is_little_endian() {
        let msg = Message::create_for_encode(HEADER_SIZE, 0x0102, false);
        let bytes = msg.to_bytes();
        assert_eq!(&bytes[TYPE_OFFSET..TYPE_OFFSET + 2], &[0x02, 0x01]);
    }
}
