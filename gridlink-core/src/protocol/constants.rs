//! Protocol constants for the grid's client binary protocol.
//!
//! The message header and all body primitives are little-endian, fixed by
//! the remote protocol version independently of the serialization stream's
//! configured byte order.

/// Offset of the frame length field (i32).
pub const FRAME_LENGTH_OFFSET: usize = 0;

/// Offset of the protocol version field (u8).
pub const VERSION_OFFSET: usize = 4;

/// Offset of the flags field (u8).
pub const FLAGS_OFFSET: usize = 5;

/// Offset of the message type field (u16).
pub const TYPE_OFFSET: usize = 6;

/// Offset of the correlation id field (i64).
pub const CORRELATION_ID_OFFSET: usize = 8;

/// Offset of the partition id field (i32).
pub const PARTITION_ID_OFFSET: usize = 16;

/// Offset of the data offset field (u16).
pub const DATA_OFFSET_FIELD_OFFSET: usize = 20;

/// Total fixed header size in bytes.
pub const HEADER_SIZE: usize = 22;

/// Protocol version written into every message.
pub const PROTOCOL_VERSION: u8 = 1;

/// Flag marking the first fragment of a message.
pub const BEGIN_FLAG: u8 = 0x80;

/// Flag marking the last fragment of a message.
pub const END_FLAG: u8 = 0x40;

/// Flags for an unfragmented message.
pub const BEGIN_END_FLAGS: u8 = BEGIN_FLAG | END_FLAG;

/// Flag marking a request the invocation layer may transparently resend.
pub const RETRYABLE_FLAG: u8 = 0x20;

/// Flag marking an unsolicited event message.
pub const LISTENER_EVENT_FLAG: u8 = 0x01;

/// Partition id indicating no specific partition.
pub const PARTITION_ID_ANY: i32 = -1;

// Request message types.

/// Map put request.
pub const MAP_PUT: u16 = 0x0101;

/// Map get request.
pub const MAP_GET: u16 = 0x0102;

/// Map remove request.
pub const MAP_REMOVE: u16 = 0x0103;

/// Map size request.
pub const MAP_SIZE: u16 = 0x0105;

/// Map contains key request.
pub const MAP_CONTAINS_KEY: u16 = 0x0109;

// Generic response message types.

/// Void response.
pub const RESPONSE_VOID: u16 = 100;

/// Boolean response.
pub const RESPONSE_BOOLEAN: u16 = 101;

/// 32-bit integer response.
pub const RESPONSE_INTEGER: u16 = 102;

/// 64-bit integer response.
pub const RESPONSE_LONG: u16 = 103;

/// Nullable serialized-data response.
pub const RESPONSE_DATA: u16 = 105;
