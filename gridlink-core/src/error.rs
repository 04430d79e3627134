//! Error types for Gridlink client operations.

use std::io;
use thiserror::Error;

/// The main error type for the Gridlink encoding core.
#[derive(Debug, Error)]
pub enum GridlinkError {
    /// The value cannot be serialized at all (the "no value" sentinel).
    ///
    /// Never produced for null, which is a valid serializable value.
    #[error("unserializable value: {0}")]
    Unserializable(String),

    /// No registered serializer matches the value's resolved shape.
    #[error("no serializer found for shape '{0}'")]
    NoSerializerFound(String),

    /// A decode-time type tag has no bound serializer.
    ///
    /// Usually a version mismatch between client and cluster, or corrupt data.
    #[error("unknown type tag: {0}")]
    UnknownType(i32),

    /// A serializer name was registered twice.
    #[error("duplicate serializer name: '{0}'")]
    DuplicateName(String),

    /// A serializer type tag was registered twice.
    #[error("duplicate serializer type tag: {0}")]
    DuplicateTag(i32),

    /// A read primitive consumed past the buffer's declared bounds.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Serialization/deserialization errors (malformed payloads).
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Protocol-related errors (invalid messages, field mismatches).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O errors from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized `Result` type for Gridlink operations.
pub type Result<T> = std::result::Result<T, GridlinkError>;
