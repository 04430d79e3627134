//! Core data-encoding layer for the Gridlink client.
//!
//! Two halves make up this crate. The [`serialization`] module converts
//! dynamically typed [`Value`]s into self-describing binary envelopes and
//! back, resolving a serializer per value by shape with custom
//! `IdentifiedDataSerializable` types taking precedence. The [`protocol`]
//! module builds and parses the framed request/response messages that carry
//! those envelopes to a cluster member, with a table-driven codec per
//! operation and a `tokio_util` framing codec for the byte stream.
//!
//! Connection management, invocation routing, and retry policy live in the
//! client layer above this crate; everything here is pure encoding.

#![warn(missing_docs)]

pub mod error;
pub mod protocol;
pub mod serialization;

pub use error::{GridlinkError, Result};
pub use protocol::{Message, MessageCodec, OperationSpec};
pub use serialization::{
    ByteOrder, DataInput, DataOutput, Envelope, FactoryRegistry, IdentifiedDataSerializable,
    SerializationService, Value,
};
