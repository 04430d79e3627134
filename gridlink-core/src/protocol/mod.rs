//! The grid's client binary protocol: framed messages and operation codecs.

mod codec;
pub mod constants;
mod message;
mod operation;

pub use codec::MessageCodec;
pub use message::Message;
pub use operation::{ops, DecodedValue, Field, FieldKind, OperationSpec};
