//! Table-driven request/response codecs, one spec per remote operation kind.
//!
//! Every operation is described by a static [`OperationSpec`]: request and
//! response type tags, retryability, and the fixed field order agreed with
//! the remote peer. A single generic encoder/decoder interprets the table,
//! so adding an operation adds a table entry, not a handwritten codec.

use tracing::trace;

use super::constants::*;
use super::message::Message;
use crate::error::{GridlinkError, Result};
use crate::serialization::{ByteOrder, Envelope, Value};

/// The wire kind of one body field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One byte, 0 or 1.
    Boolean,
    /// Little-endian i32.
    Int32,
    /// Little-endian i64.
    Int64,
    /// Length-prefixed UTF-8, nullable via the -1 sentinel.
    String,
    /// Length-prefixed serialized envelope.
    Data,
    /// A presence byte, then a length-prefixed envelope when present.
    OptionalData,
}

/// One typed body field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A boolean field.
    Boolean(bool),
    /// A 32-bit integer field.
    Int32(i32),
    /// A 64-bit integer field.
    Int64(i64),
    /// A nullable string field.
    String(Option<String>),
    /// A serialized envelope field.
    Data(Envelope),
    /// A nullable serialized envelope field.
    OptionalData(Option<Envelope>),
}

impl Field {
    /// Returns the wire kind of this field.
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Boolean(_) => FieldKind::Boolean,
            Field::Int32(_) => FieldKind::Int32,
            Field::Int64(_) => FieldKind::Int64,
            Field::String(_) => FieldKind::String,
            Field::Data(_) => FieldKind::Data,
            Field::OptionalData(_) => FieldKind::OptionalData,
        }
    }

    fn wire_size(&self) -> usize {
        match self {
            Field::Boolean(_) => Message::bool_size(),
            Field::Int32(_) => Message::int_size(),
            Field::Int64(_) => Message::long_size(),
            Field::String(s) => Message::string_size(s.as_deref()),
            Field::Data(d) => Message::data_size(d),
            Field::OptionalData(d) => {
                Message::bool_size() + d.as_ref().map_or(0, Message::data_size)
            }
        }
    }
}

/// A response field with envelope-carried values converted to objects.
#[derive(Debug, PartialEq)]
pub enum DecodedValue {
    /// A boolean field.
    Boolean(bool),
    /// A 32-bit integer field.
    Int32(i32),
    /// A 64-bit integer field.
    Int64(i64),
    /// A nullable string field.
    String(Option<String>),
    /// A deserialized object; `None` for an absent optional field.
    Object(Option<Value>),
}

/// The static description of one remote operation kind.
///
/// `calculate_size` and `encode_request` are derived from the same field
/// table, so they agree by construction; the invariant is still pinned by
/// tests because a mismatch is a protocol-breaking bug.
#[derive(Debug)]
pub struct OperationSpec {
    /// Operation name for diagnostics, e.g. `"map.get"`.
    pub name: &'static str,
    /// Request message type tag.
    pub request_type: u16,
    /// Response message type tag.
    pub response_type: u16,
    /// Whether the invocation layer may transparently resend the request.
    pub retryable: bool,
    /// Request body fields in wire order.
    pub request_fields: &'static [FieldKind],
    /// Response body fields in wire order.
    pub response_fields: &'static [FieldKind],
}

impl OperationSpec {
    fn check_args(&self, args: &[Field]) -> Result<()> {
        if args.len() != self.request_fields.len() {
            return Err(GridlinkError::Protocol(format!(
                "{}: expected {} arguments, got {}",
                self.name,
                self.request_fields.len(),
                args.len()
            )));
        }
        for (i, (arg, kind)) in args.iter().zip(self.request_fields).enumerate() {
            if arg.kind() != *kind {
                return Err(GridlinkError::Protocol(format!(
                    "{}: argument {} should be {:?}, got {:?}",
                    self.name,
                    i,
                    kind,
                    arg.kind()
                )));
            }
        }
        Ok(())
    }

    /// Computes the exact byte count `encode_request` will produce for the
    /// given arguments.
    pub fn calculate_size(&self, args: &[Field]) -> Result<usize> {
        self.check_args(args)?;
        Ok(HEADER_SIZE + args.iter().map(Field::wire_size).sum::<usize>())
    }

    /// Builds the request message: header, each argument field in the
    /// operation's fixed order, then the frame length patched to the final
    /// buffer length.
    pub fn encode_request(&self, args: &[Field]) -> Result<Message> {
        let size = self.calculate_size(args)?;
        let mut message = Message::create_for_encode(size, self.request_type, self.retryable);
        for arg in args {
            match arg {
                Field::Boolean(v) => message.append_bool(*v),
                Field::Int32(v) => message.append_int(*v),
                Field::Int64(v) => message.append_long(*v),
                Field::String(v) => message.append_string(v.as_deref()),
                Field::Data(v) => message.append_data(v),
                Field::OptionalData(v) => {
                    message.append_bool(v.is_some());
                    if let Some(envelope) = v {
                        message.append_data(envelope);
                    }
                }
            }
        }
        message.update_frame_length();
        trace!(operation = self.name, size = message.len(), "encoded request");
        Ok(message)
    }

    /// Reads the response fields back in the fixed order the remote peer
    /// writes them.
    ///
    /// `byte_order` is the serialization byte order used to interpret
    /// embedded envelope headers.
    pub fn decode_response(
        &self,
        message: &mut Message,
        byte_order: ByteOrder,
    ) -> Result<Vec<Field>> {
        if message.message_type() != self.response_type {
            return Err(GridlinkError::Protocol(format!(
                "{}: expected response type {}, got {}",
                self.name,
                self.response_type,
                message.message_type()
            )));
        }
        let mut fields = Vec::with_capacity(self.response_fields.len());
        for kind in self.response_fields {
            let field = match kind {
                FieldKind::Boolean => Field::Boolean(message.read_bool()?),
                FieldKind::Int32 => Field::Int32(message.read_int()?),
                FieldKind::Int64 => Field::Int64(message.read_long()?),
                FieldKind::String => Field::String(message.read_string()?),
                FieldKind::Data => Field::Data(message.read_data(byte_order)?),
                FieldKind::OptionalData => {
                    if message.read_bool()? {
                        Field::OptionalData(Some(message.read_data(byte_order)?))
                    } else {
                        Field::OptionalData(None)
                    }
                }
            };
            fields.push(field);
        }
        Ok(fields)
    }

    /// Decodes the response and applies `converter` to every field carried
    /// as an envelope, yielding plain values.
    pub fn decode_response_with<F>(
        &self,
        message: &mut Message,
        byte_order: ByteOrder,
        converter: F,
    ) -> Result<Vec<DecodedValue>>
    where
        F: Fn(&Envelope) -> Result<Value>,
    {
        self.decode_response(message, byte_order)?
            .into_iter()
            .map(|field| {
                Ok(match field {
                    Field::Boolean(v) => DecodedValue::Boolean(v),
                    Field::Int32(v) => DecodedValue::Int32(v),
                    Field::Int64(v) => DecodedValue::Int64(v),
                    Field::String(v) => DecodedValue::String(v),
                    Field::Data(v) => DecodedValue::Object(Some(converter(&v)?)),
                    Field::OptionalData(v) => match v {
                        Some(envelope) => DecodedValue::Object(Some(converter(&envelope)?)),
                        None => DecodedValue::Object(None),
                    },
                })
            })
            .collect()
    }
}

/// The map service operation table.
pub mod ops {
    use super::{FieldKind, OperationSpec};
    use crate::protocol::constants;

    /// `map.put(name, key, value, ttl)` returning the previous value.
    pub const MAP_PUT: OperationSpec = OperationSpec {
        name: "map.put",
        request_type: constants::MAP_PUT,
        response_type: constants::RESPONSE_DATA,
        retryable: false,
        request_fields: &[
            FieldKind::String,
            FieldKind::Data,
            FieldKind::Data,
            FieldKind::Int64,
        ],
        response_fields: &[FieldKind::OptionalData],
    };

    /// `map.get(name, key)` returning the mapped value, if any.
    pub const MAP_GET: OperationSpec = OperationSpec {
        name: "map.get",
        request_type: constants::MAP_GET,
        response_type: constants::RESPONSE_DATA,
        retryable: true,
        request_fields: &[FieldKind::String, FieldKind::Data],
        response_fields: &[FieldKind::OptionalData],
    };

    /// `map.remove(name, key)` returning the removed value, if any.
    pub const MAP_REMOVE: OperationSpec = OperationSpec {
        name: "map.remove",
        request_type: constants::MAP_REMOVE,
        response_type: constants::RESPONSE_DATA,
        retryable: false,
        request_fields: &[FieldKind::String, FieldKind::Data],
        response_fields: &[FieldKind::OptionalData],
    };

    /// `map.containsKey(name, key)` returning a boolean.
    pub const MAP_CONTAINS_KEY: OperationSpec = OperationSpec {
        name: "map.containsKey",
        request_type: constants::MAP_CONTAINS_KEY,
        response_type: constants::RESPONSE_BOOLEAN,
        retryable: true,
        request_fields: &[FieldKind::String, FieldKind::Data],
        response_fields: &[FieldKind::Boolean],
    };

    /// `map.size(name)` returning the entry count.
    pub const MAP_SIZE: OperationSpec = OperationSpec {
        name: "map.size",
        request_type: constants::MAP_SIZE,
        response_type: constants::RESPONSE_INTEGER,
        retryable: true,
        request_fields: &[FieldKind::String],
        response_fields: &[FieldKind::Int32],
    };

    /// All map operations, for table-level assertions.
    pub const ALL: &[&OperationSpec] =
        &[&MAP_PUT, &MAP_GET, &MAP_REMOVE, &MAP_CONTAINS_KEY, &MAP_SIZE];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_envelope() -> Envelope {
        Envelope::wrap(0, -11, &[0, 0, 0, 3, b'k', b'e', b'y'], ByteOrder::BigEndian)
    }

    fn value_envelope() -> Envelope {
        Envelope::wrap(0, -7, &[0, 0, 0, 14], ByteOrder::BigEndian)
    }

    #[test]
    fn test_size_and_encode_agree_for_every_operation() {
        for spec in ops::ALL {
            let args: Vec<Field> = spec
                .request_fields
                .iter()
                .map(|kind| match kind {
                    FieldKind::Boolean => Field::Boolean(true),
                    FieldKind::Int32 => Field::Int32(7),
                    FieldKind::Int64 => Field::Int64(-1),
                    FieldKind::String => Field::String(Some("a-map".to_string())),
                    FieldKind::Data => Field::Data(key_envelope()),
                    FieldKind::OptionalData => Field::OptionalData(Some(value_envelope())),
                })
                .collect();

            let size = spec.calculate_size(&args).unwrap();
            let message = spec.encode_request(&args).unwrap();
            assert_eq!(message.len(), size, "size mismatch for {}", spec.name);
            assert_eq!(
                message.frame_length() as usize,
                message.len(),
                "frame length mismatch for {}",
                spec.name
            );
        }
    }

    #[test]
    fn test_size_and_encode_agree_with_null_fields() {
        let args = [Field::String(None), Field::Data(key_envelope())];
        let size = ops::MAP_GET.calculate_size(&args).unwrap();
        let message = ops::MAP_GET.encode_request(&args).unwrap();
        assert_eq!(message.len(), size);
    }

    #[test]
    fn test_encode_request_header() {
        let args = [
            Field::String(Some("users".to_string())),
            Field::Data(key_envelope()),
        ];
        let message = ops::MAP_CONTAINS_KEY.encode_request(&args).unwrap();
        assert_eq!(message.message_type(), MAP_CONTAINS_KEY);
        assert!(message.is_retryable());
    }

    #[test]
    fn test_non_retryable_operation() {
        let args = [
            Field::String(Some("users".to_string())),
            Field::Data(key_envelope()),
            Field::Data(value_envelope()),
            Field::Int64(-1),
        ];
        let message = ops::MAP_PUT.encode_request(&args).unwrap();
        assert!(!message.is_retryable());
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let err = ops::MAP_GET
            .encode_request(&[Field::String(Some("users".to_string()))])
            .unwrap_err();
        assert!(matches!(err, GridlinkError::Protocol(_)));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let err = ops::MAP_SIZE
            .encode_request(&[Field::Int32(3)])
            .unwrap_err();
        assert!(matches!(err, GridlinkError::Protocol(_)));
    }

    fn boolean_response(value: bool) -> Message {
        let mut message = Message::create_for_encode(
            HEADER_SIZE + 1,
            RESPONSE_BOOLEAN,
            false,
        );
        message.append_bool(value);
        message.update_frame_length();
        message
    }

    #[test]
    fn test_decode_boolean_response() {
        let mut message = boolean_response(true);
        let fields = ops::MAP_CONTAINS_KEY
            .decode_response(&mut message, ByteOrder::BigEndian)
            .unwrap();
        assert_eq!(fields, vec![Field::Boolean(true)]);
    }

    #[test]
    fn test_decode_response_type_mismatch() {
        let mut message = boolean_response(true);
        let err = ops::MAP_SIZE
            .decode_response(&mut message, ByteOrder::BigEndian)
            .unwrap_err();
        assert!(matches!(err, GridlinkError::Protocol(_)));
    }

    #[test]
    fn test_decode_optional_data_present() {
        let mut message = Message::create_for_encode(128, RESPONSE_DATA, false);
        message.append_bool(true);
        message.append_data(&value_envelope());
        message.update_frame_length();

        let fields = ops::MAP_GET
            .decode_response(&mut message, ByteOrder::BigEndian)
            .unwrap();
        assert_eq!(fields, vec![Field::OptionalData(Some(value_envelope()))]);
    }

    #[test]
    fn test_decode_optional_data_absent() {
        let mut message = Message::create_for_encode(128, RESPONSE_DATA, false);
        message.append_bool(false);
        message.update_frame_length();

        let fields = ops::MAP_GET
            .decode_response(&mut message, ByteOrder::BigEndian)
            .unwrap();
        assert_eq!(fields, vec![Field::OptionalData(None)]);
    }

    #[test]
    fn test_decode_response_with_converter() {
        let mut message = Message::create_for_encode(128, RESPONSE_DATA, false);
        message.append_bool(true);
        message.append_data(&value_envelope());
        message.update_frame_length();

        let decoded = ops::MAP_GET
            .decode_response_with(&mut message, ByteOrder::BigEndian, |_envelope| {
                Ok(Value::Integer(14))
            })
            .unwrap();
        assert_eq!(decoded, vec![DecodedValue::Object(Some(Value::Integer(14)))]);
    }

    #[test]
    fn test_decode_truncated_response_fails() {
        let mut message = Message::create_for_encode(HEADER_SIZE, RESPONSE_BOOLEAN, false);
        message.update_frame_length();
        let err = ops::MAP_CONTAINS_KEY
            .decode_response(&mut message, ByteOrder::BigEndian)
            .unwrap_err();
        assert!(matches!(err, GridlinkError::OutOfRange(_)));
    }
}
