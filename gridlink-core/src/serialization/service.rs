//! The serialization engine: values to envelopes and back.

use std::sync::Arc;

use tracing::trace;

use super::byte_order::ByteOrder;
use super::data_input::DataInput;
use super::data_output::DataOutput;
use super::envelope::{Envelope, ENVELOPE_HEADER_SIZE};
use super::identified::FactoryRegistry;
use super::registry::SerializerRegistry;
use super::serializer::Serializer;
use super::value::Value;
use crate::error::{GridlinkError, Result};

/// Computes the partition hash written into an envelope header.
///
/// The hash routes keyed operations to the owning partition; it is derived
/// at encode time and never inspected by decoders.
pub trait PartitioningStrategy: Send + Sync {
    /// Returns the partition hash for the given value.
    fn partition_hash(&self, value: &Value) -> i32;
}

/// Default strategy: a value's own declared hash when it exposes one, else 0.
///
/// Hash 0 leaves partition selection to the cluster side; the invocation
/// layer can substitute a strategy when it needs specific routing.
pub struct DefaultPartitioningStrategy;

impl PartitioningStrategy for DefaultPartitioningStrategy {
    fn partition_hash(&self, value: &Value) -> i32 {
        match value {
            Value::Identified(v) => v.partition_hash().unwrap_or(0),
            _ => 0,
        }
    }
}

/// The engine façade converting values to envelopes and back.
///
/// Stateless per call: each operation works on its own stream and produces
/// a fresh envelope, so a shared service is safe for concurrent use once
/// constructed.
pub struct SerializationService {
    registry: SerializerRegistry,
    byte_order: ByteOrder,
}

impl SerializationService {
    /// Creates a service with the standard serializers and the given
    /// factory table and byte order from client configuration.
    pub fn new(byte_order: ByteOrder, factories: Arc<FactoryRegistry>) -> Result<Self> {
        Ok(Self {
            registry: SerializerRegistry::with_defaults(factories)?,
            byte_order,
        })
    }

    /// Creates a service over a pre-populated registry.
    pub fn with_registry(byte_order: ByteOrder, registry: SerializerRegistry) -> Self {
        Self {
            registry,
            byte_order,
        }
    }

    /// Returns the byte order of every stream this service creates.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns the serializer registry.
    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    /// Resolves the serializer for a value by the precedence order:
    /// absent fails, identified wins, then arrays by their first element's
    /// shape (empty arrays default to the double array), then scalars by
    /// shape name.
    fn resolve<'a>(
        &self,
        value: Option<&'a Value>,
    ) -> Result<(&'a Value, &Arc<dyn Serializer>)> {
        let value = value.ok_or_else(|| {
            GridlinkError::Unserializable("no value provided (absent is not null)".to_string())
        })?;

        if value.is_identified() {
            let serializer = self
                .registry
                .by_name("identified", false)
                .ok_or_else(|| GridlinkError::NoSerializerFound("identified".to_string()))?;
            return Ok((value, serializer));
        }

        let serializer = match value {
            Value::Array(items) => {
                // Dispatch on the first element only; homogeneity is the
                // array contract, not something the engine verifies here.
                let element_shape = match items.first() {
                    Some(first) => first.shape_name(),
                    None => "double",
                };
                self.registry.by_name(element_shape, true).ok_or_else(|| {
                    GridlinkError::NoSerializerFound(format!("{}[]", element_shape))
                })?
            }
            scalar => {
                let shape = scalar.shape_name();
                self.registry
                    .by_name(shape, false)
                    .ok_or_else(|| GridlinkError::NoSerializerFound(shape.to_string()))?
            }
        };
        Ok((value, serializer))
    }

    /// Serializes a value to an envelope using the default partitioning
    /// strategy.
    ///
    /// `None` is the explicit "no value provided" sentinel and fails with
    /// `Unserializable`; `Some(&Value::Null)` is valid.
    pub fn to_data(&self, value: Option<&Value>) -> Result<Envelope> {
        self.to_data_with_strategy(value, &DefaultPartitioningStrategy)
    }

    /// Serializes a value to an envelope with an explicit partitioning
    /// strategy.
    pub fn to_data_with_strategy(
        &self,
        value: Option<&Value>,
        strategy: &dyn PartitioningStrategy,
    ) -> Result<Envelope> {
        let (value, serializer) = self.resolve(value)?;
        let partition_hash = strategy.partition_hash(value);

        let mut output = DataOutput::new(self.byte_order);
        serializer.write(&mut output, value)?;
        trace!(
            tag = serializer.type_tag(),
            payload_len = output.len(),
            "serialized value"
        );
        Ok(Envelope::wrap(
            partition_hash,
            serializer.type_tag(),
            output.as_bytes(),
            self.byte_order,
        ))
    }

    /// Deserializes an envelope back into a value.
    ///
    /// Fails with `UnknownType` if no serializer is bound to the envelope's
    /// type tag.
    pub fn to_object(&self, envelope: &Envelope) -> Result<Value> {
        let tag = envelope.type_tag();
        let serializer = self
            .registry
            .by_tag(tag)
            .ok_or(GridlinkError::UnknownType(tag))?;
        let mut input = DataInput::new(envelope.to_bytes(), self.byte_order);
        input.set_position(ENVELOPE_HEADER_SIZE as u64);
        serializer.read(&mut input)
    }

    /// Writes a value nested inside a larger stream: tag then payload,
    /// without a partition hash.
    pub fn write_object(&self, output: &mut DataOutput, value: Option<&Value>) -> Result<()> {
        let (value, serializer) = self.resolve(value)?;
        output.write_int(serializer.type_tag())?;
        serializer.write(output, value)
    }

    /// Reads a nested value written by [`write_object`](Self::write_object).
    pub fn read_object(&self, input: &mut DataInput) -> Result<Value> {
        let tag = input.read_int()?;
        let serializer = self
            .registry
            .by_tag(tag)
            .ok_or(GridlinkError::UnknownType(tag))?;
        serializer.read(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::data_input::DataInput;
    use crate::serialization::identified::{
        DataSerializableFactory, IdentifiedDataSerializable,
    };
    use crate::serialization::serializer::{
        TYPE_BOOLEAN_ARRAY, TYPE_DOUBLE_ARRAY, TYPE_IDENTIFIED, TYPE_NULL,
    };

    const ORDER_FACTORY_ID: i32 = 7;
    const ORDER_CLASS_ID: i32 = 2;

    #[derive(Debug, Default, PartialEq)]
    struct OrderKey {
        customer: String,
        order_id: i64,
    }

    impl IdentifiedDataSerializable for OrderKey {
        fn factory_id(&self) -> i32 {
            ORDER_FACTORY_ID
        }

        fn class_id(&self) -> i32 {
            ORDER_CLASS_ID
        }

        fn write_data(&self, output: &mut DataOutput) -> Result<()> {
            output.write_string(&self.customer)?;
            output.write_long(self.order_id)
        }

        fn read_data(&mut self, input: &mut DataInput) -> Result<()> {
            self.customer = input.read_string()?;
            self.order_id = input.read_long()?;
            Ok(())
        }

        fn partition_hash(&self) -> Option<i32> {
            Some(self.customer.len() as i32)
        }
    }

    struct OrderFactory;

    impl DataSerializableFactory for OrderFactory {
        fn create(&self, class_id: i32) -> Option<Box<dyn IdentifiedDataSerializable>> {
            match class_id {
                ORDER_CLASS_ID => Some(Box::new(OrderKey::default())),
                _ => None,
            }
        }
    }

    fn service() -> SerializationService {
        let mut factories = FactoryRegistry::new();
        factories.register(ORDER_FACTORY_ID, Box::new(OrderFactory));
        SerializationService::new(ByteOrder::BigEndian, Arc::new(factories)).unwrap()
    }

    fn round_trip(value: Value) {
        let svc = service();
        let envelope = svc.to_data(Some(&value)).unwrap();
        let restored = svc.to_object(&envelope).unwrap();
        assert_eq!(value, restored);
    }

    #[test]
    fn test_integer_round_trip() {
        round_trip(Value::Integer(14));
        round_trip(Value::Integer(i32::MIN));
        round_trip(Value::Integer(i32::MAX));
    }

    #[test]
    fn test_scalar_round_trips() {
        round_trip(Value::Null);
        round_trip(Value::Boolean(true));
        round_trip(Value::Byte(-8));
        round_trip(Value::Short(i16::MAX));
        round_trip(Value::Long(i64::MIN));
        round_trip(Value::Float(2.5));
        round_trip(Value::Double(std::f64::consts::E));
        round_trip(Value::String("grid".to_string()));
        round_trip(Value::String(String::new()));
    }

    #[test]
    fn test_boolean_array_round_trip() {
        round_trip(Value::Array(vec![
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Boolean(false),
            Value::Boolean(true),
        ]));
    }

    #[test]
    fn test_empty_array_uses_double_array_default() {
        let svc = service();
        let envelope = svc.to_data(Some(&Value::Array(vec![]))).unwrap();
        assert_eq!(envelope.type_tag(), TYPE_DOUBLE_ARRAY);
        assert_eq!(svc.to_object(&envelope).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_array_dispatch_on_first_element() {
        let svc = service();
        let envelope = svc
            .to_data(Some(&Value::Array(vec![Value::Boolean(true)])))
            .unwrap();
        assert_eq!(envelope.type_tag(), TYPE_BOOLEAN_ARRAY);
    }

    #[test]
    fn test_mixed_array_fails_consistently() {
        let svc = service();
        let mixed = Value::Array(vec![Value::Boolean(true), Value::Integer(3)]);
        // first element decides the serializer; the second element's
        // mismatch is a write-time error, never a per-element re-dispatch
        let err = svc.to_data(Some(&mixed)).unwrap_err();
        assert!(matches!(err, GridlinkError::Serialization(_)));
    }

    #[test]
    fn test_absent_value_is_unserializable() {
        let svc = service();
        let err = svc.to_data(None).unwrap_err();
        assert!(matches!(err, GridlinkError::Unserializable(_)));
    }

    #[test]
    fn test_null_is_serializable() {
        let svc = service();
        let envelope = svc.to_data(Some(&Value::Null)).unwrap();
        assert_eq!(envelope.type_tag(), TYPE_NULL);
        assert!(envelope.is_empty());
        assert_eq!(svc.to_object(&envelope).unwrap(), Value::Null);
    }

    #[test]
    fn test_identified_round_trip() {
        round_trip(Value::Identified(Box::new(OrderKey {
            customer: "acme".to_string(),
            order_id: 99,
        })));
    }

    #[test]
    fn test_identified_wins_precedence() {
        let svc = service();
        let envelope = svc
            .to_data(Some(&Value::Identified(Box::new(OrderKey {
                customer: "acme".to_string(),
                order_id: 1,
            }))))
            .unwrap();
        assert_eq!(envelope.type_tag(), TYPE_IDENTIFIED);
    }

    #[test]
    fn test_default_partition_hash_is_zero() {
        let svc = service();
        let envelope = svc.to_data(Some(&Value::Integer(14))).unwrap();
        assert_eq!(envelope.partition_hash(), 0);
    }

    #[test]
    fn test_value_declared_partition_hash_is_used() {
        let svc = service();
        let envelope = svc
            .to_data(Some(&Value::Identified(Box::new(OrderKey {
                customer: "acme".to_string(),
                order_id: 1,
            }))))
            .unwrap();
        assert_eq!(envelope.partition_hash(), 4);
    }

    #[test]
    fn test_explicit_strategy_overrides_default() {
        struct FixedStrategy(i32);
        impl PartitioningStrategy for FixedStrategy {
            fn partition_hash(&self, _value: &Value) -> i32 {
                self.0
            }
        }

        let svc = service();
        let envelope = svc
            .to_data_with_strategy(Some(&Value::Integer(14)), &FixedStrategy(271))
            .unwrap();
        assert_eq!(envelope.partition_hash(), 271);
    }

    #[test]
    fn test_unknown_tag_on_decode() {
        let svc = service();
        let envelope = Envelope::wrap(0, 999, &[], ByteOrder::BigEndian);
        let err = svc.to_object(&envelope).unwrap_err();
        assert!(matches!(err, GridlinkError::UnknownType(999)));
    }

    #[test]
    fn test_envelope_layout() {
        let svc = service();
        let envelope = svc.to_data(Some(&Value::Integer(14))).unwrap();
        // [hash 0][tag -7][payload 14]
        assert_eq!(
            envelope.to_bytes(),
            &[0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xF9, 0, 0, 0, 14]
        );
    }

    #[test]
    fn test_write_and_read_object_nested() {
        let svc = service();
        let mut output = DataOutput::new(ByteOrder::BigEndian);
        svc.write_object(&mut output, Some(&Value::Integer(5))).unwrap();
        svc.write_object(&mut output, Some(&Value::String("x".to_string())))
            .unwrap();

        let bytes = output.into_bytes();
        let mut input = DataInput::new(&bytes, ByteOrder::BigEndian);
        assert_eq!(svc.read_object(&mut input).unwrap(), Value::Integer(5));
        assert_eq!(
            svc.read_object(&mut input).unwrap(),
            Value::String("x".to_string())
        );
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_write_object_has_no_partition_hash() {
        let svc = service();
        let mut output = DataOutput::new(ByteOrder::BigEndian);
        svc.write_object(&mut output, Some(&Value::Integer(14))).unwrap();
        // tag + payload only
        assert_eq!(output.as_bytes(), &[0xFF, 0xFF, 0xFF, 0xF9, 0, 0, 0, 14]);
    }

    #[test]
    fn test_read_object_unknown_tag() {
        let svc = service();
        let bytes = [0, 0, 0, 99];
        let mut input = DataInput::new(&bytes, ByteOrder::BigEndian);
        let err = svc.read_object(&mut input).unwrap_err();
        assert!(matches!(err, GridlinkError::UnknownType(99)));
    }

    #[test]
    fn test_little_endian_round_trip() {
        let svc = SerializationService::new(
            ByteOrder::LittleEndian,
            Arc::new(FactoryRegistry::new()),
        )
        .unwrap();
        let value = Value::Integer(0x01020304);
        let envelope = svc.to_data(Some(&value)).unwrap();
        assert_eq!(envelope.payload(), &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(svc.to_object(&envelope).unwrap(), value);
    }

    #[test]
    fn test_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SerializationService>();
    }
}
