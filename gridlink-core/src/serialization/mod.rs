//! Serialization framework for the grid's binary format.

mod byte_order;
mod data_input;
mod data_output;
mod envelope;
mod identified;
mod registry;
mod serializer;
mod service;
mod value;

pub use byte_order::ByteOrder;
pub use data_input::DataInput;
pub use data_output::{DataOutput, NULL_ARRAY_LENGTH};
pub use envelope::{Envelope, ENVELOPE_HEADER_SIZE};
pub use identified::{
    DataSerializableFactory, FactoryRegistry, IdentifiedDataSerializable, IdentifiedSerializer,
};
pub use registry::SerializerRegistry;
pub use serializer::{
    Serializer, TYPE_BOOLEAN, TYPE_BOOLEAN_ARRAY, TYPE_BYTE, TYPE_BYTE_ARRAY, TYPE_DOUBLE,
    TYPE_DOUBLE_ARRAY, TYPE_FLOAT, TYPE_FLOAT_ARRAY, TYPE_IDENTIFIED, TYPE_INTEGER,
    TYPE_INTEGER_ARRAY, TYPE_LONG, TYPE_LONG_ARRAY, TYPE_NULL, TYPE_SHORT, TYPE_SHORT_ARRAY,
    TYPE_STRING, TYPE_STRING_ARRAY,
};
pub use service::{DefaultPartitioningStrategy, PartitioningStrategy, SerializationService};
pub use value::Value;
