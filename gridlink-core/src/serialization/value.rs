//! The dynamic value model the serialization engine dispatches on.

use super::byte_order::ByteOrder;
use super::data_output::DataOutput;
use super::identified::IdentifiedDataSerializable;

/// An application value in one of the runtime shapes the engine supports.
///
/// Arrays are homogeneous by contract: the engine dispatches an array on its
/// first element's shape and never re-classifies later elements. Mixed-type
/// arrays are rejected at write time.
#[derive(Debug)]
pub enum Value {
    /// The null value. Valid and serializable, unlike an absent value.
    Null,
    /// A boolean.
    Boolean(bool),
    /// An 8-bit signed integer.
    Byte(i8),
    /// A 16-bit signed integer.
    Short(i16),
    /// A 32-bit signed integer.
    Integer(i32),
    /// A 64-bit signed integer.
    Long(i64),
    /// A single-precision float.
    Float(f32),
    /// A double-precision number.
    Double(f64),
    /// A UTF-8 string.
    String(String),
    /// A homogeneous sequence, dispatched on its first element's shape.
    Array(Vec<Value>),
    /// A user type carrying the identified capability set.
    Identified(Box<dyn IdentifiedDataSerializable>),
}

impl Value {
    /// Returns the shape name used for serializer lookup and error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Integer(_) => "integer",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Identified(_) => "identified",
        }
    }

    /// Returns true if this value carries the identified capability.
    pub fn is_identified(&self) -> bool {
        matches!(self, Value::Identified(_))
    }

    fn identified_bytes(v: &dyn IdentifiedDataSerializable) -> Option<Vec<u8>> {
        let mut output = DataOutput::new(ByteOrder::BigEndian);
        v.write_data(&mut output).ok()?;
        Some(output.into_bytes())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            // Identified values compare by identity ids plus field bytes.
            (Value::Identified(a), Value::Identified(b)) => {
                a.factory_id() == b.factory_id()
                    && a.class_id() == b.class_id()
                    && match (
                        Self::identified_bytes(a.as_ref()),
                        Self::identified_bytes(b.as_ref()),
                    ) {
                        (Some(x), Some(y)) => x == y,
                        _ => false,
                    }
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_names() {
        assert_eq!(Value::Null.shape_name(), "null");
        assert_eq!(Value::Boolean(true).shape_name(), "boolean");
        assert_eq!(Value::Byte(1).shape_name(), "byte");
        assert_eq!(Value::Short(1).shape_name(), "short");
        assert_eq!(Value::Integer(1).shape_name(), "integer");
        assert_eq!(Value::Long(1).shape_name(), "long");
        assert_eq!(Value::Float(1.0).shape_name(), "float");
        assert_eq!(Value::Double(1.0).shape_name(), "double");
        assert_eq!(Value::String(String::new()).shape_name(), "string");
        assert_eq!(Value::Array(vec![]).shape_name(), "array");
    }

    #[test]
    fn test_scalar_equality() {
        assert_eq!(Value::Integer(14), Value::Integer(14));
        assert_ne!(Value::Integer(14), Value::Integer(15));
        assert_ne!(Value::Integer(14), Value::Long(14));
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::Boolean(false));
    }

    #[test]
    fn test_array_equality() {
        let a = Value::Array(vec![Value::Boolean(true), Value::Boolean(false)]);
        let b = Value::Array(vec![Value::Boolean(true), Value::Boolean(false)]);
        let c = Value::Array(vec![Value::Boolean(true)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(14i32), Value::Integer(14));
        assert_eq!(Value::from(14i64), Value::Long(14));
        assert_eq!(Value::from(1.5f64), Value::Double(1.5));
        assert_eq!(Value::from("hi"), Value::String("hi".to_string()));
    }

    #[test]
    fn test_is_identified() {
        assert!(!Value::Integer(1).is_identified());
        assert!(!Value::Array(vec![]).is_identified());
    }
}
