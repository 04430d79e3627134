//! The serializer contract and the built-in serializers for standard shapes.

use super::data_input::DataInput;
use super::data_output::DataOutput;
use super::value::Value;
use crate::error::{GridlinkError, Result};

/// Type tag for the null value.
pub const TYPE_NULL: i32 = 0;

/// Type tag for identified custom types.
pub const TYPE_IDENTIFIED: i32 = -2;

/// Type tag for an 8-bit signed integer.
pub const TYPE_BYTE: i32 = -3;

/// Type tag for a boolean.
pub const TYPE_BOOLEAN: i32 = -4;

/// Type tag for a 16-bit signed integer.
pub const TYPE_SHORT: i32 = -6;

/// Type tag for a 32-bit signed integer.
pub const TYPE_INTEGER: i32 = -7;

/// Type tag for a 64-bit signed integer.
pub const TYPE_LONG: i32 = -8;

/// Type tag for a single-precision float.
pub const TYPE_FLOAT: i32 = -9;

/// Type tag for a double-precision number.
pub const TYPE_DOUBLE: i32 = -10;

/// Type tag for a UTF-8 string.
pub const TYPE_STRING: i32 = -11;

/// Type tag for a byte array.
pub const TYPE_BYTE_ARRAY: i32 = -12;

/// Type tag for a boolean array.
pub const TYPE_BOOLEAN_ARRAY: i32 = -13;

/// Type tag for a short array.
pub const TYPE_SHORT_ARRAY: i32 = -15;

/// Type tag for an integer array.
pub const TYPE_INTEGER_ARRAY: i32 = -16;

/// Type tag for a long array.
pub const TYPE_LONG_ARRAY: i32 = -17;

/// Type tag for a float array.
pub const TYPE_FLOAT_ARRAY: i32 = -18;

/// Type tag for a double array.
pub const TYPE_DOUBLE_ARRAY: i32 = -19;

/// Type tag for a string array.
pub const TYPE_STRING_ARRAY: i32 = -20;

/// An encoder/decoder pair for one logical value shape.
///
/// A serializer's identity is its (registered name, type tag) pair; both are
/// unique within a registry. Implementations are pure over their stream
/// arguments and safe to share across threads.
pub trait Serializer: Send + Sync {
    /// Returns the numeric tag bound 1:1 to this serializer.
    fn type_tag(&self) -> i32;

    /// Writes the value's payload to the output.
    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()>;

    /// Reads a value's payload from the input.
    fn read(&self, input: &mut DataInput) -> Result<Value>;
}

fn wrong_shape(expected: &str, found: &Value) -> GridlinkError {
    GridlinkError::Serialization(format!(
        "expected shape '{}', found '{}'",
        expected,
        found.shape_name()
    ))
}

fn expect_array<'a>(value: &'a Value, serializer: &str) -> Result<&'a [Value]> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(wrong_shape(serializer, other)),
    }
}

fn read_array_len(input: &mut DataInput) -> Result<usize> {
    let len = input.read_int()?;
    if len < 0 {
        return Err(GridlinkError::Serialization(format!(
            "invalid array length: {}",
            len
        )));
    }
    Ok(len as usize)
}

/// Serializer for the null value; the payload is empty.
pub struct NullSerializer;

impl Serializer for NullSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_NULL
    }

    fn write(&self, _output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            other => Err(wrong_shape("null", other)),
        }
    }

    fn read(&self, _input: &mut DataInput) -> Result<Value> {
        Ok(Value::Null)
    }
}

/// Serializer for booleans.
pub struct BooleanSerializer;

impl Serializer for BooleanSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_BOOLEAN
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::Boolean(v) => output.write_bool(*v),
            other => Err(wrong_shape("boolean", other)),
        }
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        Ok(Value::Boolean(input.read_bool()?))
    }
}

/// Serializer for 8-bit signed integers.
pub struct ByteSerializer;

impl Serializer for ByteSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_BYTE
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::Byte(v) => output.write_byte(*v),
            other => Err(wrong_shape("byte", other)),
        }
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        Ok(Value::Byte(input.read_byte()?))
    }
}

/// Serializer for 16-bit signed integers.
pub struct ShortSerializer;

impl Serializer for ShortSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_SHORT
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::Short(v) => output.write_short(*v),
            other => Err(wrong_shape("short", other)),
        }
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        Ok(Value::Short(input.read_short()?))
    }
}

/// Serializer for 32-bit signed integers.
pub struct IntegerSerializer;

impl Serializer for IntegerSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_INTEGER
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::Integer(v) => output.write_int(*v),
            other => Err(wrong_shape("integer", other)),
        }
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        Ok(Value::Integer(input.read_int()?))
    }
}

/// Serializer for 64-bit signed integers.
pub struct LongSerializer;

impl Serializer for LongSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_LONG
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::Long(v) => output.write_long(*v),
            other => Err(wrong_shape("long", other)),
        }
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        Ok(Value::Long(input.read_long()?))
    }
}

/// Serializer for single-precision floats.
pub struct FloatSerializer;

impl Serializer for FloatSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_FLOAT
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::Float(v) => output.write_float(*v),
            other => Err(wrong_shape("float", other)),
        }
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        Ok(Value::Float(input.read_float()?))
    }
}

/// Serializer for double-precision numbers.
pub struct DoubleSerializer;

impl Serializer for DoubleSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_DOUBLE
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::Double(v) => output.write_double(*v),
            other => Err(wrong_shape("double", other)),
        }
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        Ok(Value::Double(input.read_double()?))
    }
}

/// Serializer for UTF-8 strings.
pub struct StringSerializer;

impl Serializer for StringSerializer {
    fn type_tag(&self) -> i32 {
        TYPE_STRING
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        match value {
            Value::String(v) => output.write_string(v),
            other => Err(wrong_shape("string", other)),
        }
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        Ok(Value::String(input.read_string()?))
    }
}

/// Serializer for homogeneous boolean arrays: `[4B count][count bytes]`.
pub struct BooleanArraySerializer;

impl Serializer for BooleanArraySerializer {
    fn type_tag(&self) -> i32 {
        TYPE_BOOLEAN_ARRAY
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        let items = expect_array(value, "boolean[]")?;
        output.write_int(items.len() as i32)?;
        for item in items {
            match item {
                Value::Boolean(v) => output.write_bool(*v)?,
                other => return Err(wrong_shape("boolean element", other)),
            }
        }
        Ok(())
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        let len = read_array_len(input)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(Value::Boolean(input.read_bool()?));
        }
        Ok(Value::Array(items))
    }
}

/// Serializer for homogeneous byte arrays: `[4B count][count bytes]`.
pub struct ByteArraySerializer;

impl Serializer for ByteArraySerializer {
    fn type_tag(&self) -> i32 {
        TYPE_BYTE_ARRAY
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        let items = expect_array(value, "byte[]")?;
        output.write_int(items.len() as i32)?;
        for item in items {
            match item {
                Value::Byte(v) => output.write_byte(*v)?,
                other => return Err(wrong_shape("byte element", other)),
            }
        }
        Ok(())
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        let len = read_array_len(input)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(Value::Byte(input.read_byte()?));
        }
        Ok(Value::Array(items))
    }
}

/// Serializer for homogeneous short arrays.
pub struct ShortArraySerializer;

impl Serializer for ShortArraySerializer {
    fn type_tag(&self) -> i32 {
        TYPE_SHORT_ARRAY
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        let items = expect_array(value, "short[]")?;
        output.write_int(items.len() as i32)?;
        for item in items {
            match item {
                Value::Short(v) => output.write_short(*v)?,
                other => return Err(wrong_shape("short element", other)),
            }
        }
        Ok(())
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        let len = read_array_len(input)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(Value::Short(input.read_short()?));
        }
        Ok(Value::Array(items))
    }
}

/// Serializer for homogeneous integer arrays.
pub struct IntegerArraySerializer;

impl Serializer for IntegerArraySerializer {
    fn type_tag(&self) -> i32 {
        TYPE_INTEGER_ARRAY
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        let items = expect_array(value, "integer[]")?;
        output.write_int(items.len() as i32)?;
        for item in items {
            match item {
                Value::Integer(v) => output.write_int(*v)?,
                other => return Err(wrong_shape("integer element", other)),
            }
        }
        Ok(())
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        let len = read_array_len(input)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(Value::Integer(input.read_int()?));
        }
        Ok(Value::Array(items))
    }
}

/// Serializer for homogeneous long arrays.
pub struct LongArraySerializer;

impl Serializer for LongArraySerializer {
    fn type_tag(&self) -> i32 {
        TYPE_LONG_ARRAY
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        let items = expect_array(value, "long[]")?;
        output.write_int(items.len() as i32)?;
        for item in items {
            match item {
                Value::Long(v) => output.write_long(*v)?,
                other => return Err(wrong_shape("long element", other)),
            }
        }
        Ok(())
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        let len = read_array_len(input)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(Value::Long(input.read_long()?));
        }
        Ok(Value::Array(items))
    }
}

/// Serializer for homogeneous float arrays.
pub struct FloatArraySerializer;

impl Serializer for FloatArraySerializer {
    fn type_tag(&self) -> i32 {
        TYPE_FLOAT_ARRAY
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        let items = expect_array(value, "float[]")?;
        output.write_int(items.len() as i32)?;
        for item in items {
            match item {
                Value::Float(v) => output.write_float(*v)?,
                other => return Err(wrong_shape("float element", other)),
            }
        }
        Ok(())
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        let len = read_array_len(input)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(Value::Float(input.read_float()?));
        }
        Ok(Value::Array(items))
    }
}

/// Serializer for homogeneous double arrays.
///
/// Also the default serializer for empty arrays, whose element shape
/// cannot be observed.
pub struct DoubleArraySerializer;

impl Serializer for DoubleArraySerializer {
    fn type_tag(&self) -> i32 {
        TYPE_DOUBLE_ARRAY
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        let items = expect_array(value, "double[]")?;
        output.write_int(items.len() as i32)?;
        for item in items {
            match item {
                Value::Double(v) => output.write_double(*v)?,
                other => return Err(wrong_shape("double element", other)),
            }
        }
        Ok(())
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        let len = read_array_len(input)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(Value::Double(input.read_double()?));
        }
        Ok(Value::Array(items))
    }
}

/// Serializer for homogeneous string arrays.
///
/// Elements use the nullable string encoding, but `Value::Array` elements
/// are always present strings; a null element on decode is rejected.
pub struct StringArraySerializer;

impl Serializer for StringArraySerializer {
    fn type_tag(&self) -> i32 {
        TYPE_STRING_ARRAY
    }

    fn write(&self, output: &mut DataOutput, value: &Value) -> Result<()> {
        let items = expect_array(value, "string[]")?;
        output.write_int(items.len() as i32)?;
        for item in items {
            match item {
                Value::String(v) => output.write_nullable_string(Some(v))?,
                other => return Err(wrong_shape("string element", other)),
            }
        }
        Ok(())
    }

    fn read(&self, input: &mut DataInput) -> Result<Value> {
        let len = read_array_len(input)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            match input.read_nullable_string()? {
                Some(s) => items.push(Value::String(s)),
                None => {
                    return Err(GridlinkError::Serialization(
                        "null element in string array".to_string(),
                    ))
                }
            }
        }
        Ok(Value::Array(items))
    }
}
