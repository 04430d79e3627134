//! Registry resolving logical type names and tags to serializers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::identified::{FactoryRegistry, IdentifiedSerializer};
use super::serializer::{
    BooleanArraySerializer, BooleanSerializer, ByteArraySerializer, ByteSerializer,
    DoubleArraySerializer, DoubleSerializer, FloatArraySerializer, FloatSerializer,
    IntegerArraySerializer, IntegerSerializer, LongArraySerializer, LongSerializer,
    NullSerializer, Serializer, ShortArraySerializer, ShortSerializer, StringArraySerializer,
    StringSerializer,
};
use crate::error::{GridlinkError, Result};

/// Suffix distinguishing the "array of" variant of a registered name.
const ARRAY_SUFFIX: &str = "[]";

/// Two lookup tables: name to tag, and tag to serializer.
///
/// Registration completes before any encode/decode traffic begins; the
/// registry is read-only afterwards and requires no synchronization.
/// Every tag reachable from the name table resolves to a present serializer.
#[derive(Default)]
pub struct SerializerRegistry {
    name_to_tag: HashMap<String, i32>,
    tag_to_serializer: HashMap<i32, Arc<dyn Serializer>>,
}

impl SerializerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            name_to_tag: HashMap::new(),
            tag_to_serializer: HashMap::new(),
        }
    }

    /// Creates a registry populated with the grid's standard serializers.
    ///
    /// The identified-type serializer is parameterized by the supplied
    /// factory table from client configuration.
    pub fn with_defaults(factories: Arc<FactoryRegistry>) -> Result<Self> {
        let mut registry = Self::new();

        registry.register("null", Arc::new(NullSerializer))?;
        registry.register("identified", Arc::new(IdentifiedSerializer::new(factories)))?;
        registry.register("boolean", Arc::new(BooleanSerializer))?;
        registry.register("byte", Arc::new(ByteSerializer))?;
        registry.register("short", Arc::new(ShortSerializer))?;
        registry.register("integer", Arc::new(IntegerSerializer))?;
        registry.register("long", Arc::new(LongSerializer))?;
        registry.register("float", Arc::new(FloatSerializer))?;
        registry.register("double", Arc::new(DoubleSerializer))?;
        registry.register("string", Arc::new(StringSerializer))?;

        registry.register("boolean[]", Arc::new(BooleanArraySerializer))?;
        registry.register("byte[]", Arc::new(ByteArraySerializer))?;
        registry.register("short[]", Arc::new(ShortArraySerializer))?;
        registry.register("integer[]", Arc::new(IntegerArraySerializer))?;
        registry.register("long[]", Arc::new(LongArraySerializer))?;
        registry.register("float[]", Arc::new(FloatArraySerializer))?;
        registry.register("double[]", Arc::new(DoubleArraySerializer))?;
        registry.register("string[]", Arc::new(StringArraySerializer))?;

        debug!(
            serializers = registry.len(),
            "populated default serializer registry"
        );
        Ok(registry)
    }

    /// Registers a serializer under the given logical name.
    ///
    /// Fails with `DuplicateName` if the name is taken and `DuplicateTag`
    /// if the serializer's tag is already bound; neither failure mutates
    /// the registry.
    pub fn register(&mut self, name: &str, serializer: Arc<dyn Serializer>) -> Result<()> {
        if self.name_to_tag.contains_key(name) {
            return Err(GridlinkError::DuplicateName(name.to_string()));
        }
        let tag = serializer.type_tag();
        if self.tag_to_serializer.contains_key(&tag) {
            return Err(GridlinkError::DuplicateTag(tag));
        }
        self.name_to_tag.insert(name.to_string(), tag);
        self.tag_to_serializer.insert(tag, serializer);
        Ok(())
    }

    /// Looks up a serializer by name, optionally as the array variant.
    ///
    /// Absence is not an error; callers decide whether it is fatal.
    pub fn by_name(&self, name: &str, array_variant: bool) -> Option<&Arc<dyn Serializer>> {
        let tag = if array_variant {
            self.name_to_tag.get(&format!("{}{}", name, ARRAY_SUFFIX))?
        } else {
            self.name_to_tag.get(name)?
        };
        self.tag_to_serializer.get(tag)
    }

    /// Looks up a serializer by its numeric type tag.
    pub fn by_tag(&self, tag: i32) -> Option<&Arc<dyn Serializer>> {
        self.tag_to_serializer.get(&tag)
    }

    /// Returns the number of registered serializers.
    pub fn len(&self) -> usize {
        self.tag_to_serializer.len()
    }

    /// Returns `true` if no serializers are registered.
    pub fn is_empty(&self) -> bool {
        self.tag_to_serializer.is_empty()
    }
}
