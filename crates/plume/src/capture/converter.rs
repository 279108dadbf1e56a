use std::any::TypeId;
use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::capture::policy::{
    ByteArrayScalarConversionPolicy, ByteMemoryScalarConversionPolicy, DelegateDestructuringPolicy,
    DestructuringPolicy, EnumScalarConversionPolicy, ReflectionTypesScalarDestructuringPolicy,
    ScalarConversionPolicy, SimpleScalarConversionPolicy, TransformPolicy,
};
use crate::capture::{impls, Capture, Destructuring, Fields, MapShape, Shape, TypeDesc};
use crate::error::{CaptureError, ConfigError};
use crate::events::{DictionaryValue, Property, PropertyValue, Scalar, StructureValue};
use crate::selflog;

/// Built-in scalar types; valid dictionary keys.
static BUILTIN_SCALAR_TYPES: Lazy<HashSet<TypeId>> = Lazy::new(impls::builtin_scalar_types);

/// Turns [`Capture`] values into [`PropertyValue`] trees.
///
/// Built once with [`ConverterBuilder`] and shared; capturing takes `&self`
/// and keeps its recursion depth on the call stack, so one converter serves
/// any number of threads.
pub struct PropertyValueConverter {
    max_depth: usize,
    max_string_length: usize,
    max_collection_count: usize,
    scalar_types: HashSet<TypeId>,
    dictionary_types: HashSet<TypeId>,
    scalar_policies: Vec<Box<dyn ScalarConversionPolicy>>,
    destructuring_policies: Vec<Box<dyn DestructuringPolicy>>,
    propagate_errors: bool,
}

impl Default for PropertyValueConverter {
    fn default() -> Self {
        Self::from_builder(ConverterBuilder::default())
    }
}

impl std::fmt::Debug for PropertyValueConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyValueConverter")
            .field("max_depth", &self.max_depth)
            .field("max_string_length", &self.max_string_length)
            .field("max_collection_count", &self.max_collection_count)
            .field("scalar_policies", &self.scalar_policies.len())
            .field("destructuring_policies", &self.destructuring_policies.len())
            .field("propagate_errors", &self.propagate_errors)
            .finish()
    }
}

impl PropertyValueConverter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::default()
    }

    fn from_builder(builder: ConverterBuilder) -> Self {
        let scalar_types: HashSet<TypeId> = BUILTIN_SCALAR_TYPES.iter().chain(&builder.scalar_types).copied().collect();

        let scalar_policies: Vec<Box<dyn ScalarConversionPolicy>> = vec![
            Box::new(SimpleScalarConversionPolicy::new(builder.scalar_types.iter().copied().collect())),
            Box::new(EnumScalarConversionPolicy),
            Box::new(ByteArrayScalarConversionPolicy),
            Box::new(ByteMemoryScalarConversionPolicy),
        ];

        let mut destructuring_policies = builder.destructuring_policies;
        destructuring_policies.push(Box::new(DelegateDestructuringPolicy));
        destructuring_policies.push(Box::new(ReflectionTypesScalarDestructuringPolicy));

        Self {
            max_depth: builder.max_depth,
            max_string_length: builder.max_string_length,
            max_collection_count: builder.max_collection_count,
            scalar_types,
            dictionary_types: builder.dictionary_types.into_iter().collect(),
            scalar_policies,
            destructuring_policies,
            propagate_errors: builder.propagate_errors,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_string_length(&self) -> usize {
        self.max_string_length
    }

    pub fn max_collection_count(&self) -> usize {
        self.max_collection_count
    }

    /// Captures a top-level value.
    pub fn capture(&self, value: &dyn Capture, destructuring: Destructuring) -> Result<PropertyValue, CaptureError> {
        self.create(value, destructuring, 1)
    }

    /// Captures a value under a property name.
    pub fn create_property(
        &self,
        name: impl Into<String>,
        value: &dyn Capture,
        destructuring: Destructuring,
    ) -> Result<Property, CaptureError> {
        Ok(Property::new(name, self.capture(value, destructuring)?))
    }

    fn create(&self, value: &dyn Capture, destructuring: Destructuring, depth: usize) -> Result<PropertyValue, CaptureError> {
        let value = unwrap_transparent(value);
        let shape = value.shape();

        if matches!(shape, Shape::Null) {
            return Ok(PropertyValue::NULL);
        }

        if destructuring == Destructuring::Stringify {
            return Ok(Scalar::String(self.truncate(value.display())).into());
        }

        if destructuring == Destructuring::Destructure {
            if let Shape::Str(s) = shape {
                return Ok(Scalar::String(self.truncate(s.to_string())).into());
            }
        }

        for policy in &self.scalar_policies {
            if let Some(scalar) = policy.try_convert_to_scalar(value) {
                return Ok(PropertyValue::Scalar(scalar));
            }
        }

        let factory = ValueFactory { converter: self, depth };

        if destructuring == Destructuring::Destructure {
            for policy in &self.destructuring_policies {
                if let Some(result) = policy.try_destructure(value, &factory)? {
                    return Ok(result);
                }
            }
        }

        match shape {
            Shape::Map(map) => {
                let dictionary_type = map.standard || self.dictionary_types.contains(&value.as_any().type_id());
                if dictionary_type && self.is_scalar_key(&map.key_type) {
                    self.create_dictionary(map, destructuring, &factory)
                } else {
                    self.create_pair_sequence(map, destructuring, &factory)
                }
            }
            Shape::Seq(elements) => {
                let elements = elements
                    .take(self.max_collection_count)
                    .map(|element| factory.create_property_value(element, destructuring))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PropertyValue::Sequence(elements))
            }
            Shape::Tuple(items) => {
                let items = items
                    .into_iter()
                    .map(|item| factory.create_property_value(item, destructuring))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PropertyValue::Sequence(items))
            }
            _ if destructuring == Destructuring::Destructure => {
                let desc = value.type_desc();
                let mut fields = Fields::new(&factory, desc.full_name());
                value.properties(&mut fields);
                let properties = fields.finish()?;
                let type_tag = (!desc.is_compiler_generated()).then(|| desc.name().to_string());
                Ok(PropertyValue::Structure(StructureValue::new(type_tag, properties)))
            }
            _ => Ok(Scalar::String(value.display()).into()),
        }
    }

    fn create_dictionary(
        &self,
        map: MapShape<'_>,
        destructuring: Destructuring,
        factory: &ValueFactory<'_>,
    ) -> Result<PropertyValue, CaptureError> {
        let mut entries = Vec::new();
        for (count, (key, value)) in map.entries.enumerate() {
            if count >= self.max_collection_count {
                break;
            }
            let key = match factory.create_property_value(key, destructuring)? {
                PropertyValue::Scalar(Scalar::Null) => continue,
                PropertyValue::Scalar(key) => key,
                other => Scalar::String(other.to_string()),
            };
            entries.push((key, factory.create_property_value(value, destructuring)?));
        }
        Ok(PropertyValue::Dictionary(DictionaryValue::new(entries)))
    }

    /// Maps that are not dictionaries become a sequence of `[key, value]`
    /// pairs.
    fn create_pair_sequence(
        &self,
        map: MapShape<'_>,
        destructuring: Destructuring,
        factory: &ValueFactory<'_>,
    ) -> Result<PropertyValue, CaptureError> {
        let pairs = map
            .entries
            .take(self.max_collection_count)
            .map(|(key, value)| {
                Ok(PropertyValue::Sequence(vec![
                    factory.create_property_value(key, destructuring)?,
                    factory.create_property_value(value, destructuring)?,
                ]))
            })
            .collect::<Result<Vec<_>, CaptureError>>()?;
        Ok(PropertyValue::Sequence(pairs))
    }

    fn is_scalar_key(&self, key_type: &TypeDesc) -> bool {
        key_type.is_enum() || self.scalar_types.contains(&key_type.id())
    }

    /// Keeps at most `max_string_length` characters, the last being `…`.
    fn truncate(&self, s: String) -> String {
        if self.max_string_length == usize::MAX {
            return s;
        }
        match s.char_indices().nth(self.max_string_length) {
            None => s,
            Some(_) => {
                let mut truncated: String = s.chars().take(self.max_string_length - 1).collect();
                truncated.push('…');
                truncated
            }
        }
    }
}

fn unwrap_transparent(mut value: &dyn Capture) -> &dyn Capture {
    while let Shape::Transparent(inner) = value.shape() {
        value = inner;
    }
    value
}

/// Captures nested values on behalf of policies and property walks,
/// enforcing the depth limit.
pub struct ValueFactory<'a> {
    converter: &'a PropertyValueConverter,
    depth: usize,
}

impl ValueFactory<'_> {
    /// Captures `value` one level deeper than the current value, or yields
    /// null once the maximum depth is reached.
    pub fn create_property_value(&self, value: &dyn Capture, destructuring: Destructuring) -> Result<PropertyValue, CaptureError> {
        if self.depth >= self.converter.max_depth {
            selflog!("Maximum destructuring depth reached.");
            return Ok(PropertyValue::NULL);
        }
        self.converter.create(value, destructuring, self.depth + 1)
    }

    /// Depth of the value currently being captured; the top level is 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn propagates_errors(&self) -> bool {
        self.converter.propagate_errors
    }
}

/// Configures a [`PropertyValueConverter`].
///
/// ```rust
/// use plume::capture::PropertyValueConverter;
///
/// let converter = PropertyValueConverter::builder()
///     .max_depth(3)
///     .max_string_length(64)
///     .max_collection_count(100)
///     .build()
///     .unwrap();
/// assert_eq!(converter.max_depth(), 3);
/// ```
pub struct ConverterBuilder {
    max_depth: usize,
    max_string_length: usize,
    max_collection_count: usize,
    scalar_types: Vec<TypeId>,
    dictionary_types: Vec<TypeId>,
    destructuring_policies: Vec<Box<dyn DestructuringPolicy>>,
    propagate_errors: bool,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_string_length: usize::MAX,
            max_collection_count: usize::MAX,
            scalar_types: Vec::new(),
            dictionary_types: Vec::new(),
            destructuring_policies: Vec::new(),
            propagate_errors: false,
        }
    }
}

impl ConverterBuilder {
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// At least 2: one character plus the ellipsis.
    pub fn max_string_length(mut self, length: usize) -> Self {
        self.max_string_length = length;
        self
    }

    pub fn max_collection_count(mut self, count: usize) -> Self {
        self.max_collection_count = count;
        self
    }

    /// Treats `T` as a scalar: captured by its display string and accepted
    /// as a dictionary key.
    pub fn scalar_type<T: Capture>(mut self) -> Self {
        self.scalar_types.push(TypeId::of::<T>());
        self
    }

    /// Treats the non-standard map type `T` as a dictionary.
    pub fn dictionary_type<T: Capture>(mut self) -> Self {
        self.dictionary_types.push(TypeId::of::<T>());
        self
    }

    /// Appends a destructuring policy. User policies run in the order added,
    /// before the built-in ones.
    pub fn destructure_with(mut self, policy: impl DestructuringPolicy + 'static) -> Self {
        self.destructuring_policies.push(Box::new(policy));
        self
    }

    /// Destructures `T` by capturing whatever `transform` returns instead.
    pub fn transform<T, R, F>(self, transform: F) -> Self
    where
        T: Capture,
        R: Capture,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.destructure_with(TransformPolicy::new(transform))
    }

    /// Surfaces property accessor failures as errors instead of
    /// substituting a descriptive string.
    pub fn propagate_errors(mut self, propagate: bool) -> Self {
        self.propagate_errors = propagate;
        self
    }

    pub fn build(self) -> Result<PropertyValueConverter, ConfigError> {
        if self.max_string_length < 2 {
            return Err(ConfigError::OutOfRange {
                field: "max_string_length",
                min: 2,
                actual: self.max_string_length,
            });
        }
        if self.max_collection_count < 1 {
            return Err(ConfigError::OutOfRange {
                field: "max_collection_count",
                min: 1,
                actual: self.max_collection_count,
            });
        }
        Ok(PropertyValueConverter::from_builder(self))
    }
}
