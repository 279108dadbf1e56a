//! Capturing runtime values as structured values.
//!
//! Any type implementing [`Capture`] can be logged. A type describes itself
//! through its [`Shape`]: a scalar, a string, a sequence, a map, a tuple or
//! an object with named properties. The [`PropertyValueConverter`] walks
//! that description and builds a bounded [`PropertyValue`] tree, applying
//! scalar and destructuring policies, depth and size limits.
//!
//! # Example
//!
//! ```rust
//! use plume::capture::{Capture, Fields, PropertyValueConverter, Shape};
//! use plume::Destructuring;
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Capture for Point {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::Object
//!     }
//!
//!     fn properties(&self, fields: &mut Fields<'_>) {
//!         fields.field("X", &self.x).field("Y", &self.y);
//!     }
//! }
//!
//! let converter = PropertyValueConverter::default();
//! let value = converter.capture(&Point { x: 1, y: 2 }, Destructuring::Destructure).unwrap();
//! assert_eq!(value.to_string(), "Point { X: 1, Y: 2 }");
//! ```
//!
//! Without the `@` hint the same value is captured by its [`Capture::display`]
//! text.

mod converter;
mod impls;
pub mod policy;

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;

pub use converter::{ConverterBuilder, PropertyValueConverter, ValueFactory};
pub use plume_template::Destructuring;

use crate::error::CaptureError;
use crate::events::{Property, PropertyValue, Scalar};
use crate::selflog;

/// Access to the concrete type behind a `dyn Capture`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A value that can be captured into a [`PropertyValue`].
pub trait Capture: AsAny {
    /// How the converter should see this value.
    fn shape(&self) -> Shape<'_>;

    /// Type metadata for this value. Used for type tags and type-keyed
    /// policies.
    fn type_desc(&self) -> TypeDesc {
        TypeDesc::of::<Self>()
    }

    /// Type metadata without a value; consulted for map key types.
    fn describe() -> TypeDesc
    where
        Self: Sized,
    {
        TypeDesc::of::<Self>()
    }

    /// String form used for stringified captures and as the fallback when
    /// a value is neither scalar nor destructured.
    fn display(&self) -> String {
        match self.shape() {
            Shape::Null => String::new(),
            Shape::Scalar(s) => s.to_plain_string(),
            Shape::Str(s) | Shape::Enum(s) => s.to_string(),
            Shape::Transparent(inner) => inner.display(),
            _ => self.type_desc().full_name().to_string(),
        }
    }

    /// Lists public readable properties. Only called for [`Shape::Object`]
    /// values being destructured.
    fn properties(&self, _fields: &mut Fields<'_>) {}
}

/// The structural description of a captured value.
pub enum Shape<'a> {
    Null,
    /// Already a scalar.
    Scalar(Scalar),
    Str(&'a str),
    /// An enum variant, by name.
    Enum(&'a str),
    /// A wrapper (`Box`, `Arc`, `Some`) standing in for its contents.
    Transparent(&'a dyn Capture),
    Seq(Box<dyn Iterator<Item = &'a dyn Capture> + 'a>),
    Map(MapShape<'a>),
    /// A fixed-arity tuple.
    Tuple(Vec<&'a dyn Capture>),
    /// A function value.
    Function,
    /// Runtime type metadata.
    TypeInfo,
    /// Anything with named properties.
    Object,
}

impl fmt::Debug for Shape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Null => "Null",
            Shape::Scalar(_) => "Scalar",
            Shape::Str(_) => "Str",
            Shape::Enum(_) => "Enum",
            Shape::Transparent(_) => "Transparent",
            Shape::Seq(_) => "Seq",
            Shape::Map(_) => "Map",
            Shape::Tuple(_) => "Tuple",
            Shape::Function => "Function",
            Shape::TypeInfo => "TypeInfo",
            Shape::Object => "Object",
        };
        f.write_str(name)
    }
}

/// Entries of a map-like value.
pub struct MapShape<'a> {
    /// The declared key type.
    pub key_type: TypeDesc,
    /// Standard maps are dictionaries whenever their keys are scalar; other
    /// maps only when registered as dictionary types.
    pub standard: bool,
    pub entries: Box<dyn Iterator<Item = (&'a dyn Capture, &'a dyn Capture)> + 'a>,
}

/// Static description of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    id: TypeId,
    full_name: &'static str,
    is_enum: bool,
    anonymous: bool,
}

impl TypeDesc {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
            is_enum: false,
            anonymous: false,
        }
    }

    /// A type whose structures carry no type tag.
    pub fn anonymous<T: ?Sized + 'static>() -> Self {
        Self {
            anonymous: true,
            ..Self::of::<T>()
        }
    }

    /// Marks the type as an enum, which makes it a valid dictionary key.
    pub fn enumeration(self) -> Self {
        Self { is_enum: true, ..self }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn full_name(&self) -> &'static str {
        self.full_name
    }

    pub fn is_enum(&self) -> bool {
        self.is_enum
    }

    /// The unqualified name without generic arguments: `Vec` for
    /// `alloc::vec::Vec<i32>`.
    pub fn name(&self) -> &'static str {
        let full = self.full_name;
        if full.starts_with(['(', '[', '&', '*']) {
            return full;
        }
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// The module path, if any.
    pub fn namespace(&self) -> Option<&'static str> {
        let base = self.full_name.split('<').next().unwrap_or(self.full_name);
        base.rsplit_once("::").map(|(ns, _)| ns)
    }

    pub fn is_generic(&self) -> bool {
        self.full_name.contains('<')
    }

    /// Closures, qualified projections and explicitly anonymous types.
    pub fn is_compiler_generated(&self) -> bool {
        let name = self.name();
        self.anonymous || name.starts_with('{') || name.starts_with('<') || name.contains("{{closure}}")
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name)
    }
}

/// Collects the properties of an object being destructured.
///
/// Names are de-duplicated: the first property with a given name wins.
pub struct Fields<'f> {
    factory: &'f ValueFactory<'f>,
    type_name: &'static str,
    seen: HashSet<String>,
    properties: Vec<Property>,
    error: Option<CaptureError>,
}

impl<'f> Fields<'f> {
    pub(crate) fn new(factory: &'f ValueFactory<'f>, type_name: &'static str) -> Self {
        Self {
            factory,
            type_name,
            seen: HashSet::new(),
            properties: Vec::new(),
            error: None,
        }
    }

    /// Adds a readable property.
    pub fn field(&mut self, name: &str, value: &dyn Capture) -> &mut Self {
        if self.error.is_some() || self.seen.contains(name) {
            return self;
        }
        match self.factory.create_property_value(value, Destructuring::Destructure) {
            Ok(value) => self.push(name, value),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Adds a property whose accessor can fail. A failure is reported and
    /// replaced by a descriptive string, or surfaces as a [`CaptureError`]
    /// when the converter propagates errors.
    pub fn getter<T, E>(&mut self, name: &str, get: impl FnOnce() -> Result<T, E>) -> &mut Self
    where
        T: Capture,
        E: std::error::Error + 'static,
    {
        if self.error.is_some() || self.seen.contains(name) {
            return self;
        }
        match get() {
            Ok(value) => self.field(name, &value),
            Err(e) => {
                selflog!("The property accessor {} threw exception: {}", name, e);
                if self.factory.propagates_errors() {
                    self.error = Some(CaptureError::Accessor {
                        type_name: self.type_name.to_string(),
                        property: name.to_string(),
                        message: e.to_string(),
                    });
                    return self;
                }
                let error_type = TypeDesc::of::<E>().name();
                let text = format!("The property accessor threw an exception: {error_type}");
                self.field(name, &text)
            }
        }
    }

    /// Records a property that exists but cannot be read.
    pub fn unsupported(&mut self, name: &str) -> &mut Self {
        if self.error.is_some() || self.seen.contains(name) {
            return self;
        }
        selflog!("The property accessor {} on {} is not supported", name, self.type_name);
        if self.factory.propagates_errors() {
            self.error = Some(CaptureError::Unsupported {
                type_name: self.type_name.to_string(),
                property: name.to_string(),
            });
            return self;
        }
        self.field(name, &"Accessing this property is not supported")
    }

    /// Records an indexed property. Indexers are never captured.
    pub fn indexer(&mut self, name: &str) -> &mut Self {
        selflog!("The property {} on {} is an indexer and was skipped", name, self.type_name);
        self
    }

    fn push(&mut self, name: &str, value: PropertyValue) {
        self.seen.insert(name.to_string());
        self.properties.push(Property::new(name, value));
    }

    pub(crate) fn finish(self) -> Result<Vec<Property>, CaptureError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.properties),
        }
    }
}

/// Implements [`Capture`] for a fieldless enum, capturing variants by name.
///
/// ```rust
/// #[derive(Clone, Copy)]
/// enum Color {
///     Red,
///     Green,
/// }
/// plume::capture_enum!(Color { Red, Green });
///
/// let converter = plume::capture::PropertyValueConverter::default();
/// let value = converter.capture(&Color::Green, plume::Destructuring::Default).unwrap();
/// assert_eq!(value.to_string(), "Green");
/// ```
#[macro_export]
macro_rules! capture_enum {
    ($ty:ident { $($variant:ident),* $(,)? }) => {
        impl $crate::capture::Capture for $ty {
            fn shape(&self) -> $crate::capture::Shape<'_> {
                match self {
                    $($ty::$variant => $crate::capture::Shape::Enum(stringify!($variant)),)*
                }
            }

            fn type_desc(&self) -> $crate::capture::TypeDesc {
                $crate::capture::TypeDesc::of::<Self>().enumeration()
            }

            fn describe() -> $crate::capture::TypeDesc {
                $crate::capture::TypeDesc::of::<Self>().enumeration()
            }
        }
    };
}
