//! Structured values captured from log arguments.
//!
//! A captured value is one of four closed kinds:
//!
//! - [`Scalar`]: null, primitives, strings, dates, enum names
//! - [`PropertyValue::Sequence`]: an ordered list
//! - [`PropertyValue::Structure`]: named properties with an optional type tag
//! - [`PropertyValue::Dictionary`]: scalar keys mapped to values
//!
//! Values are immutable once built and render themselves to text with
//! [`PropertyValue::render`].

use std::fmt::{self, Write};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::format::provider::FormatProvider;
use crate::format::scalar;

/// A primitive value or the last-resort string form of something else.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Char(char),
    I64(i64),
    U64(u64),
    I128(i128),
    U128(u128),
    F32(f32),
    F64(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
    NaiveDateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(Duration),
    /// An enum variant, by name.
    Enum(String),
    /// Text produced for a type with no better representation.
    Other(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Scalar::I64(_) | Scalar::U64(_) | Scalar::I128(_) | Scalar::U128(_) | Scalar::F32(_) | Scalar::F64(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the scalar.
    ///
    /// Strings are double quoted with `"` escaped, unless `format` is `l`.
    /// Other values go through `provider` first, then their own handling
    /// of `format`.
    pub fn render(&self, out: &mut dyn Write, format: Option<&str>, provider: Option<&dyn FormatProvider>) -> fmt::Result {
        match self {
            Scalar::Null => out.write_str("null"),
            Scalar::String(s) => {
                if format == Some("l") {
                    out.write_str(s)
                } else {
                    out.write_char('"')?;
                    write_escaped_quotes(out, s)?;
                    out.write_char('"')
                }
            }
            _ => {
                if let Some(text) = provider.and_then(|p| p.format(format, self)) {
                    return out.write_str(&text);
                }
                scalar::write_formatted(out, self, format)
            }
        }
    }

    /// The unquoted text of the scalar with no format applied.
    pub fn to_plain_string(&self) -> String {
        match self {
            Scalar::String(s) => s.clone(),
            other => {
                let mut text = String::new();
                let _ = scalar::write_formatted(&mut text, other, None);
                text
            }
        }
    }
}

fn write_escaped_quotes(out: &mut dyn Write, s: &str) -> fmt::Result {
    let mut rest = s;
    while let Some(i) = rest.find('"') {
        out.write_str(&rest[..i])?;
        out.write_str("\\\"")?;
        rest = &rest[i + 1..];
    }
    out.write_str(rest)
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, None, None)
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v as $target)
                }
            }
        )*
    };
}

scalar_from! {
    i8 => I64 as i64, i16 => I64 as i64, i32 => I64 as i64, i64 => I64 as i64, isize => I64 as i64,
    u8 => U64 as u64, u16 => U64 as u64, u32 => U64 as u64, u64 => U64 as u64, usize => U64 as u64,
    i128 => I128 as i128, u128 => U128 as u128,
    f32 => F32 as f32, f64 => F64 as f64,
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<char> for Scalar {
    fn from(v: char) -> Self {
        Scalar::Char(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Scalar {
    fn from(v: DateTime<Tz>) -> Self {
        Scalar::DateTime(v.fixed_offset())
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(v: NaiveDateTime) -> Self {
        Scalar::NaiveDateTime(v)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(v: NaiveDate) -> Self {
        Scalar::Date(v)
    }
}

impl From<NaiveTime> for Scalar {
    fn from(v: NaiveTime) -> Self {
        Scalar::Time(v)
    }
}

impl From<Duration> for Scalar {
    fn from(v: Duration) -> Self {
        Scalar::Duration(v)
    }
}

/// A named value inside a [`StructureValue`] or a log event.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Names must contain something other than whitespace.
    pub fn is_valid_name(name: &str) -> bool {
        !name.trim().is_empty()
    }
}

/// Named properties with an optional type tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructureValue {
    pub type_tag: Option<String>,
    pub properties: Vec<Property>,
}

impl StructureValue {
    pub fn new(type_tag: Option<String>, properties: Vec<Property>) -> Self {
        Self { type_tag, properties }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// Scalar keys mapped to values, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DictionaryValue {
    pub entries: Vec<(Scalar, PropertyValue)>,
}

impl DictionaryValue {
    pub fn new(entries: Vec<(Scalar, PropertyValue)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &Scalar) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// A captured, structured value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Scalar(Scalar),
    Sequence(Vec<PropertyValue>),
    Structure(StructureValue),
    Dictionary(DictionaryValue),
}

impl PropertyValue {
    pub const NULL: PropertyValue = PropertyValue::Scalar(Scalar::Null);

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            PropertyValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Scalar(Scalar::Null))
    }

    /// Renders the value as plain text.
    ///
    /// ```rust
    /// use plume::{Property, PropertyValue, StructureValue};
    ///
    /// let point = PropertyValue::Structure(StructureValue::new(
    ///     Some("Point".into()),
    ///     vec![Property::new("X", 1), Property::new("Y", 2)],
    /// ));
    /// assert_eq!(point.to_string(), "Point { X: 1, Y: 2 }");
    /// ```
    pub fn render(&self, out: &mut dyn Write, format: Option<&str>, provider: Option<&dyn FormatProvider>) -> fmt::Result {
        match self {
            PropertyValue::Scalar(s) => s.render(out, format, provider),
            PropertyValue::Sequence(elements) => {
                out.write_char('[')?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    element.render(out, format, provider)?;
                }
                out.write_char(']')
            }
            PropertyValue::Structure(structure) => {
                if let Some(tag) = &structure.type_tag {
                    out.write_str(tag)?;
                    out.write_char(' ')?;
                }
                out.write_str("{ ")?;
                for (i, property) in structure.properties.iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    out.write_str(&property.name)?;
                    out.write_str(": ")?;
                    property.value.render(out, None, provider)?;
                }
                out.write_str(" }")
            }
            PropertyValue::Dictionary(dictionary) => {
                out.write_char('[')?;
                for (i, (key, value)) in dictionary.entries.iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    out.write_char('(')?;
                    key.render(out, None, provider)?;
                    out.write_str(": ")?;
                    value.render(out, None, provider)?;
                    out.write_char(')')?;
                }
                out.write_char(']')
            }
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, None, None)
    }
}

macro_rules! value_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(v: $ty) -> Self {
                    PropertyValue::Scalar(v.into())
                }
            }
        )*
    };
}

value_from_scalar! {
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, i128, u128, f32, f64,
    bool, char, &str, String, NaiveDateTime, NaiveDate, NaiveTime, Duration,
}

impl From<Scalar> for PropertyValue {
    fn from(v: Scalar) -> Self {
        PropertyValue::Scalar(v)
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for PropertyValue {
    fn from(v: DateTime<Tz>) -> Self {
        PropertyValue::Scalar(v.into())
    }
}

impl From<StructureValue> for PropertyValue {
    fn from(v: StructureValue) -> Self {
        PropertyValue::Structure(v)
    }
}

impl From<DictionaryValue> for PropertyValue {
    fn from(v: DictionaryValue) -> Self {
        PropertyValue::Dictionary(v)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(v: Vec<PropertyValue>) -> Self {
        PropertyValue::Sequence(v)
    }
}
