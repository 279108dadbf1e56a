//! Pluggable conversion policies.
//!
//! Scalar conversion policies run first, in order, for every value. The
//! first to return a scalar wins. Destructuring policies run only for values
//! captured with the `@` hint, user policies before the built-in ones.

use std::any::TypeId;
use std::collections::HashSet;
use std::fmt::Write;
use std::marker::PhantomData;

use crate::capture::{Capture, Destructuring, Shape, ValueFactory};
use crate::error::CaptureError;
use crate::events::{PropertyValue, Scalar};

/// Recognises values that are already scalar.
pub trait ScalarConversionPolicy: Send + Sync {
    fn try_convert_to_scalar(&self, value: &dyn Capture) -> Option<Scalar>;
}

/// Converts values marked for destructuring. `Ok(None)` passes the value
/// on to the next policy.
pub trait DestructuringPolicy: Send + Sync {
    fn try_destructure(&self, value: &dyn Capture, factory: &ValueFactory<'_>) -> Result<Option<PropertyValue>, CaptureError>;
}

impl<F> DestructuringPolicy for F
where
    F: Fn(&dyn Capture, &ValueFactory<'_>) -> Result<Option<PropertyValue>, CaptureError> + Send + Sync,
{
    fn try_destructure(&self, value: &dyn Capture, factory: &ValueFactory<'_>) -> Result<Option<PropertyValue>, CaptureError> {
        self(value, factory)
    }
}

/// Values that describe themselves as scalars, plus registered scalar
/// types captured by their display string.
pub struct SimpleScalarConversionPolicy {
    scalar_types: HashSet<TypeId>,
}

impl SimpleScalarConversionPolicy {
    pub fn new(scalar_types: HashSet<TypeId>) -> Self {
        Self { scalar_types }
    }
}

impl ScalarConversionPolicy for SimpleScalarConversionPolicy {
    fn try_convert_to_scalar(&self, value: &dyn Capture) -> Option<Scalar> {
        match value.shape() {
            Shape::Scalar(scalar) => Some(scalar),
            Shape::Str(s) => Some(Scalar::String(s.to_string())),
            _ if self.scalar_types.contains(&value.as_any().type_id()) => Some(Scalar::Other(value.display())),
            _ => None,
        }
    }
}

pub struct EnumScalarConversionPolicy;

impl ScalarConversionPolicy for EnumScalarConversionPolicy {
    fn try_convert_to_scalar(&self, value: &dyn Capture) -> Option<Scalar> {
        match value.shape() {
            Shape::Enum(name) => Some(Scalar::Enum(name.to_string())),
            _ => None,
        }
    }
}

/// Byte sequences longer than this are abbreviated.
const MAXIMUM_BYTE_ARRAY_LENGTH: usize = 1024;
const ABBREVIATED_BYTES: usize = 16;

/// Uppercase hex; long inputs keep the first 16 bytes and the total length.
pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let shown = if bytes.len() > MAXIMUM_BYTE_ARRAY_LENGTH {
        &bytes[..ABBREVIATED_BYTES]
    } else {
        bytes
    };
    let mut hex = String::with_capacity(shown.len() * 2 + 24);
    for b in shown {
        let _ = write!(hex, "{b:02X}");
    }
    if bytes.len() > MAXIMUM_BYTE_ARRAY_LENGTH {
        let _ = write!(hex, "... ({} bytes)", bytes.len());
    }
    hex
}

/// `Vec<u8>`, `Box<[u8]>` and `&'static [u8]`.
pub struct ByteArrayScalarConversionPolicy;

impl ScalarConversionPolicy for ByteArrayScalarConversionPolicy {
    fn try_convert_to_scalar(&self, value: &dyn Capture) -> Option<Scalar> {
        let any = value.as_any();
        let bytes: &[u8] = if let Some(v) = any.downcast_ref::<Vec<u8>>() {
            v
        } else if let Some(v) = any.downcast_ref::<Box<[u8]>>() {
            v
        } else if let Some(v) = any.downcast_ref::<&'static [u8]>() {
            v
        } else {
            return None;
        };
        Some(Scalar::String(bytes_to_hex(bytes)))
    }
}

/// `bytes::Bytes` and `bytes::BytesMut`.
pub struct ByteMemoryScalarConversionPolicy;

impl ScalarConversionPolicy for ByteMemoryScalarConversionPolicy {
    fn try_convert_to_scalar(&self, value: &dyn Capture) -> Option<Scalar> {
        let any = value.as_any();
        let bytes: &[u8] = if let Some(v) = any.downcast_ref::<bytes::Bytes>() {
            v
        } else if let Some(v) = any.downcast_ref::<bytes::BytesMut>() {
            v
        } else {
            return None;
        };
        Some(Scalar::String(bytes_to_hex(bytes)))
    }
}

/// Function values are captured as their type name.
pub struct DelegateDestructuringPolicy;

impl DestructuringPolicy for DelegateDestructuringPolicy {
    fn try_destructure(&self, value: &dyn Capture, _factory: &ValueFactory<'_>) -> Result<Option<PropertyValue>, CaptureError> {
        Ok(match value.shape() {
            Shape::Function => Some(Scalar::String(value.display()).into()),
            _ => None,
        })
    }
}

/// Type metadata is captured as a scalar rather than walked.
pub struct ReflectionTypesScalarDestructuringPolicy;

impl DestructuringPolicy for ReflectionTypesScalarDestructuringPolicy {
    fn try_destructure(&self, value: &dyn Capture, _factory: &ValueFactory<'_>) -> Result<Option<PropertyValue>, CaptureError> {
        Ok(match value.shape() {
            Shape::TypeInfo => Some(Scalar::Other(value.display()).into()),
            _ => None,
        })
    }
}

/// Destructures `T` by capturing a substitute value.
pub struct TransformPolicy<T, R, F> {
    transform: F,
    _types: PhantomData<fn(&T) -> R>,
}

impl<T, R, F> TransformPolicy<T, R, F>
where
    T: Capture,
    R: Capture,
    F: Fn(&T) -> R + Send + Sync,
{
    pub fn new(transform: F) -> Self {
        Self {
            transform,
            _types: PhantomData,
        }
    }
}

impl<T, R, F> DestructuringPolicy for TransformPolicy<T, R, F>
where
    T: Capture,
    R: Capture,
    F: Fn(&T) -> R + Send + Sync,
{
    fn try_destructure(&self, value: &dyn Capture, factory: &ValueFactory<'_>) -> Result<Option<PropertyValue>, CaptureError> {
        let Some(typed) = value.as_any().downcast_ref::<T>() else {
            return Ok(None);
        };
        let substitute = (self.transform)(typed);
        factory.create_property_value(&substitute, Destructuring::Destructure).map(Some)
    }
}
