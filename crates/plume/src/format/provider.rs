use crate::events::Scalar;

/// Caller-supplied formatting for non-string scalars.
///
/// Returning `None` falls back to the scalar's own formatting.
pub trait FormatProvider: Send + Sync {
    fn format(&self, format: Option<&str>, value: &Scalar) -> Option<String>;
}

impl<F> FormatProvider for F
where
    F: Fn(Option<&str>, &Scalar) -> Option<String> + Send + Sync,
{
    fn format(&self, format: Option<&str>, value: &Scalar) -> Option<String> {
        self(format, value)
    }
}
