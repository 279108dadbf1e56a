//! Themed value formatters.
//!
//! Both formatters return the number of invisible characters they wrote,
//! summed over every nested span.

use std::fmt::{self, Write};
use std::sync::Arc;

use crate::events::{PropertyValue, Scalar};
use crate::format::{json, write_quoted_json_string, FormatProvider};
use crate::theme::{styled, styled_str, ConsoleTheme, ThemeStyle};

/// Key under which themed JSON writes structure type tags.
const TYPE_TAG: &str = "$type";

/// Writes a [`PropertyValue`] through a [`ConsoleTheme`].
pub trait ThemedValueFormatter: Send + Sync {
    /// `literal_top_level` applies the message `l` flag to a top-level
    /// scalar.
    fn format(
        &self,
        theme: &dyn ConsoleTheme,
        value: &PropertyValue,
        out: &mut dyn Write,
        format: Option<&str>,
        literal_top_level: bool,
    ) -> Result<usize, fmt::Error>;
}

/// The human-readable form: `[1, 2]`, `Tag {A=1}`, `{["k"]=v}`.
#[derive(Clone, Default)]
pub struct ThemedDisplayFormatter {
    provider: Option<Arc<dyn FormatProvider>>,
}

impl ThemedDisplayFormatter {
    pub fn new(provider: Option<Arc<dyn FormatProvider>>) -> Self {
        Self { provider }
    }

    fn visit(&self, theme: &dyn ConsoleTheme, value: &PropertyValue, out: &mut dyn Write, format: Option<&str>) -> Result<usize, fmt::Error> {
        let mut count = 0;
        match value {
            PropertyValue::Scalar(scalar) => return self.format_literal(theme, scalar, out, format),
            PropertyValue::Sequence(elements) => {
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, ", ")?;
                    }
                    count += self.visit(theme, element, out, format)?;
                }
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "]")?;
            }
            PropertyValue::Structure(structure) => {
                if let Some(tag) = &structure.type_tag {
                    styled_str(theme, out, ThemeStyle::Name, &mut count, tag)?;
                    out.write_char(' ')?;
                }
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "{")?;
                for (i, property) in structure.properties.iter().enumerate() {
                    if i > 0 {
                        styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, ", ")?;
                    }
                    styled_str(theme, out, ThemeStyle::Name, &mut count, &property.name)?;
                    styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "=")?;
                    count += self.visit(theme, &property.value, out, None)?;
                }
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "}")?;
            }
            PropertyValue::Dictionary(dictionary) => {
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "{")?;
                for (i, (key, value)) in dictionary.entries.iter().enumerate() {
                    if i > 0 {
                        styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, ", ")?;
                    }
                    styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "[")?;
                    count += self.format_literal(theme, key, out, None)?;
                    styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "]=")?;
                    count += self.visit(theme, value, out, None)?;
                }
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "}")?;
            }
        }
        Ok(count)
    }

    /// Writes one scalar in the style of its kind.
    pub fn format_literal(&self, theme: &dyn ConsoleTheme, scalar: &Scalar, out: &mut dyn Write, format: Option<&str>) -> Result<usize, fmt::Error> {
        let provider = self.provider.as_deref();
        let mut count = 0;
        match scalar {
            Scalar::Null => styled_str(theme, out, ThemeStyle::Null, &mut count, "null")?,
            Scalar::String(s) => styled(theme, out, ThemeStyle::String, &mut count, |out| {
                if format == Some("l") {
                    out.write_str(s)
                } else {
                    write_quoted_json_string(out, s)
                }
            })?,
            s if s.is_number() => styled(theme, out, ThemeStyle::Number, &mut count, |out| s.render(out, format, provider))?,
            Scalar::Bool(b) => styled_str(theme, out, ThemeStyle::Boolean, &mut count, if *b { "true" } else { "false" })?,
            Scalar::Char(c) => styled(theme, out, ThemeStyle::Scalar, &mut count, |out| write!(out, "'{c}'"))?,
            other => styled(theme, out, ThemeStyle::Scalar, &mut count, |out| other.render(out, format, provider))?,
        }
        Ok(count)
    }
}

impl ThemedValueFormatter for ThemedDisplayFormatter {
    fn format(
        &self,
        theme: &dyn ConsoleTheme,
        value: &PropertyValue,
        out: &mut dyn Write,
        format: Option<&str>,
        _literal_top_level: bool,
    ) -> Result<usize, fmt::Error> {
        self.visit(theme, value, out, format)
    }
}

/// Single-line JSON with `": "` and `", "` separators. Top-level scalars
/// under the literal flag use the display form.
#[derive(Clone, Default)]
pub struct ThemedJsonFormatter {
    display: ThemedDisplayFormatter,
}

impl ThemedJsonFormatter {
    pub fn new(provider: Option<Arc<dyn FormatProvider>>) -> Self {
        Self {
            display: ThemedDisplayFormatter::new(provider),
        }
    }

    fn visit(&self, theme: &dyn ConsoleTheme, value: &PropertyValue, out: &mut dyn Write) -> Result<usize, fmt::Error> {
        let mut count = 0;
        match value {
            PropertyValue::Scalar(scalar) => return format_json_literal(theme, scalar, out),
            PropertyValue::Sequence(elements) => {
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, ", ")?;
                    }
                    count += self.visit(theme, element, out)?;
                }
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "]")?;
            }
            PropertyValue::Structure(structure) => {
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "{")?;
                let mut delim = "";
                for property in &structure.properties {
                    if !delim.is_empty() {
                        styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, delim)?;
                    }
                    delim = ", ";
                    styled(theme, out, ThemeStyle::Name, &mut count, |out| write_quoted_json_string(out, &property.name))?;
                    styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, ": ")?;
                    count += self.visit(theme, &property.value, out)?;
                }
                if let Some(tag) = &structure.type_tag {
                    if !delim.is_empty() {
                        styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, delim)?;
                    }
                    styled(theme, out, ThemeStyle::Name, &mut count, |out| write_quoted_json_string(out, TYPE_TAG))?;
                    styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, ": ")?;
                    styled(theme, out, ThemeStyle::String, &mut count, |out| write_quoted_json_string(out, tag))?;
                }
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "}")?;
            }
            PropertyValue::Dictionary(dictionary) => {
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "{")?;
                for (i, (key, value)) in dictionary.entries.iter().enumerate() {
                    if i > 0 {
                        styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, ", ")?;
                    }
                    let style = match key {
                        Scalar::Null => ThemeStyle::Null,
                        Scalar::String(_) => ThemeStyle::String,
                        _ => ThemeStyle::Scalar,
                    };
                    styled(theme, out, style, &mut count, |out| write_quoted_json_string(out, &key.to_plain_string()))?;
                    styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, ": ")?;
                    count += self.visit(theme, value, out)?;
                }
                styled_str(theme, out, ThemeStyle::TertiaryText, &mut count, "}")?;
            }
        }
        Ok(count)
    }
}

impl ThemedValueFormatter for ThemedJsonFormatter {
    fn format(
        &self,
        theme: &dyn ConsoleTheme,
        value: &PropertyValue,
        out: &mut dyn Write,
        format: Option<&str>,
        literal_top_level: bool,
    ) -> Result<usize, fmt::Error> {
        match value {
            PropertyValue::Scalar(scalar) if literal_top_level => self.display.format_literal(theme, scalar, out, format),
            _ => self.visit(theme, value, out),
        }
    }
}

fn format_json_literal(theme: &dyn ConsoleTheme, scalar: &Scalar, out: &mut dyn Write) -> Result<usize, fmt::Error> {
    let style = match scalar {
        Scalar::Null => ThemeStyle::Null,
        Scalar::String(_) => ThemeStyle::String,
        s if s.is_number() => ThemeStyle::Number,
        Scalar::Bool(_) => ThemeStyle::Boolean,
        _ => ThemeStyle::Scalar,
    };
    let mut count = 0;
    styled(theme, out, style, &mut count, |out| json::write_scalar(out, scalar))?;
    Ok(count)
}
