//! JSON rendering of structured values.

use std::fmt::{self, Write};

use crate::events::{PropertyValue, Scalar};
use crate::format::scalar;

/// Default key under which structure type tags are written.
pub const DEFAULT_TYPE_TAG_NAME: &str = "_typeTag";

/// Writes [`PropertyValue`]s as compact JSON.
///
/// ```rust
/// use plume::format::JsonValueFormatter;
/// use plume::{Property, PropertyValue, StructureValue};
///
/// let value = PropertyValue::Structure(StructureValue::new(
///     Some("Point".into()),
///     vec![Property::new("X", 1), Property::new("Y", 2.5)],
/// ));
/// let mut out = String::new();
/// JsonValueFormatter::new("$type").format(&value, &mut out).unwrap();
/// assert_eq!(out, r#"{"X":1,"Y":2.5,"$type":"Point"}"#);
/// ```
#[derive(Clone, Debug)]
pub struct JsonValueFormatter {
    type_tag_name: String,
}

impl Default for JsonValueFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_TAG_NAME)
    }
}

impl JsonValueFormatter {
    pub fn new(type_tag_name: impl Into<String>) -> Self {
        Self {
            type_tag_name: type_tag_name.into(),
        }
    }

    pub fn type_tag_name(&self) -> &str {
        &self.type_tag_name
    }

    pub fn format(&self, value: &PropertyValue, out: &mut dyn Write) -> fmt::Result {
        match value {
            PropertyValue::Scalar(s) => write_scalar(out, s),
            PropertyValue::Sequence(elements) => {
                out.write_char('[')?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.write_char(',')?;
                    }
                    self.format(element, out)?;
                }
                out.write_char(']')
            }
            PropertyValue::Structure(structure) => {
                out.write_char('{')?;
                let mut delim = "";
                for property in &structure.properties {
                    out.write_str(delim)?;
                    delim = ",";
                    write_quoted_json_string(out, &property.name)?;
                    out.write_char(':')?;
                    self.format(&property.value, out)?;
                }
                if let Some(tag) = &structure.type_tag {
                    out.write_str(delim)?;
                    write_quoted_json_string(out, &self.type_tag_name)?;
                    out.write_char(':')?;
                    write_quoted_json_string(out, tag)?;
                }
                out.write_char('}')
            }
            PropertyValue::Dictionary(dictionary) => {
                out.write_char('{')?;
                for (i, (key, value)) in dictionary.entries.iter().enumerate() {
                    if i > 0 {
                        out.write_char(',')?;
                    }
                    write_quoted_json_string(out, &key.to_plain_string())?;
                    out.write_char(':')?;
                    self.format(value, out)?;
                }
                out.write_char('}')
            }
        }
    }
}

/// Writes a scalar as a JSON literal.
pub fn write_scalar(out: &mut dyn Write, value: &Scalar) -> fmt::Result {
    match value {
        Scalar::Null => out.write_str("null"),
        Scalar::Bool(b) => out.write_str(if *b { "true" } else { "false" }),
        Scalar::I64(_) | Scalar::U64(_) | Scalar::I128(_) | Scalar::U128(_) => scalar::write_default(out, value),
        Scalar::F32(v) if v.is_finite() => write!(out, "{v}"),
        Scalar::F64(v) if v.is_finite() => write!(out, "{v}"),
        Scalar::String(s) | Scalar::Enum(s) | Scalar::Other(s) => write_quoted_json_string(out, s),
        Scalar::DateTime(dt) => write!(out, "\"{}\"", dt.to_rfc3339()),
        Scalar::NaiveDateTime(dt) => write!(out, "\"{}\"", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        Scalar::Date(d) => write!(out, "\"{}\"", d.format("%Y-%m-%d")),
        Scalar::Time(t) => write!(out, "\"{}\"", t.format("%H:%M:%S%.f")),
        // Non-finite floats, chars and durations have no JSON literal.
        Scalar::F32(_) | Scalar::F64(_) | Scalar::Char(_) | Scalar::Duration(_) => {
            write_quoted_json_string(out, &value.to_plain_string())
        }
    }
}

/// Writes `s` as a JSON string. Only `"`, `\` and control characters are
/// escaped.
pub fn write_quoted_json_string(out: &mut dyn Write, s: &str) -> fmt::Result {
    out.write_char('"')?;
    let mut run_start = 0;
    for (i, c) in s.char_indices() {
        let escape: Option<&str> = match c {
            '"' => Some("\\\""),
            '\\' => Some("\\\\"),
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\u{0c}' => Some("\\f"),
            '\t' => Some("\\t"),
            c if (c as u32) < 0x20 => None,
            _ => continue,
        };
        out.write_str(&s[run_start..i])?;
        match escape {
            Some(e) => out.write_str(e)?,
            None => write!(out, "\\u{:04X}", c as u32)?,
        }
        run_start = i + c.len_utf8();
    }
    out.write_str(&s[run_start..])?;
    out.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DictionaryValue, Property, StructureValue};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::time::Duration;

    fn json(value: impl Into<PropertyValue>) -> String {
        let mut out = String::new();
        JsonValueFormatter::default().format(&value.into(), &mut out).unwrap();
        out
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(json("a\"b\nc"), r#""a\"b\nc""#);
        assert_eq!(json("tab\there\\"), r#""tab\there\\""#);
        assert_eq!(json("\u{01}\u{1f}"), r#""\u0001\u001F""#);
        assert_eq!(json("\u{0c}\r"), r#""\f\r""#);
    }

    #[test]
    fn test_non_ascii_untouched() {
        assert_eq!(json("héllo </script> ✓"), "\"héllo </script> ✓\"");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(json(42), "42");
        assert_eq!(json(-1i64), "-1");
        assert_eq!(json(u128::MAX), u128::MAX.to_string());
        assert_eq!(json(0.1), "0.1");
        assert_eq!(json(1e21), "1000000000000000000000");
        assert_eq!(json(2.5f32), "2.5");
    }

    #[test]
    fn test_non_finite_floats_are_strings() {
        assert_eq!(json(f64::NAN), r#""NaN""#);
        assert_eq!(json(f64::INFINITY), r#""Infinity""#);
        assert_eq!(json(f32::NEG_INFINITY), r#""-Infinity""#);
    }

    #[test]
    fn test_other_scalars() {
        assert_eq!(json(true), "true");
        assert_eq!(json(PropertyValue::NULL), "null");
        assert_eq!(json('x'), r#""x""#);
        assert_eq!(json(Scalar::Enum("Red".into())), r#""Red""#);
        assert_eq!(json(Duration::from_secs(61)), r#""00:01:01""#);
    }

    #[test]
    fn test_dates_are_iso() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(json(dt), r#""2024-01-02T03:04:05+00:00""#);
        assert_eq!(json(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), r#""2024-01-02""#);
    }

    #[test]
    fn test_sequence() {
        assert_eq!(json(PropertyValue::Sequence(vec![1.into(), "a".into()])), r#"[1,"a"]"#);
    }

    #[test]
    fn test_structure_type_tag() {
        let tagged = StructureValue::new(Some("User".into()), vec![Property::new("Id", 7)]);
        assert_eq!(json(tagged.clone()), r#"{"Id":7,"_typeTag":"User"}"#);

        let mut out = String::new();
        JsonValueFormatter::new("$type").format(&tagged.into(), &mut out).unwrap();
        assert_eq!(out, r#"{"Id":7,"$type":"User"}"#);

        let untagged = StructureValue::new(None, vec![Property::new("Id", 7)]);
        assert_eq!(json(untagged), r#"{"Id":7}"#);

        let empty_tagged = StructureValue::new(Some("Empty".into()), vec![]);
        assert_eq!(json(empty_tagged), r#"{"_typeTag":"Empty"}"#);
    }

    #[test]
    fn test_dictionary_keys_become_strings() {
        let dict = DictionaryValue::new(vec![(Scalar::from(1), "one".into()), (Scalar::from(true), 2.into())]);
        assert_eq!(json(dict), r#"{"1":"one","true":2}"#);
    }
}
