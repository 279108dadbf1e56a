//! Plain-text rendering of message templates.

use std::fmt::{self, Write};

use once_cell::sync::Lazy;
use plume_template::{MessageTemplate, PropertyToken, Token};

use crate::events::{PropertyMap, PropertyValue, Scalar};
use crate::format::buffer::ScratchBuffer;
use crate::format::json::JsonValueFormatter;
use crate::format::padding;
use crate::format::provider::FormatProvider;

/// Structure tags in message JSON use `$type`.
pub(crate) static MESSAGE_JSON: Lazy<JsonValueFormatter> = Lazy::new(|| JsonValueFormatter::new("$type"));

/// Rendering flags from a format string such as `lj`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatFlags {
    /// `l`: string scalars are written without quotes.
    pub literal: bool,
    /// `j`: values without their own format are written as JSON.
    pub json: bool,
}

impl FormatFlags {
    pub fn parse(format: Option<&str>) -> Self {
        let mut flags = Self::default();
        for c in format.unwrap_or("").chars() {
            match c {
                'l' => flags.literal = true,
                'j' => flags.json = true,
                _ => {}
            }
        }
        flags
    }
}

/// Renders `template` against `properties`.
///
/// `format` carries [`FormatFlags`]. Properties missing from the map are
/// written as their raw source text, so `{Foo}` stays visible.
///
/// ```rust
/// use plume::format::render_message;
/// use plume::{PropertyMap, PropertyValue};
/// use plume_template::parse;
///
/// let mut props = PropertyMap::new();
/// props.insert("User".into(), PropertyValue::from("ada"));
///
/// let mut out = String::new();
/// render_message(&parse("Hi {User}, {Missing}"), &props, &mut out, None, None).unwrap();
/// assert_eq!(out, r#"Hi "ada", {Missing}"#);
/// ```
pub fn render_message(
    template: &MessageTemplate,
    properties: &PropertyMap,
    out: &mut dyn Write,
    format: Option<&str>,
    provider: Option<&dyn FormatProvider>,
) -> fmt::Result {
    let flags = FormatFlags::parse(format);
    for token in template.tokens() {
        match token {
            Token::Text(text) => out.write_str(text)?,
            Token::Property(pt) => render_property_token(pt, properties, out, flags, provider)?,
        }
    }
    Ok(())
}

fn render_property_token(
    pt: &PropertyToken,
    properties: &PropertyMap,
    out: &mut dyn Write,
    flags: FormatFlags,
    provider: Option<&dyn FormatProvider>,
) -> fmt::Result {
    let Some(value) = properties.get(pt.name()) else {
        return out.write_str(pt.raw_text());
    };

    match pt.alignment() {
        None => render_value(value, flags, out, pt.format(), provider),
        Some(alignment) => {
            let mut buf = ScratchBuffer::take();
            render_value(value, flags, &mut *buf, pt.format(), provider)?;
            padding::apply(out, &buf, Some(alignment))
        }
    }
}

pub(crate) fn render_value(
    value: &PropertyValue,
    flags: FormatFlags,
    out: &mut dyn Write,
    format: Option<&str>,
    provider: Option<&dyn FormatProvider>,
) -> fmt::Result {
    if flags.literal {
        if let PropertyValue::Scalar(Scalar::String(s)) = value {
            return out.write_str(s);
        }
    }
    if flags.json && format.is_none() {
        return MESSAGE_JSON.format(value, out);
    }
    value.render(out, format, provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Property, StructureValue};
    use plume_template::parse;

    fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn render(template: &str, properties: &PropertyMap, format: Option<&str>) -> String {
        let mut out = String::new();
        render_message(&parse(template), properties, &mut out, format, None).unwrap();
        out
    }

    #[test]
    fn test_missing_property_renders_raw_text() {
        assert_eq!(render("{Foo}", &PropertyMap::new(), None), "{Foo}");
        assert_eq!(render("{Foo,10:x}", &PropertyMap::new(), None), "{Foo,10:x}");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(render("{{literal}} }}", &PropertyMap::new(), None), "{literal} }");
    }

    #[test]
    fn test_strings_quoted_unless_literal() {
        let p = props(&[("Name", "ada".into())]);
        assert_eq!(render("Hi {Name}", &p, None), r#"Hi "ada""#);
        assert_eq!(render("Hi {Name}", &p, Some("l")), "Hi ada");
        assert_eq!(render("Hi {Name:l}", &p, None), "Hi ada");
    }

    #[test]
    fn test_alignment() {
        let p = props(&[("V", "ab".into())]);
        assert_eq!(render("[{V,6}]", &p, Some("l")), "[    ab]");
        assert_eq!(render("[{V,-6}]", &p, Some("l")), "[ab    ]");
        assert_eq!(render("[{V,2}]", &p, Some("l")), "[ab]");
    }

    #[test]
    fn test_token_format_applies() {
        let p = props(&[("N", 12.34567.into())]);
        assert_eq!(render("{N:F2}", &p, None), "12.35");
    }

    #[test]
    fn test_json_flag() {
        let user = StructureValue::new(Some("User".into()), vec![Property::new("Name", "ada")]);
        let p = props(&[("U", user.into()), ("S", "x".into())]);
        assert_eq!(render("{U}", &p, Some("j")), r#"{"Name":"ada","$type":"User"}"#);
        assert_eq!(render("{S}", &p, Some("j")), r#""x""#);
        assert_eq!(render("{S}", &p, Some("lj")), "x");
    }

    #[test]
    fn test_json_flag_yields_to_token_format() {
        let p = props(&[("N", 255.into())]);
        assert_eq!(render("{N:X}", &p, Some("j")), "FF");
    }

    #[test]
    fn test_positional() {
        let p = props(&[("0", 1.into()), ("1", "b".into())]);
        assert_eq!(render("{1} then {0}", &p, Some("l")), "b then 1");
    }

    #[test]
    fn test_render_is_deterministic() {
        let p = props(&[("A", 1.into()), ("B", PropertyValue::Sequence(vec![2.into(), 3.into()]))]);
        let first = render("{A,-4}|{B}|{C}", &p, None);
        let second = render("{A,-4}|{B}|{C}", &p, None);
        assert_eq!(first, second);
        assert_eq!(first, "1   |[2, 3]|{C}");
    }
}
