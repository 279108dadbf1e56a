//! Themed rendering of message templates.

use std::fmt::{self, Write};
use std::sync::Arc;

use plume_template::{Alignment, AlignmentDirection, MessageTemplate, PropertyToken, Token};

use super::value::{ThemedDisplayFormatter, ThemedJsonFormatter, ThemedValueFormatter};
use crate::events::{PropertyMap, PropertyValue, Scalar};
use crate::format::{padding, FormatFlags, FormatProvider, ScratchBuffer};
use crate::theme::{styled_str, ConsoleTheme, EmptyTheme, ThemeStyle};

/// Renders message templates through a theme, keeping alignment correct
/// on visible width.
pub struct ThemedMessageRenderer {
    formatter: Box<dyn ThemedValueFormatter>,
    literal: bool,
}

impl ThemedMessageRenderer {
    /// `flags` select literal strings (`l`) and the JSON value form (`j`).
    pub fn new(flags: FormatFlags, provider: Option<Arc<dyn FormatProvider>>) -> Self {
        let formatter: Box<dyn ThemedValueFormatter> = if flags.json {
            Box::new(ThemedJsonFormatter::new(provider))
        } else {
            Box::new(ThemedDisplayFormatter::new(provider))
        };
        Self {
            formatter,
            literal: flags.literal,
        }
    }

    /// Writes the rendered template and returns the invisible character
    /// count.
    pub fn render(
        &self,
        theme: &dyn ConsoleTheme,
        template: &MessageTemplate,
        properties: &PropertyMap,
        out: &mut dyn Write,
    ) -> Result<usize, fmt::Error> {
        let mut count = 0;
        for token in template.tokens() {
            match token {
                Token::Text(text) => styled_str(theme, out, ThemeStyle::Text, &mut count, text)?,
                Token::Property(pt) => count += self.render_property_token(theme, pt, properties, out)?,
            }
        }
        Ok(count)
    }

    fn render_property_token(
        &self,
        theme: &dyn ConsoleTheme,
        pt: &PropertyToken,
        properties: &PropertyMap,
        out: &mut dyn Write,
    ) -> Result<usize, fmt::Error> {
        let Some(value) = properties.get(pt.name()) else {
            let mut count = 0;
            styled_str(theme, out, ThemeStyle::Invalid, &mut count, pt.raw_text())?;
            return Ok(count);
        };

        let Some(alignment) = pt.alignment() else {
            return self.render_value(theme, value, out, pt.format());
        };

        if !theme.can_buffer() {
            return self.render_aligned_unbuffered(theme, pt.format(), alignment, value, out);
        }

        let mut buf = ScratchBuffer::take();
        let invisible = self.render_value(theme, value, &mut *buf, pt.format())?;
        let visible = buf.chars().count().saturating_sub(invisible);
        if visible >= alignment.width {
            out.write_str(&buf)?;
        } else {
            padding::apply(out, &buf, Some(alignment.widen(invisible)))?;
        }
        Ok(invisible)
    }

    /// Measures an unstyled rendering, then writes the styled one with
    /// padding around it.
    fn render_aligned_unbuffered(
        &self,
        theme: &dyn ConsoleTheme,
        format: Option<&str>,
        alignment: Alignment,
        value: &PropertyValue,
        out: &mut dyn Write,
    ) -> Result<usize, fmt::Error> {
        let len = {
            let mut measure = ScratchBuffer::take();
            self.render_value(&EmptyTheme, value, &mut *measure, format)?;
            measure.chars().count()
        };
        if len >= alignment.width {
            return self.render_value(theme, value, out, format);
        }
        let pad = alignment.width - len;
        match alignment.direction {
            AlignmentDirection::Left => {
                let invisible = self.render_value(theme, value, out, format)?;
                padding::write_spaces(out, pad)?;
                Ok(invisible)
            }
            AlignmentDirection::Right => {
                padding::write_spaces(out, pad)?;
                self.render_value(theme, value, out, format)
            }
        }
    }

    fn render_value(&self, theme: &dyn ConsoleTheme, value: &PropertyValue, out: &mut dyn Write, format: Option<&str>) -> Result<usize, fmt::Error> {
        if self.literal {
            if let PropertyValue::Scalar(Scalar::String(s)) = value {
                let mut count = 0;
                styled_str(theme, out, ThemeStyle::String, &mut count, s)?;
                return Ok(count);
            }
        }
        self.formatter.format(theme, value, out, format, self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Property, StructureValue};
    use crate::theme::AnsiTheme;
    use plume_template::parse;

    /// Drives the terminal out of band, so output cannot be buffered.
    #[derive(Debug)]
    struct UnbufferedTheme(AnsiTheme);

    impl ConsoleTheme for UnbufferedTheme {
        fn can_buffer(&self) -> bool {
            false
        }
        fn set(&self, out: &mut dyn Write, style: ThemeStyle) -> Result<usize, fmt::Error> {
            self.0.set(out, style)
        }
        fn reset(&self, out: &mut dyn Write) -> fmt::Result {
            self.0.reset(out)
        }
        fn reset_char_count(&self) -> usize {
            self.0.reset_char_count()
        }
    }

    fn ansi() -> AnsiTheme {
        AnsiTheme::new([
            (ThemeStyle::Text, "\x1b[37m"),
            (ThemeStyle::String, "\x1b[36m"),
            (ThemeStyle::Number, "\x1b[35m"),
            (ThemeStyle::Invalid, "\x1b[33;1m"),
        ])
    }

    fn props() -> PropertyMap {
        [
            ("User".to_string(), PropertyValue::from("ada")),
            ("Count".to_string(), PropertyValue::from(7)),
            (
                "Point".to_string(),
                StructureValue::new(Some("Point".into()), vec![Property::new("X", 1)]).into(),
            ),
        ]
        .into_iter()
        .collect()
    }

    fn render(theme: &dyn ConsoleTheme, flags: &str, template: &str) -> (String, usize) {
        let renderer = ThemedMessageRenderer::new(FormatFlags::parse(Some(flags)), None);
        let mut out = String::new();
        let invisible = renderer.render(theme, &parse(template), &props(), &mut out).unwrap();
        (out, invisible)
    }

    fn strip(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_plain_theme_output() {
        let (out, invisible) = render(&EmptyTheme, "", "Hi {User}, {Count} {Missing}");
        assert_eq!(out, r#"Hi "ada", 7 {Missing}"#);
        assert_eq!(invisible, 0);
    }

    #[test]
    fn test_literal_and_json_flags() {
        assert_eq!(render(&EmptyTheme, "l", "{User}").0, "ada");
        assert_eq!(render(&EmptyTheme, "j", "{Point}").0, r#"{"X": 1, "$type": "Point"}"#);
        assert_eq!(render(&EmptyTheme, "", "{Point}").0, "Point {X=1}");
    }

    #[test]
    fn test_styled_spans() {
        let (out, invisible) = render(&ansi(), "l", "Hi {User}");
        assert_eq!(out, "\x1b[37mHi \x1b[0m\x1b[36mada\x1b[0m");
        assert_eq!(invisible, out.chars().count() - "Hi ada".len());
    }

    #[test]
    fn test_missing_property_styled_invalid() {
        let (out, _) = render(&ansi(), "", "{Missing,5}");
        assert_eq!(out, "\x1b[33;1m{Missing,5}\x1b[0m");
    }

    #[test]
    fn test_aligned_visible_width_matches_plain() {
        for template in ["[{User,8}]", "[{User,-8}]", "[{Count,4}]", "[{Count,-4}]", "[{User,2}]"] {
            let (plain, _) = render(&EmptyTheme, "", template);
            let (themed, invisible) = render(&ansi(), "", template);
            assert_eq!(strip(&themed), plain, "{template}");
            assert_eq!(themed.chars().count() - invisible, plain.chars().count(), "{template}");
        }
    }

    #[test]
    fn test_unbuffered_alignment() {
        let theme = UnbufferedTheme(ansi());
        for template in ["[{User,8}]", "[{User,-8}]", "[{User,2}]"] {
            let (plain, _) = render(&EmptyTheme, "", template);
            let (themed, _) = render(&theme, "", template);
            assert_eq!(strip(&themed), plain, "{template}");
        }
        let (themed, _) = render(&theme, "", "{User,-7}|");
        assert!(themed.contains("\x1b[36m\"ada\"\x1b[0m  \x1b[37m|"));
    }
}
