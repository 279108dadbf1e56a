use std::collections::HashMap;
use std::fmt::{self, Write};

use console::Style;

use super::{ConsoleTheme, ThemeStyle};
use crate::error::ConfigError;

pub const ANSI_RESET: &str = "\x1b[0m";

/// Placeholder styled by `console` to recover the escape prefix of a style.
const SENTINEL: &str = "\u{0}";

/// A theme of raw ANSI escape sequences.
///
/// Styles without an entry are written unstyled; the reset sequence is
/// written after every span regardless.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnsiTheme {
    styles: HashMap<ThemeStyle, String>,
}

impl AnsiTheme {
    /// Builds a theme from raw escape sequences.
    pub fn new<I, S>(styles: I) -> Self
    where
        I: IntoIterator<Item = (ThemeStyle, S)>,
        S: Into<String>,
    {
        Self {
            styles: styles.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }

    /// Builds a theme from `console` dotted style strings such as
    /// `"cyan.bold"` or `"black.on_yellow"`.
    pub fn from_dotted<I, S>(styles: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (ThemeStyle, S)>,
        S: AsRef<str>,
    {
        let styles = styles
            .into_iter()
            .map(|(k, v)| Ok((k, parse_style(v.as_ref())?)))
            .collect::<Result<_, ConfigError>>()?;
        Ok(Self { styles })
    }

    /// Adds or replaces one style.
    pub fn with(mut self, style: ThemeStyle, console_style: &Style) -> Self {
        self.styles.insert(style, escape_prefix(console_style));
        self
    }

    pub fn escape(&self, style: ThemeStyle) -> Option<&str> {
        self.styles.get(&style).map(String::as_str)
    }
}

impl ConsoleTheme for AnsiTheme {
    fn can_buffer(&self) -> bool {
        true
    }

    fn set(&self, out: &mut dyn Write, style: ThemeStyle) -> Result<usize, fmt::Error> {
        match self.styles.get(&style) {
            Some(escape) => {
                out.write_str(escape)?;
                Ok(escape.chars().count())
            }
            None => Ok(0),
        }
    }

    fn reset(&self, out: &mut dyn Write) -> fmt::Result {
        out.write_str(ANSI_RESET)
    }

    fn reset_char_count(&self) -> usize {
        ANSI_RESET.len()
    }
}

/// Accepts a raw escape sequence, the empty string (unstyled), or a dotted
/// `console` style whose every part is recognised.
pub(crate) fn parse_style(spec: &str) -> Result<String, ConfigError> {
    if spec.is_empty() || spec.starts_with('\x1b') {
        return Ok(spec.to_string());
    }
    for part in spec.split('.') {
        if escape_prefix(&Style::from_dotted_str(part)).is_empty() {
            return Err(ConfigError::InvalidStyle {
                style: spec.to_string(),
                reason: format!("unknown attribute `{part}`"),
            });
        }
    }
    Ok(escape_prefix(&Style::from_dotted_str(spec)))
}

fn escape_prefix(style: &Style) -> String {
    let rendered = style.clone().force_styling(true).apply_to(SENTINEL).to_string();
    match rendered.split_once(SENTINEL) {
        Some((prefix, _)) => prefix.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_returns_escape_length() {
        let theme = AnsiTheme::new([(ThemeStyle::Number, "\x1b[35m")]);
        let mut out = String::new();
        assert_eq!(theme.set(&mut out, ThemeStyle::Number).unwrap(), 5);
        assert_eq!(theme.set(&mut out, ThemeStyle::Null).unwrap(), 0);
        assert_eq!(out, "\x1b[35m");
        assert_eq!(theme.reset_char_count(), 4);
    }

    #[test]
    fn test_dotted_styles() {
        assert_eq!(parse_style("red").unwrap(), "\x1b[31m");
        assert!(parse_style("red.bold").unwrap().starts_with("\x1b[31m"));
        assert!(parse_style("red.bold").unwrap().contains("\x1b[1m"));
        assert_eq!(parse_style("208").unwrap(), "\x1b[38;5;208m");
    }

    #[test]
    fn test_raw_and_empty_styles_pass_through() {
        assert_eq!(parse_style("\x1b[30;1m").unwrap(), "\x1b[30;1m");
        assert_eq!(parse_style("").unwrap(), "");
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let err = parse_style("red.sparkly").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStyle { ref reason, .. } if reason.contains("sparkly")));
    }

    #[test]
    fn test_with_console_style() {
        let theme = AnsiTheme::default().with(ThemeStyle::Name, &Style::new().green());
        assert_eq!(theme.escape(ThemeStyle::Name), Some("\x1b[32m"));
        assert_eq!(theme.escape(ThemeStyle::Text), None);
    }
}
