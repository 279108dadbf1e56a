//! Formatter configuration.
//!
//! Options can be built in code or loaded from YAML:
//!
//! ```rust
//! use plume::config::FormatterOptions;
//! use plume::theme::ThemeStyle;
//!
//! let options = FormatterOptions::from_yaml(r#"
//! output_template: "{Level:u3} {Message:lj}{NewLine}"
//! use_utc_timestamp: true
//! max_collection_count: 20
//! theme:
//!   level_error: red.bold
//!   string: cyan
//! "#).unwrap();
//!
//! assert!(options.use_utc_timestamp);
//! assert_eq!(options.theme.unwrap()[&ThemeStyle::LevelError], "red.bold");
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capture::{ConverterBuilder, PropertyValueConverter};
use crate::error::ConfigError;
use crate::render::DEFAULT_OUTPUT_TEMPLATE;
use crate::theme::{AnsiTheme, ConsoleTheme, EmptyTheme, ThemeStyle};

/// Settings for [`ConsoleFormatter`](crate::ConsoleFormatter).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterOptions {
    /// Layout of each rendered line.
    pub output_template: String,

    /// Stamp events with UTC instead of the local offset.
    pub use_utc_timestamp: bool,

    pub max_destructuring_depth: usize,

    /// Longer strings are cut to this many characters, ending in `…`.
    pub max_string_length: Option<usize>,

    /// Sequences and dictionaries keep at most this many elements.
    pub max_collection_count: Option<usize>,

    /// Fail the event when a property accessor fails, instead of recording
    /// a placeholder.
    pub propagate_capture_errors: bool,

    /// Console style per theme slot, as dotted style strings (`red.bold`,
    /// `on_blue`, `208`) or raw escape sequences. `None` renders plain.
    pub theme: Option<BTreeMap<ThemeStyle, String>>,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            use_utc_timestamp: false,
            max_destructuring_depth: 10,
            max_string_length: None,
            max_collection_count: None,
            propagate_capture_errors: false,
            theme: None,
        }
    }
}

impl FormatterOptions {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// A converter builder carrying these limits. Callers can register
    /// types and policies before building.
    pub fn converter_builder(&self) -> ConverterBuilder {
        let mut builder = PropertyValueConverter::builder()
            .max_depth(self.max_destructuring_depth)
            .propagate_errors(self.propagate_capture_errors);
        if let Some(length) = self.max_string_length {
            builder = builder.max_string_length(length);
        }
        if let Some(count) = self.max_collection_count {
            builder = builder.max_collection_count(count);
        }
        builder
    }

    pub fn build_converter(&self) -> Result<PropertyValueConverter, ConfigError> {
        self.converter_builder().build()
    }

    pub fn build_theme(&self) -> Result<Arc<dyn ConsoleTheme>, ConfigError> {
        Ok(match &self.theme {
            Some(styles) => Arc::new(AnsiTheme::from_dotted(styles.iter().map(|(k, v)| (*k, v)))?),
            None => Arc::new(EmptyTheme),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = FormatterOptions::default();
        assert_eq!(options.output_template, DEFAULT_OUTPUT_TEMPLATE);
        assert_eq!(options.max_destructuring_depth, 10);
        assert!(options.theme.is_none());

        let converter = options.build_converter().unwrap();
        assert_eq!(converter.max_depth(), 10);
        assert_eq!(converter.max_string_length(), usize::MAX);
        assert!(options.build_theme().unwrap().can_buffer());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let options = FormatterOptions::from_yaml("max_string_length: 8\n").unwrap();
        assert_eq!(options.max_string_length, Some(8));
        assert_eq!(options.output_template, DEFAULT_OUTPUT_TEMPLATE);
        assert!(!options.use_utc_timestamp);
        assert_eq!(options.build_converter().unwrap().max_string_length(), 8);
    }

    #[test]
    fn test_empty_document() {
        let options = FormatterOptions::from_yaml("{}").unwrap();
        assert_eq!(options, FormatterOptions::default());
    }

    #[test]
    fn test_unknown_theme_slot_rejected() {
        let result = FormatterOptions::from_yaml("theme:\n  not_a_slot: red\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_invalid_limits_rejected_at_build() {
        let options = FormatterOptions::from_yaml("max_collection_count: 0\n").unwrap();
        let err = options.build_converter().unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "max_collection_count", .. }));
    }

    #[test]
    fn test_invalid_style_rejected_at_build() {
        let options = FormatterOptions::from_yaml("theme:\n  string: sparkly\n").unwrap();
        assert!(matches!(options.build_theme(), Err(ConfigError::InvalidStyle { .. })));
    }

    #[test]
    fn test_theme_escapes() {
        let options = FormatterOptions::from_yaml("theme:\n  number: red\n").unwrap();
        let theme = options.build_theme().unwrap();
        let mut out = String::new();
        let written = theme.set(&mut out, ThemeStyle::Number).unwrap();
        assert_eq!(out, "\x1b[31m");
        assert_eq!(written, 5);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "use_utc_timestamp: true").unwrap();
        writeln!(file, "output_template: \"{{Message}}\"").unwrap();
        let options = FormatterOptions::from_file(file.path()).unwrap();
        assert!(options.use_utc_timestamp);
        assert_eq!(options.output_template, "{Message}");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FormatterOptions::from_file(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_serialize_roundtrip_through_yaml() {
        let mut options = FormatterOptions::default();
        options.theme = Some([(ThemeStyle::Text, "white".to_string())].into_iter().collect());
        let yaml = serde_yaml::to_string(&options).unwrap();
        assert!(yaml.contains("text: white"));
        assert_eq!(FormatterOptions::from_yaml(&yaml).unwrap(), options);
    }
}
