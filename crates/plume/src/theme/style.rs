use std::fmt;

use serde::{Deserialize, Serialize};

/// The spans a console theme can style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeStyle {
    /// Message template text.
    Text,
    /// Timestamps, exception detail lines and event properties.
    SecondaryText,
    /// Output template text.
    TertiaryText,
    /// Template properties with no matching value.
    Invalid,
    Null,
    /// Structure property names.
    Name,
    String,
    Number,
    Boolean,
    /// Any other scalar.
    Scalar,
    LevelVerbose,
    LevelDebug,
    LevelInformation,
    LevelWarning,
    LevelError,
    LevelFatal,
}

impl ThemeStyle {
    pub const ALL: [ThemeStyle; 16] = [
        ThemeStyle::Text,
        ThemeStyle::SecondaryText,
        ThemeStyle::TertiaryText,
        ThemeStyle::Invalid,
        ThemeStyle::Null,
        ThemeStyle::Name,
        ThemeStyle::String,
        ThemeStyle::Number,
        ThemeStyle::Boolean,
        ThemeStyle::Scalar,
        ThemeStyle::LevelVerbose,
        ThemeStyle::LevelDebug,
        ThemeStyle::LevelInformation,
        ThemeStyle::LevelWarning,
        ThemeStyle::LevelError,
        ThemeStyle::LevelFatal,
    ];

    /// The configuration key, as accepted in theme maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeStyle::Text => "text",
            ThemeStyle::SecondaryText => "secondary_text",
            ThemeStyle::TertiaryText => "tertiary_text",
            ThemeStyle::Invalid => "invalid",
            ThemeStyle::Null => "null",
            ThemeStyle::Name => "name",
            ThemeStyle::String => "string",
            ThemeStyle::Number => "number",
            ThemeStyle::Boolean => "boolean",
            ThemeStyle::Scalar => "scalar",
            ThemeStyle::LevelVerbose => "level_verbose",
            ThemeStyle::LevelDebug => "level_debug",
            ThemeStyle::LevelInformation => "level_information",
            ThemeStyle::LevelWarning => "level_warning",
            ThemeStyle::LevelError => "level_error",
            ThemeStyle::LevelFatal => "level_fatal",
        }
    }
}

impl fmt::Display for ThemeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match_serde_names() {
        for style in ThemeStyle::ALL {
            let yaml = serde_yaml::to_string(&style).unwrap();
            assert_eq!(yaml.trim().trim_matches('\''), style.as_str());
            let parsed: ThemeStyle = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(parsed, style);
        }
    }

    #[test]
    fn test_keyword_named_key_parses_bare_or_quoted() {
        for yaml in ["null: red\n", "'null': red\n"] {
            let map: std::collections::BTreeMap<ThemeStyle, String> = serde_yaml::from_str(yaml).unwrap();
            assert_eq!(map.get(&ThemeStyle::Null).map(String::as_str), Some("red"));
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(serde_yaml::from_str::<ThemeStyle>("sparkly").is_err());
    }
}
