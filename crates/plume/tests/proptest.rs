//! Property-based tests for capture limits and rendering.

use chrono::{DateTime, FixedOffset};
use plume::capture::PropertyValueConverter;
use plume::{ConsoleFormatter, Destructuring, FormatterOptions, Level, LogEntry, PropertyValue, Scalar};
use proptest::prelude::*;

// =============================================================================
// Helpers
// =============================================================================

fn ts() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00+00:00").unwrap()
}

fn strip_ansi(s: &str) -> String {
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

fn themed_options(output_template: &str) -> FormatterOptions {
    FormatterOptions::from_yaml(&format!(
        "output_template: '{output_template}'\ntheme:\n  text: white\n  string: cyan.bold\n  number: magenta\n  name: blue\n  tertiary_text: '90'\n  secondary_text: dim\n  level_information: green\n"
    ))
    .unwrap()
}

// =============================================================================
// Strategies
// =============================================================================

fn template_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-z ]{1,6}",
            Just("{A}".to_string()),
            Just("{B,-7}".to_string()),
            Just("{A,5}".to_string()),
            Just("{B:l}".to_string()),
            Just("{Missing}".to_string()),
            Just("{{".to_string()),
            Just("{bad".to_string()),
        ],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn sequences_respect_collection_limit(len in 0usize..50, limit in 1usize..20) {
        let converter = PropertyValueConverter::builder().max_collection_count(limit).build().unwrap();
        let values: Vec<usize> = (0..len).collect();
        let captured = converter.capture(&values, Destructuring::Default).unwrap();
        let PropertyValue::Sequence(elements) = captured else {
            panic!("expected a sequence");
        };
        prop_assert_eq!(elements.len(), len.min(limit));
    }

    #[test]
    fn strings_respect_length_limit(text in "\\PC{0,40}", limit in 2usize..30) {
        let converter = PropertyValueConverter::builder().max_string_length(limit).build().unwrap();
        let captured = converter.capture(&text, Destructuring::Stringify).unwrap();
        let Some(Scalar::String(s)) = captured.as_scalar() else {
            panic!("expected a string");
        };
        let count = s.chars().count();
        prop_assert!(count <= limit);
        if text.chars().count() <= limit {
            prop_assert_eq!(s, &text);
        } else {
            prop_assert!(s.ends_with('…'));
        }
    }

    #[test]
    fn themed_and_plain_output_have_same_visible_text(
        template in template_text(),
        a in "[a-z]{0,8}",
        b in -1000i64..1000,
    ) {
        let output = "[{Level:u3}] {Message,-30}|{NewLine}";
        let plain = ConsoleFormatter::new(FormatterOptions {
            output_template: output.to_string(),
            ..FormatterOptions::default()
        })
        .unwrap();
        let themed = ConsoleFormatter::new(themed_options(output)).unwrap();

        let entry = LogEntry::new(Level::Information, &template)
            .property("A", &a)
            .property("B", &b)
            .timestamp(ts());

        let mut plain_out = String::new();
        plain.format(&entry, &mut plain_out).unwrap();
        let mut themed_out = String::new();
        themed.format(&entry, &mut themed_out).unwrap();

        prop_assert_eq!(strip_ansi(&themed_out), plain_out);
    }

    #[test]
    fn rendering_is_deterministic(template in template_text(), a in "[a-z]{0,8}") {
        let formatter = ConsoleFormatter::new(FormatterOptions {
            output_template: "{Message:lj} {Properties}".to_string(),
            ..FormatterOptions::default()
        })
        .unwrap();
        let entry = LogEntry::new(Level::Debug, &template).property("A", &a).property("Extra", &1).timestamp(ts());

        let mut first = String::new();
        formatter.format(&entry, &mut first).unwrap();
        let mut second = String::new();
        formatter.format(&entry, &mut second).unwrap();
        prop_assert_eq!(first, second);
    }
}
