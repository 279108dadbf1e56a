//! Newline-delimited JSON for log events.

use std::fmt::{self, Write};

use chrono::SecondsFormat;

use crate::events::{Level, LogEvent};
use crate::format::json::{write_quoted_json_string, JsonValueFormatter};

/// Writes each event as one JSON object followed by a newline.
///
/// Reserved fields come first: `@t` timestamp, `@mt` message template,
/// `@l` level (omitted for [`Level::Information`]) and `@x` exception
/// (omitted when absent). Property names starting with `@` are written
/// with a doubled `@@` so they cannot collide with reserved fields.
///
/// ```rust
/// use std::sync::Arc;
/// use chrono::DateTime;
/// use plume::format::CompactJsonFormatter;
/// use plume::{Level, LogEvent, MessageTemplate, Property};
///
/// let ts = DateTime::parse_from_rfc3339("2024-03-09T14:05:07+02:00").unwrap();
/// let template = Arc::new(MessageTemplate::parse("Disk {Volume} is full"));
/// let event = LogEvent::new(ts, Level::Warning, None, template, vec![Property::new("Volume", "/var")]).unwrap();
///
/// let mut out = String::new();
/// CompactJsonFormatter::default().format(&event, &mut out).unwrap();
/// assert_eq!(
///     out,
///     "{\"@t\":\"2024-03-09T14:05:07+02:00\",\"@mt\":\"Disk {Volume} is full\",\"@l\":\"Warning\",\"Volume\":\"/var\"}\n"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct CompactJsonFormatter {
    values: JsonValueFormatter,
}

impl Default for CompactJsonFormatter {
    fn default() -> Self {
        Self::new(JsonValueFormatter::new("$type"))
    }
}

impl CompactJsonFormatter {
    pub fn new(values: JsonValueFormatter) -> Self {
        Self { values }
    }

    pub fn format(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        out.write_str("{\"@t\":")?;
        write_quoted_json_string(out, &event.timestamp().to_rfc3339_opts(SecondsFormat::AutoSi, false))?;
        out.write_str(",\"@mt\":")?;
        write_quoted_json_string(out, event.message_template().text())?;

        if event.level() != Level::Information {
            out.write_str(",\"@l\":")?;
            write_quoted_json_string(out, event.level().as_str())?;
        }

        if let Some(text) = event.exception_text() {
            out.write_str(",\"@x\":")?;
            write_quoted_json_string(out, &text)?;
        }

        for (name, value) in event.properties() {
            out.write_char(',')?;
            if name.starts_with('@') {
                write_quoted_json_string(out, &format!("@{name}"))?;
            } else {
                write_quoted_json_string(out, name)?;
            }
            out.write_char(':')?;
            self.values.format(value, out)?;
        }

        out.write_str("}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Property, StructureValue};
    use chrono::{DateTime, FixedOffset};
    use plume_template::MessageTemplate;
    use std::sync::Arc;

    fn ts() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-09T14:05:07.250Z").unwrap()
    }

    fn json(level: Level, template: &str, props: Vec<Property>) -> String {
        let event = LogEvent::new(ts(), level, None, Arc::new(MessageTemplate::parse(template)), props).unwrap();
        let mut out = String::new();
        CompactJsonFormatter::default().format(&event, &mut out).unwrap();
        out
    }

    #[test]
    fn test_information_level_omitted() {
        let out = json(Level::Information, "Started", vec![]);
        assert_eq!(out, "{\"@t\":\"2024-03-09T14:05:07.250+00:00\",\"@mt\":\"Started\"}\n");
    }

    #[test]
    fn test_other_levels_written() {
        let out = json(Level::Debug, "x", vec![]);
        assert!(out.contains(",\"@l\":\"Debug\""), "{out}");
    }

    #[test]
    fn test_reserved_names_escaped() {
        let out = json(Level::Information, "{@mt}", vec![Property::new("@mt", 1), Property::new("User", "ada")]);
        assert!(out.ends_with(",\"@@mt\":1,\"User\":\"ada\"}\n"), "{out}");
    }

    #[test]
    fn test_structured_properties() {
        let point = StructureValue::new(Some("Point".into()), vec![Property::new("X", 1)]);
        let out = json(Level::Information, "{@P}", vec![Property::new("P", point)]);
        assert!(out.ends_with(",\"P\":{\"X\":1,\"$type\":\"Point\"}}\n"), "{out}");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection \"db\" refused")]
    struct Refused;

    #[test]
    fn test_exception_written() {
        let template = Arc::new(MessageTemplate::parse("Failed"));
        let event = LogEvent::new(ts(), Level::Error, Some(Arc::new(Refused)), template, vec![]).unwrap();
        let mut out = String::new();
        CompactJsonFormatter::default().format(&event, &mut out).unwrap();
        assert!(out.contains(",\"@l\":\"Error\",\"@x\":\"connection \\\"db\\\" refused\"}"), "{out}");
    }

    #[test]
    fn test_template_text_is_verbatim() {
        let out = json(Level::Information, "{{literal}} {A,5:x}", vec![]);
        assert!(out.contains("\"@mt\":\"{{literal}} {A,5:x}\""), "{out}");
    }
}
