//! End-to-end tests: configuration, binding, rendering.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset};
use plume::capture::{Capture, Fields, Shape};
use plume::{CompactJsonFormatter, ConsoleFormatter, EventId, FormatterOptions, Level, LogEntry};
use serial_test::serial;

// =============================================================================
// Fixtures
// =============================================================================

struct Customer {
    name: &'static str,
    tier: u8,
}

impl Capture for Customer {
    fn shape(&self) -> Shape<'_> {
        Shape::Object
    }

    fn display(&self) -> String {
        format!("customer {}", self.name)
    }

    fn properties(&self, fields: &mut Fields<'_>) {
        fields.field("Name", &self.name).field("Tier", &self.tier);
    }
}

struct Node {
    child: Option<Box<Node>>,
}

impl Capture for Node {
    fn shape(&self) -> Shape<'_> {
        Shape::Object
    }

    fn properties(&self, fields: &mut Fields<'_>) {
        fields.field("Child", &self.child);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("payment declined")]
struct PaymentError(#[source] CardError);

#[derive(Debug, thiserror::Error)]
#[error("card expired")]
struct CardError;

fn ts() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-03-09T14:05:07+02:00").unwrap()
}

fn formatter(yaml: &str) -> ConsoleFormatter {
    ConsoleFormatter::new(FormatterOptions::from_yaml(yaml).unwrap()).unwrap()
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

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_plain_pipeline_with_exception_and_properties() {
    let f = formatter(r#"output_template: "{Level:w3} {Message:lj} {Properties}{NewLine}{Exception}""#);
    let customer = Customer { name: "Ada", tier: 2 };

    let entry = LogEntry::new(Level::Error, "Order {OrderId} failed for {@Customer}")
        .property("OrderId", &42)
        .property("@Customer", &customer)
        .property("Region", &"eu")
        .exception(Arc::new(PaymentError(CardError)))
        .timestamp(ts());

    let mut out = String::new();
    f.format(&entry, &mut out).unwrap();
    assert_eq!(
        out,
        "err Order 42 failed for {\"Name\": \"Ada\", \"Tier\": 2, \"$type\": \"Customer\"} {Region=\"eu\"}\n\
         payment declined\n   caused by: card expired\n"
    );
}

#[test]
fn test_default_template() {
    let f = ConsoleFormatter::new(FormatterOptions::default()).unwrap();
    let entry = LogEntry::new(Level::Information, "User {UserId} signed in")
        .property("UserId", &"u-17")
        .timestamp(ts());

    let mut out = String::new();
    f.format(&entry, &mut out).unwrap();
    assert_eq!(out, "[14:05:07 INF] User u-17 signed in\n");
}

#[test]
fn test_category_and_event_id_in_output() {
    let f = formatter(r#"output_template: "{Category,-8}|{EventId} {Message}""#);
    let entry = LogEntry::new(Level::Debug, "ready")
        .category("Boot")
        .event_id(EventId::named(5, "Start"))
        .timestamp(ts());

    let mut out = String::new();
    f.format(&entry, &mut out).unwrap();
    assert_eq!(out, "Boot    |{ Id: 5, Name: \"Start\" } ready");
}

#[test]
fn test_themed_output_has_same_visible_text() {
    let template = r#"output_template: "[{Level:u3}] {Message,-40} {Count,4}|{NewLine}""#;
    let plain = formatter(template);
    let themed = formatter(&format!(
        "{template}\ntheme:\n  level_warning: yellow\n  string: cyan\n  number: magenta\n  text: white\n  tertiary_text: \"\\e[90m\"\n"
    ));

    let entry = LogEntry::new(Level::Warning, "Queue {Queue} has {Depth} items")
        .property("Queue", &"jobs")
        .property("Depth", &1200)
        .property("Count", &7)
        .timestamp(ts());

    let mut plain_out = String::new();
    plain.format(&entry, &mut plain_out).unwrap();
    let mut themed_out = String::new();
    themed.format(&entry, &mut themed_out).unwrap();

    assert_eq!(plain_out, "[WRN] Queue \"jobs\" has 1200 items                 7|\n");
    assert_eq!(strip_ansi(&themed_out), plain_out);
    assert!(themed_out.contains("\x1b[33mWRN"), "{themed_out:?}");
    assert!(themed_out.contains("\x1b[36m\"jobs\""), "{themed_out:?}");
}

#[test]
fn test_depth_limit_from_config() {
    let f = formatter("output_template: \"{Message:j}\"\nmax_destructuring_depth: 2\n");
    let chain = Node {
        child: Some(Box::new(Node {
            child: Some(Box::new(Node { child: None })),
        })),
    };
    let entry = LogEntry::new(Level::Information, "{@Chain}").property("@Chain", &chain).timestamp(ts());

    let mut out = String::new();
    f.format(&entry, &mut out).unwrap();
    let nodes = out.matches("\"Node\"").count();
    assert!((1..=2).contains(&nodes), "{out}");
    assert!(out.contains("null"), "{out}");
}

#[test]
fn test_collection_and_string_limits_from_config() {
    let f = formatter("output_template: \"{Message:l}\"\nmax_collection_count: 3\nmax_string_length: 6\n");
    let numbers: Vec<u32> = (1..=10).collect();
    let entry = LogEntry::new(Level::Information, "{Numbers} {$Text}")
        .property("Numbers", &numbers)
        .property("$Text", &"abcdefghij")
        .timestamp(ts());

    let mut out = String::new();
    f.format(&entry, &mut out).unwrap();
    assert_eq!(out, "[1, 2, 3] abcde…");
}

#[test]
fn test_formatter_shared_across_threads() {
    let f = formatter(r#"output_template: "{Message:l}""#);
    std::thread::scope(|s| {
        for worker in 0..4 {
            let f = &f;
            s.spawn(move || {
                for i in 0..25 {
                    let entry = LogEntry::new(Level::Information, "worker {Worker} item {Item}")
                        .property("Worker", &worker)
                        .property("Item", &i)
                        .timestamp(ts());
                    let mut out = String::new();
                    f.format(&entry, &mut out).unwrap();
                    assert_eq!(out, format!("worker {worker} item {i}"));
                }
            });
        }
    });
}

// =============================================================================
// JSON
// =============================================================================

#[test]
fn test_bound_event_as_compact_json() {
    let f = ConsoleFormatter::new(FormatterOptions::default()).unwrap();
    let customer = Customer { name: "Ada", tier: 1 };
    let entry = LogEntry::new(Level::Warning, "Slow checkout for {@Customer}")
        .property("@Customer", &customer)
        .category("Shop")
        .timestamp(ts());

    let event = f.to_event(&entry).unwrap();
    let mut out = String::new();
    CompactJsonFormatter::default().format(&event, &mut out).unwrap();

    assert_eq!(
        out,
        "{\"@t\":\"2024-03-09T14:05:07+02:00\",\"@mt\":\"Slow checkout for {@Customer}\",\"@l\":\"Warning\",\
         \"Customer\":{\"Name\":\"Ada\",\"Tier\":1,\"$type\":\"Customer\"},\"Category\":\"Shop\"}\n"
    );
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["Customer"]["Tier"], 1);
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
#[serial(selflog)]
fn test_malformed_template_reported_once_per_parse() {
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&lines);
    plume::selflog::enable(move |line| sink.lock().unwrap().push(line.to_string()));

    let f = formatter(r#"output_template: "{Message}""#);
    let entry = LogEntry::new(Level::Information, "{0} then {Name}")
        .property("0", &"zero")
        .property("Name", &"n")
        .timestamp(ts());
    let mut out = String::new();
    f.format(&entry, &mut out).unwrap();
    f.format(&entry, &mut String::new()).unwrap();
    plume::selflog::disable();

    assert_eq!(out, "\"zero\" then \"n\"");
    let reports = lines
        .lock()
        .unwrap()
        .iter()
        .filter(|l| l.contains("Message template is malformed: {0} then {Name}"))
        .count();
    assert_eq!(reports, 1);
}
