//! Structured log event capture and rendering.
//!
//! plume turns a log call (a message template plus arguments) into a
//! [`LogEvent`] holding structured values, and renders events as plain text,
//! themed console output or JSON.
//!
//! # Overview
//!
//! - [`MessageTemplate`]: parsed `Hello {Name}` templates, cached by
//!   [`TemplateCache`]
//! - [`capture`]: the [`Capture`](capture::Capture) trait and the converter
//!   that builds bounded [`PropertyValue`] trees from runtime values
//! - [`render`]: output templates, levels and themed values
//! - [`theme`]: ANSI console themes
//! - [`format`]: plain and JSON value rendering, [`CompactJsonFormatter`]
//! - [`ConsoleFormatter`]: all of the above behind [`FormatterOptions`]
//!
//! # Example
//!
//! ```rust
//! use chrono::DateTime;
//! use plume::{ConsoleFormatter, FormatterOptions, Level, LogEntry};
//!
//! let formatter = ConsoleFormatter::new(FormatterOptions::default()).unwrap();
//! let ts = DateTime::parse_from_rfc3339("2024-03-09T14:05:07+00:00").unwrap();
//!
//! let mut out = String::new();
//! let tags = vec!["new", "eu"];
//! let entry = LogEntry::new(Level::Warning, "Signup from {Email} tagged {Tags}")
//!     .property("Email", &"ada@example.com")
//!     .property("Tags", &tags)
//!     .timestamp(ts);
//! formatter.format(&entry, &mut out).unwrap();
//!
//! assert_eq!(out, "[14:05:07 WRN] Signup from ada@example.com tagged [\"new\", \"eu\"]\n");
//! ```
//!
//! # Diagnostics
//!
//! Nothing in the formatting path panics or fails on bad input. Problems
//! are reported through [`selflog`], which is silent until enabled.

pub mod selflog;

mod cache;
pub mod capture;
pub mod config;
mod error;
pub mod events;
pub mod format;
mod formatter;
pub mod render;
pub mod theme;

pub use cache::{parse_template, TemplateCache};
pub use config::FormatterOptions;
pub use error::{CaptureError, ConfigError, Error, EventError, Result};
pub use events::{
    DictionaryValue, Exception, Level, LogEvent, Property, PropertyMap, PropertyValue, Scalar, StructureValue,
};
pub use format::CompactJsonFormatter;
pub use formatter::{ConsoleFormatter, EventId, LogEntry, CATEGORY_PROPERTY, EVENT_ID_PROPERTY};
pub use plume_template::{parse, Destructuring, MessageTemplate};
