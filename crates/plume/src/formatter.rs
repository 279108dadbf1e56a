//! Binding raw log entries into events and writing them to the console.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::cache::TemplateCache;
use crate::capture::{Capture, Destructuring, PropertyValueConverter};
use crate::config::FormatterOptions;
use crate::error::{ConfigError, Result};
use crate::events::{Exception, Level, LogEvent, Property, PropertyValue, Scalar, StructureValue};
use crate::format::FormatProvider;
use crate::render::OutputTemplateRenderer;
use crate::theme::ConsoleTheme;

pub const CATEGORY_PROPERTY: &str = "Category";
pub const EVENT_ID_PROPERTY: &str = "EventId";

/// Numeric and optional named identity of an event kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventId {
    pub id: i32,
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    fn is_empty(&self) -> bool {
        self.id == 0 && self.name.is_none()
    }

    fn to_value(&self) -> PropertyValue {
        let mut properties = Vec::with_capacity(2);
        if self.id != 0 {
            properties.push(Property::new("Id", self.id));
        }
        if let Some(name) = &self.name {
            properties.push(Property::new("Name", name.as_str()));
        }
        StructureValue::new(None, properties).into()
    }
}

/// An unbound log call: a template and its arguments.
///
/// Argument keys starting with `@` are destructured and keys starting with
/// `$` are stringified; the prefix is dropped from the property name.
pub struct LogEntry<'a> {
    pub level: Level,
    pub template: &'a str,
    pub properties: Vec<(&'a str, &'a dyn Capture)>,
    pub category: Option<&'a str>,
    pub event_id: Option<EventId>,
    pub exception: Option<Exception>,
    /// Event time; the current time when `None`.
    pub timestamp: Option<DateTime<FixedOffset>>,
}

impl<'a> LogEntry<'a> {
    pub fn new(level: Level, template: &'a str) -> Self {
        Self {
            level,
            template,
            properties: Vec::new(),
            category: None,
            event_id: None,
            exception: None,
            timestamp: None,
        }
    }

    pub fn property(mut self, key: &'a str, value: &'a dyn Capture) -> Self {
        self.properties.push((key, value));
        self
    }

    pub fn category(mut self, category: &'a str) -> Self {
        self.category = Some(category);
        self
    }

    pub fn event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn exception(mut self, exception: Exception) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Splits the capture hint off an argument key.
fn binding_hint(key: &str) -> (&str, Destructuring) {
    if let Some(name) = key.strip_prefix('@') {
        (name, Destructuring::Destructure)
    } else if let Some(name) = key.strip_prefix('$') {
        (name, Destructuring::Stringify)
    } else {
        (key, Destructuring::Default)
    }
}

/// Renders [`LogEntry`]s through a configured output template.
///
/// Everything expensive is built once in [`ConsoleFormatter::new`]; a
/// formatter can be shared across threads.
///
/// ```rust
/// use plume::{ConsoleFormatter, FormatterOptions, Level, LogEntry};
///
/// let options = FormatterOptions {
///     output_template: "{Level:u3} {Message:lj}".into(),
///     ..FormatterOptions::default()
/// };
/// let formatter = ConsoleFormatter::new(options).unwrap();
///
/// let mut out = String::new();
/// let entry = LogEntry::new(Level::Information, "Served {Path} in {Elapsed} ms")
///     .property("Path", &"/index.html")
///     .property("Elapsed", &12);
/// formatter.format(&entry, &mut out).unwrap();
/// assert_eq!(out, "INF Served /index.html in 12 ms");
/// ```
pub struct ConsoleFormatter {
    options: FormatterOptions,
    converter: PropertyValueConverter,
    cache: TemplateCache,
    renderer: OutputTemplateRenderer,
}

impl fmt::Debug for ConsoleFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleFormatter")
            .field("options", &self.options)
            .field("converter", &self.converter)
            .finish_non_exhaustive()
    }
}

impl ConsoleFormatter {
    pub fn new(options: FormatterOptions) -> std::result::Result<Self, ConfigError> {
        let converter = options.build_converter()?;
        let theme = options.build_theme()?;
        Ok(Self::with_parts(options, converter, theme, None))
    }

    /// Builds from explicit parts, for custom converters, themes or format
    /// providers.
    pub fn with_parts(
        options: FormatterOptions,
        converter: PropertyValueConverter,
        theme: Arc<dyn ConsoleTheme>,
        provider: Option<Arc<dyn FormatProvider>>,
    ) -> Self {
        let renderer = OutputTemplateRenderer::new(theme, &options.output_template, provider);
        Self {
            options,
            converter,
            cache: TemplateCache::new(),
            renderer,
        }
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    pub fn converter(&self) -> &PropertyValueConverter {
        &self.converter
    }

    /// Binds an entry into a [`LogEvent`].
    pub fn to_event(&self, entry: &LogEntry<'_>) -> Result<LogEvent> {
        let template = self.cache.parse(entry.template);

        let mut properties = Vec::with_capacity(entry.properties.len() + 2);
        for (key, value) in &entry.properties {
            let (name, destructuring) = binding_hint(key);
            if !Property::is_valid_name(name) {
                continue;
            }
            properties.push(self.converter.create_property(name, *value, destructuring)?);
        }

        if let Some(category) = entry.category.filter(|c| !c.is_empty()) {
            properties.push(Property::new(CATEGORY_PROPERTY, Scalar::String(category.to_string())));
        }
        if let Some(event_id) = entry.event_id.as_ref().filter(|e| !e.is_empty()) {
            properties.push(Property::new(EVENT_ID_PROPERTY, event_id.to_value()));
        }

        let timestamp = entry.timestamp.unwrap_or_else(|| self.now());
        Ok(LogEvent::new(timestamp, entry.level, entry.exception.clone(), template, properties)?)
    }

    /// Binds and renders an entry.
    pub fn format(&self, entry: &LogEntry<'_>, out: &mut dyn fmt::Write) -> Result<()> {
        let event = self.to_event(entry)?;
        self.renderer.format(&event, out)?;
        Ok(())
    }

    /// Renders an already bound event.
    pub fn format_event(&self, event: &LogEvent, out: &mut dyn fmt::Write) -> Result<()> {
        self.renderer.format(event, out)?;
        Ok(())
    }

    fn now(&self) -> DateTime<FixedOffset> {
        if self.options.use_utc_timestamp {
            Utc::now().fixed_offset()
        } else {
            Local::now().fixed_offset()
        }
    }
}
