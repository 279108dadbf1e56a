use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use plume_template::MessageTemplate;

use crate::error::EventError;
use crate::events::{Level, Property, PropertyValue};
use crate::format::{render_message, FormatProvider};

/// Event properties by name, in insertion order.
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// An error attached to a log event.
pub type Exception = Arc<dyn StdError + Send + Sync>;

/// A single log event: when, how severe, what happened and the captured
/// values.
///
/// Properties can be changed until the event is handed to a renderer;
/// renderers only read it.
#[derive(Clone, Debug)]
pub struct LogEvent {
    timestamp: DateTime<FixedOffset>,
    level: Level,
    exception: Option<Exception>,
    template: Arc<MessageTemplate>,
    properties: PropertyMap,
}

impl LogEvent {
    /// Builds an event. Later properties replace earlier ones with the same
    /// name.
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        level: Level,
        exception: Option<Exception>,
        template: Arc<MessageTemplate>,
        properties: impl IntoIterator<Item = Property>,
    ) -> Result<Self, EventError> {
        let mut event = Self {
            timestamp,
            level,
            exception,
            template,
            properties: PropertyMap::new(),
        };
        for property in properties {
            event.add_or_update_property(property)?;
        }
        Ok(event)
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn exception(&self) -> Option<&Exception> {
        self.exception.as_ref()
    }

    pub fn message_template(&self) -> &MessageTemplate {
        &self.template
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Sets a property, replacing any existing value of the same name.
    pub fn add_or_update_property(&mut self, property: Property) -> Result<(), EventError> {
        check_name(&property.name)?;
        self.properties.insert(property.name, property.value);
        Ok(())
    }

    /// Sets a property unless one with the same name exists.
    pub fn add_property_if_absent(&mut self, property: Property) -> Result<(), EventError> {
        check_name(&property.name)?;
        self.properties.entry(property.name).or_insert(property.value);
        Ok(())
    }

    pub fn remove_property_if_present(&mut self, name: &str) {
        self.properties.shift_remove(name);
    }

    /// A snapshot sharing the template and exception with this event.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Renders the message template against this event's properties.
    pub fn render_message(&self, provider: Option<&dyn FormatProvider>) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = render_message(&self.template, &self.properties, &mut out, None, provider);
        out
    }

    pub fn write_message(&self, out: &mut dyn fmt::Write, provider: Option<&dyn FormatProvider>) -> fmt::Result {
        render_message(&self.template, &self.properties, out, None, provider)
    }

    /// The exception and its source chain, one cause per line.
    pub fn exception_text(&self) -> Option<String> {
        let exception = self.exception.as_ref()?;
        let mut text = exception.to_string();
        let mut source = exception.source();
        while let Some(cause) = source {
            text.push('\n');
            text.push_str(CAUSE_PREFIX);
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        Some(text)
    }
}

/// Leads each source line of [`LogEvent::exception_text`].
pub const CAUSE_PREFIX: &str = "   caused by: ";

fn check_name(name: &str) -> Result<(), EventError> {
    if Property::is_valid_name(name) {
        Ok(())
    } else {
        Err(EventError::InvalidPropertyName)
    }
}
