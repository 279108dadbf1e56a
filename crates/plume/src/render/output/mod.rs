//! Output templates: the layout of a whole console line.
//!
//! An output template is an ordinary message template whose property
//! names refer to parts of the event. The reserved names are
//! [`MESSAGE`], [`LEVEL`], [`TIMESTAMP`], [`NEW_LINE`], [`EXCEPTION`] and
//! [`PROPERTIES`]; any other name is looked up among the event's
//! properties. Tokens are resolved to renderers once, when the
//! [`OutputTemplateRenderer`] is built.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::{FixedOffset, TimeZone};
//! use plume::render::OutputTemplateRenderer;
//! use plume::theme::EmptyTheme;
//! use plume::{Level, LogEvent, MessageTemplate, Property};
//!
//! let renderer = OutputTemplateRenderer::new(Arc::new(EmptyTheme), "[{Level:u3}] {Message:lj}", None);
//! let timestamp = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
//! let event = LogEvent::new(
//!     timestamp,
//!     Level::Warning,
//!     None,
//!     Arc::new(MessageTemplate::parse("Disk {Mount} is full")),
//!     [Property::new("Mount", "/var")],
//! )
//! .unwrap();
//!
//! let mut out = String::new();
//! renderer.format(&event, &mut out).unwrap();
//! assert_eq!(out, "[WRN] Disk /var is full");
//! ```

mod tokens;

use std::fmt::{self, Write};
use std::sync::Arc;

use plume_template::{MessageTemplate, Token};

use crate::events::LogEvent;
use crate::format::{FormatFlags, FormatProvider};
use crate::theme::ConsoleTheme;
use tokens::{
    EventPropertyTokenRenderer, ExceptionTokenRenderer, LevelTokenRenderer, MessageTokenRenderer, NewLineTokenRenderer,
    PropertiesTokenRenderer, TextTokenRenderer, TimestampTokenRenderer,
};

pub const MESSAGE: &str = "Message";
pub const LEVEL: &str = "Level";
pub const TIMESTAMP: &str = "Timestamp";
pub const NEW_LINE: &str = "NewLine";
pub const EXCEPTION: &str = "Exception";
pub const PROPERTIES: &str = "Properties";

pub const DEFAULT_OUTPUT_TEMPLATE: &str = "[{Timestamp:HH:mm:ss} {Level:u3}] {Message:lj}{NewLine}{Exception}";

/// Renders one part of a log event.
pub(crate) trait OutputTokenRenderer: Send + Sync {
    fn render(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result;
}

/// Formats log events through a parsed output template.
pub struct OutputTemplateRenderer {
    renderers: Vec<Box<dyn OutputTokenRenderer>>,
}

impl OutputTemplateRenderer {
    pub fn new(theme: Arc<dyn ConsoleTheme>, output_template: &str, provider: Option<Arc<dyn FormatProvider>>) -> Self {
        let template = Arc::new(MessageTemplate::parse(output_template));
        let renderers = template
            .tokens()
            .iter()
            .map(|token| -> Box<dyn OutputTokenRenderer> {
                let theme = Arc::clone(&theme);
                let pt = match token {
                    Token::Text(text) => return Box::new(TextTokenRenderer::new(theme, text.clone())),
                    Token::Property(pt) => pt.clone(),
                };
                match pt.name() {
                    LEVEL => Box::new(LevelTokenRenderer::new(theme, pt)),
                    NEW_LINE => Box::new(NewLineTokenRenderer::new(pt.alignment())),
                    EXCEPTION => Box::new(ExceptionTokenRenderer::new(theme)),
                    MESSAGE => Box::new(MessageTokenRenderer::new(theme, pt, provider.clone())),
                    TIMESTAMP => Box::new(TimestampTokenRenderer::new(theme, pt, provider.clone())),
                    PROPERTIES => {
                        let json = FormatFlags::parse(pt.format()).json;
                        Box::new(PropertiesTokenRenderer::new(theme, pt, Arc::clone(&template), json, provider.clone()))
                    }
                    _ => Box::new(EventPropertyTokenRenderer::new(theme, pt, provider.clone())),
                }
            })
            .collect();
        Self { renderers }
    }

    pub fn format(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        for renderer in &self.renderers {
            renderer.render(event, out)?;
        }
        Ok(())
    }
}

impl Default for OutputTemplateRenderer {
    fn default() -> Self {
        Self::new(Arc::new(crate::theme::EmptyTheme), DEFAULT_OUTPUT_TEMPLATE, None)
    }
}
