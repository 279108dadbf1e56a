use std::fmt::{self, Write};
use std::sync::Arc;

use plume_template::{Alignment, AlignmentDirection, MessageTemplate, PropertyToken};

use super::OutputTokenRenderer;
use crate::events::{Level, LogEvent, Property, PropertyValue, Scalar, StructureValue};
use crate::format::{padding, scalar, FormatFlags, FormatProvider, ScratchBuffer};
use crate::render::level::{apply_case, level_moniker};
use crate::render::message::ThemedMessageRenderer;
use crate::render::value::{ThemedDisplayFormatter, ThemedJsonFormatter, ThemedValueFormatter};
use crate::theme::{styled, styled_str, ConsoleTheme, EmptyTheme, ThemeStyle};

const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

/// Exception lines with this prefix are detail lines.
const DETAIL_LINE_PREFIX: &str = "   ";

pub(super) struct TextTokenRenderer {
    theme: Arc<dyn ConsoleTheme>,
    text: String,
}

impl TextTokenRenderer {
    pub(super) fn new(theme: Arc<dyn ConsoleTheme>, text: String) -> Self {
        Self { theme, text }
    }
}

impl OutputTokenRenderer for TextTokenRenderer {
    fn render(&self, _event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        styled_str(&*self.theme, out, ThemeStyle::TertiaryText, &mut 0, &self.text)
    }
}

pub(super) struct LevelTokenRenderer {
    theme: Arc<dyn ConsoleTheme>,
    token: PropertyToken,
}

impl LevelTokenRenderer {
    pub(super) fn new(theme: Arc<dyn ConsoleTheme>, token: PropertyToken) -> Self {
        Self { theme, token }
    }
}

fn level_style(level: Level) -> ThemeStyle {
    match level {
        Level::Verbose => ThemeStyle::LevelVerbose,
        Level::Debug => ThemeStyle::LevelDebug,
        Level::Information => ThemeStyle::LevelInformation,
        Level::Warning => ThemeStyle::LevelWarning,
        Level::Error => ThemeStyle::LevelError,
        Level::Fatal => ThemeStyle::LevelFatal,
    }
}

impl OutputTokenRenderer for LevelTokenRenderer {
    fn render(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        let moniker = level_moniker(event.level(), self.token.format());
        styled(&*self.theme, out, level_style(event.level()), &mut 0, |out| {
            padding::apply(out, &moniker, self.token.alignment())
        })
    }
}

pub(super) struct NewLineTokenRenderer {
    alignment: Option<Alignment>,
}

impl NewLineTokenRenderer {
    pub(super) fn new(alignment: Option<Alignment>) -> Self {
        Self { alignment }
    }
}

impl OutputTokenRenderer for NewLineTokenRenderer {
    fn render(&self, _event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        padding::apply(out, "\n", self.alignment.map(|a| a.widen(1)))
    }
}

/// The error text, then one `   caused by: ...` line per source.
pub(super) struct ExceptionTokenRenderer {
    theme: Arc<dyn ConsoleTheme>,
}

impl ExceptionTokenRenderer {
    pub(super) fn new(theme: Arc<dyn ConsoleTheme>) -> Self {
        Self { theme }
    }
}

impl OutputTokenRenderer for ExceptionTokenRenderer {
    fn render(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        let Some(text) = event.exception_text() else {
            return Ok(());
        };

        for line in text.lines() {
            let style = if line.starts_with(DETAIL_LINE_PREFIX) {
                ThemeStyle::SecondaryText
            } else {
                ThemeStyle::Text
            };
            styled_str(&*self.theme, out, style, &mut 0, line)?;
            out.write_char('\n')?;
        }
        Ok(())
    }
}

pub(super) struct MessageTokenRenderer {
    theme: Arc<dyn ConsoleTheme>,
    token: PropertyToken,
    renderer: ThemedMessageRenderer,
}

impl MessageTokenRenderer {
    pub(super) fn new(theme: Arc<dyn ConsoleTheme>, token: PropertyToken, provider: Option<Arc<dyn FormatProvider>>) -> Self {
        let renderer = ThemedMessageRenderer::new(FormatFlags::parse(token.format()), provider);
        Self { theme, token, renderer }
    }
}

impl OutputTokenRenderer for MessageTokenRenderer {
    fn render(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        let theme = &*self.theme;
        match self.token.alignment() {
            Some(alignment) if theme.can_buffer() => {
                let mut buf = ScratchBuffer::take();
                let invisible = self.renderer.render(theme, event.message_template(), event.properties(), &mut *buf)?;
                padding::apply(out, &buf, Some(alignment.widen(invisible)))
            }
            Some(alignment) => {
                let mut measure = ScratchBuffer::take();
                self.renderer
                    .render(&EmptyTheme, event.message_template(), event.properties(), &mut *measure)?;
                let pad = alignment.width.saturating_sub(measure.chars().count());
                if alignment.direction == AlignmentDirection::Right {
                    padding::write_spaces(out, pad)?;
                }
                self.renderer.render(theme, event.message_template(), event.properties(), out)?;
                if alignment.direction == AlignmentDirection::Left {
                    padding::write_spaces(out, pad)?;
                }
                Ok(())
            }
            None => self
                .renderer
                .render(theme, event.message_template(), event.properties(), out)
                .map(|_| ()),
        }
    }
}

pub(super) struct TimestampTokenRenderer {
    theme: Arc<dyn ConsoleTheme>,
    token: PropertyToken,
    provider: Option<Arc<dyn FormatProvider>>,
}

impl TimestampTokenRenderer {
    pub(super) fn new(theme: Arc<dyn ConsoleTheme>, token: PropertyToken, provider: Option<Arc<dyn FormatProvider>>) -> Self {
        Self { theme, token, provider }
    }

    fn write_timestamp(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        let value = Scalar::DateTime(event.timestamp());
        let format = self.token.format();
        if let Some(text) = self.provider.as_deref().and_then(|p| p.format(format, &value)) {
            return out.write_str(&text);
        }
        scalar::write_formatted(out, &value, Some(format.unwrap_or(DEFAULT_TIMESTAMP_FORMAT)))
    }
}

impl OutputTokenRenderer for TimestampTokenRenderer {
    fn render(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        styled(&*self.theme, out, ThemeStyle::SecondaryText, &mut 0, |out| match self.token.alignment() {
            None => self.write_timestamp(event, out),
            Some(alignment) => {
                let mut buf = ScratchBuffer::take();
                self.write_timestamp(event, &mut *buf)?;
                padding::apply(out, &buf, Some(alignment))
            }
        })
    }
}

/// Event properties mentioned by neither the message template nor the
/// output template, as one untagged structure.
pub(super) struct PropertiesTokenRenderer {
    theme: Arc<dyn ConsoleTheme>,
    token: PropertyToken,
    output_template: Arc<MessageTemplate>,
    formatter: Box<dyn ThemedValueFormatter>,
}

impl PropertiesTokenRenderer {
    pub(super) fn new(
        theme: Arc<dyn ConsoleTheme>,
        token: PropertyToken,
        output_template: Arc<MessageTemplate>,
        json: bool,
        provider: Option<Arc<dyn FormatProvider>>,
    ) -> Self {
        let formatter: Box<dyn ThemedValueFormatter> = if json {
            Box::new(ThemedJsonFormatter::new(provider))
        } else {
            Box::new(ThemedDisplayFormatter::new(provider))
        };
        Self {
            theme,
            token,
            output_template,
            formatter,
        }
    }
}

impl OutputTokenRenderer for PropertiesTokenRenderer {
    fn render(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        let included = event
            .properties()
            .iter()
            .filter(|(name, _)| !event.message_template().mentions(name) && !self.output_template.mentions(name))
            .map(|(name, value)| Property::new(name.clone(), value.clone()))
            .collect();
        let value = PropertyValue::Structure(StructureValue::new(None, included));

        let theme = &*self.theme;
        match self.token.alignment() {
            Some(alignment) if theme.can_buffer() => {
                let mut buf = ScratchBuffer::take();
                let invisible = self.formatter.format(theme, &value, &mut *buf, None, false)?;
                padding::apply(out, &buf, Some(alignment.widen(invisible)))
            }
            _ => self.formatter.format(theme, &value, out, None, false).map(|_| ()),
        }
    }
}

/// Any non-reserved name, looked up among the event's properties.
pub(super) struct EventPropertyTokenRenderer {
    theme: Arc<dyn ConsoleTheme>,
    token: PropertyToken,
    provider: Option<Arc<dyn FormatProvider>>,
}

impl EventPropertyTokenRenderer {
    pub(super) fn new(theme: Arc<dyn ConsoleTheme>, token: PropertyToken, provider: Option<Arc<dyn FormatProvider>>) -> Self {
        Self { theme, token, provider }
    }

    fn write_value(&self, value: &PropertyValue, out: &mut dyn Write) -> fmt::Result {
        match value {
            PropertyValue::Scalar(Scalar::String(s)) => out.write_str(&apply_case(s, self.token.format())),
            _ => value.render(out, self.token.format(), self.provider.as_deref()),
        }
    }
}

impl OutputTokenRenderer for EventPropertyTokenRenderer {
    fn render(&self, event: &LogEvent, out: &mut dyn Write) -> fmt::Result {
        let Some(value) = event.property(self.token.name()) else {
            return padding::apply(out, "", self.token.alignment());
        };

        styled(&*self.theme, out, ThemeStyle::SecondaryText, &mut 0, |out| match self.token.alignment() {
            None => self.write_value(value, out),
            Some(alignment) => {
                let mut buf = ScratchBuffer::take();
                self.write_value(value, &mut *buf)?;
                padding::apply(out, &buf, Some(alignment))
            }
        })
    }
}
