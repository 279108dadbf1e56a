//! Themed console rendering.
//!
//! [`ThemedMessageRenderer`] renders message templates through a
//! [`ConsoleTheme`](crate::theme::ConsoleTheme);
//! [`OutputTemplateRenderer`] lays out whole events.

pub mod level;
mod message;
pub mod output;
mod value;

pub use level::level_moniker;
pub use message::ThemedMessageRenderer;
pub use output::{OutputTemplateRenderer, DEFAULT_OUTPUT_TEMPLATE};
pub use value::{ThemedDisplayFormatter, ThemedJsonFormatter, ThemedValueFormatter};
