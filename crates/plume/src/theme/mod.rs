//! Console themes.
//!
//! A theme maps [`ThemeStyle`]s to escape sequences. Every styled span is
//! written as set, text, reset, and the writers report how many of the
//! characters they produced are invisible on screen so that alignment can
//! be computed on visible width.
//!
//! ```rust
//! use plume::theme::{AnsiTheme, ThemeStyle};
//!
//! let theme = AnsiTheme::from_dotted([
//!     (ThemeStyle::String, "cyan"),
//!     (ThemeStyle::LevelError, "white.on_red.bold"),
//! ])
//! .unwrap();
//! assert_eq!(theme.escape(ThemeStyle::String), Some("\x1b[36m"));
//! ```

mod ansi;
mod empty;
mod style;

use std::fmt::{self, Write};

pub use ansi::{AnsiTheme, ANSI_RESET};
pub use empty::EmptyTheme;
pub use style::ThemeStyle;

/// Writes styling escape sequences around console output.
pub trait ConsoleTheme: Send + Sync + fmt::Debug {
    /// Whether styled output may be rendered into a buffer and measured.
    /// Themes that drive the terminal out of band return `false`.
    fn can_buffer(&self) -> bool;

    /// Starts `style`, returning the number of characters written.
    fn set(&self, out: &mut dyn Write, style: ThemeStyle) -> Result<usize, fmt::Error>;

    fn reset(&self, out: &mut dyn Write) -> fmt::Result;

    /// Characters written by [`reset`](ConsoleTheme::reset).
    fn reset_char_count(&self) -> usize;
}

/// Writes one styled span and adds its invisible characters to `invisible`.
///
/// The reset is written even when `body` fails.
pub fn styled<F>(theme: &dyn ConsoleTheme, out: &mut dyn Write, style: ThemeStyle, invisible: &mut usize, body: F) -> fmt::Result
where
    F: FnOnce(&mut dyn Write) -> fmt::Result,
{
    *invisible += theme.set(out, style)?;
    *invisible += theme.reset_char_count();
    let written = body(out);
    let reset = theme.reset(out);
    written.and(reset)
}

/// [`styled`] for a single string.
pub fn styled_str(theme: &dyn ConsoleTheme, out: &mut dyn Write, style: ThemeStyle, invisible: &mut usize, text: &str) -> fmt::Result {
    styled(theme, out, style, invisible, |out| out.write_str(text))
}
