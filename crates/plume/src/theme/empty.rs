use std::fmt::{self, Write};

use super::{ConsoleTheme, ThemeStyle};

/// Writes no styling at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyTheme;

impl ConsoleTheme for EmptyTheme {
    fn can_buffer(&self) -> bool {
        true
    }

    fn set(&self, _out: &mut dyn Write, _style: ThemeStyle) -> Result<usize, fmt::Error> {
        Ok(0)
    }

    fn reset(&self, _out: &mut dyn Write) -> fmt::Result {
        Ok(())
    }

    fn reset_char_count(&self) -> usize {
        0
    }
}
