//! Justifying rendered text to a minimum width.

use std::fmt::{self, Write};

use plume_template::{Alignment, AlignmentDirection};

const SPACES: &str = "                                        ";

/// Writes `value`, padded with spaces to `alignment.width` columns.
///
/// Width is counted in characters. Values already at or beyond the width
/// are written unchanged.
pub fn apply(out: &mut dyn Write, value: &str, alignment: Option<Alignment>) -> fmt::Result {
    let Some(alignment) = alignment else {
        return out.write_str(value);
    };
    let len = value.chars().count();
    if len >= alignment.width {
        return out.write_str(value);
    }

    let pad = alignment.width - len;
    match alignment.direction {
        AlignmentDirection::Left => {
            out.write_str(value)?;
            write_spaces(out, pad)
        }
        AlignmentDirection::Right => {
            write_spaces(out, pad)?;
            out.write_str(value)
        }
    }
}

pub fn write_spaces(out: &mut dyn Write, mut count: usize) -> fmt::Result {
    while count > 0 {
        let n = count.min(SPACES.len());
        out.write_str(&SPACES[..n])?;
        count -= n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(value: &str, alignment: Option<Alignment>) -> String {
        let mut out = String::new();
        apply(&mut out, value, alignment).unwrap();
        out
    }

    #[test]
    fn test_right_alignment() {
        assert_eq!(pad("ab", Some(Alignment::right(5))), "   ab");
    }

    #[test]
    fn test_left_alignment() {
        assert_eq!(pad("ab", Some(Alignment::left(5))), "ab   ");
    }

    #[test]
    fn test_wide_value_unpadded() {
        assert_eq!(pad("abcdef", Some(Alignment::right(5))), "abcdef");
        assert_eq!(pad("abcde", Some(Alignment::left(5))), "abcde");
    }

    #[test]
    fn test_no_alignment() {
        assert_eq!(pad("ab", None), "ab");
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(pad("é", Some(Alignment::right(3))), "  é");
    }

    #[test]
    fn test_long_padding() {
        assert_eq!(pad("", Some(Alignment::left(100))).len(), 100);
    }
}
