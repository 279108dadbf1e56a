//! Level monikers for output templates.
//!
//! `u3` gives `INF`, `w4` gives `info`, `t2` gives `In`. The letter selects
//! the case and one or two digits the width; monikers shorter than the
//! requested width are returned whole.

use std::borrow::Cow;

use crate::events::Level;

const TITLE: [&[&str]; 6] = [
    &["V", "Vb", "Vrb", "Verb", "Verbo", "Verbos", "Verbose"],
    &["D", "De", "Dbg", "Dbug", "Debug"],
    &["I", "In", "Inf", "Info", "Infor", "Inform", "Informa", "Informat", "Informati", "Informatio", "Information"],
    &["W", "Wn", "Wrn", "Warn", "Warni", "Warnin", "Warning"],
    &["E", "Er", "Err", "Eror", "Error"],
    &["F", "Fa", "Ftl", "Fatl", "Fatal"],
];

const LOWER: [&[&str]; 6] = [
    &["v", "vb", "vrb", "verb", "verbo", "verbos", "verbose"],
    &["d", "de", "dbg", "dbug", "debug"],
    &["i", "in", "inf", "info", "infor", "inform", "informa", "informat", "informati", "informatio", "information"],
    &["w", "wn", "wrn", "warn", "warni", "warnin", "warning"],
    &["e", "er", "err", "eror", "error"],
    &["f", "fa", "ftl", "fatl", "fatal"],
];

const UPPER: [&[&str]; 6] = [
    &["V", "VB", "VRB", "VERB", "VERBO", "VERBOS", "VERBOSE"],
    &["D", "DE", "DBG", "DBUG", "DEBUG"],
    &["I", "IN", "INF", "INFO", "INFOR", "INFORM", "INFORMA", "INFORMAT", "INFORMATI", "INFORMATIO", "INFORMATION"],
    &["W", "WN", "WRN", "WARN", "WARNI", "WARNIN", "WARNING"],
    &["E", "ER", "ERR", "EROR", "ERROR"],
    &["F", "FA", "FTL", "FATL", "FATAL"],
];

/// The moniker of `level` under `format`.
pub fn level_moniker(level: Level, format: Option<&str>) -> Cow<'static, str> {
    let index = level as usize;
    let full = || apply_case(TITLE[index][TITLE[index].len() - 1], format);

    let Some(format) = format else {
        return full();
    };
    let mut chars = format.chars();
    let (Some(case), Some(width)) = (chars.next(), parse_width(chars.as_str())) else {
        return full();
    };
    if width < 1 {
        return Cow::Borrowed("");
    }
    let table = match case {
        'w' => &LOWER,
        'u' => &UPPER,
        't' => &TITLE,
        _ => return full(),
    };
    let monikers = table[index];
    Cow::Borrowed(monikers[width.min(monikers.len()) - 1])
}

/// One or two ASCII digits.
fn parse_width(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `u` upper-cases and `w` lower-cases; any other format leaves the text.
pub(crate) fn apply_case<'a>(value: &'a str, format: Option<&str>) -> Cow<'a, str> {
    match format {
        Some("u") => Cow::Owned(value.to_uppercase()),
        Some("w") => Cow::Owned(value.to_lowercase()),
        _ => Cow::Borrowed(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_monikers() {
        assert_eq!(level_moniker(Level::Information, Some("u3")), "INF");
        assert_eq!(level_moniker(Level::Warning, Some("w3")), "wrn");
        assert_eq!(level_moniker(Level::Debug, Some("t4")), "Dbug");
        assert_eq!(level_moniker(Level::Fatal, Some("u1")), "F");
        assert_eq!(level_moniker(Level::Verbose, Some("u12")), "VERBOSE");
        assert_eq!(level_moniker(Level::Information, Some("w10")), "informatio");
    }

    #[test]
    fn test_zero_width_is_empty() {
        assert_eq!(level_moniker(Level::Error, Some("u0")), "");
        assert_eq!(level_moniker(Level::Error, Some("w00")), "");
    }

    #[test]
    fn test_full_names() {
        assert_eq!(level_moniker(Level::Warning, None), "Warning");
        assert_eq!(level_moniker(Level::Warning, Some("u")), "WARNING");
        assert_eq!(level_moniker(Level::Warning, Some("w")), "warning");
        assert_eq!(level_moniker(Level::Warning, Some("x3")), "Warning");
        assert_eq!(level_moniker(Level::Warning, Some("u123")), "Warning");
    }

    #[test]
    fn test_every_level_has_monikers() {
        for level in Level::ALL {
            for width in 1..=12 {
                let format = format!("u{width}");
                let moniker = level_moniker(level, Some(&format));
                assert!(!moniker.is_empty());
                assert!(moniker.chars().count() <= width);
            }
        }
    }
}
