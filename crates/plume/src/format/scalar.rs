//! Own formatting of non-string scalars.
//!
//! Numbers understand a small set of standard format strings: `D<n>`,
//! `X<n>`/`x<n>`, `F<n>`, `N<n>` and `E<n>`. Date and time values accept a
//! strftime pattern (anything containing `%`) or a custom pattern in the
//! `yyyy-MM-dd HH:mm:ss.fff` style. Formats a value does not understand fall
//! back to its default text.

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::time::Duration;

use crate::events::Scalar;

/// Writes `value` applying `format` when it is understood.
pub fn write_formatted(out: &mut dyn Write, value: &Scalar, format: Option<&str>) -> fmt::Result {
    if let Some(format) = format {
        if let Some(text) = apply_format(value, format) {
            return out.write_str(&text);
        }
    }
    write_default(out, value)
}

/// The default text of a scalar.
pub fn write_default(out: &mut dyn Write, value: &Scalar) -> fmt::Result {
    match value {
        Scalar::Null => out.write_str("null"),
        Scalar::Bool(b) => out.write_str(if *b { "true" } else { "false" }),
        Scalar::Char(c) => out.write_char(*c),
        Scalar::I64(v) => write!(out, "{v}"),
        Scalar::U64(v) => write!(out, "{v}"),
        Scalar::I128(v) => write!(out, "{v}"),
        Scalar::U128(v) => write!(out, "{v}"),
        Scalar::F32(v) => write_float(out, *v as f64, || v.to_string()),
        Scalar::F64(v) => write_float(out, *v, || v.to_string()),
        Scalar::String(s) | Scalar::Enum(s) | Scalar::Other(s) => out.write_str(s),
        Scalar::DateTime(dt) => out.write_str(&dt.to_rfc3339()),
        Scalar::NaiveDateTime(dt) => write!(out, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        Scalar::Date(d) => write!(out, "{}", d.format("%Y-%m-%d")),
        Scalar::Time(t) => write!(out, "{}", t.format("%H:%M:%S%.f")),
        Scalar::Duration(d) => write_duration(out, *d),
    }
}

/// Shortest round-trip text; non-finite values use their JSON-safe names.
fn write_float(out: &mut dyn Write, v: f64, finite: impl FnOnce() -> String) -> fmt::Result {
    if v.is_nan() {
        out.write_str("NaN")
    } else if v.is_infinite() {
        out.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        out.write_str(&finite())
    }
}

/// `[d.]hh:mm:ss[.fffffff]`, with seven fractional digits when present.
pub fn write_duration(out: &mut dyn Write, d: Duration) -> fmt::Result {
    let total = d.as_secs();
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let seconds = total % 60;
    let ticks = d.subsec_nanos() / 100;

    if days > 0 {
        write!(out, "{days}.")?;
    }
    write!(out, "{hours:02}:{minutes:02}:{seconds:02}")?;
    if ticks > 0 {
        write!(out, ".{ticks:07}")?;
    }
    Ok(())
}

fn apply_format(value: &Scalar, format: &str) -> Option<String> {
    match value {
        Scalar::I64(v) => format_integer(*v < 0, v.unsigned_abs() as u128, format, || format!("{v:X}")),
        Scalar::U64(v) => format_integer(false, *v as u128, format, || format!("{v:X}")),
        Scalar::I128(v) => format_integer(*v < 0, v.unsigned_abs(), format, || format!("{v:X}")),
        Scalar::U128(v) => format_integer(false, *v, format, || format!("{v:X}")),
        Scalar::F32(v) => format_float(*v as f64, format),
        Scalar::F64(v) => format_float(*v, format),
        Scalar::DateTime(dt) => format_date(format, |p| dt.format(p).to_string_checked()),
        Scalar::NaiveDateTime(dt) => format_date(format, |p| dt.format(p).to_string_checked()),
        Scalar::Date(d) => format_date(format, |p| d.format(p).to_string_checked()),
        Scalar::Time(t) => format_date(format, |p| t.format(p).to_string_checked()),
        _ => None,
    }
}

/// Splits `N2` into `('N', Some(2))`.
fn parse_standard(format: &str) -> Option<(char, Option<usize>)> {
    let mut chars = format.chars();
    let spec = chars.next().filter(char::is_ascii_alphabetic)?;
    let digits = chars.as_str();
    if digits.is_empty() {
        return Some((spec, None));
    }
    if digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((spec, digits.parse().ok()))
}

fn format_integer(negative: bool, magnitude: u128, format: &str, hex: impl FnOnce() -> String) -> Option<String> {
    let (spec, precision) = parse_standard(format)?;
    let sign = if negative { "-" } else { "" };
    let text = match spec {
        'D' | 'd' => format!("{sign}{magnitude:0width$}", width = precision.unwrap_or(0)),
        'X' => format!("{:0>width$}", hex(), width = precision.unwrap_or(0)),
        'x' => format!("{:0>width$}", hex().to_ascii_lowercase(), width = precision.unwrap_or(0)),
        'F' | 'f' => {
            let p = precision.unwrap_or(2);
            if p == 0 {
                format!("{sign}{magnitude}")
            } else {
                format!("{sign}{magnitude}.{:0<p$}", "")
            }
        }
        'N' | 'n' => {
            let p = precision.unwrap_or(2);
            let grouped = group_thousands(&magnitude.to_string());
            if p == 0 {
                format!("{sign}{grouped}")
            } else {
                format!("{sign}{grouped}.{:0<p$}", "")
            }
        }
        _ => return None,
    };
    Some(text)
}

fn format_float(v: f64, format: &str) -> Option<String> {
    if !v.is_finite() {
        return None;
    }
    let (spec, precision) = parse_standard(format)?;
    let text = match spec {
        'F' | 'f' => format!("{v:.p$}", p = precision.unwrap_or(2)),
        'N' | 'n' => {
            let fixed = format!("{:.p$}", v.abs(), p = precision.unwrap_or(2));
            let (int, frac) = fixed.split_once('.').map_or((fixed.as_str(), None), |(i, f)| (i, Some(f)));
            let sign = if v.is_sign_negative() && v != 0.0 { "-" } else { "" };
            match frac {
                Some(frac) => format!("{sign}{}.{frac}", group_thousands(int)),
                None => format!("{sign}{}", group_thousands(int)),
            }
        }
        'E' | 'e' => {
            let raw = format!("{v:.p$e}", p = precision.unwrap_or(6));
            let (mantissa, exponent) = raw.split_once('e')?;
            let exponent: i32 = exponent.parse().ok()?;
            let e = if spec == 'E' { 'E' } else { 'e' };
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}{e}{sign}{:03}", exponent.unsigned_abs())
        }
        'R' | 'r' | 'G' | 'g' => v.to_string(),
        _ => return None,
    };
    Some(text)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

trait ToStringChecked {
    fn to_string_checked(&self) -> Option<String>;
}

impl<T: fmt::Display> ToStringChecked for T {
    /// chrono reports bad patterns as a formatting error rather than a value.
    fn to_string_checked(&self) -> Option<String> {
        let mut s = String::new();
        write!(s, "{self}").ok().map(|_| s)
    }
}

fn format_date(format: &str, render: impl FnOnce(&str) -> Option<String>) -> Option<String> {
    render(&date_pattern(format))
}

/// Converts a custom date pattern to strftime. Patterns with a `%` outside
/// quotes are taken as strftime.
pub fn date_pattern(format: &str) -> Cow<'_, str> {
    if has_unquoted_percent(format) {
        return Cow::Borrowed(format);
    }

    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        match c {
            'y' => out.push_str(if run >= 3 { "%Y" } else { "%y" }),
            'M' => out.push_str(match run {
                1 => "%-m",
                2 => "%m",
                3 => "%b",
                _ => "%B",
            }),
            'd' => out.push_str(match run {
                1 => "%-d",
                2 => "%d",
                3 => "%a",
                _ => "%A",
            }),
            'H' => out.push_str(if run == 1 { "%-H" } else { "%H" }),
            'h' => out.push_str(if run == 1 { "%-I" } else { "%I" }),
            'm' => out.push_str(if run == 1 { "%-M" } else { "%M" }),
            's' => out.push_str(if run == 1 { "%-S" } else { "%S" }),
            // chrono offers 3, 6 or 9 fractional digits.
            'f' | 'F' => out.push_str(match run {
                1..=3 => "%3f",
                4..=6 => "%6f",
                _ => "%9f",
            }),
            't' => out.push_str("%p"),
            'z' | 'K' => out.push_str("%:z"),
            '\'' | '"' => {
                let close = chars[i + 1..].iter().position(|&x| x == c);
                let end = close.map_or(chars.len(), |p| i + 1 + p);
                for &lit in &chars[i + 1..end] {
                    push_literal(&mut out, lit);
                }
                i = (end + 1).min(chars.len());
                continue;
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    push_literal(&mut out, next);
                }
                i += 2;
                continue;
            }
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
            }
        }
        i += run;
    }
    Cow::Owned(out)
}

fn has_unquoted_percent(format: &str) -> bool {
    let mut quote = None;
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, '\\') => {
                chars.next();
            }
            (None, '%') => return true,
            _ => {}
        }
    }
    false
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
