//! Left-to-right template tokenizer.
//!
//! The tokenizer alternates between two states: a text run that stops at the
//! next unescaped `{`, and a property tag that runs up to the matching `}`.
//! Tags that fail validation are emitted as text holding their raw source, so
//! tokenizing never fails.

use crate::token::{Alignment, AlignmentDirection, Destructuring, PropertyToken, Token};

/// Iterator over the tokens of a template string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    emitted_any: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            emitted_any: false,
        }
    }

    /// Consumes text up to the next single `{`, unescaping doubled braces.
    fn text_token(&mut self) -> Option<Token> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut text = String::new();
        let mut run_start = self.pos;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'{' => {
                    if bytes.get(self.pos + 1) == Some(&b'{') {
                        text.push_str(&self.input[run_start..=self.pos]);
                        self.pos += 2;
                        run_start = self.pos;
                    } else {
                        break;
                    }
                }
                b'}' => {
                    text.push_str(&self.input[run_start..=self.pos]);
                    self.pos += if bytes.get(self.pos + 1) == Some(&b'}') { 2 } else { 1 };
                    run_start = self.pos;
                }
                _ => self.pos += 1,
            }
        }
        text.push_str(&self.input[run_start..self.pos]);

        (self.pos > start).then_some(Token::Text(text))
    }

    /// Consumes a tag starting at `{`.
    fn property_token(&mut self) -> Token {
        let start = self.pos;
        let rest = &self.input[start + 1..];
        let scanned = rest
            .char_indices()
            .find(|&(_, c)| !is_valid_in_tag(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let end = start + 1 + scanned;

        if !rest[scanned..].starts_with('}') {
            self.pos = end;
            return Token::Text(self.input[start..end].to_string());
        }

        self.pos = end + 1;
        let raw_text = &self.input[start..self.pos];
        let content = &rest[..scanned];

        match parse_tag(content, raw_text) {
            Some(token) => Token::Property(token),
            None => Token::Text(raw_text.to_string()),
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.input.is_empty() {
            if self.emitted_any {
                return None;
            }
            self.emitted_any = true;
            return Some(Token::Text(String::new()));
        }

        while self.pos < self.input.len() {
            let token = if self.input.as_bytes()[self.pos] == b'{'
                && self.input.as_bytes().get(self.pos + 1) != Some(&b'{')
            {
                Some(self.property_token())
            } else {
                self.text_token()
            };
            if let Some(token) = token {
                self.emitted_any = true;
                return Some(token);
            }
        }
        None
    }
}

/// Validates tag content and builds the property token, or `None` when the
/// tag should degrade to text.
fn parse_tag(content: &str, raw_text: &str) -> Option<PropertyToken> {
    if content.is_empty() {
        return None;
    }

    let (name, format, alignment) = split_tag_content(content)?;

    let mut chars = name.chars();
    let (destructuring, name) = match chars.next().and_then(Destructuring::from_prefix) {
        Some(hint) => (hint, chars.as_str()),
        None => (Destructuring::Default, name),
    };

    if name.is_empty() || !name.chars().all(is_valid_in_name) {
        return None;
    }

    if let Some(format) = format {
        if !format.chars().all(is_valid_in_format) {
            return None;
        }
    }

    let alignment = match alignment {
        Some(a) => Some(parse_alignment(a)?),
        None => None,
    };

    Some(PropertyToken::new(
        name,
        raw_text,
        format.map(str::to_string),
        alignment,
        destructuring,
    ))
}

/// Splits `name[,alignment][:format]`. The first `:` starts the format; a
/// `,` only delimits alignment when it comes before that.
fn split_tag_content(content: &str) -> Option<(&str, Option<&str>, Option<&str>)> {
    let format_at = content.find(':');
    let align_at = content.find(',');
    fn non_empty(s: &str) -> Option<&str> {
        (!s.is_empty()).then_some(s)
    }

    match (align_at, format_at) {
        (None, None) => Some((content, None, None)),
        (None, Some(f)) => Some((&content[..f], non_empty(&content[f + 1..]), None)),
        (Some(a), Some(f)) if a > f => Some((&content[..f], non_empty(&content[f + 1..]), None)),
        (Some(a), None) => {
            if a == content.len() - 1 {
                return None;
            }
            Some((&content[..a], None, Some(&content[a + 1..])))
        }
        (Some(a), Some(f)) => {
            if a + 1 == f {
                return None;
            }
            Some((
                &content[..a],
                non_empty(&content[f + 1..]),
                Some(&content[a + 1..f]),
            ))
        }
    }
}

fn parse_alignment(text: &str) -> Option<Alignment> {
    if !text.chars().all(is_valid_in_alignment) {
        return None;
    }
    let last_dash = text.rfind('-');
    if matches!(last_dash, Some(i) if i > 0) {
        return None;
    }
    let digits = if last_dash.is_some() { &text[1..] } else { text };
    let width = digits.parse::<i32>().ok().filter(|w| *w > 0)? as usize;
    let direction = if last_dash.is_some() {
        AlignmentDirection::Left
    } else {
        AlignmentDirection::Right
    };
    Some(Alignment::new(direction, width))
}

fn is_valid_in_name(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_valid_in_alignment(c: char) -> bool {
    c.is_ascii_digit() || c == '-'
}

/// Punctuation as opposed to symbols: `$+<=>^`|~` are symbols.
/// ASCII only; Unicode punctuation such as `¿` or `«` ends a tag.
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~')
}

fn is_valid_in_format(c: char) -> bool {
    c != '}' && (c.is_alphanumeric() || is_punctuation(c) || c == ' ' || c == '+')
}

fn is_valid_in_tag(c: char) -> bool {
    Destructuring::from_prefix(c).is_some() || is_valid_in_name(c) || is_valid_in_format(c) || c == ':'
}
