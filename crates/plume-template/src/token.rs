//! Tokens produced by the template parser.

use std::fmt;

/// How a captured value should be turned into a structured value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Destructuring {
    /// Scalars stay scalars, everything else is converted to text or a collection.
    #[default]
    Default,
    /// `@` prefix: explode the value into its properties.
    Destructure,
    /// `$` prefix: always use the value's string form.
    Stringify,
}

impl Destructuring {
    /// Maps a tag prefix character to its hint.
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            '@' => Some(Destructuring::Destructure),
            '$' => Some(Destructuring::Stringify),
            _ => None,
        }
    }

    /// The prefix character for this hint, if it has one.
    pub fn prefix(self) -> Option<char> {
        match self {
            Destructuring::Default => None,
            Destructuring::Destructure => Some('@'),
            Destructuring::Stringify => Some('$'),
        }
    }
}

/// Justification of padded output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlignmentDirection {
    /// Value first, padding after.
    Left,
    /// Padding first, value after.
    Right,
}

/// Minimum rendered width and justification for a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Alignment {
    pub direction: AlignmentDirection,
    pub width: usize,
}

impl Alignment {
    pub fn new(direction: AlignmentDirection, width: usize) -> Self {
        Self { direction, width }
    }

    pub fn left(width: usize) -> Self {
        Self::new(AlignmentDirection::Left, width)
    }

    pub fn right(width: usize) -> Self {
        Self::new(AlignmentDirection::Right, width)
    }

    /// Returns the same alignment with `by` extra columns.
    ///
    /// Used when the padded text carries characters that take no space on
    /// screen (escape sequences) or that are laid out elsewhere (newlines).
    pub fn widen(self, by: usize) -> Self {
        Self {
            direction: self.direction,
            width: self.width.saturating_add(by),
        }
    }
}

/// A `{Name,alignment:format}` placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyToken {
    name: String,
    raw_text: String,
    format: Option<String>,
    alignment: Option<Alignment>,
    destructuring: Destructuring,
    position: Option<usize>,
}

impl PropertyToken {
    pub fn new(
        name: impl Into<String>,
        raw_text: impl Into<String>,
        format: Option<String>,
        alignment: Option<Alignment>,
        destructuring: Destructuring,
    ) -> Self {
        let name = name.into();
        let position = parse_position(&name);
        Self {
            name,
            raw_text: raw_text.into(),
            format,
            alignment,
            destructuring,
            position,
        }
    }

    /// Property name without the destructuring prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tag exactly as it appeared in the template, braces included.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }

    pub fn destructuring(&self) -> Destructuring {
        self.destructuring
    }

    /// True when the name is a non-negative integer, as in `{0}`.
    pub fn is_positional(&self) -> bool {
        self.position.is_some()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

fn parse_position(name: &str) -> Option<usize> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<i32>().ok().map(|p| p as usize)
}

/// One element of a parsed template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Literal text with `{{` and `}}` already unescaped.
    Text(String),
    /// A property placeholder.
    Property(PropertyToken),
}

impl Token {
    pub fn as_property(&self) -> Option<&PropertyToken> {
        match self {
            Token::Property(p) => Some(p),
            Token::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text(t) => Some(t),
            Token::Property(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text(t) => f.write_str(t),
            Token::Property(p) => f.write_str(&p.raw_text),
        }
    }
}
