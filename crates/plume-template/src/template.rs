//! Parsed message templates.

use std::fmt;

use crate::parser::Tokenizer;
use crate::token::{PropertyToken, Token};

/// How the property tokens of a template bind to supplied values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyBinding {
    /// The template has no property tokens.
    None,
    /// Properties are looked up by name.
    Named,
    /// Every property name is a non-negative integer (`{0} {1}`).
    Positional,
}

/// An immutable, parsed message template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageTemplate {
    text: String,
    tokens: Vec<Token>,
    properties: Vec<PropertyToken>,
    binding: PropertyBinding,
    malformed: bool,
}

impl MessageTemplate {
    /// Parses `text`. Never fails: malformed tags become literal text.
    pub fn parse(text: &str) -> Self {
        Self::from_tokens(text, Tokenizer::new(text).collect())
    }

    /// Builds a template from already tokenized input.
    pub fn from_tokens(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        let properties: Vec<PropertyToken> = tokens.iter().filter_map(Token::as_property).cloned().collect();

        let (binding, malformed) = if properties.is_empty() {
            (PropertyBinding::None, false)
        } else if properties.iter().all(PropertyToken::is_positional) {
            (PropertyBinding::Positional, false)
        } else {
            (PropertyBinding::Named, properties.iter().any(PropertyToken::is_positional))
        };

        Self {
            text: text.into(),
            tokens,
            properties,
            binding,
            malformed,
        }
    }

    /// The source text, exactly as given.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn binding(&self) -> PropertyBinding {
        self.binding
    }

    /// All property tokens, in template order.
    pub fn properties(&self) -> &[PropertyToken] {
        &self.properties
    }

    /// Property tokens when the template binds by name.
    pub fn named_properties(&self) -> Option<&[PropertyToken]> {
        (self.binding == PropertyBinding::Named).then_some(self.properties.as_slice())
    }

    /// Property tokens when the template binds by position.
    pub fn positional_properties(&self) -> Option<&[PropertyToken]> {
        (self.binding == PropertyBinding::Positional).then_some(self.properties.as_slice())
    }

    /// True when positional and named properties are mixed. Such templates
    /// bind by name.
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Whether any property token uses `name`.
    pub fn mentions(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name() == name)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for MessageTemplate {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}
