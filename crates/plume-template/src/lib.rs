//! Message template parsing for structured logging.
//!
//! A message template is ordinary text with named holes:
//!
//! ```text
//! User {UserId} logged in from {@Client} in {Elapsed,8:0.00} ms
//! ```
//!
//! Parsing turns it into an ordered list of [`Token`]s. Each property token
//! carries its name, optional alignment (`,8` right / `,-8` left), optional
//! format (`:0.00`) and destructuring hint (`@` destructure, `$` stringify).
//!
//! # Example
//!
//! ```rust
//! use plume_template::{parse, Alignment, Destructuring, Token};
//!
//! let template = parse("Hello, {@User,-10:l}!");
//! let tokens = template.tokens();
//! assert_eq!(tokens[0], Token::Text("Hello, ".into()));
//!
//! let user = tokens[1].as_property().unwrap();
//! assert_eq!(user.name(), "User");
//! assert_eq!(user.destructuring(), Destructuring::Destructure);
//! assert_eq!(user.alignment(), Some(Alignment::left(10)));
//! assert_eq!(user.format(), Some("l"));
//! ```
//!
//! # Malformed input
//!
//! Parsing is total. A tag that cannot be parsed (bad name character,
//! missing `}`, zero width, stray sign) is kept as literal text, braces and
//! all:
//!
//! ```rust
//! use plume_template::{parse, Token};
//!
//! let template = parse("{not-a-name!}");
//! assert_eq!(template.tokens(), &[Token::Text("{not-a-name!}".into())]);
//! ```
//!
//! Doubled braces `{{` and `}}` escape a single brace in text.

mod parser;
mod template;
mod token;

pub use parser::Tokenizer;
pub use template::{MessageTemplate, PropertyBinding};
pub use token::{Alignment, AlignmentDirection, Destructuring, PropertyToken, Token};

/// Parses a template. Never fails.
pub fn parse(text: &str) -> MessageTemplate {
    MessageTemplate::parse(text)
}
