//! Plain and JSON rendering of values and message templates.

pub(crate) mod buffer;
pub mod compact;
pub mod json;
pub mod message;
pub mod padding;
pub mod provider;
pub mod scalar;

pub(crate) use buffer::ScratchBuffer;
pub use compact::CompactJsonFormatter;
pub use json::{write_quoted_json_string, JsonValueFormatter, DEFAULT_TYPE_TAG_NAME};
pub use message::{render_message, FormatFlags};
pub use provider::FormatProvider;
