//! Log events and the structured values they carry.

mod event;
mod level;
mod value;

pub use event::{Exception, LogEvent, PropertyMap, CAUSE_PREFIX};
pub use level::Level;
pub use value::{DictionaryValue, Property, PropertyValue, Scalar, StructureValue};
