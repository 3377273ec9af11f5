//! Source-form codec: config documents to PHP array files and back.

pub mod layout;
pub mod parse;
pub mod render;
pub mod value;

pub use layout::{LayoutCalculator, LevelLayout, DEFAULT_TAB_WIDTH};
pub use parse::{parse_document, ParseError, MAX_DEPTH};
pub use render::{Comments, Serializer};
pub use value::{format_key, format_value, FormatError};
