//! Record parsing: one source document to one attribute tree.

pub mod model;
pub mod parser;

pub use model::{Field, Record, Value, TEXT_KEY};
pub use parser::{parse_document, parse_tree};
