//! `application/x-www-form-urlencoded` codec.
//!
//! A form is one flat object of scalar fields. Collections of scalars are
//! written as repeated keys; on read, repeated keys are joined with `,` and
//! split again when a collection is requested.

mod parse_node;
mod writer;

pub use parse_node::{FormParseNode, FormParseNodeFactory};
pub use writer::{FormSerializationWriter, FormSerializationWriterFactory};

pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
