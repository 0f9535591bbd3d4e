//! `application/json` codec for wirekit, built on `serde_json`.

mod parse_node;
mod writer;

pub use parse_node::{JsonParseNode, JsonParseNodeFactory, JsonParseNodeOptions};
pub use writer::{JsonSerializationWriter, JsonSerializationWriterFactory};

pub const CONTENT_TYPE: &str = "application/json";

/// Escapes one path segment the way JSON Pointer does.
pub(crate) fn escape_segment(segment: &str) -> String {
    if !segment.contains('/') && !segment.contains('~') {
        return segment.to_owned();
    }
    segment.replace('~', "~0").replace('/', "~1")
}
