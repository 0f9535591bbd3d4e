//! `text/plain` codec: a payload is exactly one scalar value.

use wirekit_core::parse_node::{ParseNode, ParseNodeFactory, ParseNodeHooks};
use wirekit_core::writer::{SerializationWriter, SerializationWriterFactory, WriterHooks};
use wirekit_core::{Parsable, Result, SerializationError, UntypedNode};

pub const CONTENT_TYPE: &str = "text/plain";

const NO_STRUCTURED_DATA: &str = "text/plain does not support structured data";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextParseNodeFactory;

impl ParseNodeFactory for TextParseNodeFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn get_root_parse_node(
        &self,
        _content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        let text = std::str::from_utf8(content)
            .map_err(|e| SerializationError::parse("", format!("payload is not UTF-8: {e}")))?;
        Ok(Box::new(TextParseNode::new(text)))
    }
}

/// The whole payload as one value, surrounding double quotes removed.
#[derive(Debug, Clone)]
pub struct TextParseNode {
    text: String,
    hooks: ParseNodeHooks,
}

impl TextParseNode {
    pub fn new(text: &str) -> Self {
        let text = text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(text);
        Self {
            text: text.to_owned(),
            hooks: ParseNodeHooks::default(),
        }
    }
}

impl ParseNode for TextParseNode {
    fn path(&self) -> &str {
        ""
    }

    fn hooks(&self) -> &ParseNodeHooks {
        &self.hooks
    }

    fn set_hooks(&mut self, hooks: ParseNodeHooks) {
        self.hooks = hooks;
    }

    fn get_string_value(&self) -> Result<Option<String>> {
        Ok(Some(self.text.clone()))
    }

    fn get_untyped_value(&self) -> Result<UntypedNode> {
        Ok(UntypedNode::String(self.text.clone()))
    }

    fn get_child_node(&self, _key: &str) -> Result<Option<Box<dyn ParseNode>>> {
        Err(SerializationError::unsupported(NO_STRUCTURED_DATA))
    }

    fn get_collection_elements(&self) -> Result<Option<Vec<Box<dyn ParseNode>>>> {
        Err(SerializationError::unsupported(NO_STRUCTURED_DATA))
    }

    fn get_object_members(&self) -> Result<Option<Vec<(String, Box<dyn ParseNode>)>>> {
        Err(SerializationError::unsupported(NO_STRUCTURED_DATA))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextSerializationWriterFactory;

impl SerializationWriterFactory for TextSerializationWriterFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn get_serialization_writer(&self, _content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        Ok(Box::new(TextSerializationWriter::new()))
    }
}

/// Accepts a single unnamed scalar.
#[derive(Debug, Default)]
pub struct TextSerializationWriter {
    text: Option<String>,
    hooks: WriterHooks,
}

impl TextSerializationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, key: Option<&str>, value: String) -> Result<()> {
        if key.is_some_and(|k| !k.is_empty()) {
            return Err(SerializationError::unsupported(NO_STRUCTURED_DATA));
        }
        if self.text.is_some() {
            return Err(SerializationError::unsupported(
                "text/plain holds a single value",
            ));
        }
        self.text = Some(value);
        Ok(())
    }

    fn put_some(&mut self, key: Option<&str>, value: Option<String>) -> Result<()> {
        match value {
            Some(value) => self.put(key, value),
            None => Ok(()),
        }
    }
}

impl SerializationWriter for TextSerializationWriter {
    fn content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn hooks(&self) -> &WriterHooks {
        &self.hooks
    }

    fn set_hooks(&mut self, hooks: WriterHooks) {
        self.hooks = hooks;
    }

    fn write_string_value(&mut self, key: Option<&str>, value: Option<&str>) -> Result<()> {
        self.put_some(key, value.map(str::to_owned))
    }

    fn write_bool_value(&mut self, key: Option<&str>, value: Option<bool>) -> Result<()> {
        self.put_some(key, value.map(|b| b.to_string()))
    }

    fn write_long_value(&mut self, key: Option<&str>, value: Option<i64>) -> Result<()> {
        self.put_some(key, value.map(|n| n.to_string()))
    }

    fn write_double_value(&mut self, key: Option<&str>, value: Option<f64>) -> Result<()> {
        self.put_some(key, value.map(|n| n.to_string()))
    }

    fn write_float_value(&mut self, key: Option<&str>, value: Option<f32>) -> Result<()> {
        self.put_some(key, value.map(|n| n.to_string()))
    }

    fn write_null_value(&mut self, key: Option<&str>) -> Result<()> {
        self.put(key, "null".to_owned())
    }

    fn write_start_object(
        &mut self,
        _key: Option<&str>,
        _value: Option<&dyn Parsable>,
    ) -> Result<()> {
        Err(SerializationError::unsupported(NO_STRUCTURED_DATA))
    }

    fn write_end_object(&mut self) -> Result<()> {
        Err(SerializationError::unsupported(NO_STRUCTURED_DATA))
    }

    fn write_start_collection(&mut self, _key: Option<&str>) -> Result<()> {
        Err(SerializationError::unsupported(NO_STRUCTURED_DATA))
    }

    fn write_end_collection(&mut self) -> Result<()> {
        Err(SerializationError::unsupported(NO_STRUCTURED_DATA))
    }

    fn get_serialized_content(&mut self) -> Result<Vec<u8>> {
        Ok(self.text.take().map(String::into_bytes).unwrap_or_default())
    }
}
