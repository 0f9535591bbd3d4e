//! `multipart/form-data` serialization writer.
//!
//! The writer only accepts a [`MultipartBody`] as its root object. The body
//! drives the layout: header lines arrive as keyed strings, blank lines as
//! empty strings and part payloads as raw byte arrays.

use wirekit_core::writer::{SerializationWriter, SerializationWriterFactory, WriterHooks};
use wirekit_core::{MultipartBody, Parsable, Result, SerializationError};

pub const CONTENT_TYPE: &str = "multipart/form-data";

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct MultipartSerializationWriterFactory;

impl SerializationWriterFactory for MultipartSerializationWriterFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn get_serialization_writer(&self, _content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        Ok(Box::new(MultipartSerializationWriter::new()))
    }
}

#[derive(Debug, Default)]
pub struct MultipartSerializationWriter {
    buffer: Vec<u8>,
    depth: usize,
    hooks: WriterHooks,
}

fn unsupported(what: &str) -> SerializationError {
    SerializationError::unsupported(format!("multipart bodies cannot contain {what}"))
}

impl MultipartSerializationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `body` and returns the finished payload.
    pub fn write_body(body: &MultipartBody) -> Result<Vec<u8>> {
        let mut writer = Self::new();
        wirekit_core::writer::write_object_value(&mut writer, None, Some(body as &dyn Parsable))?;
        writer.get_serialized_content()
    }
}

impl SerializationWriter for MultipartSerializationWriter {
    fn content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn hooks(&self) -> &WriterHooks {
        &self.hooks
    }

    fn set_hooks(&mut self, hooks: WriterHooks) {
        self.hooks = hooks;
    }

    /// Writes `key: value` as one line; either half may be absent.
    fn write_string_value(&mut self, key: Option<&str>, value: Option<&str>) -> Result<()> {
        if key.is_none() && value.is_none() {
            return Ok(());
        }
        if let Some(key) = key {
            self.buffer.extend_from_slice(key.as_bytes());
        }
        if let Some(value) = value {
            if key.is_some() {
                self.buffer.extend_from_slice(b": ");
            }
            self.buffer.extend_from_slice(value.as_bytes());
        }
        self.buffer.extend_from_slice(CRLF);
        Ok(())
    }

    /// Appended verbatim.
    fn write_byte_array_value(&mut self, _key: Option<&str>, value: Option<&[u8]>) -> Result<()> {
        if let Some(bytes) = value {
            self.buffer.extend_from_slice(bytes);
        }
        Ok(())
    }

    fn write_bool_value(&mut self, _key: Option<&str>, _value: Option<bool>) -> Result<()> {
        Err(unsupported("boolean values"))
    }

    fn write_long_value(&mut self, _key: Option<&str>, _value: Option<i64>) -> Result<()> {
        Err(unsupported("numeric values"))
    }

    fn write_double_value(&mut self, _key: Option<&str>, _value: Option<f64>) -> Result<()> {
        Err(unsupported("numeric values"))
    }

    fn write_null_value(&mut self, _key: Option<&str>) -> Result<()> {
        Err(unsupported("null values"))
    }

    fn write_start_object(
        &mut self,
        _key: Option<&str>,
        value: Option<&dyn Parsable>,
    ) -> Result<()> {
        let is_body = value.and_then(|v| v.as_multipart_body()).is_some();
        if self.depth > 0 || !is_body {
            return Err(unsupported("objects other than the multipart body itself"));
        }
        self.depth += 1;
        Ok(())
    }

    fn write_end_object(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn write_start_collection(&mut self, _key: Option<&str>) -> Result<()> {
        Err(unsupported("collections"))
    }

    fn write_end_collection(&mut self) -> Result<()> {
        Err(unsupported("collections"))
    }

    fn get_serialized_content(&mut self) -> Result<Vec<u8>> {
        tracing::trace!(len = self.buffer.len(), "multipart body written");
        Ok(std::mem::take(&mut self.buffer))
    }
}
