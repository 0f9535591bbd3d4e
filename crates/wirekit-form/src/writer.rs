use url::form_urlencoded;
use wirekit_core::writer::{SerializationWriter, SerializationWriterFactory, WriterHooks};
use wirekit_core::{AdditionalData, Parsable, Result, SerializationError};

use crate::CONTENT_TYPE;

#[derive(Debug, Clone, Copy, Default)]
pub struct FormSerializationWriterFactory;

impl SerializationWriterFactory for FormSerializationWriterFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn get_serialization_writer(&self, _content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        Ok(Box::new(FormSerializationWriter::new()))
    }
}

/// Collects `key=value` pairs of one flat root object.
#[derive(Debug, Default)]
pub struct FormSerializationWriter {
    pairs: Vec<(String, String)>,
    in_root: bool,
    collection_key: Option<String>,
    hooks: WriterHooks,
}

impl FormSerializationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, key: Option<&str>, value: String) -> Result<()> {
        let key = match (key, &self.collection_key) {
            (Some(key), None) => key.to_owned(),
            (None, Some(collection)) => collection.clone(),
            (Some(_), Some(collection)) => {
                return Err(SerializationError::unsupported(format!(
                    "form collection `{collection}` cannot hold named values"
                )))
            }
            (None, None) => {
                return Err(SerializationError::unsupported(
                    "form values must be fields of the root object",
                ))
            }
        };
        if !self.in_root {
            return Err(SerializationError::unsupported(format!(
                "form field `{key}` written outside of an object"
            )));
        }
        self.pairs.push((key, value));
        Ok(())
    }

    fn put_some(&mut self, key: Option<&str>, value: Option<String>) -> Result<()> {
        match value {
            Some(value) => self.put(key, value),
            None => Ok(()),
        }
    }

    fn has_field(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k.eq_ignore_ascii_case(key))
    }
}

impl SerializationWriter for FormSerializationWriter {
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
        key: Option<&str>,
        _value: Option<&dyn Parsable>,
    ) -> Result<()> {
        if self.in_root || key.is_some() {
            return Err(SerializationError::unsupported(
                "form serialization does not support nested objects",
            ));
        }
        self.in_root = true;
        Ok(())
    }

    fn write_end_object(&mut self) -> Result<()> {
        if !self.in_root {
            return Err(SerializationError::unsupported(
                "end of object without a matching start",
            ));
        }
        self.in_root = false;
        Ok(())
    }

    fn write_start_collection(&mut self, key: Option<&str>) -> Result<()> {
        let Some(key) = key else {
            return Err(SerializationError::unsupported(
                "form serialization does not support root collections",
            ));
        };
        if self.collection_key.is_some() {
            return Err(SerializationError::unsupported(
                "form serialization does not support nested collections",
            ));
        }
        self.collection_key = Some(key.to_owned());
        Ok(())
    }

    fn write_end_collection(&mut self) -> Result<()> {
        self.collection_key = None;
        Ok(())
    }

    /// Fields already written win over additional data.
    fn write_additional_data(&mut self, data: &AdditionalData) -> Result<()> {
        for (key, value) in data {
            if self.has_field(key) {
                tracing::trace!(%key, "additional data shadowed by a declared property");
                continue;
            }
            self.write_untyped_value(Some(key.as_str()), Some(value))?;
        }
        Ok(())
    }

    fn get_serialized_content(&mut self) -> Result<Vec<u8>> {
        let pairs = std::mem::take(&mut self.pairs);
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish();
        Ok(encoded.into_bytes())
    }
}
