//! `multipart/form-data` request bodies.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::{Result, SerializationError};
use crate::parsable::{FieldDeserializers, Parsable};
use crate::registry::SerializationWriterFactoryRegistry;
use crate::writer::{write_object_value, SerializationWriter};

/// Content of one part.
pub enum PartValue {
    /// Serialized with the writer registered for the part's content type.
    Object(Box<dyn Parsable + Send + Sync>),
    Text(String),
    Binary(Vec<u8>),
}

impl fmt::Debug for PartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartValue::Object(_) => f.write_str("Object(..)"),
            PartValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            PartValue::Binary(bytes) => write!(f, "Binary({} bytes)", bytes.len()),
        }
    }
}

impl PartValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PartValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PartValue::Binary(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct MultipartPart {
    pub name: String,
    pub content_type: String,
    pub file_name: Option<String>,
    pub value: PartValue,
}

/// Named parts separated by a boundary. Part names compare
/// case-insensitively; parts are written in insertion order.
pub struct MultipartBody {
    boundary: String,
    parts: IndexMap<String, MultipartPart>,
    writers: Option<Arc<SerializationWriterFactoryRegistry>>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MultipartBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartBody")
            .field("boundary", &self.boundary)
            .field("parts", &self.parts.values().collect::<Vec<_>>())
            .finish()
    }
}

impl MultipartBody {
    /// A body with a random boundary.
    pub fn new() -> Self {
        Self {
            boundary: Uuid::new_v4().simple().to_string(),
            parts: IndexMap::new(),
            writers: None,
        }
    }

    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    /// Object parts are written with `registry` instead of the default one.
    pub fn with_writer_registry(mut self, registry: Arc<SerializationWriterFactoryRegistry>) -> Self {
        self.writers = Some(registry);
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `multipart/form-data; boundary=...`
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn add_or_replace_part(
        &mut self,
        name: &str,
        content_type: &str,
        value: PartValue,
    ) -> Result<()> {
        self.insert_part(name, content_type, None, value)
    }

    pub fn add_or_replace_file_part(
        &mut self,
        name: &str,
        content_type: &str,
        file_name: &str,
        value: PartValue,
    ) -> Result<()> {
        self.insert_part(name, content_type, Some(file_name.to_owned()), value)
    }

    fn insert_part(
        &mut self,
        name: &str,
        content_type: &str,
        file_name: Option<String>,
        value: PartValue,
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(SerializationError::invalid_argument(
                "name",
                "part name must not be empty",
            ));
        }
        if content_type.trim().is_empty() {
            return Err(SerializationError::invalid_argument(
                "content_type",
                "part content type must not be empty",
            ));
        }
        self.parts.insert(
            name.to_lowercase(),
            MultipartPart {
                name: name.to_owned(),
                content_type: content_type.to_owned(),
                file_name,
                value,
            },
        );
        Ok(())
    }

    pub fn get_part(&self, name: &str) -> Option<&MultipartPart> {
        self.parts.get(&name.to_lowercase())
    }

    pub fn get_part_value(&self, name: &str) -> Option<&PartValue> {
        self.get_part(name).map(|part| &part.value)
    }

    pub fn remove_part(&mut self, name: &str) -> bool {
        self.parts.shift_remove(&name.to_lowercase()).is_some()
    }

    pub fn parts(&self) -> impl Iterator<Item = &MultipartPart> + '_ {
        self.parts.values()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn writers(&self) -> &SerializationWriterFactoryRegistry {
        match &self.writers {
            Some(registry) => registry.as_ref(),
            None => SerializationWriterFactoryRegistry::default_instance(),
        }
    }

    fn write_part(&self, part: &MultipartPart, writer: &mut dyn SerializationWriter) -> Result<()> {
        writer.write_string_value(None, Some(format!("--{}", self.boundary).as_str()))?;
        writer.write_string_value(Some("Content-Type"), Some(part.content_type.as_str()))?;
        let disposition = match &part.file_name {
            Some(file_name) => format!("form-data; name=\"{}\"; filename=\"{file_name}\"", part.name),
            None => format!("form-data; name=\"{}\"", part.name),
        };
        writer.write_string_value(Some("Content-Disposition"), Some(disposition.as_str()))?;
        writer.write_string_value(None, Some(""))?;
        match &part.value {
            PartValue::Object(value) => {
                let mut part_writer = self.writers().get_serialization_writer(&part.content_type)?;
                let value: &dyn Parsable = &**value;
                write_object_value(part_writer.as_mut(), None, Some(value))?;
                let content = part_writer.get_serialized_content()?;
                writer.write_byte_array_value(None, Some(content.as_slice()))?;
            }
            PartValue::Text(text) => writer.write_byte_array_value(None, Some(text.as_bytes()))?,
            PartValue::Binary(bytes) => writer.write_byte_array_value(None, Some(bytes.as_slice()))?,
        }
        writer.write_string_value(None, Some(""))
    }
}

impl Parsable for MultipartBody {
    /// Multipart payloads are write-only.
    fn get_field_deserializers(&self) -> FieldDeserializers<Self> {
        FieldDeserializers::new()
    }

    fn serialize(&self, writer: &mut dyn SerializationWriter) -> Result<()> {
        if self.parts.is_empty() {
            return Err(SerializationError::invalid_argument(
                "parts",
                "multipart body must contain at least one part",
            ));
        }
        for part in self.parts.values() {
            self.write_part(part, writer)?;
        }
        writer.write_string_value(None, Some(format!("--{}--", self.boundary).as_str()))
    }

    fn as_multipart_body(&self) -> Option<&MultipartBody> {
        Some(self)
    }
}
