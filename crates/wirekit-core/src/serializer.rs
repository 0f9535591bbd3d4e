//! One-call serialization and deserialization through the registries.

use std::sync::Arc;

use crate::discriminator::DiscriminatorRegistry;
use crate::error::{Result, SerializationError};
use crate::parsable::{Parsable, ParsableFactory};
use crate::parse_node::{get_collection_of_object_values, get_object_value, ParseNode};
use crate::registry::{
    normalize_content_type, ParseNodeFactoryRegistry, SerializationWriterFactoryRegistry,
};
use crate::writer::{write_collection_of_object_values, write_object_value, SerializationWriter};

/// A serialized payload and the content type it was written as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedContent {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SerializedContent {
    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.bytes)
            .map_err(|e| SerializationError::format(format!("payload is not UTF-8: {e}")))
    }
}

/// Facade over a pair of registries.
///
/// [`ContentSerializer::default`] uses the process-wide registries, which is
/// what the free functions of this module do. Subtypes resolve through the
/// process-wide [`DiscriminatorRegistry`] unless
/// [`with_discriminators`](Self::with_discriminators) supplies another.
#[derive(Debug, Clone)]
pub struct ContentSerializer<'a> {
    writers: &'a SerializationWriterFactoryRegistry,
    parsers: &'a ParseNodeFactoryRegistry,
    discriminators: Option<Arc<DiscriminatorRegistry>>,
}

impl Default for ContentSerializer<'static> {
    fn default() -> Self {
        Self::new(
            SerializationWriterFactoryRegistry::default_instance(),
            ParseNodeFactoryRegistry::default_instance(),
        )
    }
}

impl<'a> ContentSerializer<'a> {
    pub fn new(
        writers: &'a SerializationWriterFactoryRegistry,
        parsers: &'a ParseNodeFactoryRegistry,
    ) -> Self {
        Self {
            writers,
            parsers,
            discriminators: None,
        }
    }

    pub fn with_discriminators(mut self, registry: Arc<DiscriminatorRegistry>) -> Self {
        self.discriminators = Some(registry);
        self
    }

    fn root_node(&self, content_type: &str, content: &[u8]) -> Result<Box<dyn ParseNode>> {
        normalize_content_type(content_type)?;
        let mut root = self.parsers.get_root_parse_node(content_type, content)?;
        if let Some(registry) = &self.discriminators {
            let hooks = root.hooks().clone().with_discriminators(Arc::clone(registry));
            root.set_hooks(hooks);
        }
        Ok(root)
    }

    fn writer(&self, content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        normalize_content_type(content_type)?;
        self.writers.get_serialization_writer(content_type)
    }

    pub fn serialize<T: Parsable>(&self, content_type: &str, value: &T) -> Result<SerializedContent> {
        let mut writer = self.writer(content_type)?;
        write_object_value(writer.as_mut(), None, Some(value as &dyn Parsable))?;
        let bytes = writer.get_serialized_content()?;
        let content_type = match value.as_multipart_body() {
            Some(body) => body.content_type(),
            None => writer.content_type().to_owned(),
        };
        Ok(SerializedContent {
            content_type,
            bytes,
        })
    }

    pub fn serialize_as_bytes<T: Parsable>(&self, content_type: &str, value: &T) -> Result<Vec<u8>> {
        self.serialize(content_type, value).map(|c| c.bytes)
    }

    pub fn serialize_as_string<T: Parsable>(&self, content_type: &str, value: &T) -> Result<String> {
        self.serialize(content_type, value)?.into_string()
    }

    pub fn serialize_collection<T: Parsable>(
        &self,
        content_type: &str,
        values: &[T],
    ) -> Result<SerializedContent> {
        let mut writer = self.writer(content_type)?;
        write_collection_of_object_values(writer.as_mut(), None, Some(values))?;
        let bytes = writer.get_serialized_content()?;
        Ok(SerializedContent {
            content_type: writer.content_type().to_owned(),
            bytes,
        })
    }

    pub fn serialize_collection_as_bytes<T: Parsable>(
        &self,
        content_type: &str,
        values: &[T],
    ) -> Result<Vec<u8>> {
        self.serialize_collection(content_type, values).map(|c| c.bytes)
    }

    pub fn serialize_collection_as_string<T: Parsable>(
        &self,
        content_type: &str,
        values: &[T],
    ) -> Result<String> {
        self.serialize_collection(content_type, values)?.into_string()
    }

    /// `Ok(None)` when the payload is a null value.
    pub fn deserialize<T: Parsable + 'static>(
        &self,
        content_type: &str,
        content: &[u8],
        factory: ParsableFactory<T>,
    ) -> Result<Option<T>> {
        let root = self.root_node(content_type, content)?;
        get_object_value(root.as_ref(), factory)
    }

    pub fn deserialize_from_str<T: Parsable + 'static>(
        &self,
        content_type: &str,
        content: &str,
        factory: ParsableFactory<T>,
    ) -> Result<Option<T>> {
        self.deserialize(content_type, content.as_bytes(), factory)
    }

    /// A null payload reads as an empty collection.
    pub fn deserialize_collection<T: Parsable + 'static>(
        &self,
        content_type: &str,
        content: &[u8],
        factory: ParsableFactory<T>,
    ) -> Result<Vec<T>> {
        let root = self.root_node(content_type, content)?;
        Ok(get_collection_of_object_values(root.as_ref(), factory)?.unwrap_or_default())
    }

    pub fn deserialize_collection_from_str<T: Parsable + 'static>(
        &self,
        content_type: &str,
        content: &str,
        factory: ParsableFactory<T>,
    ) -> Result<Vec<T>> {
        self.deserialize_collection(content_type, content.as_bytes(), factory)
    }
}

pub fn serialize<T: Parsable>(content_type: &str, value: &T) -> Result<SerializedContent> {
    ContentSerializer::default().serialize(content_type, value)
}

pub fn serialize_as_bytes<T: Parsable>(content_type: &str, value: &T) -> Result<Vec<u8>> {
    ContentSerializer::default().serialize_as_bytes(content_type, value)
}

pub fn serialize_as_string<T: Parsable>(content_type: &str, value: &T) -> Result<String> {
    ContentSerializer::default().serialize_as_string(content_type, value)
}

pub fn serialize_collection<T: Parsable>(
    content_type: &str,
    values: &[T],
) -> Result<SerializedContent> {
    ContentSerializer::default().serialize_collection(content_type, values)
}

pub fn serialize_collection_as_bytes<T: Parsable>(
    content_type: &str,
    values: &[T],
) -> Result<Vec<u8>> {
    ContentSerializer::default().serialize_collection_as_bytes(content_type, values)
}

pub fn serialize_collection_as_string<T: Parsable>(
    content_type: &str,
    values: &[T],
) -> Result<String> {
    ContentSerializer::default().serialize_collection_as_string(content_type, values)
}

pub fn deserialize<T: Parsable + 'static>(
    content_type: &str,
    content: &[u8],
    factory: ParsableFactory<T>,
) -> Result<Option<T>> {
    ContentSerializer::default().deserialize(content_type, content, factory)
}

pub fn deserialize_from_str<T: Parsable + 'static>(
    content_type: &str,
    content: &str,
    factory: ParsableFactory<T>,
) -> Result<Option<T>> {
    ContentSerializer::default().deserialize_from_str(content_type, content, factory)
}

pub fn deserialize_collection<T: Parsable + 'static>(
    content_type: &str,
    content: &[u8],
    factory: ParsableFactory<T>,
) -> Result<Vec<T>> {
    ContentSerializer::default().deserialize_collection(content_type, content, factory)
}

pub fn deserialize_collection_from_str<T: Parsable + 'static>(
    content_type: &str,
    content: &str,
    factory: ParsableFactory<T>,
) -> Result<Vec<T>> {
    ContentSerializer::default().deserialize_collection_from_str(content_type, content, factory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsable::FieldDeserializers;

    struct Empty;

    impl Parsable for Empty {
        fn get_field_deserializers(&self) -> FieldDeserializers<Self> {
            FieldDeserializers::new()
        }

        fn serialize(&self, _writer: &mut dyn SerializationWriter) -> Result<()> {
            Ok(())
        }
    }

    fn empty(_: &dyn crate::parse_node::ParseNode) -> Result<Empty> {
        Ok(Empty)
    }

    #[test]
    fn empty_content_type_is_an_invalid_argument() {
        let writers = SerializationWriterFactoryRegistry::new();
        let parsers = ParseNodeFactoryRegistry::new();
        let facade = ContentSerializer::new(&writers, &parsers);

        for result in [
            facade.serialize("", &Empty).map(|_| ()),
            facade.serialize_collection::<Empty>("  ", &[]).map(|_| ()),
            facade.deserialize("", b"{}", empty).map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(SerializationError::InvalidArgument { name: "content_type", .. })
            ));
        }
    }

    #[test]
    fn empty_payload_is_an_invalid_argument() {
        let writers = SerializationWriterFactoryRegistry::new();
        let parsers = ParseNodeFactoryRegistry::new();
        let facade = ContentSerializer::new(&writers, &parsers);
        assert!(matches!(
            facade.deserialize_from_str("application/json", "", empty),
            Err(SerializationError::InvalidArgument { name: "content", .. })
        ));
    }

    #[test]
    fn unknown_content_type_is_reported() {
        let writers = SerializationWriterFactoryRegistry::new();
        let parsers = ParseNodeFactoryRegistry::new();
        let facade = ContentSerializer::new(&writers, &parsers);
        assert_eq!(
            facade.serialize("application/xml", &Empty).unwrap_err(),
            SerializationError::UnsupportedContentType("application/xml".to_owned())
        );
        assert_eq!(
            facade
                .deserialize_collection("application/xml", b"<a/>", empty)
                .map(|v| v.len())
                .unwrap_err(),
            SerializationError::UnsupportedContentType("application/xml".to_owned())
        );
    }
}
