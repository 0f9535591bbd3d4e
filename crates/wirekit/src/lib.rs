//! Content-type driven serialization of models.
//!
//! Re-exports the core contracts and bundles the stock codecs. Call
//! [`register_defaults`] once at startup to make JSON, plain text, form and
//! multipart available through the process-wide registries:
//!
//! ```ignore
//! wirekit::register_defaults()?;
//! let body = wirekit::json::serialize_as_string(&user)?;
//! let back = wirekit::json::deserialize_from_str(&body, User::create)?;
//! ```

use std::sync::Arc;

pub use wirekit_core::*;

/// The stock codec crates.
pub mod codecs {
    pub use wirekit_form as form;
    pub use wirekit_json as json;
    pub use wirekit_multipart as multipart;
    pub use wirekit_text as text;
}

use wirekit_form::{FormParseNodeFactory, FormSerializationWriterFactory};
use wirekit_json::{JsonParseNodeFactory, JsonSerializationWriterFactory};
use wirekit_multipart::MultipartSerializationWriterFactory;
use wirekit_text::{TextParseNodeFactory, TextSerializationWriterFactory};

/// Registers the stock codecs in the process-wide registries.
///
/// Factories already registered for the same content types are replaced.
pub fn register_defaults() -> Result<()> {
    register_defaults_in(
        SerializationWriterFactoryRegistry::default_instance(),
        ParseNodeFactoryRegistry::default_instance(),
    )
}

/// Registers the stock codecs in the given registries.
pub fn register_defaults_in(
    writers: &SerializationWriterFactoryRegistry,
    parsers: &ParseNodeFactoryRegistry,
) -> Result<()> {
    writers.register(Arc::new(JsonSerializationWriterFactory))?;
    writers.register(Arc::new(TextSerializationWriterFactory))?;
    writers.register(Arc::new(FormSerializationWriterFactory))?;
    writers.register(Arc::new(MultipartSerializationWriterFactory))?;

    parsers.register(Arc::new(JsonParseNodeFactory::default()))?;
    parsers.register(Arc::new(TextParseNodeFactory))?;
    parsers.register(Arc::new(FormParseNodeFactory))?;

    tracing::debug!(
        writers = ?writers.content_types(),
        parsers = ?parsers.content_types(),
        "default codecs registered"
    );
    Ok(())
}

/// The facade with the content type fixed to `application/json`.
///
/// Goes through the process-wide registries, so [`register_defaults`] (or an
/// equivalent registration) must have run.
pub mod json {
    use wirekit_core::serializer;
    use wirekit_core::{Parsable, ParsableFactory, Result};
    use wirekit_json::CONTENT_TYPE;

    pub fn serialize_as_bytes<T: Parsable>(value: &T) -> Result<Vec<u8>> {
        serializer::serialize_as_bytes(CONTENT_TYPE, value)
    }

    pub fn serialize_as_string<T: Parsable>(value: &T) -> Result<String> {
        serializer::serialize_as_string(CONTENT_TYPE, value)
    }

    pub fn serialize_collection_as_bytes<T: Parsable>(values: &[T]) -> Result<Vec<u8>> {
        serializer::serialize_collection_as_bytes(CONTENT_TYPE, values)
    }

    pub fn serialize_collection_as_string<T: Parsable>(values: &[T]) -> Result<String> {
        serializer::serialize_collection_as_string(CONTENT_TYPE, values)
    }

    pub fn deserialize<T: Parsable + 'static>(
        content: &[u8],
        factory: ParsableFactory<T>,
    ) -> Result<Option<T>> {
        serializer::deserialize(CONTENT_TYPE, content, factory)
    }

    pub fn deserialize_from_str<T: Parsable + 'static>(
        content: &str,
        factory: ParsableFactory<T>,
    ) -> Result<Option<T>> {
        serializer::deserialize_from_str(CONTENT_TYPE, content, factory)
    }

    pub fn deserialize_collection<T: Parsable + 'static>(
        content: &[u8],
        factory: ParsableFactory<T>,
    ) -> Result<Vec<T>> {
        serializer::deserialize_collection(CONTENT_TYPE, content, factory)
    }

    pub fn deserialize_collection_from_str<T: Parsable + 'static>(
        content: &str,
        factory: ParsableFactory<T>,
    ) -> Result<Vec<T>> {
        serializer::deserialize_collection_from_str(CONTENT_TYPE, content, factory)
    }
}
