//! Registration helpers used when wiring up a client.

use std::sync::Arc;

use crate::error::Result;
use crate::parse_node::ParseNodeFactory;
use crate::proxy::{BackingStoreParseNodeFactory, BackingStoreSerializationWriterProxyFactory};
use crate::registry::{ParseNodeFactoryRegistry, SerializationWriterFactoryRegistry};
use crate::writer::SerializationWriterFactory;

/// Registers `F::default()` in the default writer registry.
pub fn register_default_serializer<F>() -> Result<()>
where
    F: SerializationWriterFactory + Default + 'static,
{
    SerializationWriterFactoryRegistry::default_instance().register(Arc::new(F::default()))
}

/// Registers `F::default()` in the default parse-node registry.
pub fn register_default_deserializer<F>() -> Result<()>
where
    F: ParseNodeFactory + Default + 'static,
{
    ParseNodeFactoryRegistry::default_instance().register(Arc::new(F::default()))
}

/// Wraps every writer factory of `registry` so backed models only write
/// changed fields. Factories registered afterwards are not wrapped.
pub fn enable_backing_store_for_serialization_writer_factory(
    registry: &SerializationWriterFactoryRegistry,
) {
    tracing::debug!(content_types = ?registry.content_types(), "backing store writers enabled");
    registry.wrap_all(|inner| Arc::new(BackingStoreSerializationWriterProxyFactory::new(inner)));
}

/// Wraps every parse-node factory of `registry` so deserialized backed
/// models start with clean stores.
pub fn enable_backing_store_for_parse_node_factory(registry: &ParseNodeFactoryRegistry) {
    tracing::debug!(content_types = ?registry.content_types(), "backing store parse nodes enabled");
    registry.wrap_all(|inner| Arc::new(BackingStoreParseNodeFactory::new(inner)));
}
