//! Core of the wirekit serialization runtime.
//!
//! Models implement [`Parsable`] and are read through a format-specific
//! [`ParseNode`] and written through a [`SerializationWriter`]. Codecs are
//! looked up by content type in the [`registry`] module, and the
//! [`serializer`] facade ties the two directions together.

pub mod backing_store;
pub mod builder;
pub mod discriminator;
pub mod enums;
pub mod error;
pub mod multipart;
pub mod parsable;
pub mod parse_node;
pub mod primitive;
pub mod proxy;
pub mod registry;
pub mod serializer;
pub mod temporal;
pub mod untyped;
pub mod writer;

pub use backing_store::{BackedModel, BackingStore, BackingStoreSubscriber};
pub use discriminator::{DiscriminatorMapping, DiscriminatorRegistry, DEFAULT_DISCRIMINATOR_KEY};
pub use enums::{parse_enum, serialize_enum, EnumMember, FlagBits, WireEnum};
pub use error::{Result, SerializationError};
pub use multipart::{MultipartBody, MultipartPart, PartValue};
pub use parsable::{
    AdditionalDataHolder, FieldDeserializer, FieldDeserializers, Parsable, ParsableFactory,
};
pub use parse_node::{ParsableHook, ParseNode, ParseNodeExt, ParseNodeFactory, ParseNodeHooks};
pub use primitive::Primitive;
pub use proxy::{
    BackingStoreParseNodeFactory, BackingStoreSerializationWriterProxyFactory,
    ParseNodeProxyFactory, SerializationWriterProxyFactory,
};
pub use registry::{ParseNodeFactoryRegistry, SerializationWriterFactoryRegistry};
pub use serializer::{ContentSerializer, SerializedContent};
pub use untyped::{AdditionalData, UntypedNode};
pub use writer::{
    ParsableObserver, ParsableWriterHook, SerializationWriter, SerializationWriterExt,
    SerializationWriterFactory, WriterHooks,
};
