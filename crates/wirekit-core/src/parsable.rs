//! Capability traits implemented by every model type.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::backing_store::BackedModel;
use crate::error::Result;
use crate::multipart::MultipartBody;
use crate::parse_node::ParseNode;
use crate::untyped::AdditionalData;
use crate::writer::SerializationWriter;

/// Builds the instance a parse node materializes into.
///
/// Factories receive the node being read so polymorphic bases can inspect
/// it; most simply return a default instance.
pub type ParsableFactory<T> = fn(&dyn ParseNode) -> Result<T>;

/// Reads one wire field into a model.
pub type FieldDeserializer<T> = Box<dyn Fn(&mut T, &dyn ParseNode) -> Result<()>>;

/// A model that can be read from a [`ParseNode`] and written to a
/// [`SerializationWriter`].
///
/// Optional capabilities are exposed through the `as_*` accessors instead of
/// runtime type inspection; a model overrides the ones it supports.
pub trait Parsable {
    /// Wire field name → action reading that field into `self`.
    fn get_field_deserializers(&self) -> FieldDeserializers<Self>
    where
        Self: Sized;

    /// Writes the fields of `self`. The enclosing object is opened and closed
    /// by the caller.
    fn serialize(&self, writer: &mut dyn SerializationWriter) -> Result<()>;

    fn as_additional_data_holder(&self) -> Option<&dyn AdditionalDataHolder> {
        None
    }

    fn as_additional_data_holder_mut(&mut self) -> Option<&mut dyn AdditionalDataHolder> {
        None
    }

    fn as_backed_model(&self) -> Option<&dyn BackedModel> {
        None
    }

    fn as_backed_model_mut(&mut self) -> Option<&mut dyn BackedModel> {
        None
    }

    fn as_multipart_body(&self) -> Option<&MultipartBody> {
        None
    }
}

/// Capability of models that keep undeclared wire fields.
pub trait AdditionalDataHolder {
    fn additional_data(&self) -> &AdditionalData;
    fn additional_data_mut(&mut self) -> &mut AdditionalData;
}

/// Ordered mapping from wire field name to [`FieldDeserializer`].
pub struct FieldDeserializers<T> {
    fields: IndexMap<&'static str, FieldDeserializer<T>>,
}

impl<T> Default for FieldDeserializers<T> {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }
}

impl<T> fmt::Debug for FieldDeserializers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.keys()).finish()
    }
}

impl<T: 'static> FieldDeserializers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn field<F>(mut self, key: &'static str, deserializer: F) -> Self
    where
        F: Fn(&mut T, &dyn ParseNode) -> Result<()> + 'static,
    {
        self.insert(key, deserializer);
        self
    }

    pub fn insert<F>(&mut self, key: &'static str, deserializer: F)
    where
        F: Fn(&mut T, &dyn ParseNode) -> Result<()> + 'static,
    {
        self.fields.insert(key, Box::new(deserializer));
    }

    /// Adds every entry of `other`; entries already present are replaced.
    pub fn extend(mut self, other: FieldDeserializers<T>) -> Self {
        self.fields.extend(other.fields);
        self
    }

    /// Lifts the deserializers of a component type onto an outer type.
    ///
    /// Used both for composition (a derived model embedding its base) and
    /// for polymorphic wrappers dispatching to the active variant. Fields
    /// whose projection yields `None` are ignored.
    pub fn project<O, P>(self, projection: P) -> FieldDeserializers<O>
    where
        O: 'static,
        P: Fn(&mut O) -> Option<&mut T> + 'static,
    {
        let projection = Rc::new(projection);
        let mut out = FieldDeserializers::<O>::new();
        for (key, deserializer) in self.fields {
            let projection = Rc::clone(&projection);
            out.insert(key, move |outer: &mut O, node: &dyn ParseNode| {
                match (*projection)(outer) {
                    Some(inner) => deserializer(inner, node),
                    None => Ok(()),
                }
            });
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&FieldDeserializer<T>> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
