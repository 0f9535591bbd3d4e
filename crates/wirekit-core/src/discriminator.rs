//! Selects the most-derived factory for a polymorphic value.
//!
//! A declared base type registers a [`DiscriminatorMapping`] from the value
//! of a reserved wire field (`@odata.type` unless reconfigured) to the
//! factory of the concrete type. A missing field or an unknown value falls
//! back to the factory the caller supplied.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::error::{Result, SerializationError};
use crate::parsable::ParsableFactory;
use crate::parse_node::ParseNode;

pub const DEFAULT_DISCRIMINATOR_KEY: &str = "@odata.type";

/// Discriminator value → concrete factory for one base type `T`.
pub struct DiscriminatorMapping<T> {
    factories: HashMap<String, ParsableFactory<T>>,
    default: Option<ParsableFactory<T>>,
}

impl<T> Clone for DiscriminatorMapping<T> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
            default: self.default,
        }
    }
}

impl<T> Default for DiscriminatorMapping<T> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
            default: None,
        }
    }
}

impl<T> fmt::Debug for DiscriminatorMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscriminatorMapping")
            .field("values", &self.factories.keys().collect::<Vec<_>>())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

impl<T> DiscriminatorMapping<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, value: impl Into<String>, factory: ParsableFactory<T>) -> Self {
        self.insert(value, factory);
        self
    }

    pub fn with_default(mut self, factory: ParsableFactory<T>) -> Self {
        self.default = Some(factory);
        self
    }

    pub fn insert(&mut self, value: impl Into<String>, factory: ParsableFactory<T>) {
        self.factories.insert(value.into(), factory);
    }

    pub fn get(&self, value: &str) -> Option<ParsableFactory<T>> {
        self.factories.get(value).copied()
    }

    pub fn default_factory(&self) -> Option<ParsableFactory<T>> {
        self.default
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

type ErasedMapping = Arc<dyn Any + Send + Sync>;

/// Per-base-type discriminator mappings plus the reserved field name.
///
/// Registration replaces or extends the mapping of one base type; readers
/// clone the mapping `Arc` out under the read lock.
pub struct DiscriminatorRegistry {
    key: RwLock<String>,
    mappings: RwLock<HashMap<TypeId, ErasedMapping>>,
}

impl Default for DiscriminatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DiscriminatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("DiscriminatorRegistry")
            .field("key", &self.discriminator_key())
            .field("base_types", &count)
            .finish()
    }
}

impl DiscriminatorRegistry {
    pub fn new() -> Self {
        Self {
            key: RwLock::new(DEFAULT_DISCRIMINATOR_KEY.to_owned()),
            mappings: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide registry consulted by
    /// [`get_object_value`](crate::parse_node::get_object_value) unless the
    /// parse node carries its own.
    pub fn default_instance() -> &'static DiscriminatorRegistry {
        static INSTANCE: OnceLock<DiscriminatorRegistry> = OnceLock::new();
        INSTANCE.get_or_init(DiscriminatorRegistry::new)
    }

    pub fn discriminator_key(&self) -> String {
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_discriminator_key(&self, key: impl Into<String>) {
        let key = key.into();
        tracing::debug!(%key, "discriminator key changed");
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = key;
    }

    /// Replaces the whole mapping of base type `T`.
    pub fn register_mapping<T: 'static>(&self, mapping: DiscriminatorMapping<T>) {
        tracing::debug!(
            base = std::any::type_name::<T>(),
            values = mapping.len(),
            "discriminator mapping registered"
        );
        self.mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), Arc::new(mapping));
    }

    /// Adds one value → factory entry to the mapping of base type `T`.
    pub fn register<T: 'static>(&self, value: impl Into<String>, factory: ParsableFactory<T>) {
        self.update::<T>(|mapping| mapping.insert(value, factory));
    }

    /// Sets the factory used by [`resolve_without_fallback`](Self::resolve_without_fallback)
    /// when no value matches.
    pub fn register_default<T: 'static>(&self, factory: ParsableFactory<T>) {
        self.update::<T>(|mapping| mapping.default = Some(factory));
    }

    fn update<T: 'static>(&self, f: impl FnOnce(&mut DiscriminatorMapping<T>)) {
        let mut mappings = self.mappings.write().unwrap_or_else(PoisonError::into_inner);
        let mut mapping = mappings
            .get(&TypeId::of::<T>())
            .and_then(|erased| Arc::clone(erased).downcast::<DiscriminatorMapping<T>>().ok())
            .map(|current| (*current).clone())
            .unwrap_or_default();
        f(&mut mapping);
        mappings.insert(TypeId::of::<T>(), Arc::new(mapping));
    }

    pub fn unregister<T: 'static>(&self) -> bool {
        self.mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TypeId::of::<T>())
            .is_some()
    }

    pub fn mapping<T: 'static>(&self) -> Option<Arc<DiscriminatorMapping<T>>> {
        let erased = self
            .mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()?;
        erased.downcast::<DiscriminatorMapping<T>>().ok()
    }

    /// Reads the discriminator through a child node so the parent is left
    /// untouched. Non-string values count as absent.
    pub fn discriminator_value(&self, node: &dyn ParseNode) -> Option<String> {
        let key = self.discriminator_key();
        match node.get_child_node(&key) {
            Ok(Some(child)) => child.get_string_value().ok().flatten(),
            Ok(None) => None,
            Err(err) => {
                tracing::trace!(path = node.path(), %err, "discriminator not readable");
                None
            }
        }
    }

    /// The concrete factory named by the payload, else `fallback`.
    pub fn resolve<T: 'static>(
        &self,
        node: &dyn ParseNode,
        fallback: ParsableFactory<T>,
    ) -> ParsableFactory<T> {
        let Some(mapping) = self.mapping::<T>() else {
            return fallback;
        };
        match self.discriminator_value(node) {
            Some(value) => match mapping.get(&value) {
                Some(factory) => factory,
                None => {
                    tracing::trace!(
                        path = node.path(),
                        %value,
                        base = std::any::type_name::<T>(),
                        "unmapped discriminator, using fallback factory"
                    );
                    fallback
                }
            },
            None => fallback,
        }
    }

    /// Like [`resolve`](Self::resolve) with the registered default as the
    /// fallback; fails when neither matches.
    pub fn resolve_without_fallback<T: 'static>(
        &self,
        node: &dyn ParseNode,
    ) -> Result<ParsableFactory<T>> {
        let mapping = self.mapping::<T>();
        let value = self.discriminator_value(node);
        let matched = match (&mapping, &value) {
            (Some(mapping), Some(value)) => mapping.get(value),
            _ => None,
        };
        matched
            .or_else(|| mapping.as_ref().and_then(|m| m.default_factory()))
            .ok_or_else(|| {
                SerializationError::parse(
                    node.path(),
                    format!(
                        "no factory for discriminator {} of {}",
                        value.as_deref().unwrap_or("<missing>"),
                        std::any::type_name::<T>()
                    ),
                )
            })
    }
}
