//! Content-type keyed registries of parse-node and writer factories.
//!
//! Keys are normalized (parameters dropped, lower-cased). A lookup tries the
//! exact type first, then the vendor-cleaned one, so
//! `application/vnd.acme.v2+json; charset=utf-8` reaches the
//! `application/json` codec. Registration is last-writer-wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::error::{Result, SerializationError};
use crate::parse_node::{ParseNode, ParseNodeFactory};
use crate::writer::{SerializationWriter, SerializationWriterFactory};

/// `Type/Sub+Suffix; charset=x` → `type/sub+suffix`.
pub fn normalize_content_type(content_type: &str) -> Result<String> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if media_type.is_empty() {
        return Err(SerializationError::invalid_argument(
            "content_type",
            "must not be empty",
        ));
    }
    Ok(media_type)
}

/// `application/vnd.acme+json` → `application/json`; `None` when there is
/// no structured-syntax suffix to fall back to.
pub fn vendor_cleaned(media_type: &str) -> Option<String> {
    let (kind, subtype) = media_type.split_once('/')?;
    let (_, suffix) = subtype.rsplit_once('+')?;
    if suffix.is_empty() {
        return None;
    }
    Some(format!("{kind}/{suffix}"))
}

struct FactoryMap<F: ?Sized> {
    entries: RwLock<HashMap<String, Arc<F>>>,
}

impl<F: ?Sized> FactoryMap<F> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn insert(&self, content_type: &str, factory: Arc<F>) -> Result<()> {
        let key = normalize_content_type(content_type)?;
        let replaced = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), factory)
            .is_some();
        tracing::debug!(content_type = %key, replaced, "factory registered");
        Ok(())
    }

    fn remove(&self, content_type: &str) -> bool {
        let Ok(key) = normalize_content_type(content_type) else {
            return false;
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some()
    }

    /// The factory and the key it was found under.
    fn lookup(&self, content_type: &str) -> Result<(String, Arc<F>)> {
        let key = normalize_content_type(content_type)?;
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(factory) = entries.get(&key) {
            return Ok((key, Arc::clone(factory)));
        }
        if let Some(cleaned) = vendor_cleaned(&key) {
            if let Some(factory) = entries.get(&cleaned) {
                tracing::trace!(content_type = %key, %cleaned, "vendor content type resolved");
                return Ok((cleaned, Arc::clone(factory)));
            }
        }
        tracing::debug!(content_type = %key, "no factory registered");
        Err(SerializationError::UnsupportedContentType(key))
    }

    fn content_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn wrap_all(&self, wrap: &dyn Fn(Arc<F>) -> Arc<F>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for factory in entries.values_mut() {
            *factory = wrap(Arc::clone(factory));
        }
    }
}

/// Parse-node factories by content type.
pub struct ParseNodeFactoryRegistry {
    factories: FactoryMap<dyn ParseNodeFactory>,
}

impl Default for ParseNodeFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParseNodeFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseNodeFactoryRegistry")
            .field("content_types", &self.content_types())
            .finish()
    }
}

impl ParseNodeFactoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: FactoryMap::new(),
        }
    }

    pub fn default_instance() -> &'static ParseNodeFactoryRegistry {
        static INSTANCE: OnceLock<ParseNodeFactoryRegistry> = OnceLock::new();
        INSTANCE.get_or_init(ParseNodeFactoryRegistry::new)
    }

    /// Registers `factory` under its own content type.
    pub fn register(&self, factory: Arc<dyn ParseNodeFactory>) -> Result<()> {
        let content_type = factory.valid_content_type().to_owned();
        self.factories.insert(&content_type, factory)
    }

    pub fn register_for(
        &self,
        content_type: &str,
        factory: Arc<dyn ParseNodeFactory>,
    ) -> Result<()> {
        self.factories.insert(content_type, factory)
    }

    pub fn unregister(&self, content_type: &str) -> bool {
        self.factories.remove(content_type)
    }

    pub fn get(&self, content_type: &str) -> Result<Arc<dyn ParseNodeFactory>> {
        self.factories.lookup(content_type).map(|(_, factory)| factory)
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.factories.lookup(content_type).is_ok()
    }

    pub fn content_types(&self) -> Vec<String> {
        self.factories.content_types()
    }

    /// Replaces every registered factory with `wrap(factory)`.
    pub fn wrap_all(&self, wrap: impl Fn(Arc<dyn ParseNodeFactory>) -> Arc<dyn ParseNodeFactory>) {
        self.factories.wrap_all(&wrap);
    }

    pub fn get_root_parse_node(
        &self,
        content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        if content.is_empty() {
            return Err(SerializationError::invalid_argument(
                "content",
                "must not be empty",
            ));
        }
        let (matched, factory) = self.factories.lookup(content_type)?;
        factory.get_root_parse_node(&matched, content)
    }
}

/// Serialization-writer factories by content type.
pub struct SerializationWriterFactoryRegistry {
    factories: FactoryMap<dyn SerializationWriterFactory>,
}

impl Default for SerializationWriterFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SerializationWriterFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationWriterFactoryRegistry")
            .field("content_types", &self.content_types())
            .finish()
    }
}

impl SerializationWriterFactoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: FactoryMap::new(),
        }
    }

    pub fn default_instance() -> &'static SerializationWriterFactoryRegistry {
        static INSTANCE: OnceLock<SerializationWriterFactoryRegistry> = OnceLock::new();
        INSTANCE.get_or_init(SerializationWriterFactoryRegistry::new)
    }

    pub fn register(&self, factory: Arc<dyn SerializationWriterFactory>) -> Result<()> {
        let content_type = factory.valid_content_type().to_owned();
        self.factories.insert(&content_type, factory)
    }

    pub fn register_for(
        &self,
        content_type: &str,
        factory: Arc<dyn SerializationWriterFactory>,
    ) -> Result<()> {
        self.factories.insert(content_type, factory)
    }

    pub fn unregister(&self, content_type: &str) -> bool {
        self.factories.remove(content_type)
    }

    pub fn get(&self, content_type: &str) -> Result<Arc<dyn SerializationWriterFactory>> {
        self.factories.lookup(content_type).map(|(_, factory)| factory)
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.factories.lookup(content_type).is_ok()
    }

    pub fn content_types(&self) -> Vec<String> {
        self.factories.content_types()
    }

    pub fn wrap_all(
        &self,
        wrap: impl Fn(Arc<dyn SerializationWriterFactory>) -> Arc<dyn SerializationWriterFactory>,
    ) {
        self.factories.wrap_all(&wrap);
    }

    pub fn get_serialization_writer(
        &self,
        content_type: &str,
    ) -> Result<Box<dyn SerializationWriter>> {
        let (matched, factory) = self.factories.lookup(content_type)?;
        factory.get_serialization_writer(&matched)
    }
}
