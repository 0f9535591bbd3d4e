//! Per-model dirty-tracking value store.
//!
//! Every property of a backed model lives here as `(value, dirty)`. A key
//! that was never set is absent; a key set to `None` is an explicit null.
//! Writers use the distinction to emit `null` for cleared fields while
//! omitting untouched ones.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;

/// Callback fired with the key of every changed entry.
pub type BackingStoreSubscriber = Arc<dyn Fn(&str) + Send + Sync>;

type StoredValue = Box<dyn Any + Send + Sync>;

/// How to reach the backing stores nested inside a stored value.
#[derive(Clone, Copy)]
struct NestedStores {
    visit: fn(&mut (dyn Any + Send + Sync), &mut dyn FnMut(&mut BackingStore)),
    changed: fn(&(dyn Any + Send + Sync)) -> bool,
}

struct Entry {
    dirty: bool,
    value: Option<StoredValue>,
    nested: Option<NestedStores>,
}

impl Entry {
    /// Dirty itself, or holding a nested model with changes.
    fn changed(&self) -> bool {
        self.dirty
            || match (self.nested, self.value.as_ref()) {
                (Some(nested), Some(value)) => (nested.changed)(value.as_ref()),
                _ => false,
            }
    }
}

/// Capability of models whose properties are held in a [`BackingStore`].
pub trait BackedModel {
    fn backing_store(&self) -> &BackingStore;
    fn backing_store_mut(&mut self) -> &mut BackingStore;
}

pub struct BackingStore {
    entries: IndexMap<String, Entry>,
    initialization_completed: bool,
    return_only_changed_values: AtomicBool,
    subscribers: IndexMap<String, BackingStoreSubscriber>,
}

impl Default for BackingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BackingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackingStore")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .field("dirty", &self.dirty_keys().collect::<Vec<_>>())
            .field("initialization_completed", &self.initialization_completed)
            .field(
                "return_only_changed_values",
                &self.return_only_changed_values(),
            )
            .finish()
    }
}

impl BackingStore {
    /// An empty store with initialization completed, so every `set` is dirty.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            initialization_completed: true,
            return_only_changed_values: AtomicBool::new(false),
            subscribers: IndexMap::new(),
        }
    }

    /// Typed read. `None` when the key is absent, explicitly null, holds a
    /// different type, or is clean while only changed values are returned.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        let entry = self.entries.get(key)?;
        if self.return_only_changed_values() && !entry.changed() {
            return None;
        }
        entry.value.as_ref()?.downcast_ref::<T>()
    }

    /// Mutable typed read. The entry counts as changed afterwards when
    /// initialization is complete.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        let completed = self.initialization_completed;
        let entry = self.entries.get_mut(key)?;
        let value = entry.value.as_mut()?.downcast_mut::<T>()?;
        if completed {
            entry.dirty = true;
        }
        Some(value)
    }

    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: Option<T>) {
        self.insert(key.into(), value.map(|v| Box::new(v) as StoredValue), None);
    }

    /// Stores a nested backed model; store-wide state changes reach it.
    pub fn set_backed_model<T>(&mut self, key: impl Into<String>, value: Option<T>)
    where
        T: BackedModel + Any + Send + Sync,
    {
        self.insert(
            key.into(),
            value.map(|v| Box::new(v) as StoredValue),
            Some(NestedStores {
                visit: visit_model::<T>,
                changed: model_changed::<T>,
            }),
        );
    }

    /// Stores a collection of backed models; store-wide state changes reach
    /// every element.
    pub fn set_backed_collection<T>(&mut self, key: impl Into<String>, value: Option<Vec<T>>)
    where
        T: BackedModel + Any + Send + Sync,
    {
        self.insert(
            key.into(),
            value.map(|v| Box::new(v) as StoredValue),
            Some(NestedStores {
                visit: visit_collection::<T>,
                changed: collection_changed::<T>,
            }),
        );
    }

    fn insert(&mut self, key: String, value: Option<StoredValue>, nested: Option<NestedStores>) {
        let dirty = self.initialization_completed;
        self.entries.insert(
            key.clone(),
            Entry {
                dirty,
                value,
                nested,
            },
        );
        self.notify(&key);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.shift_remove(key).is_some();
        if removed {
            self.notify(key);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// `true` when the key is present with an explicit null.
    pub fn is_null(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| e.value.is_none())
    }

    pub fn is_dirty(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(Entry::changed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Held keys; only dirty ones while only changed values are returned.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        let only_changed = self.return_only_changed_values();
        self.entries
            .iter()
            .filter(move |(_, e)| !only_changed || e.changed())
            .map(|(k, _)| k.as_str())
    }

    /// Changed keys, counting entries whose nested models changed.
    pub fn dirty_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| e.changed())
            .map(|(k, _)| k.as_str())
    }

    /// Keys explicitly set to null since the last reset.
    pub fn keys_for_values_changed_to_null(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| e.dirty && e.value.is_none())
            .map(|(k, _)| k.as_str())
    }

    /// Marks every held field, nested stores included, as changed so the
    /// whole instance is re-sent.
    pub fn make_sendable(&mut self) {
        self.for_each_entry(&mut |entry| entry.dirty = true);
        self.for_each_nested(&mut |store| store.make_sendable());
    }

    pub fn initialization_completed(&self) -> bool {
        self.initialization_completed
    }

    /// `true` resets every entry to clean; `false` marks every entry dirty.
    /// Later `set` calls are dirty only while initialization is completed.
    pub fn set_initialization_completed(&mut self, completed: bool) {
        self.initialization_completed = completed;
        self.for_each_entry(&mut |entry| entry.dirty = !completed);
        self.for_each_nested(&mut |store| store.set_initialization_completed(completed));
    }

    pub fn return_only_changed_values(&self) -> bool {
        self.return_only_changed_values.load(Ordering::Relaxed)
    }

    /// Takes `&self` so serialization hooks holding a shared model reference
    /// can toggle it.
    pub fn set_return_only_changed_values(&self, value: bool) {
        self.return_only_changed_values
            .store(value, Ordering::Relaxed);
    }

    /// Registers a subscriber under a fresh id and returns the id.
    pub fn subscribe(&mut self, callback: BackingStoreSubscriber) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.subscribe_with_id(id.clone(), callback);
        id
    }

    pub fn subscribe_with_id(&mut self, id: impl Into<String>, callback: BackingStoreSubscriber) {
        self.subscribers.insert(id.into(), callback);
    }

    pub fn unsubscribe(&mut self, id: &str) -> bool {
        self.subscribers.shift_remove(id).is_some()
    }

    fn notify(&self, key: &str) {
        for subscriber in self.subscribers.values() {
            subscriber(key);
        }
    }

    fn for_each_entry(&mut self, f: &mut dyn FnMut(&mut Entry)) {
        for entry in self.entries.values_mut() {
            f(entry);
        }
    }

    fn for_each_nested(&mut self, f: &mut dyn FnMut(&mut BackingStore)) {
        for entry in self.entries.values_mut() {
            if let (Some(nested), Some(value)) = (entry.nested, entry.value.as_mut()) {
                (nested.visit)(value.as_mut(), f);
            }
        }
    }
}

fn visit_model<T: BackedModel + Any + Send + Sync>(
    value: &mut (dyn Any + Send + Sync),
    f: &mut dyn FnMut(&mut BackingStore),
) {
    if let Some(model) = value.downcast_mut::<T>() {
        f(model.backing_store_mut());
    }
}

fn visit_collection<T: BackedModel + Any + Send + Sync>(
    value: &mut (dyn Any + Send + Sync),
    f: &mut dyn FnMut(&mut BackingStore),
) {
    if let Some(models) = value.downcast_mut::<Vec<T>>() {
        for model in models {
            f(model.backing_store_mut());
        }
    }
}

fn model_changed<T: BackedModel + Any + Send + Sync>(value: &(dyn Any + Send + Sync)) -> bool {
    value
        .downcast_ref::<T>()
        .is_some_and(|model| model.backing_store().dirty_keys().next().is_some())
}

fn collection_changed<T: BackedModel + Any + Send + Sync>(value: &(dyn Any + Send + Sync)) -> bool {
    value.downcast_ref::<Vec<T>>().is_some_and(|models| {
        models
            .iter()
            .any(|model| model.backing_store().dirty_keys().next().is_some())
    })
}
