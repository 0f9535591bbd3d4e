//! Factory decorators that install hooks on the nodes and writers they hand
//! out.
//!
//! The backing-store variants keep stores consistent with the wire: values
//! read from a payload start clean, and a write only emits what changed.

use std::sync::Arc;

use crate::error::Result;
use crate::parsable::Parsable;
use crate::parse_node::{ParsableHook, ParseNode, ParseNodeFactory};
use crate::writer::{
    ParsableObserver, ParsableWriterHook, SerializationWriter, SerializationWriterFactory,
};

/// Wraps a parse-node factory and adds hooks to every root node.
pub struct ParseNodeProxyFactory {
    inner: Arc<dyn ParseNodeFactory>,
    on_before: Option<ParsableHook>,
    on_after: Option<ParsableHook>,
}

impl ParseNodeProxyFactory {
    pub fn new(
        inner: Arc<dyn ParseNodeFactory>,
        on_before: Option<ParsableHook>,
        on_after: Option<ParsableHook>,
    ) -> Self {
        Self {
            inner,
            on_before,
            on_after,
        }
    }
}

impl ParseNodeFactory for ParseNodeProxyFactory {
    fn valid_content_type(&self) -> &str {
        self.inner.valid_content_type()
    }

    fn get_root_parse_node(
        &self,
        content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        let mut node = self.inner.get_root_parse_node(content_type, content)?;
        let hooks = node
            .hooks()
            .clone()
            .wrap(self.on_before.clone(), self.on_after.clone());
        node.set_hooks(hooks);
        Ok(node)
    }
}

/// Reads values into backing stores without marking them changed.
pub struct BackingStoreParseNodeFactory(ParseNodeProxyFactory);

impl BackingStoreParseNodeFactory {
    pub fn new(inner: Arc<dyn ParseNodeFactory>) -> Self {
        let before: ParsableHook = Arc::new(|value: &mut dyn Parsable| {
            if let Some(model) = value.as_backed_model_mut() {
                model.backing_store_mut().set_initialization_completed(false);
            }
        });
        let after: ParsableHook = Arc::new(|value: &mut dyn Parsable| {
            if let Some(model) = value.as_backed_model_mut() {
                model.backing_store_mut().set_initialization_completed(true);
            }
        });
        Self(ParseNodeProxyFactory::new(inner, Some(before), Some(after)))
    }
}

impl ParseNodeFactory for BackingStoreParseNodeFactory {
    fn valid_content_type(&self) -> &str {
        self.0.valid_content_type()
    }

    fn get_root_parse_node(
        &self,
        content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        self.0.get_root_parse_node(content_type, content)
    }
}

/// Wraps a writer factory and adds hooks to every writer.
pub struct SerializationWriterProxyFactory {
    inner: Arc<dyn SerializationWriterFactory>,
    on_before: Option<ParsableObserver>,
    on_after: Option<ParsableObserver>,
    on_start: Option<ParsableWriterHook>,
}

impl SerializationWriterProxyFactory {
    pub fn new(
        inner: Arc<dyn SerializationWriterFactory>,
        on_before: Option<ParsableObserver>,
        on_after: Option<ParsableObserver>,
        on_start: Option<ParsableWriterHook>,
    ) -> Self {
        Self {
            inner,
            on_before,
            on_after,
            on_start,
        }
    }
}

impl SerializationWriterFactory for SerializationWriterProxyFactory {
    fn valid_content_type(&self) -> &str {
        self.inner.valid_content_type()
    }

    fn get_serialization_writer(&self, content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        let mut writer = self.inner.get_serialization_writer(content_type)?;
        let hooks = writer.hooks().clone().wrap(
            self.on_before.clone(),
            self.on_after.clone(),
            self.on_start.clone(),
        );
        writer.set_hooks(hooks);
        Ok(writer)
    }
}

/// Writes only the changed fields of backed models.
pub struct BackingStoreSerializationWriterProxyFactory(SerializationWriterProxyFactory);

impl BackingStoreSerializationWriterProxyFactory {
    pub fn new(inner: Arc<dyn SerializationWriterFactory>) -> Self {
        let before: ParsableObserver = Arc::new(|value: &dyn Parsable| {
            if let Some(model) = value.as_backed_model() {
                model.backing_store().set_return_only_changed_values(true);
            }
        });
        let after: ParsableObserver = Arc::new(|value: &dyn Parsable| {
            if let Some(model) = value.as_backed_model() {
                model.backing_store().set_return_only_changed_values(false);
            }
        });
        Self(SerializationWriterProxyFactory::new(
            inner,
            Some(before),
            Some(after),
            None,
        ))
    }
}

impl SerializationWriterFactory for BackingStoreSerializationWriterProxyFactory {
    fn valid_content_type(&self) -> &str {
        self.0.valid_content_type()
    }

    fn get_serialization_writer(&self, content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        self.0.get_serialization_writer(content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing_store::{BackedModel, BackingStore};
    use crate::parsable::FieldDeserializers;
    use crate::parse_node::ParseNodeHooks;
    use crate::untyped::UntypedNode;

    struct EmptyNode {
        hooks: ParseNodeHooks,
    }

    impl ParseNode for EmptyNode {
        fn path(&self) -> &str {
            "/"
        }
        fn hooks(&self) -> &ParseNodeHooks {
            &self.hooks
        }
        fn set_hooks(&mut self, hooks: ParseNodeHooks) {
            self.hooks = hooks;
        }
        fn get_string_value(&self) -> Result<Option<String>> {
            Ok(None)
        }
        fn get_untyped_value(&self) -> Result<UntypedNode> {
            Ok(UntypedNode::Null)
        }
        fn get_child_node(&self, _key: &str) -> Result<Option<Box<dyn ParseNode>>> {
            Ok(None)
        }
        fn get_collection_elements(&self) -> Result<Option<Vec<Box<dyn ParseNode>>>> {
            Ok(None)
        }
        fn get_object_members(&self) -> Result<Option<Vec<(String, Box<dyn ParseNode>)>>> {
            Ok(None)
        }
    }

    struct EmptyFactory;

    impl ParseNodeFactory for EmptyFactory {
        fn valid_content_type(&self) -> &str {
            "application/test"
        }
        fn get_root_parse_node(
            &self,
            _content_type: &str,
            _content: &[u8],
        ) -> Result<Box<dyn ParseNode>> {
            Ok(Box::new(EmptyNode {
                hooks: ParseNodeHooks::default(),
            }))
        }
    }

    #[derive(Default)]
    struct Backed {
        store: BackingStore,
    }

    impl BackedModel for Backed {
        fn backing_store(&self) -> &BackingStore {
            &self.store
        }
        fn backing_store_mut(&mut self) -> &mut BackingStore {
            &mut self.store
        }
    }

    impl Parsable for Backed {
        fn get_field_deserializers(&self) -> FieldDeserializers<Self> {
            FieldDeserializers::new()
        }
        fn serialize(&self, _writer: &mut dyn SerializationWriter) -> Result<()> {
            Ok(())
        }
        fn as_backed_model(&self) -> Option<&dyn BackedModel> {
            Some(self)
        }
        fn as_backed_model_mut(&mut self) -> Option<&mut dyn BackedModel> {
            Some(self)
        }
    }

    #[test]
    fn parse_hooks_toggle_initialization() {
        let factory = BackingStoreParseNodeFactory::new(Arc::new(EmptyFactory));
        assert_eq!(factory.valid_content_type(), "application/test");
        let node = factory.get_root_parse_node("application/test", b"x").unwrap();

        let mut model = Backed::default();
        node.hooks().before(&mut model);
        assert!(!model.store.initialization_completed());
        model.store.set("name", Some("read".to_owned()));
        node.hooks().after(&mut model);
        assert!(model.store.initialization_completed());
        assert!(!model.store.is_dirty("name"));
    }

    #[test]
    fn field_assignment_runs_the_installed_hooks() {
        let factory = BackingStoreParseNodeFactory::new(Arc::new(EmptyFactory));
        let node = factory.get_root_parse_node("application/test", b"x").unwrap();
        let mut model = Backed::default();
        model.store.set("name", Some("stale".to_owned()));
        assert!(model.store.is_dirty("name"));

        crate::parse_node::assign_field_values(node.as_ref(), &mut model, Vec::new()).unwrap();
        assert!(model.store.initialization_completed());
        assert!(!model.store.is_dirty("name"));
    }

    #[test]
    fn installed_hooks_run_after_the_new_ones() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let first = Arc::clone(&order);
        let second = Arc::clone(&order);
        let hooks = ParseNodeHooks::default()
            .wrap(
                Some(Arc::new(move |_: &mut dyn Parsable| {
                    first.lock().unwrap().push("inner")
                })),
                None,
            )
            .wrap(
                Some(Arc::new(move |_: &mut dyn Parsable| {
                    second.lock().unwrap().push("outer")
                })),
                None,
            );
        hooks.before(&mut Backed::default());
        assert_eq!(*order.lock().unwrap(), ["outer", "inner"]);
    }
}
