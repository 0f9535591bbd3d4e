use std::sync::Arc;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::Value;
use wirekit_core::parse_node::{parse_decimal, ParseNode, ParseNodeFactory, ParseNodeHooks};
use wirekit_core::{Result, SerializationError, UntypedNode};

use crate::{escape_segment, CONTENT_TYPE};

/// Limits applied while walking a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonParseNodeOptions {
    /// Deepest child node that may be created; the root is depth 0.
    pub max_depth: usize,
}

impl Default for JsonParseNodeOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonParseNodeFactory {
    options: JsonParseNodeOptions,
}

impl JsonParseNodeFactory {
    pub fn new(options: JsonParseNodeOptions) -> Self {
        Self { options }
    }
}

impl ParseNodeFactory for JsonParseNodeFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn get_root_parse_node(
        &self,
        _content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        let value: Value = serde_json::from_slice(content)
            .map_err(|e| SerializationError::parse("", format!("invalid JSON: {e}")))?;
        Ok(Box::new(JsonParseNode::with_options(value, self.options)))
    }
}

static NULL: Value = Value::Null;

#[derive(Debug, Clone)]
enum Step {
    Key(String),
    Index(usize),
}

/// Cursor over one value of a shared `serde_json::Value` document.
///
/// Children hold the document by `Arc` plus the steps leading to their
/// value, so walking a payload never copies subtrees.
#[derive(Debug, Clone)]
pub struct JsonParseNode {
    document: Arc<Value>,
    steps: Vec<Step>,
    path: String,
    options: JsonParseNodeOptions,
    hooks: ParseNodeHooks,
}

impl JsonParseNode {
    pub fn new(value: Value) -> Self {
        Self::with_options(value, JsonParseNodeOptions::default())
    }

    pub fn with_options(value: Value, options: JsonParseNodeOptions) -> Self {
        Self {
            document: Arc::new(value),
            steps: Vec::new(),
            path: String::new(),
            options,
            hooks: ParseNodeHooks::default(),
        }
    }

    pub fn value(&self) -> &Value {
        let mut current = self.document.as_ref();
        for step in &self.steps {
            let next = match (step, current) {
                (Step::Key(key), Value::Object(map)) => map.get(key),
                (Step::Index(i), Value::Array(items)) => items.get(*i),
                _ => None,
            };
            current = next.unwrap_or(&NULL);
        }
        current
    }

    fn child(&self, segment: &str, step: Step) -> Result<Box<dyn ParseNode>> {
        let path = format!("{}/{}", self.path, escape_segment(segment));
        let depth = self.steps.len() + 1;
        if depth > self.options.max_depth {
            return Err(SerializationError::parse(
                &path,
                format!("nesting exceeds the maximum depth of {}", self.options.max_depth),
            ));
        }
        let mut steps = Vec::with_capacity(depth);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        Ok(Box::new(Self {
            document: Arc::clone(&self.document),
            steps,
            path,
            options: self.options,
            hooks: self.hooks.clone(),
        }))
    }

    fn mismatch(&self, expected: &str) -> SerializationError {
        SerializationError::parse(
            &self.path,
            format!("expected {expected}, found {}", kind(self.value())),
        )
    }

    fn integer(&self, expected: &str) -> Result<Option<i64>> {
        match self.value() {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_i64().map(Some).ok_or_else(|| self.mismatch(expected)),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| self.mismatch(expected)),
            _ => Err(self.mismatch(expected)),
        }
    }

    fn narrow<T: TryFrom<i64>>(&self, expected: &str) -> Result<Option<T>> {
        match self.integer(expected)? {
            None => Ok(None),
            Some(wide) => T::try_from(wide)
                .map(Some)
                .map_err(|_| self.mismatch(expected)),
        }
    }

    fn float(&self, expected: &str) -> Result<Option<f64>> {
        match self.value() {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| self.mismatch(expected)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.mismatch(expected)),
            _ => Err(self.mismatch(expected)),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn to_untyped(value: &Value) -> UntypedNode {
    match value {
        Value::Null => UntypedNode::Null,
        Value::Bool(b) => UntypedNode::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => UntypedNode::Integer(i),
            None => n.as_f64().map_or(UntypedNode::Null, UntypedNode::Double),
        },
        Value::String(s) => UntypedNode::String(s.clone()),
        Value::Array(items) => UntypedNode::Array(items.iter().map(to_untyped).collect()),
        Value::Object(map) => UntypedNode::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_untyped(v)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

impl ParseNode for JsonParseNode {
    fn path(&self) -> &str {
        &self.path
    }

    fn hooks(&self) -> &ParseNodeHooks {
        &self.hooks
    }

    fn set_hooks(&mut self, hooks: ParseNodeHooks) {
        self.hooks = hooks;
    }

    /// Scalars other than strings are returned in their JSON text form.
    fn get_string_value(&self) -> Result<Option<String>> {
        match self.value() {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Number(n) => Ok(Some(n.to_string())),
            _ => Err(self.mismatch("a string")),
        }
    }

    fn get_bool_value(&self) -> Result<Option<bool>> {
        match self.value() {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            _ => Err(self.mismatch("a boolean")),
        }
    }

    fn get_byte_value(&self) -> Result<Option<u8>> {
        self.narrow("an unsigned byte")
    }

    fn get_sbyte_value(&self) -> Result<Option<i8>> {
        self.narrow("a signed byte")
    }

    fn get_int_value(&self) -> Result<Option<i32>> {
        self.narrow("a 32-bit integer")
    }

    fn get_long_value(&self) -> Result<Option<i64>> {
        self.integer("a 64-bit integer")
    }

    fn get_float_value(&self) -> Result<Option<f32>> {
        Ok(self.float("a number")?.map(|f| f as f32))
    }

    fn get_double_value(&self) -> Result<Option<f64>> {
        self.float("a number")
    }

    fn get_decimal_value(&self) -> Result<Option<Decimal>> {
        match self.value() {
            Value::Null => Ok(None),
            Value::Number(n) => parse_decimal(&self.path, &n.to_string()).map(Some),
            Value::String(s) => parse_decimal(&self.path, s).map(Some),
            _ => Err(self.mismatch("a decimal")),
        }
    }

    fn get_untyped_value(&self) -> Result<UntypedNode> {
        Ok(to_untyped(self.value()))
    }

    fn get_child_node(&self, key: &str) -> Result<Option<Box<dyn ParseNode>>> {
        match self.value() {
            Value::Object(map) if map.contains_key(key) => {
                self.child(key, Step::Key(key.to_owned())).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn get_collection_elements(&self) -> Result<Option<Vec<Box<dyn ParseNode>>>> {
        match self.value() {
            Value::Null => Ok(None),
            Value::Array(items) => (0..items.len())
                .map(|i| self.child(&i.to_string(), Step::Index(i)))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            _ => Err(self.mismatch("an array")),
        }
    }

    fn get_object_members(&self) -> Result<Option<Vec<(String, Box<dyn ParseNode>)>>> {
        match self.value() {
            Value::Null => Ok(None),
            Value::Object(map) => map
                .keys()
                .map(|key| {
                    self.child(key, Step::Key(key.clone()))
                        .map(|child| (key.clone(), child))
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            _ => Err(self.mismatch("an object")),
        }
    }
}
