use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use wirekit_core::writer::{SerializationWriter, SerializationWriterFactory, WriterHooks};
use wirekit_core::{AdditionalData, Parsable, Result, SerializationError};

use crate::CONTENT_TYPE;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializationWriterFactory;

impl SerializationWriterFactory for JsonSerializationWriterFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn get_serialization_writer(&self, _content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        Ok(Box::new(JsonSerializationWriter::new()))
    }
}

#[derive(Debug)]
enum Frame {
    Object {
        key: Option<String>,
        members: Map<String, Value>,
    },
    Array {
        key: Option<String>,
        items: Vec<Value>,
    },
}

/// Builds a `serde_json::Value` tree and encodes it once finished.
#[derive(Debug, Default)]
pub struct JsonSerializationWriter {
    stack: Vec<Frame>,
    root: Option<Value>,
    hooks: WriterHooks,
}

impl JsonSerializationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished document; `None` until a root value has been written.
    pub fn value(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    fn put(&mut self, key: Option<&str>, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Object { members, .. }) => {
                let key = key.ok_or_else(|| {
                    SerializationError::unsupported("JSON object member without a name")
                })?;
                members.insert(key.to_owned(), value);
            }
            Some(Frame::Array { items, .. }) => items.push(value),
            None => {
                if self.root.is_some() {
                    return Err(SerializationError::unsupported(
                        "a JSON document holds a single root value",
                    ));
                }
                self.root = Some(value);
            }
        }
        Ok(())
    }

    fn put_some(&mut self, key: Option<&str>, value: Option<Value>) -> Result<()> {
        match value {
            Some(value) => self.put(key, value),
            None => Ok(()),
        }
    }

    fn declared_in_current_object(&self, key: &str) -> bool {
        matches!(self.stack.last(), Some(Frame::Object { members, .. }) if members.contains_key(key))
    }
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

impl SerializationWriter for JsonSerializationWriter {
    fn content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn hooks(&self) -> &WriterHooks {
        &self.hooks
    }

    fn set_hooks(&mut self, hooks: WriterHooks) {
        self.hooks = hooks;
    }

    fn write_string_value(&mut self, key: Option<&str>, value: Option<&str>) -> Result<()> {
        self.put_some(key, value.map(|s| Value::String(s.to_owned())))
    }

    fn write_bool_value(&mut self, key: Option<&str>, value: Option<bool>) -> Result<()> {
        self.put_some(key, value.map(Value::Bool))
    }

    fn write_long_value(&mut self, key: Option<&str>, value: Option<i64>) -> Result<()> {
        self.put_some(key, value.map(Value::from))
    }

    /// Non-finite values are written as `null`.
    fn write_double_value(&mut self, key: Option<&str>, value: Option<f64>) -> Result<()> {
        self.put_some(key, value.map(number))
    }

    /// Uses the shortest decimal form of the `f32`, so `0.1f32` is `0.1`.
    fn write_float_value(&mut self, key: Option<&str>, value: Option<f32>) -> Result<()> {
        let widened = value.map(|f| f.to_string().parse::<f64>().unwrap_or(f64::from(f)));
        self.put_some(key, widened.map(number))
    }

    /// Emitted as a JSON number with every digit of the decimal kept.
    fn write_decimal_value(&mut self, key: Option<&str>, value: Option<Decimal>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let number: Value = serde_json::from_str(&value.normalize().to_string())
            .map_err(|e| SerializationError::format(format!("decimal {value}: {e}")))?;
        self.put(key, number)
    }

    fn write_null_value(&mut self, key: Option<&str>) -> Result<()> {
        self.put(key, Value::Null)
    }

    fn write_start_object(
        &mut self,
        key: Option<&str>,
        _value: Option<&dyn Parsable>,
    ) -> Result<()> {
        self.stack.push(Frame::Object {
            key: key.map(str::to_owned),
            members: Map::new(),
        });
        Ok(())
    }

    fn write_end_object(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Object { key, members }) => self.put(key.as_deref(), Value::Object(members)),
            other => Err(SerializationError::unsupported(format!(
                "end of object without a matching start ({other:?})"
            ))),
        }
    }

    fn write_start_collection(&mut self, key: Option<&str>) -> Result<()> {
        self.stack.push(Frame::Array {
            key: key.map(str::to_owned),
            items: Vec::new(),
        });
        Ok(())
    }

    fn write_end_collection(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Array { key, items }) => self.put(key.as_deref(), Value::Array(items)),
            other => Err(SerializationError::unsupported(format!(
                "end of collection without a matching start ({other:?})"
            ))),
        }
    }

    /// Declared properties already written win over additional data.
    fn write_additional_data(&mut self, data: &AdditionalData) -> Result<()> {
        for (key, value) in data {
            if self.declared_in_current_object(key) {
                tracing::trace!(%key, "additional data shadowed by a declared property");
                continue;
            }
            self.write_untyped_value(Some(key.as_str()), Some(value))?;
        }
        Ok(())
    }

    fn get_serialized_content(&mut self) -> Result<Vec<u8>> {
        if !self.stack.is_empty() {
            return Err(SerializationError::format(format!(
                "{} unterminated JSON container(s)",
                self.stack.len()
            )));
        }
        match self.root.take() {
            Some(root) => serde_json::to_vec(&root)
                .map_err(|e| SerializationError::format(format!("JSON encoding failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}
