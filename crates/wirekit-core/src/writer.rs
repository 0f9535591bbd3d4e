//! Write side: the format-specific accumulator models serialize into.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime, Time};
use uuid::Uuid;

use crate::enums::{self, WireEnum};
use crate::error::Result;
use crate::parsable::Parsable;
use crate::primitive::Primitive;
use crate::temporal;
use crate::untyped::{AdditionalData, UntypedNode};

/// Observes a model before or after it is written.
pub type ParsableObserver = Arc<dyn Fn(&dyn Parsable) + Send + Sync>;

/// Runs right after an object has been opened, before its fields.
pub type ParsableWriterHook = Arc<dyn Fn(&dyn Parsable, &mut dyn SerializationWriter) + Send + Sync>;

#[derive(Clone, Default)]
pub struct WriterHooks {
    pub on_before_object_serialization: Option<ParsableObserver>,
    pub on_after_object_serialization: Option<ParsableObserver>,
    pub on_start_object_serialization: Option<ParsableWriterHook>,
}

impl fmt::Debug for WriterHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterHooks")
            .field("before", &self.on_before_object_serialization.is_some())
            .field("after", &self.on_after_object_serialization.is_some())
            .field("start", &self.on_start_object_serialization.is_some())
            .finish()
    }
}

impl WriterHooks {
    /// Runs the given hooks first, then the ones already installed.
    pub fn wrap(
        self,
        before: Option<ParsableObserver>,
        after: Option<ParsableObserver>,
        start: Option<ParsableWriterHook>,
    ) -> Self {
        Self {
            on_before_object_serialization: chain_observers(
                before,
                self.on_before_object_serialization,
            ),
            on_after_object_serialization: chain_observers(
                after,
                self.on_after_object_serialization,
            ),
            on_start_object_serialization: chain_start(start, self.on_start_object_serialization),
        }
    }

    pub fn before(&self, value: &dyn Parsable) {
        if let Some(hook) = &self.on_before_object_serialization {
            hook(value);
        }
    }

    pub fn after(&self, value: &dyn Parsable) {
        if let Some(hook) = &self.on_after_object_serialization {
            hook(value);
        }
    }

    pub fn start(&self, value: &dyn Parsable, writer: &mut dyn SerializationWriter) {
        if let Some(hook) = &self.on_start_object_serialization {
            hook(value, writer);
        }
    }
}

fn chain_observers(
    first: Option<ParsableObserver>,
    second: Option<ParsableObserver>,
) -> Option<ParsableObserver> {
    match (first, second) {
        (Some(first), Some(second)) => Some(Arc::new(move |value: &dyn Parsable| {
            first(value);
            second(value);
        })),
        (first, second) => first.or(second),
    }
}

fn chain_start(
    first: Option<ParsableWriterHook>,
    second: Option<ParsableWriterHook>,
) -> Option<ParsableWriterHook> {
    match (first, second) {
        (Some(first), Some(second)) => Some(Arc::new(
            move |value: &dyn Parsable, writer: &mut dyn SerializationWriter| {
                first(value, &mut *writer);
                second(value, writer);
            },
        )),
        (first, second) => first.or(second),
    }
}

/// Accumulates one payload.
///
/// `key` is `None` for collection elements and for the root value. A `None`
/// value writes nothing; explicit nulls go through
/// [`write_null_value`](SerializationWriter::write_null_value).
///
/// Scalar defaults funnel into the string, integer and double writers; a
/// format overrides the ones it represents natively.
pub trait SerializationWriter {
    fn content_type(&self) -> &str;

    fn hooks(&self) -> &WriterHooks;

    fn set_hooks(&mut self, hooks: WriterHooks);

    fn write_string_value(&mut self, key: Option<&str>, value: Option<&str>) -> Result<()>;

    fn write_bool_value(&mut self, key: Option<&str>, value: Option<bool>) -> Result<()>;

    fn write_long_value(&mut self, key: Option<&str>, value: Option<i64>) -> Result<()>;

    fn write_double_value(&mut self, key: Option<&str>, value: Option<f64>) -> Result<()>;

    fn write_null_value(&mut self, key: Option<&str>) -> Result<()>;

    /// Opens an object. `value` is the model about to be written, `None`
    /// for untyped objects.
    fn write_start_object(&mut self, key: Option<&str>, value: Option<&dyn Parsable>)
        -> Result<()>;

    fn write_end_object(&mut self) -> Result<()>;

    fn write_start_collection(&mut self, key: Option<&str>) -> Result<()>;

    fn write_end_collection(&mut self) -> Result<()>;

    /// The accumulated payload. The writer is spent afterwards.
    fn get_serialized_content(&mut self) -> Result<Vec<u8>>;

    fn write_byte_value(&mut self, key: Option<&str>, value: Option<u8>) -> Result<()> {
        self.write_long_value(key, value.map(i64::from))
    }

    fn write_sbyte_value(&mut self, key: Option<&str>, value: Option<i8>) -> Result<()> {
        self.write_long_value(key, value.map(i64::from))
    }

    fn write_int_value(&mut self, key: Option<&str>, value: Option<i32>) -> Result<()> {
        self.write_long_value(key, value.map(i64::from))
    }

    fn write_float_value(&mut self, key: Option<&str>, value: Option<f32>) -> Result<()> {
        self.write_double_value(key, value.map(f64::from))
    }

    fn write_decimal_value(&mut self, key: Option<&str>, value: Option<Decimal>) -> Result<()> {
        let text = value.map(|d| d.to_string());
        self.write_string_value(key, text.as_deref())
    }

    fn write_guid_value(&mut self, key: Option<&str>, value: Option<Uuid>) -> Result<()> {
        let text = value.map(|g| g.hyphenated().to_string());
        self.write_string_value(key, text.as_deref())
    }

    fn write_date_time_offset_value(
        &mut self,
        key: Option<&str>,
        value: Option<OffsetDateTime>,
    ) -> Result<()> {
        let text = value.map(temporal::format_date_time).transpose()?;
        self.write_string_value(key, text.as_deref())
    }

    fn write_date_value(&mut self, key: Option<&str>, value: Option<Date>) -> Result<()> {
        let text = value.map(temporal::format_date).transpose()?;
        self.write_string_value(key, text.as_deref())
    }

    fn write_time_value(&mut self, key: Option<&str>, value: Option<Time>) -> Result<()> {
        let text = value.map(temporal::format_time).transpose()?;
        self.write_string_value(key, text.as_deref())
    }

    fn write_time_span_value(&mut self, key: Option<&str>, value: Option<Duration>) -> Result<()> {
        let text = value.map(temporal::format_duration);
        self.write_string_value(key, text.as_deref())
    }

    /// Base64 text by default.
    fn write_byte_array_value(&mut self, key: Option<&str>, value: Option<&[u8]>) -> Result<()> {
        let text = value.map(|bytes| BASE64.encode(bytes));
        self.write_string_value(key, text.as_deref())
    }

    fn write_untyped_value(&mut self, key: Option<&str>, value: Option<&UntypedNode>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        match value {
            UntypedNode::Null => self.write_null_value(key),
            UntypedNode::Boolean(b) => self.write_bool_value(key, Some(*b)),
            UntypedNode::Integer(i) => self.write_long_value(key, Some(*i)),
            UntypedNode::Double(d) => self.write_double_value(key, Some(*d)),
            UntypedNode::String(s) => self.write_string_value(key, Some(s.as_str())),
            UntypedNode::Array(items) => {
                self.write_start_collection(key)?;
                for item in items {
                    self.write_untyped_value(None, Some(item))?;
                }
                self.write_end_collection()
            }
            UntypedNode::Object(members) => {
                self.write_start_object(key, None)?;
                for (member, item) in members {
                    self.write_untyped_value(Some(member.as_str()), Some(item))?;
                }
                self.write_end_object()
            }
        }
    }

    /// Writes undeclared fields kept by a model. Formats that can detect a
    /// clash with a declared field keep the declared one.
    fn write_additional_data(&mut self, data: &AdditionalData) -> Result<()> {
        for (key, value) in data {
            self.write_untyped_value(Some(key.as_str()), Some(value))?;
        }
        Ok(())
    }
}

/// Builds writers for one content type.
pub trait SerializationWriterFactory: Send + Sync {
    fn valid_content_type(&self) -> &str;

    fn get_serialization_writer(&self, content_type: &str)
        -> Result<Box<dyn SerializationWriter>>;
}

/// Writes a model as an object, running the writer hooks around it.
///
/// Fields of a backed model that were explicitly set to null are written as
/// nulls after the model's own fields.
pub fn write_object_value(
    writer: &mut dyn SerializationWriter,
    key: Option<&str>,
    value: Option<&dyn Parsable>,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let hooks = writer.hooks().clone();
    hooks.before(value);
    writer.write_start_object(key, Some(value))?;
    hooks.start(value, &mut *writer);
    value.serialize(&mut *writer)?;
    if let Some(model) = value.as_backed_model() {
        for null_key in model.backing_store().keys_for_values_changed_to_null() {
            writer.write_null_value(Some(null_key))?;
        }
    }
    writer.write_end_object()?;
    hooks.after(value);
    Ok(())
}

pub fn write_collection_of_object_values<T: Parsable>(
    writer: &mut dyn SerializationWriter,
    key: Option<&str>,
    values: Option<&[T]>,
) -> Result<()> {
    let Some(values) = values else {
        return Ok(());
    };
    writer.write_start_collection(key)?;
    for value in values {
        write_object_value(writer, None, Some(value as &dyn Parsable))?;
    }
    writer.write_end_collection()
}

pub fn write_collection_of_primitive_values<T: Primitive>(
    writer: &mut dyn SerializationWriter,
    key: Option<&str>,
    values: Option<&[T]>,
) -> Result<()> {
    let Some(values) = values else {
        return Ok(());
    };
    writer.write_start_collection(key)?;
    for value in values {
        value.write(writer, None)?;
    }
    writer.write_end_collection()
}

/// Writes the wire name of `value`. Values matching no declared member are
/// skipped.
pub fn write_enum_value<E: WireEnum>(
    writer: &mut dyn SerializationWriter,
    key: Option<&str>,
    value: Option<E>,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    match enums::serialize_enum(value) {
        Some(name) => writer.write_string_value(key, Some(name.as_str())),
        None => {
            tracing::debug!(
                key,
                enum_type = std::any::type_name::<E>(),
                "enum value has no wire name"
            );
            Ok(())
        }
    }
}

pub fn write_collection_of_enum_values<E: WireEnum>(
    writer: &mut dyn SerializationWriter,
    key: Option<&str>,
    values: Option<&[E]>,
) -> Result<()> {
    let Some(values) = values else {
        return Ok(());
    };
    writer.write_start_collection(key)?;
    for value in values {
        write_enum_value(writer, None, Some(*value))?;
    }
    writer.write_end_collection()
}

/// Generic writes over any serialization writer.
pub trait SerializationWriterExt {
    fn write_object_value<T: Parsable>(&mut self, key: Option<&str>, value: Option<&T>)
        -> Result<()>;

    fn write_collection_of_object_values<T: Parsable>(
        &mut self,
        key: Option<&str>,
        values: Option<&[T]>,
    ) -> Result<()>;

    fn write_primitive_value<T: Primitive>(&mut self, key: Option<&str>, value: Option<&T>)
        -> Result<()>;

    fn write_collection_of_primitive_values<T: Primitive>(
        &mut self,
        key: Option<&str>,
        values: Option<&[T]>,
    ) -> Result<()>;

    fn write_enum_value<E: WireEnum>(&mut self, key: Option<&str>, value: Option<E>)
        -> Result<()>;

    fn write_collection_of_enum_values<E: WireEnum>(
        &mut self,
        key: Option<&str>,
        values: Option<&[E]>,
    ) -> Result<()>;
}

impl SerializationWriterExt for dyn SerializationWriter + '_ {
    fn write_object_value<T: Parsable>(
        &mut self,
        key: Option<&str>,
        value: Option<&T>,
    ) -> Result<()> {
        write_object_value(self, key, value.map(|v| v as &dyn Parsable))
    }

    fn write_collection_of_object_values<T: Parsable>(
        &mut self,
        key: Option<&str>,
        values: Option<&[T]>,
    ) -> Result<()> {
        write_collection_of_object_values(self, key, values)
    }

    fn write_primitive_value<T: Primitive>(
        &mut self,
        key: Option<&str>,
        value: Option<&T>,
    ) -> Result<()> {
        match value {
            Some(value) => value.write(self, key),
            None => Ok(()),
        }
    }

    fn write_collection_of_primitive_values<T: Primitive>(
        &mut self,
        key: Option<&str>,
        values: Option<&[T]>,
    ) -> Result<()> {
        write_collection_of_primitive_values(self, key, values)
    }

    fn write_enum_value<E: WireEnum>(&mut self, key: Option<&str>, value: Option<E>) -> Result<()> {
        write_enum_value(self, key, value)
    }

    fn write_collection_of_enum_values<E: WireEnum>(
        &mut self,
        key: Option<&str>,
        values: Option<&[E]>,
    ) -> Result<()> {
        write_collection_of_enum_values(self, key, values)
    }
}
