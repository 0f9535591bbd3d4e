//! Read side: the format-specific cursor over one wire value.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime, Time};
use uuid::Uuid;

use crate::discriminator::DiscriminatorRegistry;
use crate::enums::{self, WireEnum};
use crate::error::{Result, SerializationError};
use crate::parsable::{Parsable, ParsableFactory};
use crate::primitive::Primitive;
use crate::temporal;
use crate::untyped::UntypedNode;

/// Callback run against a model while its fields are assigned.
pub type ParsableHook = Arc<dyn Fn(&mut dyn Parsable) + Send + Sync>;

/// Hooks a parse node runs around field assignment; children inherit them.
///
/// `discriminators` overrides the process-wide registry for every object
/// read below the node that carries it.
#[derive(Clone, Default)]
pub struct ParseNodeHooks {
    pub on_before_assign_field_values: Option<ParsableHook>,
    pub on_after_assign_field_values: Option<ParsableHook>,
    pub discriminators: Option<Arc<DiscriminatorRegistry>>,
}

impl fmt::Debug for ParseNodeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseNodeHooks")
            .field("before", &self.on_before_assign_field_values.is_some())
            .field("after", &self.on_after_assign_field_values.is_some())
            .field("local_discriminators", &self.discriminators.is_some())
            .finish()
    }
}

impl ParseNodeHooks {
    /// Runs `before`/`after` first, then the hooks already installed.
    pub fn wrap(self, before: Option<ParsableHook>, after: Option<ParsableHook>) -> Self {
        Self {
            on_before_assign_field_values: chain(before, self.on_before_assign_field_values),
            on_after_assign_field_values: chain(after, self.on_after_assign_field_values),
            discriminators: self.discriminators,
        }
    }

    pub fn with_discriminators(mut self, registry: Arc<DiscriminatorRegistry>) -> Self {
        self.discriminators = Some(registry);
        self
    }

    /// The registry objects below this node resolve subtypes through.
    pub fn discriminators(&self) -> &DiscriminatorRegistry {
        self.discriminators
            .as_deref()
            .unwrap_or_else(|| DiscriminatorRegistry::default_instance())
    }

    pub fn before(&self, value: &mut dyn Parsable) {
        if let Some(hook) = &self.on_before_assign_field_values {
            hook(value);
        }
    }

    pub fn after(&self, value: &mut dyn Parsable) {
        if let Some(hook) = &self.on_after_assign_field_values {
            hook(value);
        }
    }
}

fn chain(first: Option<ParsableHook>, second: Option<ParsableHook>) -> Option<ParsableHook> {
    match (first, second) {
        (Some(first), Some(second)) => Some(Arc::new(move |value: &mut dyn Parsable| {
            first(&mut *value);
            second(value);
        })),
        (first, second) => first.or(second),
    }
}

/// A cursor over one value of a wire payload.
///
/// Every getter is independently fallible: a null or missing value yields
/// `Ok(None)`, a value of the wrong shape yields
/// [`SerializationError::Parse`] carrying [`path`](ParseNode::path).
///
/// The scalar defaults read the textual form from `get_string_value`, which
/// is what line-oriented formats need; structured formats override the
/// getters whose wire type is not a string.
pub trait ParseNode {
    /// Location of this node inside the payload, `/`-separated.
    fn path(&self) -> &str;

    fn hooks(&self) -> &ParseNodeHooks;

    fn set_hooks(&mut self, hooks: ParseNodeHooks);

    fn get_string_value(&self) -> Result<Option<String>>;

    fn get_untyped_value(&self) -> Result<UntypedNode>;

    /// Child at `key`; `None` when the key is absent.
    fn get_child_node(&self, key: &str) -> Result<Option<Box<dyn ParseNode>>>;

    /// Elements of a collection value; `None` when the value is null.
    fn get_collection_elements(&self) -> Result<Option<Vec<Box<dyn ParseNode>>>>;

    /// Members of an object value in wire order; `None` when the value is null.
    fn get_object_members(&self) -> Result<Option<Vec<(String, Box<dyn ParseNode>)>>>;

    fn get_bool_value(&self) -> Result<Option<bool>> {
        match self.get_string_value()? {
            None => Ok(None),
            Some(text) if text.trim().eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(text) if text.trim().eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(text) => Err(SerializationError::parse(
                self.path(),
                format!("expected a boolean, found `{text}`"),
            )),
        }
    }

    fn get_byte_value(&self) -> Result<Option<u8>> {
        parse_text(self.path(), self.get_string_value()?, "an unsigned byte")
    }

    fn get_sbyte_value(&self) -> Result<Option<i8>> {
        parse_text(self.path(), self.get_string_value()?, "a signed byte")
    }

    fn get_int_value(&self) -> Result<Option<i32>> {
        parse_text(self.path(), self.get_string_value()?, "a 32-bit integer")
    }

    fn get_long_value(&self) -> Result<Option<i64>> {
        parse_text(self.path(), self.get_string_value()?, "a 64-bit integer")
    }

    fn get_float_value(&self) -> Result<Option<f32>> {
        parse_text(self.path(), self.get_string_value()?, "a number")
    }

    fn get_double_value(&self) -> Result<Option<f64>> {
        parse_text(self.path(), self.get_string_value()?, "a number")
    }

    fn get_decimal_value(&self) -> Result<Option<Decimal>> {
        match self.get_string_value()? {
            None => Ok(None),
            Some(text) => parse_decimal(self.path(), &text).map(Some),
        }
    }

    fn get_guid_value(&self) -> Result<Option<Uuid>> {
        parse_with(self.path(), self.get_string_value()?, "a GUID", |s| {
            Uuid::parse_str(s).ok()
        })
    }

    fn get_date_time_offset_value(&self) -> Result<Option<OffsetDateTime>> {
        parse_with(
            self.path(),
            self.get_string_value()?,
            "an RFC 3339 date-time",
            temporal::parse_date_time,
        )
    }

    fn get_date_value(&self) -> Result<Option<Date>> {
        parse_with(
            self.path(),
            self.get_string_value()?,
            "a YYYY-MM-DD date",
            temporal::parse_date,
        )
    }

    fn get_time_value(&self) -> Result<Option<Time>> {
        parse_with(
            self.path(),
            self.get_string_value()?,
            "an HH:MM:SS time",
            temporal::parse_time,
        )
    }

    fn get_time_span_value(&self) -> Result<Option<Duration>> {
        parse_with(
            self.path(),
            self.get_string_value()?,
            "an ISO 8601 duration",
            temporal::parse_duration,
        )
    }

    fn get_byte_array_value(&self) -> Result<Option<Vec<u8>>> {
        parse_with(self.path(), self.get_string_value()?, "base64 content", |s| {
            BASE64.decode(s).ok()
        })
    }
}

/// Builds root parse nodes for one content type.
pub trait ParseNodeFactory: Send + Sync {
    /// The content type this factory reads, e.g. `application/json`.
    fn valid_content_type(&self) -> &str;

    fn get_root_parse_node(&self, content_type: &str, content: &[u8])
        -> Result<Box<dyn ParseNode>>;
}

fn parse_text<T: FromStr>(path: &str, text: Option<String>, expected: &str) -> Result<Option<T>> {
    let Some(text) = text else {
        return Ok(None);
    };
    let trimmed = text.trim();
    trimmed.parse::<T>().map(Some).map_err(|_| {
        SerializationError::parse(path, format!("expected {expected}, found `{trimmed}`"))
    })
}

fn parse_with<T>(
    path: &str,
    text: Option<String>,
    expected: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>> {
    let Some(text) = text else {
        return Ok(None);
    };
    match parse(text.trim()) {
        Some(value) => Ok(Some(value)),
        None => Err(SerializationError::parse(
            path,
            format!("expected {expected}, found `{text}`"),
        )),
    }
}

/// Decimal from plain or scientific notation.
pub fn parse_decimal(path: &str, text: &str) -> Result<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| SerializationError::parse(path, format!("expected a decimal, found `{text}`")))
}

/// Materializes an object, resolving the concrete factory first through the
/// node's [`discriminators`](ParseNodeHooks::discriminators).
pub fn get_object_value<T>(node: &dyn ParseNode, factory: ParsableFactory<T>) -> Result<Option<T>>
where
    T: Parsable + 'static,
{
    let Some(members) = node.get_object_members()? else {
        return Ok(None);
    };
    let factory = node.hooks().discriminators().resolve(node, factory);
    let mut value = factory(node)?;
    assign_field_values(node, &mut value, members)?;
    Ok(Some(value))
}

/// Runs the field deserializers of `value` over `members`. Members without
/// a deserializer go to additional data when the model keeps it.
pub fn assign_field_values<T: Parsable + 'static>(
    node: &dyn ParseNode,
    value: &mut T,
    members: Vec<(String, Box<dyn ParseNode>)>,
) -> Result<()> {
    let hooks = node.hooks().clone();
    hooks.before(&mut *value);
    let deserializers = value.get_field_deserializers();
    for (key, child) in members {
        if let Some(deserializer) = deserializers.get(&key) {
            deserializer(value, child.as_ref())?;
            continue;
        }
        if let Some(holder) = value.as_additional_data_holder_mut() {
            let untyped = child.get_untyped_value()?;
            holder.additional_data_mut().insert(key, untyped);
        } else {
            tracing::trace!(path = child.path(), "dropping undeclared field");
        }
    }
    hooks.after(&mut *value);
    Ok(())
}

pub fn get_collection_of_object_values<T>(
    node: &dyn ParseNode,
    factory: ParsableFactory<T>,
) -> Result<Option<Vec<T>>>
where
    T: Parsable + 'static,
{
    let Some(elements) = node.get_collection_elements()? else {
        return Ok(None);
    };
    let mut out = Vec::with_capacity(elements.len());
    for element in &elements {
        if let Some(value) = get_object_value(element.as_ref(), factory)? {
            out.push(value);
        }
    }
    Ok(Some(out))
}

pub fn get_collection_of_primitive_values<T: Primitive>(
    node: &dyn ParseNode,
) -> Result<Option<Vec<T>>> {
    let Some(elements) = node.get_collection_elements()? else {
        return Ok(None);
    };
    let mut out = Vec::with_capacity(elements.len());
    for element in &elements {
        if let Some(value) = T::read(element.as_ref())? {
            out.push(value);
        }
    }
    Ok(Some(out))
}

pub fn get_enum_value<E: WireEnum>(node: &dyn ParseNode) -> Result<Option<E>> {
    Ok(node
        .get_string_value()?
        .and_then(|raw| enums::parse_enum::<E>(&raw)))
}

pub fn get_collection_of_enum_values<E: WireEnum>(node: &dyn ParseNode) -> Result<Option<Vec<E>>> {
    let Some(elements) = node.get_collection_elements()? else {
        return Ok(None);
    };
    let mut out = Vec::with_capacity(elements.len());
    for element in &elements {
        if let Some(value) = get_enum_value::<E>(element.as_ref())? {
            out.push(value);
        }
    }
    Ok(Some(out))
}

/// Generic reads over any parse node.
pub trait ParseNodeExt {
    fn get_object_value<T: Parsable + 'static>(
        &self,
        factory: ParsableFactory<T>,
    ) -> Result<Option<T>>;

    fn get_collection_of_object_values<T: Parsable + 'static>(
        &self,
        factory: ParsableFactory<T>,
    ) -> Result<Option<Vec<T>>>;

    fn get_primitive_value<T: Primitive>(&self) -> Result<Option<T>>;

    fn get_collection_of_primitive_values<T: Primitive>(&self) -> Result<Option<Vec<T>>>;

    fn get_enum_value<E: WireEnum>(&self) -> Result<Option<E>>;

    fn get_collection_of_enum_values<E: WireEnum>(&self) -> Result<Option<Vec<E>>>;
}

impl ParseNodeExt for dyn ParseNode + '_ {
    fn get_object_value<T: Parsable + 'static>(
        &self,
        factory: ParsableFactory<T>,
    ) -> Result<Option<T>> {
        get_object_value(self, factory)
    }

    fn get_collection_of_object_values<T: Parsable + 'static>(
        &self,
        factory: ParsableFactory<T>,
    ) -> Result<Option<Vec<T>>> {
        get_collection_of_object_values(self, factory)
    }

    fn get_primitive_value<T: Primitive>(&self) -> Result<Option<T>> {
        T::read(self)
    }

    fn get_collection_of_primitive_values<T: Primitive>(&self) -> Result<Option<Vec<T>>> {
        get_collection_of_primitive_values(self)
    }

    fn get_enum_value<E: WireEnum>(&self) -> Result<Option<E>> {
        get_enum_value(self)
    }

    fn get_collection_of_enum_values<E: WireEnum>(&self) -> Result<Option<Vec<E>>> {
        get_collection_of_enum_values(self)
    }
}
