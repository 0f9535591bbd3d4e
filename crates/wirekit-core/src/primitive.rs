//! Scalar types readable and writable without a factory.

use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime, Time};
use uuid::Uuid;

use crate::error::Result;
use crate::parse_node::ParseNode;
use crate::writer::SerializationWriter;

/// A scalar with a dedicated getter on [`ParseNode`] and writer method on
/// [`SerializationWriter`].
pub trait Primitive: Sized + 'static {
    fn read(node: &dyn ParseNode) -> Result<Option<Self>>;

    fn write(&self, writer: &mut dyn SerializationWriter, key: Option<&str>) -> Result<()>;
}

macro_rules! primitive {
    ($ty:ty, $get:ident, |$w:ident, $k:ident, $v:ident| $write:expr) => {
        impl Primitive for $ty {
            fn read(node: &dyn ParseNode) -> Result<Option<Self>> {
                node.$get()
            }

            fn write(&self, $w: &mut dyn SerializationWriter, $k: Option<&str>) -> Result<()> {
                let $v = self;
                $write
            }
        }
    };
}

primitive!(String, get_string_value, |w, k, v| w.write_string_value(k, Some(v.as_str())));
primitive!(bool, get_bool_value, |w, k, v| w.write_bool_value(k, Some(*v)));
primitive!(u8, get_byte_value, |w, k, v| w.write_byte_value(k, Some(*v)));
primitive!(i8, get_sbyte_value, |w, k, v| w.write_sbyte_value(k, Some(*v)));
primitive!(i32, get_int_value, |w, k, v| w.write_int_value(k, Some(*v)));
primitive!(i64, get_long_value, |w, k, v| w.write_long_value(k, Some(*v)));
primitive!(f32, get_float_value, |w, k, v| w.write_float_value(k, Some(*v)));
primitive!(f64, get_double_value, |w, k, v| w.write_double_value(k, Some(*v)));
primitive!(Decimal, get_decimal_value, |w, k, v| w.write_decimal_value(k, Some(*v)));
primitive!(Uuid, get_guid_value, |w, k, v| w.write_guid_value(k, Some(*v)));
primitive!(OffsetDateTime, get_date_time_offset_value, |w, k, v| {
    w.write_date_time_offset_value(k, Some(*v))
});
primitive!(Date, get_date_value, |w, k, v| w.write_date_value(k, Some(*v)));
primitive!(Time, get_time_value, |w, k, v| w.write_time_value(k, Some(*v)));
primitive!(Duration, get_time_span_value, |w, k, v| w.write_time_span_value(k, Some(*v)));
primitive!(Vec<u8>, get_byte_array_value, |w, k, v| {
    w.write_byte_array_value(k, Some(v.as_slice()))
});
