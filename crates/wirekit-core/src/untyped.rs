//! Opaque values kept for wire fields that have no typed property.

use indexmap::IndexMap;

/// Undeclared wire fields, keyed by wire name.
///
/// `IndexMap` keeps insertion order for output while comparing as a map, so
/// two holders with the same entries in a different order are equal.
pub type AdditionalData = IndexMap<String, UntypedNode>;

/// A format-independent value tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UntypedNode {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<UntypedNode>),
    Object(IndexMap<String, UntypedNode>),
}

impl UntypedNode {
    pub fn is_null(&self) -> bool {
        matches!(self, UntypedNode::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            UntypedNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, UntypedNode>> {
        match self {
            UntypedNode::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[UntypedNode]> {
        match self {
            UntypedNode::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar rendering used by line-oriented formats (text, form).
    /// Structured values have no scalar form.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            UntypedNode::Null => Some("null".to_owned()),
            UntypedNode::Boolean(b) => Some(b.to_string()),
            UntypedNode::Integer(i) => Some(i.to_string()),
            UntypedNode::Double(d) => Some(d.to_string()),
            UntypedNode::String(s) => Some(s.clone()),
            UntypedNode::Array(_) | UntypedNode::Object(_) => None,
        }
    }
}

impl From<&str> for UntypedNode {
    fn from(value: &str) -> Self {
        UntypedNode::String(value.to_owned())
    }
}

impl From<String> for UntypedNode {
    fn from(value: String) -> Self {
        UntypedNode::String(value)
    }
}

impl From<bool> for UntypedNode {
    fn from(value: bool) -> Self {
        UntypedNode::Boolean(value)
    }
}

impl From<i64> for UntypedNode {
    fn from(value: i64) -> Self {
        UntypedNode::Integer(value)
    }
}

impl From<f64> for UntypedNode {
    fn from(value: f64) -> Self {
        UntypedNode::Double(value)
    }
}
