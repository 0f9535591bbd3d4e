use indexmap::IndexMap;
use url::form_urlencoded;
use wirekit_core::parse_node::{ParseNode, ParseNodeFactory, ParseNodeHooks};
use wirekit_core::{Result, SerializationError, UntypedNode};

use crate::CONTENT_TYPE;

#[derive(Debug, Clone, Copy, Default)]
pub struct FormParseNodeFactory;

impl ParseNodeFactory for FormParseNodeFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn get_root_parse_node(
        &self,
        _content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        Ok(Box::new(FormParseNode::parse(content)))
    }
}

#[derive(Debug, Clone)]
enum FormValue {
    /// Lower-cased key → (key as first seen, joined values).
    Fields(IndexMap<String, (String, String)>),
    Scalar(String),
}

#[derive(Debug, Clone)]
pub struct FormParseNode {
    value: FormValue,
    path: String,
    hooks: ParseNodeHooks,
}

impl FormParseNode {
    pub fn parse(content: &[u8]) -> Self {
        let mut fields: IndexMap<String, (String, String)> = IndexMap::new();
        for (key, value) in form_urlencoded::parse(content) {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            fields
                .entry(key.to_lowercase())
                .and_modify(|(_, joined)| {
                    joined.push(',');
                    joined.push_str(&value);
                })
                .or_insert_with(|| (key.to_owned(), value.into_owned()));
        }
        Self {
            value: FormValue::Fields(fields),
            path: String::new(),
            hooks: ParseNodeHooks::default(),
        }
    }

    fn scalar(&self, segment: &str, text: String) -> Box<dyn ParseNode> {
        Box::new(Self {
            value: FormValue::Scalar(text),
            path: format!("{}/{segment}", self.path),
            hooks: self.hooks.clone(),
        })
    }

    fn no_structure(&self, what: &str) -> SerializationError {
        SerializationError::unsupported(format!(
            "form field `{}` cannot hold {what}",
            self.path
        ))
    }
}

fn is_null(text: &str) -> bool {
    text.eq_ignore_ascii_case("null")
}

impl ParseNode for FormParseNode {
    fn path(&self) -> &str {
        &self.path
    }

    fn hooks(&self) -> &ParseNodeHooks {
        &self.hooks
    }

    fn set_hooks(&mut self, hooks: ParseNodeHooks) {
        self.hooks = hooks;
    }

    fn get_string_value(&self) -> Result<Option<String>> {
        match &self.value {
            FormValue::Scalar(text) if is_null(text) => Ok(None),
            FormValue::Scalar(text) => Ok(Some(text.clone())),
            FormValue::Fields(_) => Err(SerializationError::parse(
                &self.path,
                "expected a value, found the form itself",
            )),
        }
    }

    fn get_untyped_value(&self) -> Result<UntypedNode> {
        Ok(match &self.value {
            FormValue::Scalar(text) if is_null(text) => UntypedNode::Null,
            FormValue::Scalar(text) => UntypedNode::String(text.clone()),
            FormValue::Fields(fields) => UntypedNode::Object(
                fields
                    .values()
                    .map(|(key, value)| (key.clone(), UntypedNode::String(value.clone())))
                    .collect(),
            ),
        })
    }

    /// Keys match case-insensitively.
    fn get_child_node(&self, key: &str) -> Result<Option<Box<dyn ParseNode>>> {
        match &self.value {
            FormValue::Fields(fields) => Ok(fields
                .get(&key.to_lowercase())
                .map(|(key, value)| self.scalar(key, value.clone()))),
            FormValue::Scalar(_) => Ok(None),
        }
    }

    fn get_collection_elements(&self) -> Result<Option<Vec<Box<dyn ParseNode>>>> {
        match &self.value {
            FormValue::Scalar(text) if is_null(text) => Ok(None),
            FormValue::Scalar(text) => Ok(Some(
                text.split(',')
                    .enumerate()
                    .map(|(i, item)| self.scalar(&i.to_string(), item.trim().to_owned()))
                    .collect(),
            )),
            FormValue::Fields(_) => Err(SerializationError::unsupported(
                "a form cannot be read as a collection",
            )),
        }
    }

    fn get_object_members(&self) -> Result<Option<Vec<(String, Box<dyn ParseNode>)>>> {
        match &self.value {
            FormValue::Fields(fields) => Ok(Some(
                fields
                    .values()
                    .map(|(key, value)| (key.clone(), self.scalar(key, value.clone())))
                    .collect(),
            )),
            FormValue::Scalar(_) => Err(self.no_structure("a nested object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirekit_core::ParseNodeExt;

    fn root(content: &str) -> Box<dyn ParseNode> {
        FormParseNodeFactory
            .get_root_parse_node(CONTENT_TYPE, content.as_bytes())
            .unwrap()
    }

    fn field(root: &dyn ParseNode, key: &str) -> Box<dyn ParseNode> {
        root.get_child_node(key).unwrap().expect(key)
    }

    #[test]
    fn decodes_and_matches_keys_case_insensitively() {
        let form = root("Name=Jane+Doe&AGE=42&city=S%C3%A3o%20Paulo&empty=");
        assert_eq!(
            field(form.as_ref(), "name").get_string_value().unwrap().as_deref(),
            Some("Jane Doe")
        );
        assert_eq!(field(form.as_ref(), "age").get_int_value().unwrap(), Some(42));
        assert_eq!(
            field(form.as_ref(), "City").get_string_value().unwrap().as_deref(),
            Some("São Paulo")
        );
        assert_eq!(
            field(form.as_ref(), "empty").get_string_value().unwrap().as_deref(),
            Some("")
        );
        assert!(form.get_child_node("missing").unwrap().is_none());
    }

    #[test]
    fn members_keep_wire_spelling_and_order() {
        let form = root("b=1&A=2");
        let keys: Vec<String> = form
            .get_object_members()
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, ["b", "A"]);
    }

    #[test]
    fn repeated_keys_form_a_collection() {
        let form = root("tag=a&tag=b&TAG=c&n=1,2");
        assert_eq!(
            field(form.as_ref(), "tag").get_string_value().unwrap().as_deref(),
            Some("a,b,c")
        );
        assert_eq!(
            field(form.as_ref(), "tag")
                .get_collection_of_primitive_values::<String>()
                .unwrap(),
            Some(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()])
        );
        assert_eq!(
            field(form.as_ref(), "n")
                .get_collection_of_primitive_values::<i32>()
                .unwrap(),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn null_literal_reads_as_absent() {
        let form = root("a=null&b=NULL");
        assert_eq!(field(form.as_ref(), "a").get_string_value().unwrap(), None);
        assert_eq!(field(form.as_ref(), "b").get_int_value().unwrap(), None);
    }

    #[test]
    fn nested_objects_are_unsupported() {
        let form = root("a=1");
        let err = field(form.as_ref(), "a").get_object_members().err().unwrap();
        assert!(matches!(err, SerializationError::UnsupportedOperation(_)));
        assert!(field(form.as_ref(), "a").get_bool_value().unwrap_err().is_parse());
    }
}
