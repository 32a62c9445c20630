//! Owned node trees.
//!
//! `NodeSpec` is the unit of construction: documents are built from specs,
//! edits insert specs, and removed subtrees are handed back as specs.

use super::NodeKind;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// An owned description of a node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Node kind.
    pub kind: NodeKind,
    /// Verbatim name, if the node has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Verbatim scalar value, if the node has one.
    #[serde(
        default,
        deserialize_with = "deserialize_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    /// Tag annotations (`@tag value`), in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, Vec<String>>,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Creates an empty node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            value: None,
            tags: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// An `Interface` declaration.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Interface).named(name)
    }

    /// A `TypeAlias` declaration.
    pub fn type_alias(name: impl Into<String>) -> Self {
        Self::new(NodeKind::TypeAlias).named(name)
    }

    /// An `Enum` declaration.
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Enum).named(name)
    }

    /// An `EnumMember`.
    pub fn enum_member(name: impl Into<String>) -> Self {
        Self::new(NodeKind::EnumMember).named(name)
    }

    /// An `Operation`.
    pub fn operation(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Operation).named(name)
    }

    /// A named `Member` without a value.
    pub fn member(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Member).named(name)
    }

    /// A named `Member` holding a scalar value.
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::member(name).valued(value)
    }

    /// A `Literal`.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Literal).valued(value)
    }

    /// A `Reference` to the named type.
    pub fn reference(target: impl Into<String>) -> Self {
        Self::new(NodeKind::Reference).valued(target)
    }

    /// An unnamed `Container`.
    pub fn container() -> Self {
        Self::new(NodeKind::Container)
    }

    /// Sets the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the value.
    pub fn valued(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Adds a tag without a value.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.entry(tag.into()).or_default();
        self
    }

    /// Adds a tag value.
    pub fn tagged(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.entry(tag.into()).or_default().push(value.into());
        self
    }

    /// Adds a `description` tag.
    pub fn describe(self, description: impl Into<String>) -> Self {
        self.tagged("description", description)
    }

    /// Appends a child.
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several children.
    pub fn children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

/// An owned description of a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Document identifier (location). Loaders fill it in from the path
    /// when the text omits it.
    #[serde(default)]
    pub id: String,
    /// Top-level declarations, in document order.
    #[serde(default)]
    pub declarations: Vec<NodeSpec>,
}

impl DocumentSpec {
    /// Creates an empty document spec.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            declarations: Vec::new(),
        }
    }

    /// Appends a top-level declaration.
    pub fn declaration(mut self, declaration: NodeSpec) -> Self {
        self.declarations.push(declaration);
        self
    }
}

// YAML authors write `value: 200` as often as `value: "200"`.
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(JsonValue::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "node value must be a scalar, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_collects_tags_in_order() {
        let spec = NodeSpec::type_alias("RateLimit")
            .tag("header")
            .describe("Remaining calls")
            .tagged("x-ms-client-name", "Limit");

        let tags: Vec<&str> = spec.tags.keys().map(String::as_str).collect();
        assert_eq!(tags, vec!["header", "description", "x-ms-client-name"]);
        assert!(spec.tags["header"].is_empty());
    }

    #[test]
    fn test_deserialize_numeric_value() {
        let yaml = r#"
kind: literal
value: 200
"#;
        let spec: NodeSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec, NodeSpec::literal("200"));
    }

    #[test]
    fn test_deserialize_rejects_nested_value() {
        let yaml = r#"
kind: literal
value: [1, 2]
"#;
        assert!(serde_yaml::from_str::<NodeSpec>(yaml).is_err());
    }
}
