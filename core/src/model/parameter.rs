#![deny(missing_docs)]

//! # Parameters and Headers
//!
//! A parameter is a type alias whose type is a reference to one of the
//! location wrappers `Query`, `Body`, `FormData`, `Header` or `Cookie`:
//!
//! ```text
//! type Limit = Query<integer, "limit">
//! ```
//!
//! The first type argument is the value type, the optional second literal
//! argument the wire name (defaults to the alias name). `FormData` is
//! carried in the body.
//!
//! A header is any declaration tagged `header`; the first tag value, if
//! present, is the wire name.

use super::{describe_type, invalid, model_element, required_name, Element};
use crate::declaration::FromNode;
use crate::error::AppResult;
use crate::tree::{Node, NodeKind, TagReader};
use derive_more::Display;

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ParamSource {
    /// Query string.
    #[display("query")]
    Query,
    /// Request body (including form data).
    #[display("body")]
    Body,
    /// Request header.
    #[display("header")]
    Header,
    /// Cookie.
    #[display("cookie")]
    Cookie,
}

impl ParamSource {
    /// All locations.
    pub const ALL: [ParamSource; 4] = [
        ParamSource::Query,
        ParamSource::Body,
        ParamSource::Header,
        ParamSource::Cookie,
    ];

    /// Maps a wrapper type name to its location.
    pub fn from_wrapper(name: &str) -> Option<Self> {
        match name {
            "Query" => Some(ParamSource::Query),
            "Body" | "FormData" => Some(ParamSource::Body),
            "Header" => Some(ParamSource::Header),
            "Cookie" => Some(ParamSource::Cookie),
            _ => None,
        }
    }

    /// Location of a parameter-shaped declaration, `None` for other nodes.
    pub fn of(node: Node<'_>) -> Option<Self> {
        if node.kind() != NodeKind::TypeAlias {
            return None;
        }
        node.child(0)
            .filter(|child| child.kind() == NodeKind::Reference)
            .and_then(|reference| reference.value())
            .and_then(Self::from_wrapper)
    }
}

/// A request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Declaration name.
    pub name: String,
    /// Name on the wire.
    pub wire_name: String,
    /// Location.
    pub source: ParamSource,
    /// Rendered value type.
    pub type_name: Option<String>,
    /// Shared attributes.
    pub element: Element,
}

impl FromNode for Parameter {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let source = ParamSource::of(node)
            .ok_or_else(|| invalid(node, "expected an alias of Query, Body, FormData, Header or Cookie"))?;
        let name = required_name(node)?;
        let wrapper = node.child(0);

        Ok(Self {
            wire_name: wrapper
                .and_then(|wrapper| wrapper.child(1))
                .filter(|argument| argument.kind() == NodeKind::Literal)
                .and_then(|argument| argument.value())
                .map_or_else(|| name.clone(), str::to_string),
            type_name: wrapper
                .and_then(|wrapper| wrapper.child(0))
                .and_then(describe_type),
            name,
            source,
            element: Element::from_node(node),
        })
    }
}

/// A response header declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Declaration name.
    pub name: String,
    /// Name on the wire.
    pub wire_name: String,
    /// Rendered value type.
    pub type_name: Option<String>,
    /// Shared attributes.
    pub element: Element,
}

impl FromNode for Header {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let name = required_name(node)?;
        Ok(Self {
            wire_name: node
                .tag_values("header")
                .first()
                .cloned()
                .unwrap_or_else(|| name.clone()),
            type_name: node.child(0).and_then(describe_type),
            name,
            element: Element::from_node(node),
        })
    }
}

model_element!(Parameter, Header);
