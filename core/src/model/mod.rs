#![deny(missing_docs)]

//! # Semantic Model
//!
//! Views derived from document nodes.
//!
//! - **authentication**: authentication schemes, OAuth2 flows, requirements.
//! - **connection**: base URL templates and their variables.
//! - **operation**: operation groups and operations.
//! - **response**: responses, response collections and results.
//! - **parameter**: parameters keyed by location, and response headers.
//!
//! Every entity carries an [`Element`]: an optional description plus a bag
//! of vendor (`x-`) metadata read from node tags.

macro_rules! model_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::model::ModelElement for $ty {
                fn element(&self) -> &$crate::model::Element {
                    &self.element
                }

                fn element_mut(&mut self) -> &mut $crate::model::Element {
                    &mut self.element
                }
            }
        )*
    };
}

pub(crate) use model_element;

pub mod authentication;
pub mod connection;
pub mod operation;
pub mod parameter;
pub mod response;

pub use authentication::{
    authorizes, ApiKeyAuthentication, Authentication, AuthenticationReference,
    AuthenticationRequirement, AuthenticationType, Credentials, HttpAuthentication, OAuth2Authentication,
    OAuth2Flow, OAuth2Grant, OAuth2Scope, OpenIdConnectAuthentication, ParameterLocation,
};
pub use connection::{Connection, ConnectionVariable};
pub use operation::{Operation, OperationGroup, OperationParameter};
pub use parameter::{Header, ParamSource, Parameter};
pub use response::{OperationResult, Response, ResponseCollection};

use crate::address::compute_address;
use crate::error::{AppError, AppResult};
use crate::tree::{Node, NodeKind, TagReader};
use indexmap::IndexMap;
use url::Url;

/// Attributes shared by all model entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Human-readable description.
    pub description: Option<String>,
    /// Vendor / custom metadata (`x-` tags), in declaration order.
    pub extensions: IndexMap<String, String>,
}

impl Element {
    /// An element with no description or metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an extension entry.
    pub fn extension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Reads `description` and `x-` tags from a node.
    pub fn from_node(node: Node<'_>) -> Self {
        let description = node.tag_values("description");
        Self {
            description: (!description.is_empty()).then(|| description.join("\n")),
            extensions: node
                .tags()
                .filter(|(tag, _)| tag.starts_with("x-"))
                .map(|(tag, values)| (tag.to_string(), values.join(" ")))
                .collect(),
        }
    }
}

/// Access to the [`Element`] attributes of a model entity.
pub trait ModelElement {
    /// Shared attributes.
    fn element(&self) -> &Element;

    /// Mutable shared attributes.
    fn element_mut(&mut self) -> &mut Element;

    /// Shortcut for the description.
    fn description(&self) -> Option<&str> {
        self.element().description.as_deref()
    }
}

pub(crate) fn invalid(node: Node<'_>, reason: impl Into<String>) -> AppError {
    AppError::InvalidDeclaration {
        declaration: compute_address(node).to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn required_name(node: Node<'_>) -> AppResult<String> {
    node.name()
        .map(str::to_string)
        .ok_or_else(|| invalid(node, "declaration has no name"))
}

pub(crate) fn required<'a>(node: Node<'a>, field: &str) -> AppResult<&'a str> {
    node.member_value(field)
        .ok_or_else(|| invalid(node, format!("missing field '{}'", field)))
}

pub(crate) fn optional(node: Node<'_>, field: &str) -> Option<String> {
    node.member_value(field).map(str::to_string)
}

pub(crate) fn required_url(node: Node<'_>, field: &str) -> AppResult<String> {
    let value = required(node, field)?;
    check_url(node, field, value)?;
    Ok(value.to_string())
}

pub(crate) fn optional_url(node: Node<'_>, field: &str) -> AppResult<Option<String>> {
    match node.member_value(field) {
        Some(value) => {
            check_url(node, field, value)?;
            Ok(Some(value.to_string()))
        }
        None => Ok(None),
    }
}

// Relative references ("/oauth/token") are allowed, anything else must parse.
fn check_url(node: Node<'_>, field: &str, value: &str) -> AppResult<()> {
    if value.starts_with('/') || Url::parse(value).is_ok() {
        Ok(())
    } else {
        Err(invalid(
            node,
            format!("field '{}' is not a URL: '{}'", field, value),
        ))
    }
}

/// Renders a type expression node as text (e.g. `Response<200, Pet>`, `"a" | "b"`).
pub(crate) fn describe_type(node: Node<'_>) -> Option<String> {
    match node.kind() {
        NodeKind::Reference => {
            let target = node.value()?;
            let arguments: Vec<String> = node.children().filter_map(describe_type).collect();
            if arguments.is_empty() {
                Some(target.to_string())
            } else {
                Some(format!("{}<{}>", target, arguments.join(", ")))
            }
        }
        NodeKind::Literal => node.value().map(|value| {
            if value.parse::<f64>().is_ok() || value == "true" || value == "false" {
                value.to_string()
            } else {
                format!("{:?}", value)
            }
        }),
        NodeKind::Container => {
            let members: Vec<String> = node.children().filter_map(describe_type).collect();
            (!members.is_empty()).then(|| members.join(" | "))
        }
        NodeKind::Member => node
            .value()
            .map(str::to_string)
            .or_else(|| node.child(0).and_then(describe_type)),
        NodeKind::Document
        | NodeKind::Interface
        | NodeKind::TypeAlias
        | NodeKind::Enum
        | NodeKind::EnumMember
        | NodeKind::Operation => node.name().map(str::to_string),
    }
}

/// The first child of a type alias if it is a `Reference` to `target`.
pub(crate) fn aliased_reference<'a>(node: Node<'a>, target: &str) -> Option<Node<'a>> {
    if node.kind() != NodeKind::TypeAlias {
        return None;
    }
    node.child(0)
        .filter(|child| child.kind() == NodeKind::Reference && child.value() == Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Document, DocumentSpec, NodeSpec};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_element_reads_description_and_extensions() {
        let document = Document::from_spec(
            &DocumentSpec::new("api.yaml").declaration(
                NodeSpec::interface("Pets")
                    .describe("Pet operations")
                    .describe("Second paragraph")
                    .tagged("x-ms-group", "pets")
                    .tagged("header", "ignored"),
            ),
        );
        let element = Element::from_node(document.declarations().next().unwrap());
        assert_eq!(
            element,
            Element::new()
                .describe("Pet operations\nSecond paragraph")
                .extension("x-ms-group", "pets")
        );
    }

    #[test]
    fn test_describe_type_expressions() {
        let document = Document::from_spec(
            &DocumentSpec::new("api.yaml").declaration(
                NodeSpec::type_alias("Ok").child(
                    NodeSpec::reference("Response").children([
                        NodeSpec::literal("200"),
                        NodeSpec::reference("Array").child(NodeSpec::reference("Pet")),
                        NodeSpec::container()
                            .children([NodeSpec::literal("a"), NodeSpec::literal("b")]),
                    ]),
                ),
            ),
        );
        let alias = document.declarations().next().unwrap();
        assert_eq!(
            describe_type(alias.child(0).unwrap()).as_deref(),
            Some(r#"Response<200, Array<Pet>, "a" | "b">"#)
        );
        assert!(aliased_reference(alias, "Response").is_some());
        assert!(aliased_reference(alias, "Result").is_none());
    }

    #[test]
    fn test_url_fields() {
        let document = Document::from_spec(
            &DocumentSpec::new("api.yaml").declaration(
                NodeSpec::interface("flow")
                    .child(NodeSpec::field("tokenUrl", "/oauth/token"))
                    .child(NodeSpec::field("authorizationUrl", "not a url")),
            ),
        );
        let flow = document.declarations().next().unwrap();
        assert_eq!(required_url(flow, "tokenUrl").unwrap(), "/oauth/token");
        assert!(matches!(
            required_url(flow, "authorizationUrl"),
            Err(AppError::InvalidDeclaration { .. })
        ));
        assert_eq!(optional_url(flow, "refreshUrl").unwrap(), None);
        assert!(matches!(
            required(flow, "scopes"),
            Err(AppError::InvalidDeclaration { reason, .. }) if reason == "missing field 'scopes'"
        ));
    }
}
