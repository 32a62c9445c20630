#![deny(missing_docs)]

//! # Responses and Results
//!
//! * A response is a type alias of `Response<status, body, mediaType>`;
//!   literal arguments give the status code then the media type, the
//!   first non-literal argument is the body.
//! * A response collection is a type alias of a union of `Response<...>`.
//! * A result is a type alias of `Result<body>`, or an interface tagged
//!   `result` whose members are the result fields.

use super::{aliased_reference, describe_type, invalid, model_element, required_name, Element};
use crate::declaration::FromNode;
use crate::error::AppResult;
use crate::tree::{Node, NodeKind};

/// One HTTP response shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Alias name, absent for responses inside a collection.
    pub name: Option<String>,
    /// Status code, e.g. `200` or `4XX`.
    pub status_code: Option<String>,
    /// Rendered body type.
    pub body: Option<String>,
    /// Media type, e.g. `application/json`.
    pub media_type: Option<String>,
    /// Shared attributes.
    pub element: Element,
}

impl Response {
    /// Reads the type arguments of a `Response<...>` reference.
    pub(crate) fn from_reference(reference: Node<'_>) -> Self {
        let mut response = Self {
            element: Element::from_node(reference),
            ..Self::default()
        };
        for argument in reference.children() {
            match argument.kind() {
                NodeKind::Literal if response.status_code.is_none() => {
                    response.status_code = argument.value().map(str::to_string);
                }
                NodeKind::Literal => {
                    response.media_type = argument.value().map(str::to_string);
                }
                _ if response.body.is_none() => response.body = describe_type(argument),
                _ => {}
            }
        }
        response
    }
}

impl FromNode for Response {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let reference = aliased_reference(node, "Response")
            .ok_or_else(|| invalid(node, "expected an alias of Response<...>"))?;
        let mut response = Self::from_reference(reference);
        response.name = Some(required_name(node)?);
        response.element = Element::from_node(node);
        Ok(response)
    }
}

/// A named union of responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCollection {
    /// Alias name.
    pub name: String,
    /// Member responses in declaration order.
    pub responses: Vec<Response>,
    /// Shared attributes.
    pub element: Element,
}

impl ResponseCollection {
    /// The response for a status code.
    pub fn response(&self, status_code: &str) -> Option<&Response> {
        self.responses
            .iter()
            .find(|response| response.status_code.as_deref() == Some(status_code))
    }
}

impl FromNode for ResponseCollection {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let union = node
            .child(0)
            .filter(|child| child.kind() == NodeKind::Container)
            .ok_or_else(|| invalid(node, "expected an alias of a union of responses"))?;

        Ok(Self {
            name: required_name(node)?,
            responses: union
                .children()
                .filter(|member| {
                    member.kind() == NodeKind::Reference && member.value() == Some("Response")
                })
                .map(Response::from_reference)
                .collect(),
            element: Element::from_node(node),
        })
    }
}

/// An operation result shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    /// Declaration name.
    pub name: String,
    /// Rendered body type, for `Result<...>` aliases.
    pub body: Option<String>,
    /// Field names, for interfaces tagged `result`.
    pub fields: Vec<String>,
    /// Shared attributes.
    pub element: Element,
}

impl FromNode for OperationResult {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let body = match node.kind() {
            NodeKind::TypeAlias => {
                let reference = aliased_reference(node, "Result")
                    .ok_or_else(|| invalid(node, "expected an alias of Result<...>"))?;
                reference.child(0).and_then(describe_type)
            }
            _ => None,
        };

        Ok(Self {
            name: required_name(node)?,
            body,
            fields: node
                .children()
                .filter(|child| child.kind() == NodeKind::Member)
                .filter_map(|member| member.name().map(str::to_string))
                .collect(),
            element: Element::from_node(node),
        })
    }
}

model_element!(Response, ResponseCollection, OperationResult);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Document, DocumentSpec, NodeSpec};
    use pretty_assertions::assert_eq;

    fn response(status: &str, body: &str) -> NodeSpec {
        NodeSpec::reference("Response")
            .child(NodeSpec::literal(status))
            .child(NodeSpec::reference(body))
    }

    fn document() -> Document {
        Document::from_spec(
            &DocumentSpec::new("responses.yaml")
                .declaration(
                    NodeSpec::type_alias("PetFound")
                        .describe("The pet")
                        .child(response("200", "Pet").child(NodeSpec::literal("application/json"))),
                )
                .declaration(NodeSpec::type_alias("PetResponses").child(
                    NodeSpec::container().children([response("200", "Pet"), response("404", "Error")]),
                ))
                .declaration(
                    NodeSpec::type_alias("PetResult")
                        .child(NodeSpec::reference("Result").child(NodeSpec::reference("Pet"))),
                )
                .declaration(
                    NodeSpec::interface("Paged")
                        .tag("result")
                        .child(NodeSpec::field("items", "Pet[]"))
                        .child(NodeSpec::field("next", "string")),
                ),
        )
    }

    #[test]
    fn test_response_arguments_by_position() {
        let document = document();
        let found = Response::from_node(document.declarations().next().unwrap()).unwrap();
        assert_eq!(
            found,
            Response {
                name: Some("PetFound".into()),
                status_code: Some("200".into()),
                body: Some("Pet".into()),
                media_type: Some("application/json".into()),
                element: Element::new().describe("The pet"),
            }
        );
    }

    #[test]
    fn test_collection_members() {
        let document = document();
        let collection =
            ResponseCollection::from_node(document.declarations().nth(1).unwrap()).unwrap();
        assert_eq!(collection.responses.len(), 2);
        assert_eq!(collection.response("404").unwrap().body.as_deref(), Some("Error"));
        assert!(collection.response("500").is_none());
    }

    #[test]
    fn test_result_shapes() {
        let document = document();
        let alias = OperationResult::from_node(document.declarations().nth(2).unwrap()).unwrap();
        assert_eq!(alias.body.as_deref(), Some("Pet"));
        assert!(alias.fields.is_empty());

        let paged = OperationResult::from_node(document.declarations().nth(3).unwrap()).unwrap();
        assert_eq!(paged.body, None);
        assert_eq!(paged.fields, vec!["items".to_string(), "next".to_string()]);
    }

    #[test]
    fn test_wrong_shape_is_invalid() {
        let document = document();
        assert!(Response::from_node(document.declarations().nth(2).unwrap()).is_err());
    }
}
