#![deny(missing_docs)]

//! # Operations
//!
//! An operation group is an `Interface` declaring `Operation` children.
//! Operation parameters are `Member` children; return types are the
//! operation's `Reference` children.

use super::{describe_type, model_element, required_name, Element};
use crate::declaration::FromNode;
use crate::error::AppResult;
use crate::tree::{Node, NodeKind};

/// A named operation parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationParameter {
    /// Parameter name.
    pub name: String,
    /// Rendered type, if declared.
    pub type_name: Option<String>,
}

/// One operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Operation name.
    pub name: String,
    /// Parameters in declaration order.
    pub parameters: Vec<OperationParameter>,
    /// Rendered return types (responses, results).
    pub returns: Vec<String>,
    /// Shared attributes.
    pub element: Element,
}

impl FromNode for Operation {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let parameters = node
            .children()
            .filter(|child| child.kind() == NodeKind::Member)
            .map(|member| -> AppResult<_> {
                Ok(OperationParameter {
                    name: required_name(member)?,
                    type_name: describe_type(member),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            name: required_name(node)?,
            parameters,
            returns: node
                .children()
                .filter(|child| child.kind() == NodeKind::Reference)
                .filter_map(describe_type)
                .collect(),
            element: Element::from_node(node),
        })
    }
}

/// A set of related operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationGroup {
    /// Group name.
    pub name: String,
    /// Operations in declaration order.
    pub operations: Vec<Operation>,
    /// Shared attributes.
    pub element: Element,
}

impl OperationGroup {
    /// Looks an operation up by name.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|operation| operation.name == name)
    }
}

impl FromNode for OperationGroup {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        Ok(Self {
            name: required_name(node)?,
            operations: node
                .children()
                .filter(|child| child.kind() == NodeKind::Operation)
                .map(Operation::from_node)
                .collect::<AppResult<Vec<_>>>()?,
            element: Element::from_node(node),
        })
    }
}

model_element!(Operation, OperationGroup);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelElement;
    use crate::tree::{Document, DocumentSpec, NodeSpec};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_from_node() {
        let spec = DocumentSpec::new("pets.yaml").declaration(
            NodeSpec::interface("Pets")
                .describe("Pet store operations")
                .child(
                    NodeSpec::operation("getPet")
                        .child(NodeSpec::field("id", "string"))
                        .child(NodeSpec::member("filter").child(NodeSpec::reference("Filter")))
                        .child(
                            NodeSpec::reference("Response")
                                .child(NodeSpec::literal("200"))
                                .child(NodeSpec::reference("Pet")),
                        ),
                )
                .child(NodeSpec::operation("listPets"))
                .child(NodeSpec::field("version", "1")),
        );
        let document = Document::from_spec(&spec);
        let group = OperationGroup::from_node(document.declarations().next().unwrap()).unwrap();

        assert_eq!(group.name, "Pets");
        assert_eq!(group.description(), Some("Pet store operations"));
        assert_eq!(group.operations.len(), 2);

        let get = group.operation("getPet").unwrap();
        assert_eq!(
            get.parameters,
            vec![
                OperationParameter {
                    name: "id".into(),
                    type_name: Some("string".into()),
                },
                OperationParameter {
                    name: "filter".into(),
                    type_name: Some("Filter".into()),
                },
            ]
        );
        assert_eq!(get.returns, vec!["Response<200, Pet>".to_string()]);
        assert!(group.operation("listPets").unwrap().parameters.is_empty());
    }
}
