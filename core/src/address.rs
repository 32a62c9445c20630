#![deny(missing_docs)]

//! # Path Addresses
//!
//! Structural paths from a document root to a node, and the locator that
//! turns a path back into a live node.
//!
//! A `PathAddress` is the document identifier followed by one `LocatorKey`
//! per node below the root. Keys are chosen per node kind so that an address
//! taken before an edit still finds the equivalent node afterwards:
//!
//! 1. enum declarations and enum members are located by kind + name,
//! 2. otherwise the node's name, if it is unique among its siblings,
//! 3. otherwise its value, if unique,
//! 4. otherwise its position.
//!
//! Resolution is a pure function of the address and the document content.

use crate::error::{AppError, AppResult};
use crate::tree::{DocumentId, DocumentSource, Node, NodeKind};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single step below the document root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocatorKey {
    /// A child whose name (or value) equals the text.
    #[display("{_0}")]
    Name(String),
    /// A child whose value (or name) equals the text.
    #[display("={_0}")]
    Value(String),
    /// The child at a position.
    #[display("#{_0}")]
    Index(usize),
    /// A child of the given kind with the given name.
    #[display("{kind}:{name}")]
    Member {
        /// Kind the child must have.
        kind: NodeKind,
        /// Name the child must have.
        name: String,
    },
}

impl LocatorKey {
    /// Evaluates the key against `context`, returning the selected child.
    pub fn locate<'a>(&self, context: Node<'a>) -> Option<Node<'a>> {
        match self {
            LocatorKey::Member { kind, name } => context
                .children()
                .find(|child| child.kind() == *kind && child.name() == Some(name.as_str())),
            LocatorKey::Name(text) | LocatorKey::Value(text) => {
                context.children().find(|child| matches_text(*child, text))
            }
            LocatorKey::Index(index) => context.child(*index),
        }
    }
}

/// A structural path from a document root to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathAddress {
    document: DocumentId,
    keys: Vec<LocatorKey>,
}

impl PathAddress {
    /// The address of a document root.
    pub fn root(document: impl Into<DocumentId>) -> Self {
        Self {
            document: document.into(),
            keys: Vec::new(),
        }
    }

    /// The document segment.
    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    /// The locator keys below the root.
    pub fn keys(&self) -> &[LocatorKey] {
        &self.keys
    }

    /// Number of segments including the document.
    pub fn segment_count(&self) -> usize {
        self.keys.len() + 1
    }

    /// The address of the parent node, `None` for a root address.
    pub fn parent(&self) -> Option<PathAddress> {
        let (_, keys) = self.keys.split_last()?;
        Some(Self {
            document: self.document.clone(),
            keys: keys.to_vec(),
        })
    }

    /// Extends the address by one key.
    pub fn child(&self, key: LocatorKey) -> PathAddress {
        let mut keys = self.keys.clone();
        keys.push(key);
        Self {
            document: self.document.clone(),
            keys,
        }
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)?;
        for key in &self.keys {
            write!(f, "/{}", key)?;
        }
        Ok(())
    }
}

/// Computes the address of `node` by walking its ancestors to the document root.
pub fn compute_address(node: Node<'_>) -> PathAddress {
    let mut keys: Vec<LocatorKey> = std::iter::once(node)
        .chain(node.ancestors())
        .filter(|step| !step.is_root())
        .map(locator_key)
        .collect();
    keys.reverse();

    PathAddress {
        document: node.document().id().clone(),
        keys,
    }
}

/// Resolves `address` against a document set.
///
/// # Errors
///
/// * `DocumentNotFound` if the first segment names no document.
/// * `AddressUnresolvable` if any key has no matching child.
pub fn resolve<'s, S: DocumentSource>(
    address: &PathAddress,
    documents: &'s S,
) -> AppResult<Node<'s>> {
    let document = documents
        .document(address.document.as_str())
        .ok_or_else(|| AppError::DocumentNotFound(address.document.to_string()))?;

    let mut current = document.root();
    for (depth, key) in address.keys.iter().enumerate() {
        current = key
            .locate(current)
            .ok_or_else(|| AppError::AddressUnresolvable {
                address: address.to_string(),
                segment: depth + 1,
            })?;
    }
    Ok(current)
}

fn locator_key(node: Node<'_>) -> LocatorKey {
    let Some(parent) = node.parent() else {
        return LocatorKey::Index(0);
    };

    if let (NodeKind::Enum | NodeKind::EnumMember, Some(name)) = (node.kind(), node.name()) {
        let same = parent
            .children()
            .filter(|sibling| sibling.kind() == node.kind() && sibling.name() == Some(name))
            .count();
        if same == 1 {
            return LocatorKey::Member {
                kind: node.kind(),
                name: name.to_string(),
            };
        }
    }

    if let Some(name) = node.name() {
        if is_unique_text(parent, name) {
            return LocatorKey::Name(name.to_string());
        }
    }

    if let Some(value) = node.value() {
        if is_unique_text(parent, value) {
            return LocatorKey::Value(value.to_string());
        }
    }

    LocatorKey::Index(node.child_index().unwrap_or(0))
}

fn matches_text(node: Node<'_>, text: &str) -> bool {
    node.name() == Some(text) || node.value() == Some(text)
}

fn is_unique_text(parent: Node<'_>, text: &str) -> bool {
    parent
        .children()
        .filter(|sibling| matches_text(*sibling, text))
        .count()
        == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Document, DocumentSet, DocumentSpec, NodeSpec};
    use pretty_assertions::assert_eq;

    fn documents() -> DocumentSet {
        let spec = DocumentSpec::new("api.yaml")
            .declaration(
                NodeSpec::enumeration("Color")
                    .child(NodeSpec::enum_member("Red").valued("red"))
                    .child(NodeSpec::enum_member("Blue").valued("blue")),
            )
            .declaration(
                NodeSpec::type_alias("Status")
                    .child(NodeSpec::container().children([
                        NodeSpec::literal("active"),
                        NodeSpec::literal("active"),
                        NodeSpec::literal("retired"),
                    ])),
            );
        [Document::from_spec(&spec)].into_iter().collect()
    }

    #[test]
    fn test_key_strategy_per_kind() {
        let documents = documents();
        let document = documents.document("api.yaml").unwrap();
        let union = document.declarations().nth(1).unwrap().child(0).unwrap();

        let red = document.declarations().next().unwrap().child(0).unwrap();
        assert_eq!(compute_address(red).to_string(), "api.yaml/enum:Color/enumMember:Red");

        // duplicate literal values fall back to positions
        let first = compute_address(union.child(0).unwrap());
        assert_eq!(first.to_string(), "api.yaml/Status/#0/#0");
        let retired = compute_address(union.child(2).unwrap());
        assert_eq!(retired.to_string(), "api.yaml/Status/#0/=retired");
    }

    #[test]
    fn test_every_node_round_trips() {
        let documents = documents();
        let document = documents.document("api.yaml").unwrap();
        for node in document.nodes() {
            let address = compute_address(node);
            assert_eq!(resolve(&address, &documents).unwrap(), node, "{}", address);
        }
    }

    #[test]
    fn test_missing_document() {
        let documents = documents();
        let address = PathAddress::root("missing.yaml");
        assert!(matches!(
            resolve(&address, &documents),
            Err(AppError::DocumentNotFound(id)) if id == "missing.yaml"
        ));
    }

    #[test]
    fn test_unresolvable_segment_reports_depth() {
        let documents = documents();
        let address = PathAddress::root("api.yaml")
            .child(LocatorKey::Name("Status".into()))
            .child(LocatorKey::Index(4));
        match resolve(&address, &documents) {
            Err(AppError::AddressUnresolvable { segment, .. }) => assert_eq!(segment, 2),
            other => panic!("expected AddressUnresolvable, got {:?}", other),
        }
    }

    #[test]
    fn test_parent_and_serde() {
        let address = PathAddress::root("api.yaml")
            .child(LocatorKey::Member {
                kind: NodeKind::Enum,
                name: "Color".into(),
            })
            .child(LocatorKey::Index(1));
        assert_eq!(address.segment_count(), 3);
        assert_eq!(address.parent().unwrap().to_string(), "api.yaml/enum:Color");

        let json = serde_json::to_string(&address).unwrap();
        let back: PathAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
