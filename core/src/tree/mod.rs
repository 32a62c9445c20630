#![deny(missing_docs)]

//! # Document Tree
//!
//! The mutable, parsed representation of API description documents.
//!
//! - **document**: a single parsed unit and its node arena.
//! - **node**: borrowed read (`Node`) and write (`NodeMut`) views onto a node.
//! - **set**: the `DocumentSet` shared by every reference and scan.
//! - **spec**: owned, serde-friendly node trees used to build and edit documents.
//!
//! Nodes are addressed by `NodeId` handles. A handle is only valid while the
//! node is attached to the *current* generation of its document: removing the
//! node or replacing the document (re-parse) invalidates it. Long-lived
//! handles should be wrapped in a [`crate::reference::NodeReference`].

mod document;
mod node;
mod set;
mod spec;

pub use document::Document;
pub use node::{Node, NodeMut};
pub use set::DocumentSet;
pub use spec::{DocumentSpec, NodeSpec};

use crate::error::AppResult;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Stable textual identifier of a document (its location).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DocumentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The syntactic kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// The root of a document.
    #[display("document")]
    Document,
    /// A named container of members and operations.
    #[display("interface")]
    Interface,
    /// A named alias for a type expression (its first child).
    #[display("typeAlias")]
    TypeAlias,
    /// An enumeration declaration.
    #[display("enum")]
    Enum,
    /// A member of an enumeration.
    #[display("enumMember")]
    EnumMember,
    /// An operation (method) inside an interface.
    #[display("operation")]
    Operation,
    /// A named member; may carry a scalar `value` and nested children.
    #[display("member")]
    Member,
    /// A literal scalar.
    #[display("literal")]
    Literal,
    /// An unnamed grouping (union, tuple, list).
    #[display("container")]
    Container,
    /// A reference expression; `value` names the referenced type, children are arguments.
    #[display("reference")]
    Reference,
}

impl NodeKind {
    /// Returns `true` for kinds that introduce a named declaration.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::Interface | NodeKind::TypeAlias | NodeKind::Enum
        )
    }
}

/// Handle to a node within a specific generation of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) document: DocumentId,
    pub(crate) generation: u64,
    pub(crate) slot: usize,
    pub(crate) stamp: u32,
}

impl NodeId {
    /// The owning document.
    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    /// The document generation this handle was taken from.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Read access to a set of parsed documents.
///
/// This is the collaborator seam consumed by address resolution, alias
/// resolution and protocol scans.
pub trait DocumentSource {
    /// All documents, in set order.
    fn documents(&self) -> impl Iterator<Item = &Document> + '_;

    /// Looks up a document by identifier.
    fn document(&self, id: &str) -> Option<&Document>;

    /// Looks up a node by handle, returning `None` if the handle is stale.
    fn node(&self, id: &NodeId) -> Option<Node<'_>> {
        self.document(id.document.as_str())?.node(id)
    }
}

/// Reads tag annotations attached to a node.
pub trait TagReader {
    /// Returns `true` if the node carries `tag` (with or without values).
    fn has_tag(&self, tag: &str) -> bool;

    /// Returns the values recorded for `tag`, empty if absent.
    fn tag_values(&self, tag: &str) -> &[String];
}

/// Re-acquires a document by identifier (re-parse).
pub trait DocumentLoader {
    /// Loads a fresh copy of the document named `id`.
    fn load(&self, id: &str) -> AppResult<Document>;
}

impl<F> DocumentLoader for F
where
    F: Fn(&str) -> AppResult<Document>,
{
    fn load(&self, id: &str) -> AppResult<Document> {
        self(id)
    }
}
