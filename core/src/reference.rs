#![deny(missing_docs)]

//! # Self-Healing References
//!
//! A `NodeReference` is a long-lived handle into a document set. It caches a
//! `NodeId` and, on every access, checks that the cached node is still live.
//! When an edit or re-parse has invalidated it, the reference re-resolves its
//! captured `PathAddress` once and caches the result.
//!
//! Access is explicit: `get` for reads, `with_mut` for writes. The document
//! set is always passed in by the caller.

use crate::address::{compute_address, resolve, PathAddress};
use crate::error::{AppError, AppResult};
use crate::tree::{DocumentSet, DocumentSource, Node, NodeId, NodeKind, NodeMut};
use std::cell::RefCell;
use tracing::{debug, warn};

/// A node handle that survives structural edits.
#[derive(Debug, Clone)]
pub struct NodeReference {
    address: PathAddress,
    kind: NodeKind,
    current: RefCell<NodeId>,
}

impl NodeReference {
    /// Wraps a live node, capturing its address.
    pub fn new(node: Node<'_>) -> Self {
        Self {
            address: compute_address(node),
            kind: node.kind(),
            current: RefCell::new(node.id()),
        }
    }

    /// Resolves `address` now and wraps the result.
    pub fn from_address<S: DocumentSource>(address: PathAddress, documents: &S) -> AppResult<Self> {
        let node = resolve(&address, documents)?;
        Ok(Self {
            kind: node.kind(),
            current: RefCell::new(node.id()),
            address,
        })
    }

    /// The address captured at construction.
    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    /// The kind of the referenced node.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns `true` if the cached node is still live (no healing needed).
    pub fn is_live<S: DocumentSource>(&self, documents: &S) -> bool {
        documents.node(&self.current.borrow()).is_some()
    }

    /// Returns the live node, re-resolving once if the cached one was invalidated.
    ///
    /// # Errors
    ///
    /// `ReferenceLost` if the node was invalidated and its address no longer
    /// resolves to a node of the same kind.
    pub fn get<'s, S: DocumentSource>(&self, documents: &'s S) -> AppResult<Node<'s>> {
        if let Some(node) = documents.node(&self.current.borrow()) {
            return Ok(node);
        }
        self.heal(documents)
    }

    /// Runs `edit` against the live node.
    pub fn with_mut<R>(
        &self,
        documents: &mut DocumentSet,
        edit: impl FnOnce(NodeMut<'_>) -> R,
    ) -> AppResult<R> {
        let id = self.get(&*documents)?.id();
        let node = documents.node_mut(&id).ok_or_else(|| self.lost("node vanished"))?;
        Ok(edit(node))
    }

    fn heal<'s, S: DocumentSource>(&self, documents: &'s S) -> AppResult<Node<'s>> {
        debug!(address = %self.address, "cached node invalidated, re-resolving");
        let node = resolve(&self.address, documents).map_err(|err| {
            warn!(address = %self.address, error = %err, "reference lost");
            self.lost(&err.to_string())
        })?;

        if node.kind() != self.kind {
            warn!(
                address = %self.address,
                expected = %self.kind,
                found = %node.kind(),
                "reference lost"
            );
            return Err(self.lost(&format!(
                "address now names a {} instead of a {}",
                node.kind(),
                self.kind
            )));
        }

        *self.current.borrow_mut() = node.id();
        Ok(node)
    }

    fn lost(&self, reason: &str) -> AppError {
        AppError::ReferenceLost {
            address: self.address.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl PartialEq for NodeReference {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for NodeReference {}
