#![deny(missing_docs)]

//! # Declarations
//!
//! `Declaration<T>` binds a node to a semantic view type `T`. The view is
//! rebuilt from the live node on every `value` call, so edits are always
//! observed. Two declarations are equal when their addresses are equal,
//! which lets scans be de-duplicated and diffed.

use crate::address::PathAddress;
use crate::error::AppResult;
use crate::reference::NodeReference;
use crate::tree::{DocumentSource, Node};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Builds a semantic view from a node.
pub trait FromNode: Sized {
    /// Reads the view from the node's current content.
    fn from_node(node: Node<'_>) -> AppResult<Self>;
}

/// Constructor used to derive a view from a node.
pub type ViewConstructor<T> = for<'a> fn(Node<'a>) -> AppResult<T>;

/// An address-identified binding between a node and a view type.
pub struct Declaration<T> {
    reference: NodeReference,
    view: ViewConstructor<T>,
}

impl<T> Declaration<T> {
    /// Binds `node` to an explicit view constructor.
    pub fn new(node: Node<'_>, view: ViewConstructor<T>) -> Self {
        Self {
            reference: NodeReference::new(node),
            view,
        }
    }

    /// The declaration's identity.
    pub fn address(&self) -> &PathAddress {
        self.reference.address()
    }

    /// The underlying self-healing reference.
    pub fn reference(&self) -> &NodeReference {
        &self.reference
    }

    /// The live node, healed if necessary.
    pub fn node<'s, S: DocumentSource>(&self, documents: &'s S) -> AppResult<Node<'s>> {
        self.reference.get(documents)
    }

    /// Derives a fresh view from the live node.
    pub fn value<S: DocumentSource>(&self, documents: &S) -> AppResult<T> {
        let node = self.reference.get(documents)?;
        (self.view)(node)
    }
}

impl<T: FromNode> Declaration<T> {
    /// Binds `node` using `T`'s own constructor.
    pub fn wrap(node: Node<'_>) -> Self {
        Self::new(node, T::from_node)
    }
}

impl<T> Clone for Declaration<T> {
    fn clone(&self) -> Self {
        Self {
            reference: self.reference.clone(),
            view: self.view,
        }
    }
}

impl<T> PartialEq for Declaration<T> {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl<T> Eq for Declaration<T> {}

impl<T> Hash for Declaration<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl<T> fmt::Debug for Declaration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Declaration").field(self.address()).finish()
    }
}
