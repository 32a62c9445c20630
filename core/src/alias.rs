#![deny(missing_docs)]

//! # Alias Indirection
//!
//! Model fields that may either embed a definition or point at a top-level
//! declaration by name (e.g. an authentication requirement naming a globally
//! declared authentication scheme).
//!
//! Named aliases are resolved lazily on each access against the document set
//! passed in, so edits to the target declaration are always observed.
//! Ambiguity is a hard failure: a name shared by two top-level declarations
//! of the same kind never resolves.

use crate::declaration::{Declaration, FromNode};
use crate::error::{AppError, AppResult};
use crate::tree::{DocumentSource, Node};
use std::borrow::Cow;
use tracing::trace;

/// A view type that can be declared at the top level of a document.
pub trait Declared: FromNode {
    /// Human-readable kind name used in errors.
    const KIND: &'static str;

    /// Returns `true` if `node` declares a `Self`.
    fn is_declaration(node: Node<'_>) -> bool;
}

/// Either an inline value or a named reference to a top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Alias<T> {
    /// The value is embedded here.
    Inline(T),
    /// The value is declared elsewhere under this name.
    Named(String),
}

impl<T> Alias<T> {
    /// A named reference.
    pub fn named(name: impl Into<String>) -> Self {
        Alias::Named(name.into())
    }

    /// The referenced name, `None` for inline values.
    pub fn name(&self) -> Option<&str> {
        match self {
            Alias::Inline(_) => None,
            Alias::Named(name) => Some(name),
        }
    }

    /// Returns `true` for inline values.
    pub fn is_inline(&self) -> bool {
        matches!(self, Alias::Inline(_))
    }
}

impl<T> From<T> for Alias<T> {
    fn from(value: T) -> Self {
        Alias::Inline(value)
    }
}

impl<T: Declared + Clone> Alias<T> {
    /// Resolves to the inline value or a fresh view of the named declaration.
    pub fn resolve<S: DocumentSource>(&self, documents: &S) -> AppResult<Cow<'_, T>> {
        match self {
            Alias::Inline(value) => Ok(Cow::Borrowed(value)),
            Alias::Named(name) => resolve_alias::<T, S>(name, documents).map(Cow::Owned),
        }
    }
}

/// Resolves `name` among the top-level declarations of kind `T`.
///
/// # Errors
///
/// * `UnresolvedAlias` if no declaration matches.
/// * `AmbiguousAlias` if more than one does.
pub fn resolve_alias<T: Declared, S: DocumentSource>(name: &str, documents: &S) -> AppResult<T> {
    T::from_node(find_declaration::<T, S>(name, documents)?)
}

/// Like [`resolve_alias`], but returns the address-identified declaration.
pub fn resolve_declaration<T: Declared, S: DocumentSource>(
    name: &str,
    documents: &S,
) -> AppResult<Declaration<T>> {
    find_declaration::<T, S>(name, documents).map(Declaration::wrap)
}

/// All top-level declarations of kind `T` named `name`, in document order.
pub fn candidates<'s, T: Declared, S: DocumentSource>(
    name: &str,
    documents: &'s S,
) -> Vec<Node<'s>> {
    documents
        .documents()
        .flat_map(|document| document.declarations())
        .filter(|node| node.name() == Some(name) && T::is_declaration(*node))
        .collect()
}

fn find_declaration<'s, T: Declared, S: DocumentSource>(
    name: &str,
    documents: &'s S,
) -> AppResult<Node<'s>> {
    let matches = candidates::<T, S>(name, documents);
    trace!(kind = T::KIND, name, matches = matches.len(), "resolving alias");
    match matches.as_slice() {
        [] => Err(AppError::UnresolvedAlias {
            kind: T::KIND,
            name: name.to_string(),
        }),
        [node] => Ok(*node),
        many => Err(AppError::AmbiguousAlias {
            kind: T::KIND,
            name: name.to_string(),
            count: many.len(),
        }),
    }
}
