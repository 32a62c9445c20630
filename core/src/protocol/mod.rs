#![deny(missing_docs)]

//! # Protocol Model
//!
//! The query facade over a document set. Collections (operation groups,
//! responses, parameters, ...) are derived on every call by scanning the
//! top-level declarations of every document against the predicates
//! registered for a semantic kind. Nothing is cached: results always reflect
//! the current documents, in document order then declaration order.
//!
//! Protocols plug in extra shapes through [`Protocol::register_predicates`].

pub mod http;
pub mod predicates;

pub use http::HttpProtocol;
pub use predicates::PredicateRegistry;

use crate::declaration::{Declaration, FromNode};
use crate::tree::{DocumentSource, Node};
use tracing::debug;

/// A protocol binding that contributes declaration shapes.
pub trait Protocol {
    /// Protocol name, e.g. `http`.
    fn name(&self) -> &'static str;

    /// Registers the protocol's predicates.
    fn register_predicates(&self, registry: &mut PredicateRegistry);
}

/// Scans documents for declarations of registered kinds.
#[derive(Debug)]
pub struct ProtocolModel {
    predicates: PredicateRegistry,
}

impl Default for ProtocolModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolModel {
    /// A model with the protocol-independent shapes registered.
    pub fn new() -> Self {
        Self {
            predicates: PredicateRegistry::general(),
        }
    }

    /// Adds a protocol's shapes.
    pub fn with_protocol(mut self, protocol: &impl Protocol) -> Self {
        debug!(protocol = protocol.name(), "registering protocol predicates");
        protocol.register_predicates(&mut self.predicates);
        self
    }

    /// The predicate registry.
    pub fn predicates(&self) -> &PredicateRegistry {
        &self.predicates
    }

    /// The predicate registry, for registering further shapes.
    pub fn predicates_mut(&mut self) -> &mut PredicateRegistry {
        &mut self.predicates
    }

    /// Top-level declarations matching any of `kinds`, in document order.
    pub fn scan<'s, S: DocumentSource>(&self, documents: &'s S, kinds: &[&str]) -> Vec<Node<'s>> {
        let found: Vec<Node<'s>> = documents
            .documents()
            .flat_map(|document| document.declarations())
            .filter(|node| kinds.iter().any(|kind| self.predicates.matches(kind, *node)))
            .collect();
        debug!(kinds = ?kinds, found = found.len(), "scanned declarations");
        found
    }

    /// Declarations of `kind` bound to the view `T`.
    pub fn declarations<T: FromNode, S: DocumentSource>(
        &self,
        documents: &S,
        kind: &str,
    ) -> Vec<Declaration<T>> {
        self.declarations_any(documents, &[kind])
    }

    /// Declarations matching any of `kinds` bound to the view `T`.
    pub fn declarations_any<T: FromNode, S: DocumentSource>(
        &self,
        documents: &S,
        kinds: &[&str],
    ) -> Vec<Declaration<T>> {
        self.scan(documents, kinds)
            .into_iter()
            .map(Declaration::wrap)
            .collect()
    }
}
