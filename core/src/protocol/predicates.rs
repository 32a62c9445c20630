#![deny(missing_docs)]

//! # Shape Predicates
//!
//! Structural tests deciding which semantic kind a top-level declaration
//! belongs to, and the registry that keys them by kind name.

use crate::model::ParamSource;
use crate::tree::{Node, NodeKind, TagReader};
use indexmap::IndexMap;
use std::fmt;

/// Registry key for operation groups.
pub const OPERATION_GROUP: &str = "operationGroup";
/// Registry key for response collections.
pub const RESPONSE_COLLECTION: &str = "responseCollection";
/// Registry key for responses.
pub const RESPONSE: &str = "response";
/// Registry key for results.
pub const RESULT: &str = "result";
/// Registry key for headers.
pub const HEADER: &str = "header";
/// Registry key for authentications.
pub const AUTHENTICATION: &str = "authentication";
/// Registry key for authentication requirements.
pub const REQUIREMENT: &str = "requirement";
/// Registry key for connections.
pub const CONNECTION: &str = "connection";

/// Registry key for parameters carried in `source`.
pub fn parameter_key(source: ParamSource) -> String {
    format!("parameter:{}", source)
}

/// `Interface` declaring at least one `Operation`.
pub fn is_operation_group(node: Node<'_>) -> bool {
    node.kind() == NodeKind::Interface
        && node.children().any(|child| child.kind() == NodeKind::Operation)
}

/// `TypeAlias` of `Response<...>`.
pub fn is_response(node: Node<'_>) -> bool {
    crate::model::aliased_reference(node, "Response").is_some()
}

/// `TypeAlias` of a non-empty union whose members all reference `Response`.
pub fn is_response_collection(node: Node<'_>) -> bool {
    if node.kind() != NodeKind::TypeAlias {
        return false;
    }
    match node.child(0) {
        Some(union) if union.kind() == NodeKind::Container && union.child_count() > 0 => {
            union.children().all(|member| {
                member.kind() == NodeKind::Reference && member.value() == Some("Response")
            })
        }
        _ => false,
    }
}

/// `TypeAlias` of `Result<...>`, or an `Interface` tagged `result`.
pub fn is_result(node: Node<'_>) -> bool {
    crate::model::aliased_reference(node, "Result").is_some()
        || (node.kind() == NodeKind::Interface && node.has_tag("result"))
}

/// Any declaration tagged `header`.
pub fn is_header(node: Node<'_>) -> bool {
    node.has_tag("header")
}

type Predicate = Box<dyn Fn(Node<'_>) -> bool>;

/// Predicates keyed by semantic kind; several predicates per kind are OR-ed.
#[derive(Default)]
pub struct PredicateRegistry {
    predicates: IndexMap<String, Vec<Predicate>>,
}

impl PredicateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the protocol-independent shapes: operation groups,
    /// responses, response collections, results and parameters.
    pub fn general() -> Self {
        let mut registry = Self::new();
        registry.register(OPERATION_GROUP, is_operation_group);
        registry.register(RESPONSE_COLLECTION, is_response_collection);
        registry.register(RESPONSE, is_response);
        registry.register(RESULT, is_result);
        for source in ParamSource::ALL {
            registry.register(parameter_key(source), move |node| {
                ParamSource::of(node) == Some(source)
            });
        }
        registry
    }

    /// Adds a predicate for `kind`.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        predicate: impl Fn(Node<'_>) -> bool + 'static,
    ) {
        self.predicates
            .entry(kind.into())
            .or_default()
            .push(Box::new(predicate));
    }

    /// Returns `true` if any predicate is registered for `kind`.
    pub fn is_registered(&self, kind: &str) -> bool {
        self.predicates.contains_key(kind)
    }

    /// Returns `true` if any predicate registered for `kind` accepts `node`.
    pub fn matches(&self, kind: &str, node: Node<'_>) -> bool {
        self.predicates
            .get(kind)
            .is_some_and(|predicates| predicates.iter().any(|predicate| predicate(node)))
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.predicates.keys().map(String::as_str)
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.predicates
                    .iter()
                    .map(|(kind, predicates)| (kind, predicates.len())),
            )
            .finish()
    }
}
