#![deny(missing_docs)]

//! # ADL Core
//!
//! Semantic model of API descriptions layered over parsed document trees,
//! with node references that survive edits and re-parses.

/// Shared error types.
pub mod error;

/// Documents, node views and the document set.
pub mod tree;

/// Structural node addresses.
pub mod address;

/// Self-healing node references.
pub mod reference;

/// Address-identified declarations.
pub mod declaration;

/// Inline-or-named indirection.
pub mod alias;

/// Authentication, connection and HTTP entities.
pub mod model;

/// Declaration scans and the HTTP protocol.
pub mod protocol;

/// YAML / JSON document loading.
pub mod source;

pub use address::{compute_address, resolve, LocatorKey, PathAddress};
pub use alias::{resolve_alias, resolve_declaration, Alias, Declared};
pub use declaration::{Declaration, FromNode};
pub use error::{AppError, AppResult};
pub use model::{
    authorizes, Authentication, AuthenticationReference, AuthenticationRequirement, Connection,
    ConnectionVariable, Credentials, Element, ModelElement, OAuth2Flow, OAuth2Grant, OperationGroup,
    ParamSource, Parameter,
};
pub use protocol::{HttpProtocol, PredicateRegistry, Protocol, ProtocolModel};
pub use reference::NodeReference;
pub use source::{load_file, parse_document, parse_document_json, parse_document_yaml, to_yaml, TextSource};
pub use tree::{
    Document, DocumentId, DocumentLoader, DocumentSet, DocumentSource, DocumentSpec, Node, NodeId,
    NodeKind, NodeMut, NodeSpec, TagReader,
};
