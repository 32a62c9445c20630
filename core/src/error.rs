//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every resolution failure has its own variant so callers (generators, linters)
//! can decide per item whether a failure is fatal or a skip-and-report.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// An address named a document that is not part of the document set.
    #[from(ignore)]
    #[display("Document not found: '{_0}'")]
    DocumentNotFound(String),

    /// A locator key in the address matched no child node.
    #[from(ignore)]
    #[display("Address '{address}' is unresolvable at segment {segment}")]
    AddressUnresolvable {
        /// Rendered address.
        address: String,
        /// Index of the first segment without a match (0 is the document).
        segment: usize,
    },

    /// A self-healing reference was invalidated and could not be re-resolved.
    #[from(ignore)]
    #[display("Reference to '{address}' lost: {reason}")]
    ReferenceLost {
        /// Rendered address captured by the reference.
        address: String,
        /// Why re-resolution failed.
        reason: String,
    },

    /// A named alias matched no top-level declaration.
    #[from(ignore)]
    #[display("Unresolved {kind} alias '{name}'")]
    UnresolvedAlias {
        /// Declaration kind searched for.
        kind: &'static str,
        /// The identifier being resolved.
        name: String,
    },

    /// A named alias matched more than one top-level declaration.
    #[from(ignore)]
    #[display("Ambiguous {kind} alias '{name}': {count} declarations share this name")]
    AmbiguousAlias {
        /// Declaration kind searched for.
        kind: &'static str,
        /// The identifier being resolved.
        name: String,
        /// Number of matching declarations.
        count: usize,
    },

    /// The operation has no reification strategy yet.
    #[from(ignore)]
    #[display("Not implemented: {_0}")]
    NotImplemented(String),

    /// A node handle that is no longer attached to its document was used directly.
    #[from(ignore)]
    #[display("Invalid node: {_0}")]
    InvalidNode(String),

    /// A node matched a declaration shape but lacks data the view requires.
    #[from(ignore)]
    #[display("Invalid declaration at '{declaration}': {reason}")]
    InvalidDeclaration {
        /// Rendered address of the offending node.
        declaration: String,
        /// What is missing or malformed.
        reason: String,
    },

    /// Model-level validation failure (e.g. scopes on a non-OAuth2 reference).
    #[from(ignore)]
    #[display("Validation Error: {_0}")]
    Validation(String),

    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
