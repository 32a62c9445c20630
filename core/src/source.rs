#![deny(missing_docs)]

//! # Document Source
//!
//! Reads declarative document descriptions (YAML or JSON) into documents:
//!
//! ```yaml
//! id: pets.yaml
//! declarations:
//!   - kind: interface
//!     name: Pets
//!     children:
//!       - { kind: operation, name: listPets }
//! ```
//!
//! The format is picked from the identifier's extension (`.json` is JSON,
//! anything else YAML).

use crate::error::{AppError, AppResult};
use crate::tree::{Document, DocumentLoader, DocumentSpec};
use indexmap::IndexMap;
use std::path::Path;
use tracing::debug;

/// Parses a YAML document description.
pub fn parse_document_yaml(yaml: &str) -> AppResult<Document> {
    let spec: DocumentSpec = serde_yaml::from_str(yaml)
        .map_err(|e| AppError::General(format!("Failed to parse document YAML: {}", e)))?;
    Ok(Document::from_spec(&spec))
}

/// Parses a JSON document description.
pub fn parse_document_json(json: &str) -> AppResult<Document> {
    let spec: DocumentSpec = serde_json::from_str(json)
        .map_err(|e| AppError::General(format!("Failed to parse document JSON: {}", e)))?;
    Ok(Document::from_spec(&spec))
}

/// Parses `text` as the document `id`, choosing the format by extension.
///
/// The identifier always wins over an `id` written in the text.
pub fn parse_document(id: &str, text: &str) -> AppResult<Document> {
    let mut spec: DocumentSpec = if is_json(id) {
        serde_json::from_str(text)
            .map_err(|e| AppError::General(format!("Failed to parse '{}' as JSON: {}", id, e)))?
    } else {
        serde_yaml::from_str(text)
            .map_err(|e| AppError::General(format!("Failed to parse '{}' as YAML: {}", id, e)))?
    };
    spec.id = id.to_string();
    debug!(document = id, declarations = spec.declarations.len(), "parsed document");
    Ok(Document::from_spec(&spec))
}

/// Reads and parses the file at `path`, using the path as identifier.
pub fn load_file(path: &Path) -> AppResult<Document> {
    let text = std::fs::read_to_string(path)?;
    parse_document(&path.to_string_lossy(), &text)
}

/// Serializes a document's current tree as YAML.
pub fn to_yaml(document: &Document) -> AppResult<String> {
    serde_yaml::to_string(&document.to_spec())
        .map_err(|e| AppError::General(format!("Failed to serialize document YAML: {}", e)))
}

fn is_json(id: &str) -> bool {
    Path::new(id)
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

/// In-memory texts keyed by document identifier.
///
/// Acts as the re-parse source for [`crate::tree::DocumentSet::reload`].
#[derive(Debug, Clone, Default)]
pub struct TextSource {
    texts: IndexMap<String, String>,
}

impl TextSource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) the text of `id`.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(id.into(), text.into());
    }

    /// The stored text of `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    /// Parses every stored text.
    pub fn documents(&self) -> AppResult<Vec<Document>> {
        self.texts
            .iter()
            .map(|(id, text)| parse_document(id, text))
            .collect()
    }
}

impl DocumentLoader for TextSource {
    fn load(&self, id: &str) -> AppResult<Document> {
        let text = self
            .get(id)
            .ok_or_else(|| AppError::DocumentNotFound(id.to_string()))?;
        parse_document(id, text)
    }
}
