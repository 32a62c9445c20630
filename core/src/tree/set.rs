//! The document set shared by every reference, alias and scan.

use super::{Document, DocumentId, DocumentLoader, DocumentSource, Node, NodeId, NodeMut};
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use tracing::debug;

/// An ordered collection of documents keyed by identifier.
///
/// Every insertion stamps the document with a fresh generation, so replacing
/// a document (re-parse) invalidates all handles into its previous tree.
#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: IndexMap<DocumentId, Document>,
    next_generation: u64,
}

impl DocumentSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or wholesale-replaces a document, returning the replaced one.
    ///
    /// A replaced document keeps its position in the set order.
    pub fn insert(&mut self, mut document: Document) -> Option<Document> {
        self.next_generation += 1;
        document.set_generation(self.next_generation);
        debug!(
            document = %document.id(),
            generation = self.next_generation,
            "document inserted"
        );
        self.documents.insert(document.id().clone(), document)
    }

    /// Removes a document, preserving the order of the others.
    pub fn remove(&mut self, id: &str) -> Option<Document> {
        self.documents.shift_remove(id)
    }

    /// Re-acquires the document `id` through `loader` and replaces it.
    pub fn reload(&mut self, id: &str, loader: &impl DocumentLoader) -> AppResult<()> {
        let document = loader.load(id)?;
        if document.id().as_str() != id {
            return Err(AppError::General(format!(
                "Loader returned document '{}' when asked for '{}'",
                document.id(),
                id
            )));
        }
        debug!(document = id, "document re-parsed");
        self.insert(document);
        Ok(())
    }

    /// Mutable access to a document.
    pub fn document_mut(&mut self, id: &str) -> Option<&mut Document> {
        self.documents.get_mut(id)
    }

    /// Mutable access to a node, `None` if the handle is stale.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<NodeMut<'_>> {
        self.documents
            .get_mut(id.document.as_str())?
            .node_mut(id)
    }

    /// Returns `true` if the handle points at a live node of a current document.
    pub fn is_valid(&self, id: &NodeId) -> bool {
        self.documents
            .get(id.document.as_str())
            .is_some_and(|document| document.is_valid(id))
    }

    /// Document identifiers in set order.
    pub fn ids(&self) -> impl Iterator<Item = &DocumentId> + '_ {
        self.documents.keys()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the set holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for DocumentSet {
    fn documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.documents.values()
    }

    fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    fn node(&self, id: &NodeId) -> Option<Node<'_>> {
        self.documents.get(id.document.as_str())?.node(id)
    }
}

impl FromIterator<Document> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut set = Self::new();
        for document in iter {
            set.insert(document);
        }
        set
    }
}
