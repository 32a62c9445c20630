//! Borrowed views onto a node.

use super::document::{Document, Slot};
use super::spec::NodeSpec;
use super::{NodeId, NodeKind, TagReader};
use std::fmt;

/// Read-only view of a live node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    document: &'a Document,
    slot: usize,
}

impl<'a> Node<'a> {
    pub(crate) fn new(document: &'a Document, slot: usize) -> Self {
        Self { document, slot }
    }

    fn data(&self) -> &'a Slot {
        self.document.slot(self.slot)
    }

    /// Handle for this node in the current document generation.
    pub fn id(&self) -> NodeId {
        self.document.id_of(self.slot)
    }

    /// The owning document.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// Verbatim name.
    pub fn name(&self) -> Option<&'a str> {
        self.data().name.as_deref()
    }

    /// Verbatim value.
    pub fn value(&self) -> Option<&'a str> {
        self.data().value.as_deref()
    }

    /// Returns `true` for the document root.
    pub fn is_root(&self) -> bool {
        self.data().parent.is_none()
    }

    /// The parent node, `None` for the root.
    pub fn parent(&self) -> Option<Node<'a>> {
        self.data()
            .parent
            .map(|parent| Node::new(self.document, parent))
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// Direct children in order.
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let document = self.document;
        self.data()
            .children
            .iter()
            .map(move |&slot| Node::new(document, slot))
    }

    /// The child at `index`.
    pub fn child(&self, index: usize) -> Option<Node<'a>> {
        self.data()
            .children
            .get(index)
            .map(|&slot| Node::new(self.document, slot))
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    /// Position among the parent's children, `None` for the root.
    pub fn child_index(&self) -> Option<usize> {
        let parent = self.data().parent?;
        Some(self.document.position(parent, self.slot))
    }

    /// This node followed by all descendants, in document order.
    pub fn walk(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let mut pending = vec![*self];
        std::iter::from_fn(move || {
            let node = pending.pop()?;
            let children: Vec<Node<'a>> = node.children().collect();
            pending.extend(children.into_iter().rev());
            Some(node)
        })
    }

    /// The first `Member` child named `name`.
    pub fn member(&self, name: &str) -> Option<Node<'a>> {
        self.children()
            .find(|child| child.kind() == NodeKind::Member && child.name() == Some(name))
    }

    /// The value of the first `Member` child named `name`.
    pub fn member_value(&self, name: &str) -> Option<&'a str> {
        self.member(name).and_then(|member| member.value())
    }

    /// All tags with their values.
    pub fn tags(&self) -> impl Iterator<Item = (&'a str, &'a [String])> + 'a {
        self.data()
            .tags
            .iter()
            .map(|(tag, values)| (tag.as_str(), values.as_slice()))
    }
}

impl TagReader for Node<'_> {
    fn has_tag(&self, tag: &str) -> bool {
        self.data().tags.contains_key(tag)
    }

    fn tag_values(&self, tag: &str) -> &[String] {
        self.data()
            .tags
            .get(tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.document, other.document) && self.slot == other.slot
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("document", self.document.id())
            .field("slot", &self.slot)
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

/// Mutable view of a live node.
pub struct NodeMut<'a> {
    document: &'a mut Document,
    slot: usize,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(document: &'a mut Document, slot: usize) -> Self {
        Self { document, slot }
    }

    /// Handle for this node.
    pub fn id(&self) -> NodeId {
        self.document.id_of(self.slot)
    }

    /// Read-only view of the same node.
    pub fn as_node(&self) -> Node<'_> {
        Node::new(&*self.document, self.slot)
    }

    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        self.document.slot(self.slot).kind
    }

    /// Replaces the name.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.document.slot_mut(self.slot).name = Some(name.into());
    }

    /// Replaces the value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.document.slot_mut(self.slot).value = Some(value.into());
    }

    /// Removes the value.
    pub fn clear_value(&mut self) {
        self.document.slot_mut(self.slot).value = None;
    }

    /// Appends a value to `tag`, creating the tag if needed.
    pub fn add_tag(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.document
            .slot_mut(self.slot)
            .tags
            .entry(tag.into())
            .or_default()
            .push(value.into());
    }

    /// Replaces every value of `tag`.
    pub fn set_tag(&mut self, tag: impl Into<String>, values: Vec<String>) {
        self.document
            .slot_mut(self.slot)
            .tags
            .insert(tag.into(), values);
    }

    /// Removes `tag`, returning `true` if it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.document
            .slot_mut(self.slot)
            .tags
            .shift_remove(tag)
            .is_some()
    }

    /// Appends a child subtree.
    pub fn append_child(&mut self, spec: &NodeSpec) -> NodeId {
        let slot = self.document.attach(self.slot, None, spec);
        self.document.id_of(slot)
    }

    /// Inserts a child subtree at `index` (clamped to the end).
    pub fn insert_child(&mut self, index: usize, spec: &NodeSpec) -> NodeId {
        let slot = self.document.attach(self.slot, Some(index), spec);
        self.document.id_of(slot)
    }

    /// Sets the value of the `Member` child named `name`, appending one if missing.
    pub fn set_member_value(&mut self, name: &str, value: impl Into<String>) -> NodeId {
        let existing = self.as_node().member(name).map(|member| member.slot);
        match existing {
            Some(slot) => {
                self.document.slot_mut(slot).value = Some(value.into());
                self.document.id_of(slot)
            }
            None => self.append_child(&NodeSpec::field(name, value)),
        }
    }
}

impl TagReader for NodeMut<'_> {
    fn has_tag(&self, tag: &str) -> bool {
        self.document.slot(self.slot).tags.contains_key(tag)
    }

    fn tag_values(&self, tag: &str) -> &[String] {
        self.document
            .slot(self.slot)
            .tags
            .get(tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DocumentSpec;
    use pretty_assertions::assert_eq;

    fn document() -> Document {
        Document::from_spec(
            &DocumentSpec::new("auth.yaml").declaration(
                NodeSpec::interface("apiKey")
                    .tagged("authentication", "apikey")
                    .child(NodeSpec::field("parameterName", "X-Key"))
                    .child(NodeSpec::field("in", "header")),
            ),
        )
    }

    #[test]
    fn test_walk_is_document_order() {
        let document = document();
        let kinds: Vec<_> = document
            .nodes()
            .map(|n| n.name().unwrap_or("<root>"))
            .collect();
        assert_eq!(kinds, vec!["<root>", "apiKey", "parameterName", "in"]);
    }

    #[test]
    fn test_member_lookup_and_tags() {
        let document = document();
        let auth = document.declarations().next().unwrap();
        assert_eq!(auth.member_value("in"), Some("header"));
        assert!(auth.has_tag("authentication"));
        assert_eq!(auth.tag_values("authentication"), ["apikey".to_string()]);
        assert!(auth.tag_values("missing").is_empty());
        assert_eq!(auth.child(1).unwrap().child_index(), Some(1));
        assert_eq!(auth.child(1).unwrap().ancestors().count(), 2);
    }

    #[test]
    fn test_node_mut_edits() {
        let mut document = document();
        let id = document.declarations().next().unwrap().id();
        let mut auth = document.node_mut(&id).unwrap();
        auth.set_member_value("in", "query");
        auth.set_member_value("description", "Key auth");
        auth.add_tag("x-internal", "true");
        assert!(auth.remove_tag("authentication"));

        let auth = document.node(&id).unwrap();
        assert_eq!(auth.member_value("in"), Some("query"));
        assert_eq!(auth.member_value("description"), Some("Key auth"));
        assert!(!auth.has_tag("authentication"));
        assert_eq!(auth.child_count(), 3);
    }
}
