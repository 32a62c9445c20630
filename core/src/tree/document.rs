//! A single parsed document and its node arena.

use super::node::{Node, NodeMut};
use super::spec::{DocumentSpec, NodeSpec};
use super::{DocumentId, NodeId, NodeKind};
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;

pub(crate) const ROOT: usize = 0;

/// Storage for one node. Freed slots are reused with a bumped `stamp`.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) kind: NodeKind,
    pub(crate) name: Option<String>,
    pub(crate) value: Option<String>,
    pub(crate) tags: IndexMap<String, Vec<String>>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) stamp: u32,
    pub(crate) live: bool,
}

impl Slot {
    fn from_spec(spec: &NodeSpec, parent: Option<usize>) -> Self {
        Self {
            kind: spec.kind,
            name: spec.name.clone(),
            value: spec.value.clone(),
            tags: spec.tags.clone(),
            parent,
            children: Vec::new(),
            stamp: 0,
            live: true,
        }
    }
}

/// A parsed unit holding a tree of nodes.
///
/// Documents are owned by a [`super::DocumentSet`], which assigns a fresh
/// generation every time a document is inserted or replaced.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    generation: u64,
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Document {
    /// Creates a document containing only its root.
    pub fn new(id: impl Into<DocumentId>) -> Self {
        Self {
            id: id.into(),
            generation: 0,
            slots: vec![Slot::from_spec(&NodeSpec::new(NodeKind::Document), None)],
            free: Vec::new(),
        }
    }

    /// Builds a document from an owned spec.
    pub fn from_spec(spec: &DocumentSpec) -> Self {
        let mut document = Self::new(spec.id.as_str());
        for declaration in &spec.declarations {
            document.attach(ROOT, None, declaration);
        }
        document
    }

    /// Converts the current tree back into an owned spec.
    pub fn to_spec(&self) -> DocumentSpec {
        DocumentSpec {
            id: self.id.to_string(),
            declarations: self.slots[ROOT]
                .children
                .iter()
                .map(|&slot| self.spec_of(slot))
                .collect(),
        }
    }

    /// The document identifier.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// The generation assigned by the owning set (0 when standalone).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// The root node.
    pub fn root(&self) -> Node<'_> {
        Node::new(self, ROOT)
    }

    /// Mutable access to the root node.
    pub fn root_mut(&mut self) -> NodeMut<'_> {
        NodeMut::new(self, ROOT)
    }

    /// Top-level declarations in document order.
    pub fn declarations(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.root().children()
    }

    /// Every node (root included) in document order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.root().walk()
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.live).count()
    }

    /// Returns `true` if `id` points at a live node of this document generation.
    pub fn is_valid(&self, id: &NodeId) -> bool {
        id.document == self.id
            && id.generation == self.generation
            && self
                .slots
                .get(id.slot)
                .is_some_and(|slot| slot.live && slot.stamp == id.stamp)
    }

    /// Looks up a node, returning `None` if the handle is stale.
    pub fn node(&self, id: &NodeId) -> Option<Node<'_>> {
        self.is_valid(id).then(|| Node::new(self, id.slot))
    }

    /// Mutable lookup, returning `None` if the handle is stale.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<NodeMut<'_>> {
        if self.is_valid(id) {
            Some(NodeMut::new(self, id.slot))
        } else {
            None
        }
    }

    /// Appends `spec` as the last child of `parent`.
    pub fn append_child(&mut self, parent: &NodeId, spec: &NodeSpec) -> AppResult<NodeId> {
        let parent = self.checked_slot(parent)?;
        let slot = self.attach(parent, None, spec);
        Ok(self.id_of(slot))
    }

    /// Inserts `spec` at `index` among the children of `parent` (clamped to the end).
    pub fn insert_child(
        &mut self,
        parent: &NodeId,
        index: usize,
        spec: &NodeSpec,
    ) -> AppResult<NodeId> {
        let parent = self.checked_slot(parent)?;
        let slot = self.attach(parent, Some(index), spec);
        Ok(self.id_of(slot))
    }

    /// Detaches a node and its subtree, returning it as a spec.
    ///
    /// Every handle into the removed subtree becomes invalid.
    pub fn remove(&mut self, id: &NodeId) -> AppResult<NodeSpec> {
        let slot = self.checked_slot(id)?;
        if slot == ROOT {
            return Err(AppError::InvalidNode(format!(
                "cannot remove the root of '{}'",
                self.id
            )));
        }
        let spec = self.spec_of(slot);
        self.detach(slot);
        Ok(spec)
    }

    /// Replaces a node with a freshly built subtree at the same position.
    ///
    /// Handles to the old subtree become invalid; addresses that identified
    /// the old node identify the replacement if it is equivalent.
    pub fn replace(&mut self, id: &NodeId, spec: &NodeSpec) -> AppResult<NodeId> {
        let slot = self.checked_slot(id)?;
        let Some(parent) = self.slots[slot].parent else {
            return Err(AppError::InvalidNode(format!(
                "cannot replace the root of '{}'",
                self.id
            )));
        };
        let index = self.position(parent, slot);
        self.detach(slot);
        let replacement = self.attach(parent, Some(index), spec);
        Ok(self.id_of(replacement))
    }

    pub(crate) fn slot(&self, slot: usize) -> &Slot {
        &self.slots[slot]
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut Slot {
        &mut self.slots[slot]
    }

    pub(crate) fn id_of(&self, slot: usize) -> NodeId {
        NodeId {
            document: self.id.clone(),
            generation: self.generation,
            slot,
            stamp: self.slots[slot].stamp,
        }
    }

    pub(crate) fn position(&self, parent: usize, slot: usize) -> usize {
        self.slots[parent]
            .children
            .iter()
            .position(|&child| child == slot)
            .unwrap_or(0)
    }

    pub(crate) fn attach(&mut self, parent: usize, index: Option<usize>, spec: &NodeSpec) -> usize {
        let slot = self.allocate(Slot::from_spec(spec, Some(parent)));
        let siblings = &mut self.slots[parent].children;
        match index {
            Some(index) => siblings.insert(index.min(siblings.len()), slot),
            None => siblings.push(slot),
        }
        for child in &spec.children {
            self.attach(slot, None, child);
        }
        slot
    }

    pub(crate) fn detach(&mut self, slot: usize) {
        if let Some(parent) = self.slots[slot].parent {
            self.slots[parent].children.retain(|&child| child != slot);
        }
        let mut pending = vec![slot];
        while let Some(current) = pending.pop() {
            let entry = &mut self.slots[current];
            pending.append(&mut entry.children);
            entry.live = false;
            entry.parent = None;
            entry.stamp = entry.stamp.wrapping_add(1);
            self.free.push(current);
        }
    }

    fn allocate(&mut self, mut slot: Slot) -> usize {
        match self.free.pop() {
            Some(index) => {
                slot.stamp = self.slots[index].stamp;
                self.slots[index] = slot;
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    fn checked_slot(&self, id: &NodeId) -> AppResult<usize> {
        if self.is_valid(id) {
            Ok(id.slot)
        } else {
            Err(AppError::InvalidNode(format!(
                "handle {}#{} is not attached to the current generation of '{}'",
                id.document, id.slot, self.id
            )))
        }
    }

    fn spec_of(&self, slot: usize) -> NodeSpec {
        let entry = &self.slots[slot];
        NodeSpec {
            kind: entry.kind,
            name: entry.name.clone(),
            value: entry.value.clone(),
            tags: entry.tags.clone(),
            children: entry
                .children
                .iter()
                .map(|&child| self.spec_of(child))
                .collect(),
        }
    }
}
