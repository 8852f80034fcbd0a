//! Index-addressed child arrays.
//!
//! A container owns a dense `Vec` of child handles and every child keeps a
//! [`ParentPointer`] holding its parent and its current position in that
//! `Vec`. Positions are rewritten after each splice for exactly the slots
//! that moved:
//!
//! - insertion or removal at `i` re-indexes `i..len` (an append therefore
//!   only touches the new tail, a prepend touches everything),
//! - replacing one node by exactly one node re-indexes slot `i` alone,
//! - any other replacement re-indexes `i..len`.

use std::ops::Range;

use generational_arena::Arena;
use tracing::{instrument, trace};

use crate::config::Settings;
use crate::errors::{TreeError, TreeResult};
use crate::node::{Node, NodeId, ParentConstraint};
use crate::tree_traits::sealed::{Splice, Token};
use crate::tree_traits::NodeTree;

/// Back-pointer from a child to its slot in the parent's child array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentPointer {
    pub parent: NodeId,
    pub index: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Slot {
    pointer: Option<ParentPointer>,
    children: Vec<NodeId>,
}

/// Node tree backed by per-container child arrays.
#[derive(Debug)]
pub struct IndexedTree<T> {
    arena: Arena<Node<T, Slot>>,
    check_cycles: bool,
}

impl<T> Default for IndexedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IndexedTree<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            check_cycles: true,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            check_cycles: true,
        }
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            arena: Arena::with_capacity(settings.capacity),
            check_cycles: settings.check_cycles,
        }
    }

    pub fn parent_pointer(&self, id: NodeId) -> Option<ParentPointer> {
        self.arena.get(id.0).and_then(|node| node.link.pointer)
    }

    /// Position of `id` among its siblings.
    pub fn index(&self, id: NodeId) -> Option<usize> {
        self.parent_pointer(id).map(|pointer| pointer.index)
    }

    pub fn children_slice(&self, parent: NodeId) -> &[NodeId] {
        self.arena
            .get(parent.0)
            .map(|node| node.link.children.as_slice())
            .unwrap_or_default()
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children_slice(parent).get(index).copied()
    }

    fn slot(&self, id: NodeId) -> &Slot {
        &self.arena[id.0].link
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        &mut self.arena[id.0].link
    }

    #[instrument(level = "trace", skip(self))]
    fn reindex(&mut self, parent: NodeId, range: Range<usize>) {
        for index in range {
            let child = self.slot(parent).children[index];
            self.slot_mut(child).pointer = Some(ParentPointer { parent, index });
        }
    }
}

impl<T> NodeTree for IndexedTree<T> {
    #[instrument(level = "trace", skip(self, data))]
    fn insert(&mut self, data: T) -> NodeId {
        NodeId(self.arena.insert(Node::new(data)))
    }

    fn insert_constrained<C>(&mut self, data: T, constraint: C) -> NodeId
    where
        C: ParentConstraint<T> + 'static,
    {
        let mut node = Node::new(data);
        node.constraint = Some(Box::new(constraint));
        NodeId(self.arena.insert(node))
    }

    fn set_constraint<C>(&mut self, id: NodeId, constraint: C) -> TreeResult<()>
    where
        C: ParentConstraint<T> + 'static,
    {
        let node = self.arena.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))?;
        node.constraint = Some(Box::new(constraint));
        Ok(())
    }

    fn clear_constraint(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.arena.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))?;
        node.constraint = None;
        Ok(())
    }

    fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    fn get(&self, id: NodeId) -> Option<&T> {
        self.arena.get(id.0).map(|node| &node.data)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.arena.get_mut(id.0).map(|node| &mut node.data)
    }

    fn len(&self) -> usize {
        self.arena.len()
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent_pointer(id).map(|pointer| pointer.parent)
    }

    fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children_slice(id).first().copied()
    }

    fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children_slice(id).last().copied()
    }

    fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let ParentPointer { parent, index } = self.parent_pointer(id)?;
        self.child_at(parent, index + 1)
    }

    fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let ParentPointer { parent, index } = self.parent_pointer(id)?;
        self.child_at(parent, index.checked_sub(1)?)
    }

    fn child_count(&self, id: NodeId) -> usize {
        self.children_slice(id).len()
    }
}

impl<T> Splice for IndexedTree<T> {
    type Data = T;

    fn constraint_of(&self, _: Token, id: NodeId) -> Option<&dyn ParentConstraint<T>> {
        self.arena.get(id.0).and_then(|node| node.constraint.as_deref())
    }

    fn checks_cycles(&self, _: Token) -> bool {
        self.check_cycles
    }

    fn unlink(&mut self, _: Token, id: NodeId) {
        let Some(ParentPointer { parent, index }) = self.slot_mut(id).pointer.take() else {
            return;
        };
        let children = &mut self.slot_mut(parent).children;
        children.remove(index);
        let end = children.len();
        self.reindex(parent, index..end);
        trace!(%id, %parent, index, "unlinked");
    }

    fn link_before(
        &mut self,
        _: Token,
        parent: NodeId,
        items: &[NodeId],
        reference: Option<NodeId>,
    ) {
        let at = reference
            .and_then(|reference| self.index(reference))
            .unwrap_or_else(|| self.slot(parent).children.len());
        let children = &mut self.slot_mut(parent).children;
        children.splice(at..at, items.iter().copied());
        let end = children.len();
        self.reindex(parent, at..end);
    }

    fn link_in_place(&mut self, _: Token, target: NodeId, items: &[NodeId]) {
        let Some(ParentPointer { parent, index }) = self.slot_mut(target).pointer.take() else {
            return;
        };
        let children = &mut self.slot_mut(parent).children;
        children.splice(index..=index, items.iter().copied());
        let end = if items.len() == 1 {
            index + 1
        } else {
            children.len()
        };
        self.reindex(parent, index..end);
    }

    fn free(&mut self, _: Token, id: NodeId) -> Option<T> {
        self.arena.remove(id.0).map(|node| node.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every child's stored pointer matches its slot.
    fn assert_indexed(tree: &IndexedTree<&'static str>, parent: NodeId) {
        for (index, &child) in tree.children_slice(parent).iter().enumerate() {
            assert_eq!(
                tree.parent_pointer(child),
                Some(ParentPointer { parent, index }),
                "stale pointer for {}",
                tree.get(child).unwrap()
            );
        }
    }

    fn fixture() -> (IndexedTree<&'static str>, NodeId, Vec<NodeId>) {
        let mut tree = IndexedTree::new();
        let p = tree.insert("p");
        let nodes = ["1", "2", "3", "4", "5"]
            .into_iter()
            .map(|name| tree.insert(name))
            .collect();
        (tree, p, nodes)
    }

    #[test]
    fn test_parent_and_index() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0]]).unwrap();
        assert_eq!(tree.index(p), None);
        assert_eq!(tree.index(n[0]), Some(0));
        assert_eq!(tree.parent(p), None);
        assert_eq!(tree.parent(n[0]), Some(p));
    }

    #[test]
    fn test_prepend_shifts_every_index() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[2], n[3]]).unwrap();
        tree.prepend(p, &[n[0], n[1]]).unwrap();
        assert_indexed(&tree, p);
        assert_eq!(tree.children_slice(p), &[n[0], n[1], n[2], n[3]]);
        assert_eq!(tree.index(n[3]), Some(3));
    }

    #[test]
    fn test_remove_reindexes_tail() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0], n[1], n[2], n[3]]).unwrap();
        tree.remove(n[1]).unwrap();
        assert_indexed(&tree, p);
        assert_eq!(tree.index(n[2]), Some(1));
        assert_eq!(tree.parent_pointer(n[1]), None);
    }

    #[test]
    fn test_one_for_one_replacement() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0], n[1], n[2]]).unwrap();
        tree.replace_with(n[1], &[n[4]]).unwrap();
        assert_indexed(&tree, p);
        assert_eq!(tree.children_slice(p), &[n[0], n[4], n[2]]);
        assert_eq!(tree.parent(n[1]), None);
    }

    #[test]
    fn test_wide_replacement_shifts_tail() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0], n[1], n[2]]).unwrap();
        tree.replace_with(n[0], &[n[3], n[4]]).unwrap();
        assert_indexed(&tree, p);
        assert_eq!(tree.children_slice(p), &[n[3], n[4], n[1], n[2]]);
        assert_eq!(tree.index(n[2]), Some(3));
    }

    #[test]
    fn test_replacement_with_sibling_reuses_slot() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0], n[1], n[2], n[3]]).unwrap();
        // n[3] leaves the tail first, then takes n[1]'s slot
        tree.replace_with(n[1], &[n[3]]).unwrap();
        assert_indexed(&tree, p);
        assert_eq!(tree.children_slice(p), &[n[0], n[3], n[2]]);
    }

    #[test]
    fn test_random_access() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &n).unwrap();
        assert_eq!(tree.child_at(p, 2), Some(n[2]));
        assert_eq!(tree.child_at(p, 5), None);
        assert_eq!(tree.previous_sibling(n[0]), None);
        assert_eq!(tree.next_sibling(n[4]), None);
        assert_eq!(tree.next_sibling(n[1]), Some(n[2]));
    }
}
