//! Restartable views over the children of a node.
//!
//! [`Children`] is a cheap, copyable handle: every call to
//! [`values`](Children::values) starts a new walk from the current first
//! child. The view borrows the tree, so the tree cannot change while a walk
//! is in progress.

use std::fmt;
use std::iter::{Enumerate, FusedIterator, Rev};

use crate::node::NodeId;
use crate::tree_traits::NodeTree;

pub struct Children<'a, B: ?Sized> {
    tree: &'a B,
    parent: NodeId,
}

impl<'a, B: ?Sized> Clone for Children<'a, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, B: ?Sized> Copy for Children<'a, B> {}

impl<'a, B: NodeTree + ?Sized> Children<'a, B> {
    pub(crate) fn new(tree: &'a B, parent: NodeId) -> Self {
        Self { tree, parent }
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn len(&self) -> usize {
        self.tree.child_count(self.parent)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<NodeId> {
        self.tree.first_child(self.parent)
    }

    pub fn last(&self) -> Option<NodeId> {
        self.tree.last_child(self.parent)
    }

    /// Children in order, first to last.
    pub fn values(&self) -> Values<'a, B> {
        Values {
            tree: self.tree,
            front: self.first(),
            back: self.last(),
            remaining: self.len(),
        }
    }

    /// Children in reverse order, last to first.
    pub fn values_right(&self) -> Rev<Values<'a, B>> {
        self.values().rev()
    }

    /// `(position, child)` pairs, first to last.
    pub fn entries(&self) -> Enumerate<Values<'a, B>> {
        self.values().enumerate()
    }

    /// `(position, child)` pairs, last to first.
    pub fn entries_right(&self) -> EntriesRight<'a, B> {
        EntriesRight {
            values: self.values_right(),
            position: self.len(),
        }
    }
}

impl<'a, B: NodeTree + ?Sized> IntoIterator for Children<'a, B> {
    type Item = NodeId;
    type IntoIter = Values<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}

impl<'a, B: NodeTree + ?Sized> fmt::Debug for Children<'a, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values()).finish()
    }
}

/// Sibling walk over a child sequence, from both ends.
pub struct Values<'a, B: ?Sized> {
    tree: &'a B,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, B: NodeTree + ?Sized> Iterator for Values<'a, B> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front?;
        self.remaining -= 1;
        self.front = self.tree.next_sibling(current);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, B: NodeTree + ?Sized> DoubleEndedIterator for Values<'a, B> {
    fn next_back(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.back?;
        self.remaining -= 1;
        self.back = self.tree.previous_sibling(current);
        Some(current)
    }
}

impl<'a, B: NodeTree + ?Sized> ExactSizeIterator for Values<'a, B> {}

impl<'a, B: NodeTree + ?Sized> FusedIterator for Values<'a, B> {}

pub struct EntriesRight<'a, B: ?Sized> {
    values: Rev<Values<'a, B>>,
    position: usize,
}

impl<'a, B: NodeTree + ?Sized> Iterator for EntriesRight<'a, B> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<(usize, NodeId)> {
        let node = self.values.next()?;
        self.position -= 1;
        Some((self.position, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<'a, B: NodeTree + ?Sized> ExactSizeIterator for EntriesRight<'a, B> {}
