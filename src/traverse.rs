//! Whole-subtree walks built on the sibling contract.

use tracing::instrument;

use crate::node::NodeId;
use crate::tree_traits::NodeTree;

pub struct Ancestors<'a, B: ?Sized> {
    tree: &'a B,
    next: Option<NodeId>,
}

impl<'a, B: NodeTree + ?Sized> Ancestors<'a, B> {
    pub(crate) fn new(tree: &'a B, id: NodeId) -> Self {
        Self {
            tree,
            next: tree.parent(id),
        }
    }
}

impl<'a, B: NodeTree + ?Sized> Iterator for Ancestors<'a, B> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Pre-order walk using an explicit stack.
pub struct Descendants<'a, B: ?Sized> {
    tree: &'a B,
    stack: Vec<NodeId>,
}

impl<'a, B: NodeTree + ?Sized> Descendants<'a, B> {
    pub(crate) fn new(tree: &'a B, root: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(root) {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a, B: NodeTree + ?Sized> Iterator for Descendants<'a, B> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        // reversed so the first child is popped next
        self.stack.extend(self.tree.children(current).values_right());
        Some(current)
    }
}

#[instrument(level = "trace", skip(tree))]
pub(crate) fn depth<B: NodeTree + ?Sized>(tree: &B, root: NodeId) -> usize {
    if !tree.contains(root) {
        return 0;
    }
    let mut deepest = 0;
    let mut stack = vec![(root, 1)];
    while let Some((node, level)) = stack.pop() {
        deepest = deepest.max(level);
        stack.extend(tree.children(node).values().map(|child| (child, level + 1)));
    }
    deepest
}
