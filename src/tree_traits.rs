//! The node contract shared by both backends.
//!
//! Backends supply storage, navigation and four raw linkage primitives
//! ([`sealed::Splice`]). Every DOM-style mutation is written once here on
//! top of those primitives, so validation, constraint checks and the choice
//! of insertion point behave identically whichever backend is in use.
//!
//! Each mutation validates everything it needs before it touches a link:
//! an `Err` always leaves the tree exactly as it was.

use std::collections::HashSet;
use std::iter;

use tracing::{debug, instrument};

use crate::children::Children;
use crate::errors::{TreeError, TreeResult};
use crate::node::{NodeId, ParentConstraint};
use crate::traverse::{Ancestors, Descendants};

use self::sealed::Token;

const TOKEN: Token = Token::new();

pub(crate) mod sealed {
    use crate::node::{NodeId, ParentConstraint};

    /// Capability required by every [`Splice`] primitive.
    ///
    /// Only this crate can build one, so the primitives stay unreachable
    /// from the public [`NodeTree`](super::NodeTree) surface even though
    /// `Splice` is its supertrait.
    #[derive(Debug, Clone, Copy)]
    pub struct Token {
        _private: (),
    }

    impl Token {
        pub(crate) const fn new() -> Self {
            Self { _private: () }
        }
    }

    /// Raw linkage primitives.
    ///
    /// Only called with live handles that passed validation, so
    /// implementations index their arena directly.
    pub trait Splice {
        /// Payload stored in every node.
        type Data;

        fn constraint_of(
            &self,
            token: Token,
            id: NodeId,
        ) -> Option<&dyn ParentConstraint<Self::Data>>;

        fn checks_cycles(&self, token: Token) -> bool;

        /// Detach `id` from its parent. No-op for unparented nodes.
        fn unlink(&mut self, token: Token, id: NodeId);

        /// Link the detached `items`, in order, under `parent` right before
        /// `reference`, or at the end when `reference` is `None`.
        fn link_before(
            &mut self,
            token: Token,
            parent: NodeId,
            items: &[NodeId],
            reference: Option<NodeId>,
        );

        /// Put the detached `items` where `target` is and unparent `target`.
        fn link_in_place(&mut self, token: Token, target: NodeId, items: &[NodeId]);

        /// Drop an unlinked node from the arena.
        fn free(&mut self, token: Token, id: NodeId) -> Option<Self::Data>;
    }
}

/// DOM-like parent/child contract implemented by [`LinkedTree`] and
/// [`IndexedTree`].
///
/// Positional operations (`remove`, `before`, `after`, `replace_with`) on a
/// node without a parent are silent no-ops, as are insertions of an empty
/// item list. Handles that do not belong to the tree (or were deleted) are
/// reported as [`TreeError::NodeNotFound`].
///
/// When one handle is listed more than once in `items`, its last occurrence
/// decides where it ends up.
///
/// [`LinkedTree`]: crate::linked::LinkedTree
/// [`IndexedTree`]: crate::indexed::IndexedTree
pub trait NodeTree: sealed::Splice {
    /// Create an unparented node without a parent constraint.
    fn insert(&mut self, data: Self::Data) -> NodeId;

    /// Create an unparented node guarded by `constraint`.
    fn insert_constrained<C>(&mut self, data: Self::Data, constraint: C) -> NodeId
    where
        C: ParentConstraint<Self::Data> + 'static;

    /// Attach (or replace) the parent constraint of an existing node.
    ///
    /// The current parent is not re-checked; the hook applies to future
    /// attachments.
    fn set_constraint<C>(&mut self, id: NodeId, constraint: C) -> TreeResult<()>
    where
        C: ParentConstraint<Self::Data> + 'static;

    fn clear_constraint(&mut self, id: NodeId) -> TreeResult<()>;

    fn contains(&self, id: NodeId) -> bool;

    fn get(&self, id: NodeId) -> Option<&Self::Data>;

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Self::Data>;

    /// Number of nodes stored in the tree, attached or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    fn first_child(&self, id: NodeId) -> Option<NodeId>;

    fn last_child(&self, id: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, id: NodeId) -> Option<NodeId>;

    fn previous_sibling(&self, id: NodeId) -> Option<NodeId>;

    /// O(1) on both backends.
    fn child_count(&self, id: NodeId) -> usize;

    /// A fresh view over the children of `parent`.
    fn children(&self, parent: NodeId) -> Children<'_, Self> {
        Children::new(self, parent)
    }

    /// Parent chain of `id`, nearest first.
    fn ancestors(&self, id: NodeId) -> Ancestors<'_, Self> {
        Ancestors::new(self, id)
    }

    /// Pre-order walk of the subtree rooted at `id`, starting with `id`.
    fn descendants(&self, id: NodeId) -> Descendants<'_, Self> {
        Descendants::new(self, id)
    }

    /// Height of the subtree rooted at `id`; a lone node has depth 1.
    fn depth(&self, id: NodeId) -> usize {
        crate::traverse::depth(self, id)
    }

    /// Childless nodes of the subtree rooted at `id`, in pre-order.
    fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|&node| self.child_count(node) == 0)
            .collect()
    }

    /// Detach `id` from its parent.
    #[instrument(level = "debug", skip(self))]
    fn remove(&mut self, id: NodeId) -> TreeResult<()> {
        ensure(self, id)?;
        if let Some(parent) = self.parent(id) {
            self.unlink(TOKEN, id);
            debug!(%id, %parent, "removed");
        }
        Ok(())
    }

    /// Insert `items` immediately before `anchor`.
    #[instrument(level = "debug", skip(self))]
    fn before(&mut self, anchor: NodeId, items: &[NodeId]) -> TreeResult<()> {
        ensure(self, anchor)?;
        let Some(parent) = self.parent(anchor) else {
            return Ok(());
        };
        if items.is_empty() {
            return Ok(());
        }
        let (chain, members) = prepare(self, parent, items)?;
        let reference = first_outside(self, Some(anchor), &members);
        splice_into(self, parent, &chain, reference);
        Ok(())
    }

    /// Insert `items` immediately after `anchor`.
    #[instrument(level = "debug", skip(self))]
    fn after(&mut self, anchor: NodeId, items: &[NodeId]) -> TreeResult<()> {
        ensure(self, anchor)?;
        let Some(parent) = self.parent(anchor) else {
            return Ok(());
        };
        if items.is_empty() {
            return Ok(());
        }
        let (chain, members) = prepare(self, parent, items)?;
        let reference = first_outside(self, self.next_sibling(anchor), &members);
        splice_into(self, parent, &chain, reference);
        Ok(())
    }

    /// Put `items` where `anchor` is and unparent `anchor`.
    ///
    /// Equivalent to [`before`](Self::before) followed by
    /// [`remove`](Self::remove), so `anchor` ends up unparented even when it
    /// is listed among `items`. An empty `items` is a plain `remove`.
    #[instrument(level = "debug", skip(self))]
    fn replace_with(&mut self, anchor: NodeId, items: &[NodeId]) -> TreeResult<()> {
        ensure(self, anchor)?;
        let Some(parent) = self.parent(anchor) else {
            return Ok(());
        };
        if items.is_empty() {
            self.unlink(TOKEN, anchor);
            return Ok(());
        }
        let (chain, members) = prepare(self, parent, items)?;
        if members.contains(&anchor) {
            let reference = first_outside(self, Some(anchor), &members);
            splice_into(self, parent, &chain, reference);
            self.unlink(TOKEN, anchor);
            debug!(%anchor, %parent, width = chain.len(), "replaced, anchor listed");
        } else {
            for &item in &chain {
                self.unlink(TOKEN, item);
            }
            self.link_in_place(TOKEN, anchor, &chain);
            debug!(%anchor, %parent, width = chain.len(), "replaced");
        }
        Ok(())
    }

    /// Insert `items` after the last child of `parent`.
    #[instrument(level = "debug", skip(self))]
    fn append(&mut self, parent: NodeId, items: &[NodeId]) -> TreeResult<()> {
        ensure(self, parent)?;
        if items.is_empty() {
            return Ok(());
        }
        let (chain, _) = prepare(self, parent, items)?;
        splice_into(self, parent, &chain, None);
        Ok(())
    }

    /// Insert `items` before the first child of `parent`.
    #[instrument(level = "debug", skip(self))]
    fn prepend(&mut self, parent: NodeId, items: &[NodeId]) -> TreeResult<()> {
        ensure(self, parent)?;
        if items.is_empty() {
            return Ok(());
        }
        let (chain, members) = prepare(self, parent, items)?;
        let reference = first_outside(self, self.first_child(parent), &members);
        splice_into(self, parent, &chain, reference);
        Ok(())
    }

    /// Detach `id` and release it together with its whole subtree.
    ///
    /// Returns the payload of `id`; payloads of its descendants are dropped.
    #[instrument(level = "debug", skip(self))]
    fn delete(&mut self, id: NodeId) -> TreeResult<Self::Data> {
        ensure(self, id)?;
        self.unlink(TOKEN, id);
        let subtree: Vec<NodeId> = self.descendants(id).skip(1).collect();
        debug!(%id, released = subtree.len() + 1, "deleting subtree");
        for node in subtree {
            self.free(TOKEN, node);
        }
        self.free(TOKEN, id).ok_or(TreeError::NodeNotFound(id))
    }
}

fn ensure<B: NodeTree + ?Sized>(tree: &B, id: NodeId) -> TreeResult<()> {
    if tree.contains(id) {
        Ok(())
    } else {
        Err(TreeError::NodeNotFound(id))
    }
}

/// Validate `items` for attachment under `parent`.
///
/// Returns the items de-duplicated (last occurrence wins) together with the
/// set of distinct handles.
fn prepare<B: NodeTree + ?Sized>(
    tree: &B,
    parent: NodeId,
    items: &[NodeId],
) -> TreeResult<(Vec<NodeId>, HashSet<NodeId>)> {
    for &item in items {
        ensure(tree, item)?;
    }

    let mut members = HashSet::with_capacity(items.len());
    let mut chain: Vec<NodeId> = items
        .iter()
        .rev()
        .copied()
        .filter(|&item| members.insert(item))
        .collect();
    chain.reverse();

    if tree.checks_cycles(TOKEN) {
        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if members.contains(&ancestor) {
                return Err(TreeError::HierarchyViolation {
                    node: ancestor,
                    parent,
                });
            }
            cursor = tree.parent(ancestor);
        }
    }

    let parent_data = tree.get(parent).ok_or(TreeError::NodeNotFound(parent))?;
    for &item in &chain {
        let Some(hook) = tree.constraint_of(TOKEN, item) else {
            continue;
        };
        let child_data = tree.get(item).ok_or(TreeError::NodeNotFound(item))?;
        if let Err(reason) = hook.check(child_data, parent_data) {
            debug!(child = %item, %parent, %reason, "parent constraint rejected attachment");
            return Err(TreeError::ConstraintViolation {
                child: item,
                parent,
                reason,
            });
        }
    }

    Ok((chain, members))
}

/// First node from `start` onwards along the sibling chain that is not being
/// moved.
fn first_outside<B: NodeTree + ?Sized>(
    tree: &B,
    start: Option<NodeId>,
    members: &HashSet<NodeId>,
) -> Option<NodeId> {
    iter::successors(start, |&id| tree.next_sibling(id)).find(|id| !members.contains(id))
}

fn splice_into<B: NodeTree + ?Sized>(
    tree: &mut B,
    parent: NodeId,
    chain: &[NodeId],
    reference: Option<NodeId>,
) {
    for &item in chain {
        tree.unlink(TOKEN, item);
    }
    tree.link_before(TOKEN, parent, chain, reference);
    debug!(%parent, width = chain.len(), ?reference, "spliced");
}
