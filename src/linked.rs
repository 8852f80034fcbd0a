//! Doubly-linked sibling chains.
//!
//! Every node records its parent and both neighbours; a container records
//! its first and last child and a cached child count. Navigation and every
//! splice are constant-time pointer rewrites, iteration chases `next` /
//! `previous` links.

use generational_arena::Arena;
use tracing::{instrument, trace};

use crate::config::Settings;
use crate::errors::{TreeError, TreeResult};
use crate::node::{Node, NodeId, ParentConstraint};
use crate::tree_traits::sealed::{Splice, Token};
use crate::tree_traits::NodeTree;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links {
    // as a child
    parent: Option<NodeId>,
    previous: Option<NodeId>,
    next: Option<NodeId>,
    // as a container
    first: Option<NodeId>,
    last: Option<NodeId>,
    count: usize,
}

/// Node tree backed by doubly-linked sibling chains.
#[derive(Debug)]
pub struct LinkedTree<T> {
    arena: Arena<Node<T, Links>>,
    check_cycles: bool,
}

impl<T> Default for LinkedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedTree<T> {
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

    fn get_links(&self, id: NodeId) -> Option<&Links> {
        self.arena.get(id.0).map(|node| &node.link)
    }

    fn links(&self, id: NodeId) -> &Links {
        &self.arena[id.0].link
    }

    fn links_mut(&mut self, id: NodeId) -> &mut Links {
        &mut self.arena[id.0].link
    }
}

impl<T> NodeTree for LinkedTree<T> {
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
        self.get_links(id).and_then(|links| links.parent)
    }

    fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get_links(id).and_then(|links| links.first)
    }

    fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get_links(id).and_then(|links| links.last)
    }

    fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get_links(id).and_then(|links| links.next)
    }

    fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get_links(id).and_then(|links| links.previous)
    }

    fn child_count(&self, id: NodeId) -> usize {
        self.get_links(id).map_or(0, |links| links.count)
    }
}

impl<T> Splice for LinkedTree<T> {
    type Data = T;

    fn constraint_of(&self, _: Token, id: NodeId) -> Option<&dyn ParentConstraint<T>> {
        self.arena.get(id.0).and_then(|node| node.constraint.as_deref())
    }

    fn checks_cycles(&self, _: Token) -> bool {
        self.check_cycles
    }

    fn unlink(&mut self, _: Token, id: NodeId) {
        let Links {
            parent,
            previous,
            next,
            ..
        } = *self.links(id);
        let Some(parent) = parent else {
            return;
        };

        match previous {
            Some(previous) => self.links_mut(previous).next = next,
            None => self.links_mut(parent).first = next,
        }
        match next {
            Some(next) => self.links_mut(next).previous = previous,
            None => self.links_mut(parent).last = previous,
        }

        let links = self.links_mut(id);
        links.parent = None;
        links.previous = None;
        links.next = None;
        self.links_mut(parent).count -= 1;
        trace!(%id, %parent, "unlinked");
    }

    fn link_before(
        &mut self,
        _: Token,
        parent: NodeId,
        items: &[NodeId],
        reference: Option<NodeId>,
    ) {
        let (Some(&head), Some(&tail)) = (items.first(), items.last()) else {
            return;
        };
        let previous = match reference {
            Some(reference) => self.links(reference).previous,
            None => self.links(parent).last,
        };

        for (i, &item) in items.iter().enumerate() {
            let links = self.links_mut(item);
            links.parent = Some(parent);
            links.previous = if i == 0 { previous } else { Some(items[i - 1]) };
            links.next = items.get(i + 1).copied().or(reference);
        }

        match previous {
            Some(previous) => self.links_mut(previous).next = Some(head),
            None => self.links_mut(parent).first = Some(head),
        }
        match reference {
            Some(reference) => self.links_mut(reference).previous = Some(tail),
            None => self.links_mut(parent).last = Some(tail),
        }
        self.links_mut(parent).count += items.len();
    }

    fn link_in_place(&mut self, token: Token, target: NodeId, items: &[NodeId]) {
        let Links { parent, next, .. } = *self.links(target);
        let Some(parent) = parent else {
            return;
        };
        self.unlink(token, target);
        self.link_before(token, parent, items, next);
    }

    fn free(&mut self, _: Token, id: NodeId) -> Option<T> {
        self.arena.remove(id.0).map(|node| node.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &LinkedTree<&'static str>, parent: NodeId) -> Vec<&'static str> {
        tree.children(parent)
            .values()
            .map(|id| *tree.get(id).unwrap())
            .collect()
    }

    /// Walks the raw links of `parent` in both directions.
    fn assert_links(tree: &LinkedTree<&'static str>, parent: NodeId) {
        let container = tree.links(parent);
        let mut forward = Vec::new();
        let mut cursor = container.first;
        let mut previous = None;
        while let Some(id) = cursor {
            let links = tree.links(id);
            assert_eq!(links.parent, Some(parent));
            assert_eq!(links.previous, previous);
            forward.push(id);
            previous = Some(id);
            cursor = links.next;
        }
        assert_eq!(container.last, previous);
        assert_eq!(container.count, forward.len());

        let mut backward: Vec<_> = tree.children(parent).values_right().collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    fn fixture() -> (LinkedTree<&'static str>, NodeId, Vec<NodeId>) {
        let mut tree = LinkedTree::new();
        let p = tree.insert("p");
        let nodes = ["1", "2", "3", "4"]
            .into_iter()
            .map(|name| tree.insert(name))
            .collect();
        (tree, p, nodes)
    }

    #[test]
    fn test_append_to_empty_installs_chain() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0], n[1], n[2]]).unwrap();
        assert_links(&tree, p);
        assert_eq!(tree.first_child(p), Some(n[0]));
        assert_eq!(tree.last_child(p), Some(n[2]));
        assert_eq!(tree.previous_sibling(n[0]), None);
        assert_eq!(tree.next_sibling(n[2]), None);
    }

    #[test]
    fn test_remove_fixes_boundaries() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0], n[1], n[2]]).unwrap();

        tree.remove(n[0]).unwrap();
        assert_links(&tree, p);
        assert_eq!(tree.first_child(p), Some(n[1]));

        tree.remove(n[2]).unwrap();
        assert_links(&tree, p);
        assert_eq!(tree.last_child(p), Some(n[1]));

        tree.remove(n[1]).unwrap();
        assert_links(&tree, p);
        assert_eq!(tree.first_child(p), None);
        assert_eq!(tree.last_child(p), None);
        assert_eq!(*tree.links(n[1]), Links::default());
    }

    #[test]
    fn test_before_head_and_after_tail() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[1], n[2]]).unwrap();
        tree.before(n[1], &[n[0]]).unwrap();
        tree.after(n[2], &[n[3]]).unwrap();
        assert_links(&tree, p);
        assert_eq!(names(&tree, p), vec!["1", "2", "3", "4"]);
        assert_eq!(tree.first_child(p), Some(n[0]));
        assert_eq!(tree.last_child(p), Some(n[3]));
    }

    #[test]
    fn test_replace_in_middle_keeps_neighbours() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0], n[1], n[2]]).unwrap();
        tree.replace_with(n[1], &[n[3]]).unwrap();
        assert_links(&tree, p);
        assert_eq!(names(&tree, p), vec!["1", "4", "3"]);
        assert_eq!(*tree.links(n[1]), Links::default());
    }

    #[test]
    fn test_moving_between_parents_updates_both_counts() {
        let (mut tree, p, n) = fixture();
        let q = tree.insert("q");
        tree.append(p, &[n[0], n[1]]).unwrap();
        tree.append(q, &[n[2]]).unwrap();

        tree.before(n[2], &[n[1], n[0]]).unwrap();
        assert_links(&tree, p);
        assert_links(&tree, q);
        assert_eq!(tree.child_count(p), 0);
        assert_eq!(names(&tree, q), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_delete_releases_subtree() {
        let (mut tree, p, n) = fixture();
        tree.append(p, &[n[0]]).unwrap();
        tree.append(n[0], &[n[1], n[2]]).unwrap();

        assert_eq!(tree.delete(n[0]).unwrap(), "1");
        assert_links(&tree, p);
        assert!(!tree.contains(n[1]));
        assert!(!tree.contains(n[2]));
        assert_eq!(tree.len(), 2);
        assert!(matches!(tree.remove(n[1]), Err(TreeError::NodeNotFound(_))));
    }
}
