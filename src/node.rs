//! Node handles, per-node storage and the parent constraint hook.

use std::fmt;

use generational_arena::Index;

/// Handle to a node stored in a tree's arena.
///
/// Handles carry the arena generation, so a handle to a deleted node never
/// aliases a node inserted later into the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl NodeId {
    /// Slot number and generation of the underlying arena index.
    pub fn into_raw_parts(self) -> (usize, u64) {
        self.0.into_raw_parts()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}v{}", slot, generation)
    }
}

/// Restricts which parents a node may be attached to.
///
/// The hook sees the payload of the node being attached and the payload of
/// the prospective parent. Returning `Err` vetoes the attachment and the
/// whole operation fails without touching the tree.
pub trait ParentConstraint<T> {
    fn check(&self, child: &T, parent: &T) -> Result<(), String>;
}

impl<T, F> ParentConstraint<T> for F
where
    F: Fn(&T, &T) -> Result<(), String>,
{
    fn check(&self, child: &T, parent: &T) -> Result<(), String> {
        self(child, parent)
    }
}

/// Arena slot shared by both backends; `L` is the backend's linkage state.
pub(crate) struct Node<T, L> {
    pub(crate) data: T,
    pub(crate) constraint: Option<Box<dyn ParentConstraint<T>>>,
    pub(crate) link: L,
}

impl<T, L: Default> Node<T, L> {
    pub(crate) fn new(data: T) -> Self {
        Self {
            data,
            constraint: None,
            link: L::default(),
        }
    }
}

impl<T: fmt::Debug, L: fmt::Debug> fmt::Debug for Node<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("data", &self.data)
            .field("constrained", &self.constraint.is_some())
            .field("link", &self.link)
            .finish()
    }
}
