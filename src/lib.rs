//! Arena-backed node trees with DOM-style sibling operations.
//!
//! Two interchangeable backends implement [`NodeTree`]:
//! [`LinkedTree`] keeps doubly-linked sibling chains, [`IndexedTree`]
//! keeps per-container child arrays with index back-pointers. Both expose
//! the same restartable [`Children`] views and honor per-node
//! [`ParentConstraint`] hooks.
//!
//! ```
//! use nodetree::{LinkedTree, NodeTree};
//!
//! let mut tree = LinkedTree::new();
//! let p = tree.insert("p");
//! let a = tree.insert("a");
//! let b = tree.insert("b");
//! tree.append(p, &[a, b])?;
//! tree.after(b, &[a])?;
//! assert_eq!(tree.children(p).values().collect::<Vec<_>>(), vec![b, a]);
//! # Ok::<(), nodetree::TreeError>(())
//! ```

pub mod children;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exitcode;
pub mod indexed;
pub mod linked;
pub mod node;
pub mod traverse;
pub mod tree_traits;
pub mod util;

pub use children::Children;
pub use config::{Backend, Settings};
pub use errors::{TreeError, TreeResult};
pub use indexed::{IndexedTree, ParentPointer};
pub use linked::LinkedTree;
pub use node::{NodeId, ParentConstraint};
pub use tree_traits::NodeTree;
