//! Ordered sets backed by binary search trees.
//!
//! [`AvlTree`] keeps itself height-balanced, [`BinarySearchTree`] does not. Both store
//! their nodes in a slab and share the same node layout, so the AVL tree is the plain
//! tree plus balance-factor bookkeeping and rotations.

mod avl;
mod bst;
mod error;
mod iter;
mod node;
mod path;
mod tree;

pub use avl::AvlTree;
pub use bst::BinarySearchTree;
pub use error::TreeError;
pub use iter::Iter;
pub use node::NodeRef;
pub use tree::OrderedTree;
