use std::cmp::Ordering;
use std::fmt;

use slab::Slab;

use crate::error::TreeError;
use crate::iter::Iter;
use crate::node::{Node, NodeId, NodeRef, Side};
use crate::path::Path;
use crate::tree::OrderedTree;

/// Result of unlinking a node from the tree.
pub(crate) struct Removal<T> {
    pub element: T,
    /// Ancestors of the unlinked position. When the removed node had two children the
    /// promoted predecessor sits where the removed node was, followed by the walk down
    /// to the predecessor's old parent.
    pub path: Path,
    /// Side of the path top whose subtree lost height. Meaningless for an empty path.
    pub side: Side,
}

/// Unbalanced binary search tree. Nodes are kept in a slab and linked by id.
#[derive(Clone)]
pub struct BinarySearchTree<T> {
    nodes: Slab<Node<T>>,
    root: Option<NodeId>,
}

impl<T> BinarySearchTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes, self.root)
    }

    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|id| NodeRef::new(&self.nodes, id))
    }

    pub fn first(&self) -> Option<&T> {
        self.root.map(|id| &self.nodes[self.extreme(id, Side::Left)].element)
    }

    pub fn last(&self) -> Option<&T> {
        self.root.map(|id| &self.nodes[self.extreme(id, Side::Right)].element)
    }

    pub fn get_by<F>(&self, cmp: F) -> Option<&T>
    where
        F: Fn(&T) -> Ordering,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            match cmp(&node.element) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return Some(&node.element),
                Ordering::Greater => current = node.right,
            }
        }
        None
    }

    // explicit stack, a degenerate tree is as deep as it is long
    fn subtree_height(&self, id: Option<NodeId>) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = id.into_iter().map(|id| (id, 1)).collect();

        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[id];
            stack.extend(node.left.into_iter().chain(node.right).map(|child| (child, depth + 1)));
        }

        height
    }

    // last node reached by always following `side`
    fn extreme(&self, mut id: NodeId, side: Side) -> NodeId {
        while let Some(next) = self.nodes[id].child(side) {
            id = next;
        }
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id]
    }

    /// Points the link that held `old` (a child of `parent`, or the root) at `new`.
    pub(crate) fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            Some(parent) => match self.nodes[parent].side_of(old) {
                Some(side) => *self.nodes[parent].child_mut(side) = new,
                None => unreachable!("node {} is not a child of {}", old, parent),
            },
            None => self.root = new,
        }
    }
}

impl<T: Ord> BinarySearchTree<T> {
    pub fn try_from_iter<I>(iter: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut tree = Self::new();
        for element in iter {
            tree.insert(element)?;
        }
        Ok(tree)
    }

    pub fn insert(&mut self, element: T) -> Result<(), TreeError> {
        self.attach(element).map(|_| ())
    }

    pub fn remove(&mut self, element: &T) -> bool {
        self.take(element).is_some()
    }

    /// Removes `element` and hands back the stored value.
    pub fn take(&mut self, element: &T) -> Option<T> {
        self.detach(element).map(|removal| removal.element)
    }

    pub fn contains(&self, element: &T) -> bool {
        self.get_by(|stored| element.cmp(stored)).is_some()
    }

    /// Links a new leaf holding `element`. Returns its id and the ancestors visited on
    /// the way down, the new leaf excluded.
    pub(crate) fn attach(&mut self, element: T) -> Result<(NodeId, Path), TreeError> {
        let mut path = Path::new();

        let Some(mut current) = self.root else {
            let id = self.nodes.insert(Node::new(element));
            self.root = Some(id);
            log::trace!("attached {} as root", id);
            return Ok((id, path));
        };

        loop {
            path.push(current);
            let node = &self.nodes[current];
            let side = match element.cmp(&node.element) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Err(TreeError::DuplicateElement),
            };

            match node.child(side) {
                Some(next) => current = next,
                None => {
                    let id = self.nodes.insert(Node::new(element));
                    *self.nodes[current].child_mut(side) = Some(id);
                    log::trace!("attached {} under {} ({:?})", id, current, side);
                    return Ok((id, path));
                }
            }
        }
    }

    /// Finds the node equal to `element` along with its ancestors.
    fn find(&self, element: &T) -> (Option<NodeId>, Path) {
        let mut path = Path::new();
        let mut current = self.root;

        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match element.cmp(&node.element) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return (Some(id), path),
            };
            path.push(id);
        }

        (None, path)
    }

    /// Unlinks the node equal to `element` and releases its slot.
    ///
    /// A node with two children is replaced by its in-order predecessor: the predecessor
    /// node moves into the vacated position, takes over both subtrees and the balance
    /// factor, and its own left subtree is relinked into its old place.
    pub(crate) fn detach(&mut self, element: &T) -> Option<Removal<T>> {
        let (target, mut path) = self.find(element);
        let target = target?;
        let parent = path.peek();

        let node = &self.nodes[target];
        let (left, right, balance) = (node.left, node.right, node.balance);
        let side = match parent {
            Some(parent) => match self.nodes[parent].side_of(target) {
                Some(side) => side,
                None => unreachable!("node {} is not a child of {}", target, parent),
            },
            None => Side::Left,
        };

        let side = match (left, right) {
            (Some(left), Some(right)) => {
                let mut tail = Path::new();
                let mut predecessor = left;
                while let Some(next) = self.nodes[predecessor].right {
                    tail.push(predecessor);
                    predecessor = next;
                }

                let shrunk = match tail.peek() {
                    Some(predecessor_parent) => {
                        let predecessor_left = self.nodes[predecessor].left;
                        self.nodes[predecessor_parent].right = predecessor_left;
                        self.nodes[predecessor].left = Some(left);
                        Side::Right
                    }
                    // the predecessor is the left child and keeps its own left subtree
                    None => Side::Left,
                };

                let promoted = &mut self.nodes[predecessor];
                promoted.right = Some(right);
                promoted.balance = balance;
                self.replace_child(parent, target, Some(predecessor));
                log::trace!("promoted predecessor {} into {}", predecessor, target);

                path.push(predecessor);
                path.extend(tail);
                shrunk
            }
            (child, None) | (None, child) => {
                self.replace_child(parent, target, child);
                side
            }
        };

        let removed = self.nodes.remove(target);
        log::trace!("released {}", target);

        Some(Removal {
            element: removed.element,
            path,
            side,
        })
    }
}

impl<T: Ord> OrderedTree<T> for BinarySearchTree<T> {
    fn insert(&mut self, element: T) -> Result<(), TreeError> {
        BinarySearchTree::insert(self, element)
    }

    fn remove(&mut self, element: &T) -> bool {
        BinarySearchTree::remove(self, element)
    }

    fn contains(&self, element: &T) -> bool {
        BinarySearchTree::contains(self, element)
    }

    fn len(&self) -> usize {
        BinarySearchTree::len(self)
    }

    fn clear(&mut self) {
        BinarySearchTree::clear(self)
    }

    fn height(&self) -> usize {
        BinarySearchTree::height(self)
    }
}

impl<T> Default for BinarySearchTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for BinarySearchTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// same elements, shape ignored
impl<T: Ord> PartialEq for BinarySearchTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|element| other.contains(element))
    }
}

impl<T: Ord> Eq for BinarySearchTree<T> {}

impl<T: Ord> TryFrom<Vec<T>> for BinarySearchTree<T> {
    type Error = TreeError;

    fn try_from(value: Vec<T>) -> Result<Self, Self::Error> {
        Self::try_from_iter(value)
    }
}

impl<'a, T> IntoIterator for &'a BinarySearchTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
impl<T: Ord> BinarySearchTree<T> {
    /// Panics unless the ordering holds everywhere and `len` matches the reachable nodes.
    /// With `balanced`, also checks every stored balance factor against measured heights.
    pub(crate) fn assert_valid(&self, balanced: bool) {
        let mut reachable = 0;
        self.check_subtree(self.root, None, None, balanced, &mut reachable);
        assert_eq!(reachable, self.len(), "len does not match reachable nodes");
    }

    fn check_subtree(&self, id: Option<NodeId>, lower: Option<&T>, upper: Option<&T>, balanced: bool, reachable: &mut usize) -> usize {
        let Some(id) = id else {
            return 0;
        };
        *reachable += 1;
        let node = &self.nodes[id];

        if let Some(lower) = lower {
            assert!(lower < &node.element, "ordering violated at {}", id);
        }
        if let Some(upper) = upper {
            assert!(&node.element < upper, "ordering violated at {}", id);
        }

        let left = self.check_subtree(node.left, lower, Some(&node.element), balanced, reachable);
        let right = self.check_subtree(node.right, Some(&node.element), upper, balanced, reachable);

        if balanced {
            let measured = right as i64 - left as i64;
            assert_eq!(node.balance as i64, measured, "stale balance at {}", id);
            assert!(measured.abs() <= 1, "unbalanced at {}", id);
        }

        1 + left.max(right)
    }
}
