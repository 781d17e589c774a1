use std::cmp::Ordering;
use std::fmt;

use crate::bst::{BinarySearchTree, Removal};
use crate::error::TreeError;
use crate::iter::Iter;
use crate::node::{NodeId, NodeRef, Side};
use crate::tree::OrderedTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rotation {
    LeftLeft,
    RightRight,
    LeftRight,
    RightLeft,
}

/// Self-balancing binary search tree.
///
/// Every node stores its balance factor (right height minus left height). Insertion and
/// removal walk the recorded descent path back up, adjusting balance factors in O(1) per
/// node and rotating wherever a factor reaches ±2. Insertion needs at most one rotation,
/// removal may rotate at every level.
#[derive(Clone)]
pub struct AvlTree<T> {
    tree: BinarySearchTree<T>,
}

impl<T> AvlTree<T> {
    pub fn new() -> Self {
        Self {
            tree: BinarySearchTree::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.tree.root()
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    pub fn get_by<F>(&self, cmp: F) -> Option<&T>
    where
        F: Fn(&T) -> Ordering,
    {
        self.tree.get_by(cmp)
    }

    fn balance(&self, id: NodeId) -> i8 {
        self.tree.node(id).balance
    }

    fn set_balance(&mut self, id: NodeId, balance: i8) {
        self.tree.node_mut(id).balance = balance;
    }

    fn select_rotation(&self, pivot: NodeId) -> Rotation {
        let node = self.tree.node(pivot);
        match (node.balance, node.left, node.right) {
            (-2, Some(left), _) => {
                if self.balance(left) <= 0 {
                    Rotation::LeftLeft
                } else {
                    Rotation::LeftRight
                }
            }
            (2, _, Some(right)) => {
                if self.balance(right) >= 0 {
                    Rotation::RightRight
                } else {
                    Rotation::RightLeft
                }
            }
            (balance, ..) => unreachable!("no rotation for balance {} at {}", balance, pivot),
        }
    }

    /// Restores balance at `pivot`, whose factor is ±2. Returns the new subtree root and
    /// whether the subtree ended up one level shorter than before the rotation.
    ///
    /// The caller relinks the returned root into the parent.
    fn rotate(&mut self, pivot: NodeId) -> (NodeId, bool) {
        let rotation = self.select_rotation(pivot);
        log::trace!("{:?} rotation at {}", rotation, pivot);

        match rotation {
            Rotation::LeftLeft => self.single_rotation(pivot, Side::Left),
            Rotation::RightRight => self.single_rotation(pivot, Side::Right),
            Rotation::LeftRight => (self.double_rotation(pivot, Side::Left), true),
            Rotation::RightLeft => (self.double_rotation(pivot, Side::Right), true),
        }
    }

    // `heavy` is the side of `pivot` that is two levels taller
    fn single_rotation(&mut self, pivot: NodeId, heavy: Side) -> (NodeId, bool) {
        let top = self.turn(pivot, heavy.opposite());
        let delta = heavy.delta();

        // a balanced child only happens on removal and keeps the height
        if self.balance(top) == 0 {
            self.set_balance(pivot, delta);
            self.set_balance(top, -delta);
            (top, false)
        } else {
            self.set_balance(pivot, 0);
            self.set_balance(top, 0);
            (top, true)
        }
    }

    fn double_rotation(&mut self, pivot: NodeId, heavy: Side) -> NodeId {
        let Some(child) = self.tree.node(pivot).child(heavy) else {
            unreachable!("heavy side of {} is empty", pivot);
        };

        let grandchild = self.turn(child, heavy);
        *self.tree.node_mut(pivot).child_mut(heavy) = Some(grandchild);
        let top = self.turn(pivot, heavy.opposite());

        let delta = heavy.delta();
        let (pivot_balance, child_balance) = match self.balance(top) {
            0 => (0, 0),
            balance if balance == delta => (-delta, 0),
            _ => (0, delta),
        };
        self.set_balance(pivot, pivot_balance);
        self.set_balance(child, child_balance);
        self.set_balance(top, 0);

        top
    }

    /// Rotates the subtree at `id` towards `direction`, lifting the child on the other
    /// side. Only links change, balance factors are left to the caller.
    fn turn(&mut self, id: NodeId, direction: Side) -> NodeId {
        let lifted_side = direction.opposite();
        let Some(lifted) = self.tree.node(id).child(lifted_side) else {
            unreachable!("nothing to lift at {}", id);
        };

        let inner = self.tree.node(lifted).child(direction);
        *self.tree.node_mut(id).child_mut(lifted_side) = inner;
        *self.tree.node_mut(lifted).child_mut(direction) = Some(id);

        lifted
    }
}

impl<T: Ord> AvlTree<T> {
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
        let (mut child, mut path) = self.tree.attach(element)?;

        while let Some(next) = path.pop() {
            let Some(side) = self.tree.node(next).side_of(child) else {
                unreachable!("{} is not a child of {}", child, next);
            };
            let balance = self.balance(next);

            if balance == 0 {
                // subtree grew, keep going
                self.set_balance(next, side.delta());
                child = next;
                continue;
            }

            if balance != side.delta() {
                // filled the shorter side
                self.set_balance(next, 0);
                break;
            }

            self.set_balance(next, balance + side.delta());
            let (top, _) = self.rotate(next);
            self.tree.replace_child(path.peek(), next, Some(top));
            break;
        }

        Ok(())
    }

    pub fn remove(&mut self, element: &T) -> bool {
        self.take(element).is_some()
    }

    /// Removes `element` and hands back the stored value.
    pub fn take(&mut self, element: &T) -> Option<T> {
        let Removal { element, mut path, mut side } = self.tree.detach(element)?;

        while let Some(pivot) = path.pop() {
            let balance = self.balance(pivot) - side.delta();
            self.set_balance(pivot, balance);

            let top = match balance {
                // was even, height unchanged
                -1 | 1 => break,
                0 => pivot,
                _ => {
                    let (top, shrunk) = self.rotate(pivot);
                    self.tree.replace_child(path.peek(), pivot, Some(top));
                    if !shrunk {
                        break;
                    }
                    top
                }
            };

            let Some(parent) = path.peek() else {
                break;
            };
            side = match self.tree.node(parent).side_of(top) {
                Some(side) => side,
                None => unreachable!("{} is not a child of {}", top, parent),
            };
        }

        if !path.is_empty() {
            log::trace!("rebalancing stopped {} levels below the root", path.len());
        }

        Some(element)
    }

    pub fn contains(&self, element: &T) -> bool {
        self.tree.contains(element)
    }
}

impl<T: Ord> OrderedTree<T> for AvlTree<T> {
    fn insert(&mut self, element: T) -> Result<(), TreeError> {
        AvlTree::insert(self, element)
    }

    fn remove(&mut self, element: &T) -> bool {
        AvlTree::remove(self, element)
    }

    fn contains(&self, element: &T) -> bool {
        AvlTree::contains(self, element)
    }

    fn len(&self) -> usize {
        AvlTree::len(self)
    }

    fn clear(&mut self) {
        AvlTree::clear(self)
    }

    fn height(&self) -> usize {
        AvlTree::height(self)
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

impl<T: Ord> PartialEq for AvlTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Ord> Eq for AvlTree<T> {}

impl<T: Ord> TryFrom<Vec<T>> for AvlTree<T> {
    type Error = TreeError;

    fn try_from(value: Vec<T>) -> Result<Self, Self::Error> {
        Self::try_from_iter(value)
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
impl<T: Ord> AvlTree<T> {
    pub(crate) fn assert_valid(&self) {
        self.tree.assert_valid(true);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn tree_of(elements: &[i32]) -> AvlTree<i32> {
        let tree = AvlTree::try_from_iter(elements.iter().copied()).unwrap();
        tree.assert_valid();
        tree
    }

    fn root_of(tree: &AvlTree<i32>) -> Option<i32> {
        tree.root().map(|root| *root.element())
    }

    fn elements(tree: &AvlTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree: AvlTree<i32> = AvlTree::new();
        assert_eq!(tree.iter().count(), 0);
        assert_eq!(tree.height(), 0);
        assert!(tree.is_empty());
        assert_eq!(root_of(&tree), None);
    }

    #[test]
    fn test_single_insertion() {
        let tree = tree_of(&[10]);
        assert_eq!(elements(&tree), vec![10]);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.root().map(|root| root.balance()), Some(0));
    }

    #[test]
    fn test_multiple_insertions() {
        let tree = tree_of(&[10, 20, 5, 6, 15]);
        assert_eq!(elements(&tree), vec![5, 6, 10, 15, 20]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_insert_duplicates() {
        let mut tree = tree_of(&[10]);
        assert_eq!(tree.insert(10), Err(TreeError::DuplicateElement));
        assert_eq!(tree.len(), 1);
        tree.insert(20).unwrap();

        assert_eq!(elements(&tree), vec![10, 20]);
        tree.assert_valid();
    }

    #[test]
    fn test_duplicate_in_source() {
        assert_eq!(AvlTree::try_from(vec![3, 1, 3]), Err(TreeError::DuplicateElement));
        assert_eq!(AvlTree::try_from_iter([1, 2, 2]), Err(TreeError::DuplicateElement));
    }

    #[test]
    fn test_left_rotation() {
        let tree = tree_of(&[10, 20, 30]);
        assert_eq!(root_of(&tree), Some(20));
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_right_rotation() {
        let tree = tree_of(&[30, 20, 10]);
        assert_eq!(root_of(&tree), Some(20));
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_left_right_rotation() {
        let tree = tree_of(&[30, 10, 20]);
        assert_eq!(root_of(&tree), Some(20));
        assert_eq!(elements(&tree), vec![10, 20, 30]);
    }

    #[test]
    fn test_right_left_rotation() {
        let tree = tree_of(&[10, 30, 20]);
        assert_eq!(root_of(&tree), Some(20));
        assert_eq!(elements(&tree), vec![10, 20, 30]);
    }

    #[test]
    fn test_rotation_below_root() {
        // 7 unbalances 5, the root is untouched
        let tree = tree_of(&[10, 20, 5, 6, 15, 7]);
        assert_eq!(root_of(&tree), Some(10));
        assert_eq!(tree.root().and_then(|root| root.left()).map(|node| *node.element()), Some(6));
        assert_eq!(elements(&tree), vec![5, 6, 7, 10, 15, 20]);
    }

    #[test]
    fn test_ascending_insertions_stay_shallow() {
        let tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tree.height(), 3);
        assert_eq!(root_of(&tree), Some(4));
    }

    #[test]
    fn test_balanced_scenario() {
        let tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(root_of(&tree), Some(5));

        let root = tree.root().unwrap();
        let left = root.left().unwrap();
        let right = root.right().unwrap();
        assert_eq!(*left.element(), 3);
        assert_eq!(*right.element(), 8);

        assert!(tree.contains(&4));
        assert!(!tree.contains(&6));
    }

    #[test]
    fn test_remove_root_after_balancing() {
        let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
        assert!(tree.remove(&4));
        tree.assert_valid();

        assert!(!tree.contains(&4));
        for element in [1, 2, 3, 5, 6, 7] {
            assert!(tree.contains(&element));
        }
        assert!(tree.height() <= 3);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_remove_forces_left_right() {
        let mut tree = tree_of(&[30, 10, 40, 20]);
        assert!(tree.remove(&40));
        tree.assert_valid();

        assert_eq!(root_of(&tree), Some(20));
        assert_eq!(elements(&tree), vec![10, 20, 30]);
    }

    #[test]
    fn test_remove_forces_right_left() {
        let mut tree = tree_of(&[10, 5, 30, 20]);
        assert!(tree.remove(&5));
        tree.assert_valid();

        assert_eq!(root_of(&tree), Some(20));
    }

    #[test]
    fn test_remove_rotation_over_balanced_child() {
        // 30 is even after removing 10, the single rotation keeps the height
        let mut tree = tree_of(&[20, 10, 30, 25, 35]);
        assert!(tree.remove(&10));
        tree.assert_valid();

        let root = tree.root().unwrap();
        assert_eq!(*root.element(), 30);
        assert_eq!(root.balance(), -1);
        assert_eq!(root.left().map(|node| node.balance()), Some(1));
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_remove_rotates_twice() {
        // removing 12 unbalances 11, and after that rotation the root 8 is off by two
        let mut tree = tree_of(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
        assert_eq!(root_of(&tree), Some(8));

        assert!(tree.remove(&12));
        tree.assert_valid();

        assert_eq!(root_of(&tree), Some(5));
        assert_eq!(tree.height(), 4);
        assert_eq!(elements(&tree), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut tree = tree_of(&[2, 1, 3]);
        assert!(!tree.remove(&4));
        assert!(!tree.remove(&4));
        assert_eq!(tree.len(), 3);
        tree.assert_valid();
    }

    #[test]
    fn test_contains_after_insert_and_remove() {
        let mut tree = AvlTree::new();
        tree.insert(7).unwrap();
        assert!(tree.contains(&7));

        assert!(tree.remove(&7));
        assert!(!tree.contains(&7));
        assert!(!tree.remove(&7));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_take_returns_element() {
        let mut tree = tree_of(&[5, 3, 8]);
        assert_eq!(tree.take(&5), Some(5));
        assert_eq!(tree.take(&5), None);
        tree.assert_valid();
    }

    #[test]
    fn test_insertion_order_does_not_affect_result() {
        let tree1 = tree_of(&[10, 20, 5]);
        let tree2 = tree_of(&[5, 20, 10]);

        assert_eq!(elements(&tree1), elements(&tree2));
        assert_eq!(tree1, tree2);
    }

    #[test]
    fn test_equality_ignores_shape() {
        let mut tree1 = tree_of(&[1, 2, 3, 4]);
        let tree2 = tree_of(&[4, 3, 2, 1]);
        assert_eq!(tree1, tree2);

        tree1.remove(&4);
        assert_ne!(tree1, tree2);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut tree = tree_of(&[1, 2, 3, 4, 5]);
        let copy = tree.clone();
        tree.remove(&3);
        tree.insert(6).unwrap();

        assert_eq!(elements(&copy), vec![1, 2, 3, 4, 5]);
        copy.assert_valid();
        tree.assert_valid();
    }

    #[test]
    fn test_move_leaves_empty() {
        let mut tree = tree_of(&[1, 2, 3]);
        let moved = std::mem::take(&mut tree);

        assert!(tree.is_empty());
        assert_eq!(moved.len(), 3);
        moved.assert_valid();
    }

    #[test]
    fn test_large_input() {
        let mut tree = AvlTree::new();
        for i in 1..=1000 {
            tree.insert(i).unwrap();
        }
        tree.assert_valid();
        assert_eq!(elements(&tree), (1..=1000).collect::<Vec<_>>());
        // 1.44 * log2(1001)
        assert!(tree.height() <= 14);

        for i in (2..=1000).step_by(2) {
            assert!(tree.remove(&i));
        }
        tree.assert_valid();
        assert_eq!(elements(&tree), (1..=1000).step_by(2).collect::<Vec<_>>());
    }

    #[test]
    fn test_validates_after_every_removal() {
        let mut tree = tree_of(&(0..64).collect::<Vec<_>>());
        for i in (0..64).rev().step_by(3) {
            assert!(tree.remove(&i));
            tree.assert_valid();
        }
        for i in 0..64 {
            tree.remove(&i);
            tree.assert_valid();
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_first_last() {
        let tree = tree_of(&[10, 20, 5, 15]);
        assert_eq!(tree.first(), Some(&5));
        assert_eq!(tree.last(), Some(&20));
    }

    #[test]
    fn test_get_existing_value() {
        let tree = tree_of(&[10, 20, 5, 15]);

        assert_eq!(tree.get_by(|x| 10.cmp(x)), Some(&10));
        assert_eq!(tree.get_by(|x| 5.cmp(x)), Some(&5));
        assert_eq!(tree.get_by(|x| 20.cmp(x)), Some(&20));
        assert_eq!(tree.get_by(|x| 15.cmp(x)), Some(&15));
    }

    #[test]
    fn test_get_non_existing_value() {
        let tree = tree_of(&[10, 20, 5]);

        assert_eq!(tree.get_by(|x| 15.cmp(x)), None);
        assert_eq!(tree.get_by(|x| 30.cmp(x)), None);
        assert_eq!(tree.get_by(|x| 100.cmp(x)), None);
    }

    #[test]
    fn test_get_by_projection() {
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
        struct Span {
            start: u64,
            end: u64,
        }

        let mut tree = AvlTree::new();
        tree.insert(Span { start: 10, end: 20 }).unwrap();
        tree.insert(Span { start: 30, end: 50 }).unwrap();
        tree.insert(Span { start: 60, end: 90 }).unwrap();

        let find = |pos: u64| {
            tree.get_by(|span| {
                if pos < span.start {
                    Ordering::Less
                } else if pos > span.end {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
        };

        assert_eq!(find(40).map(|span| span.start), Some(30));
        assert_eq!(find(90).map(|span| span.start), Some(60));
        assert_eq!(find(25), None);
    }

    #[test]
    fn test_through_trait() {
        fn fill<O: OrderedTree<i32>>(tree: &mut O) {
            for i in 0..15 {
                tree.insert(i).unwrap();
            }
        }

        let mut tree = AvlTree::new();
        fill(&mut tree);
        assert_eq!(OrderedTree::height(&tree), 4);
        assert!(OrderedTree::remove(&mut tree, &3));
        assert!(!OrderedTree::contains(&tree, &3));
        OrderedTree::clear(&mut tree);
        assert!(OrderedTree::is_empty(&tree));
    }

    fn run_ops(ops: &[(bool, i8)]) -> bool {
        let mut tree = AvlTree::new();
        let mut set = BTreeSet::new();

        for &(insert, value) in ops {
            if insert {
                assert_eq!(tree.insert(value).is_ok(), set.insert(value));
            } else {
                assert_eq!(tree.remove(&value), set.remove(&value));
            }
            tree.assert_valid();
        }

        tree.len() == set.len() && tree.iter().eq(set.iter())
    }

    quickcheck::quickcheck! {
        fn prop_matches_btreeset(ops: Vec<(bool, i8)>) -> bool {
            run_ops(&ops)
        }

        fn prop_insert_all_then_remove_all(values: Vec<i16>) -> bool {
            let mut tree = AvlTree::new();
            let mut set = BTreeSet::new();
            for value in &values {
                assert_eq!(tree.insert(*value).is_ok(), set.insert(*value));
            }
            tree.assert_valid();

            for value in &values {
                tree.remove(value);
                tree.assert_valid();
            }
            tree.is_empty()
        }

        fn prop_height_is_logarithmic(values: Vec<u16>) -> bool {
            let set: BTreeSet<_> = values.into_iter().collect();
            let tree = AvlTree::try_from_iter(set.iter().copied()).unwrap();
            let bound = 1.45 * ((set.len() + 2) as f64).log2();
            tree.height() as f64 <= bound
        }
    }
}
