use crate::error::TreeError;

/// Set of unique, totally ordered elements kept in a binary search tree.
pub trait OrderedTree<T: Ord> {
    /// Fails with [`TreeError::DuplicateElement`] if an equal element is already stored.
    /// The tree is left untouched in that case.
    fn insert(&mut self, element: T) -> Result<(), TreeError>;

    /// Returns whether an element was removed. Removing an absent element is a no-op.
    fn remove(&mut self, element: &T) -> bool;

    fn contains(&self, element: &T) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    fn height(&self) -> usize;
}
