use std::iter::FusedIterator;

use slab::Slab;

use crate::node::{Node, NodeId};

/// In-order iterator over the elements of a tree.
pub struct Iter<'a, T> {
    nodes: &'a Slab<Node<T>>,
    stack: Vec<NodeId>,           // stack to simulate the recursion
    current_node: Option<NodeId>, // the current node we're visiting
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(nodes: &'a Slab<Node<T>>, root: Option<NodeId>) -> Self {
        Self {
            nodes,
            stack: Vec::new(),
            current_node: root,
            remaining: nodes.len(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // traverse the leftmost path first
        while let Some(id) = self.current_node {
            self.stack.push(id);
            self.current_node = self.nodes[id].left;
        }

        let id = self.stack.pop()?;
        let node = &self.nodes[id];
        // visiting the node, the right side comes next
        self.current_node = node.right;
        self.remaining -= 1;

        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
