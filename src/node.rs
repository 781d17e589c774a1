use slab::Slab;

/// Slab key of a node. Stable for the lifetime of the node.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Balance change caused by growing the subtree on this side.
    pub fn delta(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node<T> {
    pub element: T,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    // height(right) - height(left); only leaves [-1, 1] while rebalancing
    pub balance: i8,
}

impl<T> Node<T> {
    pub fn new(element: T) -> Self {
        Node {
            element,
            left: None,
            right: None,
            balance: 0,
        }
    }

    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn child_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Which side `id` hangs off. `None` if it is not a child of this node.
    pub fn side_of(&self, id: NodeId) -> Option<Side> {
        if self.left == Some(id) {
            Some(Side::Left)
        } else if self.right == Some(id) {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Read-only view of a node, for callers that need the tree shape.
pub struct NodeRef<'a, T> {
    nodes: &'a Slab<Node<T>>,
    id: NodeId,
}

impl<'a, T> NodeRef<'a, T> {
    pub(crate) fn new(nodes: &'a Slab<Node<T>>, id: NodeId) -> Self {
        Self { nodes, id }
    }

    pub fn element(&self) -> &'a T {
        &self.nodes[self.id].element
    }

    pub fn balance(&self) -> i8 {
        self.nodes[self.id].balance
    }

    pub fn left(&self) -> Option<NodeRef<'a, T>> {
        self.nodes[self.id].left.map(|id| NodeRef::new(self.nodes, id))
    }

    pub fn right(&self) -> Option<NodeRef<'a, T>> {
        self.nodes[self.id].right.map(|id| NodeRef::new(self.nodes, id))
    }
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}
