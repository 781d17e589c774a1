use crate::node::NodeId;

/// Nodes visited while descending from the root, nearest ancestor on top.
#[derive(Debug, Default)]
pub struct Path {
    stack: Vec<NodeId>,
}

impl Path {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, id: NodeId) {
        self.stack.push(id);
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    pub fn peek(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn extend(&mut self, other: Path) {
        self.stack.extend(other.stack);
    }
}
