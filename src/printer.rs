use std::fmt::Display;
use std::io;

use avltree::NodeRef;

const INDENT: usize = 4;

/// Draws a tree sideways: right subtree above its parent, left subtree below, one
/// level of indentation per depth.
pub struct Printer {
    show_balance: bool,
}

impl Printer {
    pub fn new(show_balance: bool) -> Self {
        Self { show_balance }
    }

    pub fn print<T: Display>(&self, f: &mut impl io::Write, root: Option<NodeRef<'_, T>>) -> io::Result<()> {
        if root.is_none() {
            return writeln!(f, "empty");
        }

        // reverse in-order walk, the right spine goes on the stack first
        let mut stack = Vec::new();
        let mut current = root.map(|node| (node, 0));

        loop {
            while let Some((node, depth)) = current {
                stack.push((node, depth));
                current = node.right().map(|right| (right, depth + 1));
            }

            let Some((node, depth)) = stack.pop() else {
                return Ok(());
            };
            self.print_line(f, node, depth)?;
            current = node.left().map(|left| (left, depth + 1));
        }
    }

    fn print_line<T: Display>(&self, f: &mut impl io::Write, node: NodeRef<'_, T>, depth: usize) -> io::Result<()> {
        write!(f, "{:indent$}{}", "", node.element(), indent = depth * INDENT)?;
        if self.show_balance {
            write!(f, " [{:+}]", node.balance())?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use avltree::{AvlTree, BinarySearchTree};

    use super::*;

    fn render(tree: &AvlTree<i64>, show_balance: bool) -> String {
        let mut buf = Vec::new();
        Printer::new(show_balance).print(&mut buf, tree.root()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_print_empty() {
        assert_eq!(render(&AvlTree::new(), true), "empty\n");
    }

    #[test]
    fn test_print_shape() {
        let tree = AvlTree::try_from(vec![2, 1, 3]).unwrap();
        assert_eq!(render(&tree, false), "    3\n2\n    1\n");
    }

    #[test]
    fn test_print_zigzag() {
        let tree = AvlTree::try_from(vec![4, 2, 6, 1, 3, 5, 7]).unwrap();
        assert_eq!(render(&tree, false), "        7\n    6\n        5\n4\n        3\n    2\n        1\n");
    }

    #[test]
    fn test_print_degenerate_tree() {
        // indentation grows with depth, so the chain is kept short enough to render
        let mut tree = BinarySearchTree::new();
        for i in 0..2_000i64 {
            tree.insert(i).unwrap();
        }

        let mut buf = Vec::new();
        Printer::new(false).print(&mut buf, tree.root()).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert_eq!(out.lines().count(), 2_000);
        assert_eq!(out.lines().last(), Some("0"));
        let first = out.lines().next().unwrap();
        assert_eq!(first.trim_start(), "1999");
        assert_eq!(first.len() - first.trim_start().len(), 1_999 * INDENT);
    }

    #[test]
    fn test_print_balance() {
        let tree = AvlTree::try_from(vec![2, 1]).unwrap();
        assert_eq!(render(&tree, true), "2 [-1]\n    1 [+0]\n");
    }
}
