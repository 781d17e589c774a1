use std::io;

use anyhow::{bail, Result};
use avltree::{AvlTree, BinarySearchTree, Iter, NodeRef, OrderedTree};
use clap::ValueEnum;
use thiserror::Error;

use crate::printer::Printer;

#[derive(Debug, Error, PartialEq)]
pub enum ReplError {
    #[error("invalid command")]
    InvalidCommand,
    #[error("invalid value {0}")]
    InvalidValue(String),
    #[error("missing argument")]
    MissingArgument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeKind {
    Avl,
    Bst,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Insert(Vec<i64>),
    Remove(Vec<i64>),
    Contains(i64),
    List,
    Print,
    Len,
    Height,
    Clear,
    Help,
    Quit,
}

impl TryFrom<&str> for Command {
    type Error = anyhow::Error;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let words = shlex::split(line).ok_or(ReplError::InvalidCommand)?;
        let Some((name, args)) = words.split_first() else {
            bail!(ReplError::InvalidCommand);
        };

        let command = match name.as_str() {
            "insert" | "i" => Command::Insert(parse_values(args)?),
            "remove" | "rm" => Command::Remove(parse_values(args)?),
            "contains" | "c" => match parse_values(args)?.as_slice() {
                [value] => Command::Contains(*value),
                _ => bail!(ReplError::InvalidCommand),
            },
            "list" | "l" => Command::List,
            "print" | "p" => Command::Print,
            "len" => Command::Len,
            "height" => Command::Height,
            "clear" => Command::Clear,
            "help" | "h" => Command::Help,
            "quit" | "q" => Command::Quit,
            _ => bail!(ReplError::InvalidCommand),
        };

        Ok(command)
    }
}

fn parse_values(args: &[String]) -> Result<Vec<i64>, ReplError> {
    if args.is_empty() {
        return Err(ReplError::MissingArgument);
    }

    args.iter()
        .map(|arg| arg.parse::<i64>().map_err(|_| ReplError::InvalidValue(arg.clone())))
        .collect()
}

pub enum Session {
    Avl(AvlTree<i64>),
    Bst(BinarySearchTree<i64>),
}

impl Session {
    pub fn new(kind: TreeKind) -> Self {
        match kind {
            TreeKind::Avl => Session::Avl(AvlTree::new()),
            TreeKind::Bst => Session::Bst(BinarySearchTree::new()),
        }
    }

    pub fn tree(&self) -> &dyn OrderedTree<i64> {
        match self {
            Session::Avl(tree) => tree,
            Session::Bst(tree) => tree,
        }
    }

    pub fn tree_mut(&mut self) -> &mut dyn OrderedTree<i64> {
        match self {
            Session::Avl(tree) => tree,
            Session::Bst(tree) => tree,
        }
    }

    fn root(&self) -> Option<NodeRef<'_, i64>> {
        match self {
            Session::Avl(tree) => tree.root(),
            Session::Bst(tree) => tree.root(),
        }
    }

    fn iter(&self) -> Iter<'_, i64> {
        match self {
            Session::Avl(tree) => tree.iter(),
            Session::Bst(tree) => tree.iter(),
        }
    }

    /// Runs one command. Returns whether the session should end.
    pub fn handle(&mut self, command: Command, out: &mut impl io::Write) -> Result<bool> {
        match command {
            Command::Insert(values) => {
                for value in values {
                    self.tree_mut().insert(value)?;
                    writeln!(out, "inserted {}", value)?;
                }
            }
            Command::Remove(values) => {
                for value in values {
                    if self.tree_mut().remove(&value) {
                        writeln!(out, "removed {}", value)?;
                    } else {
                        writeln!(out, "{} not found", value)?;
                    }
                }
            }
            Command::Contains(value) => writeln!(out, "{}", self.tree().contains(&value))?,
            Command::List => {
                let elements = self.iter().map(|element| element.to_string()).collect::<Vec<_>>();
                writeln!(out, "{}", elements.join(" "))?;
            }
            Command::Print => Printer::new(matches!(self, Session::Avl(_))).print(out, self.root())?,
            Command::Len => writeln!(out, "{}", self.tree().len())?,
            Command::Height => writeln!(out, "{}", self.tree().height())?,
            Command::Clear => self.tree_mut().clear(),
            Command::Help => help(out)?,
            Command::Quit => return Ok(true),
        }

        Ok(false)
    }
}

fn help(out: &mut impl io::Write) -> io::Result<()> {
    write!(
        out,
        "Commands:

insert | i <n>... - insert elements
remove | rm <n>... - remove elements
contains | c <n> - check whether an element is stored
list | l - print elements in order
print | p - print the tree shape
len - print the number of elements
height - print the tree height
clear - remove all elements
help | h - show this help
quit | q - quit
"
    )
}
