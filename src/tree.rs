//! The token tree shared by documents and patterns.
//!
//! Both sides of a search are the same shape: a sequence of atoms and
//! indented blocks. Documents only ever contain [`AtomKind::Word`],
//! [`AtomKind::Punct`] and [`AtomKind::Byte`]; the pattern parser is the sole
//! producer of the remaining variants.

use std::fmt;

use crate::loc::Loc;

/// A classified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomKind {
    /// Identifier-like run of ASCII alphanumerics and `_`.
    Word(String),
    /// A single printable punctuation character.
    Punct(char),
    /// Fallback for anything else, one byte at a time.
    Byte(u8),
    /// Pattern only: captures one document word; repeat occurrences must
    /// capture the same text.
    Metavar(String),
    /// Pattern only: `...`, licensing a bounded skip.
    Dots,
    /// Pattern only: sentinel closing the top-level pattern sequence.
    End,
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomKind::Word(w) => write!(f, "{w}"),
            AtomKind::Punct(c) => write!(f, "{c}"),
            AtomKind::Byte(b) => write!(f, "\\x{b:02x}"),
            AtomKind::Metavar(name) => write!(f, "${name}"),
            AtomKind::Dots => write!(f, "..."),
            AtomKind::End => write!(f, "<end>"),
        }
    }
}

/// A token tree node: a leaf atom or an indented block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Atom(Loc, AtomKind),
    List(Vec<Node>),
}

/// Location of the last atom in `nodes`, descending into blocks.
pub fn last_atom_loc(nodes: &[Node]) -> Option<Loc> {
    nodes.iter().rev().find_map(|node| match node {
        Node::Atom(loc, _) => Some(*loc),
        Node::List(children) => last_atom_loc(children),
    })
}

/// Iterate the atoms of `nodes` in source order, descending into blocks.
pub fn atoms(nodes: &[Node]) -> Atoms<'_> {
    Atoms {
        stack: vec![nodes.iter()],
    }
}

pub struct Atoms<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Atoms<'a> {
    type Item = (&'a Loc, &'a AtomKind);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(Node::Atom(loc, kind)) => return Some((loc, kind)),
                Some(Node::List(children)) => self.stack.push(children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}
