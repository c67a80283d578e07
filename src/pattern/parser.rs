//! Pattern parser: pattern text to a pattern token tree.
//!
//! The text is lexed exactly like a document, then rewritten: `$NAME` pairs
//! fuse into metavariable atoms, triple dots fuse into ellipsis atoms, and an
//! [`AtomKind::End`] sentinel is appended to the top-level sequence so a
//! match may end before the document does. Nested blocks get no sentinel: an
//! indented pattern block must account for the whole document block it is
//! matched against.

use std::iter::Peekable;

use crate::lexer::lex;
use crate::loc::Loc;
use crate::tree::{AtomKind, Node, last_atom_loc};

/// Errors that can occur while parsing a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern contains no tokens.
    Empty,
    /// A run of four or more consecutive dots.
    TooManyDots,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Pattern contains no tokens"),
            Self::TooManyDots => write!(f, "Too many consecutive dots (at most three)"),
        }
    }
}

impl std::error::Error for PatternError {}

/// A parsed pattern, ready for [`search`](crate::pattern::search::search).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    nodes: Vec<Node>,
}

impl Pattern {
    /// Parse pattern text.
    pub fn parse(text: &str) -> Result<Pattern, PatternError> {
        let mut nodes = rewrite(lex(text))?;
        let last = last_atom_loc(&nodes).ok_or(PatternError::Empty)?;
        // Zero-width sentinel at the end of the last atom.
        nodes.push(Node::Atom(Loc::new(last.end, last.end), AtomKind::End));
        Ok(Pattern { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

fn rewrite(nodes: Vec<Node>) -> Result<Vec<Node>, PatternError> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut it = nodes.into_iter().peekable();
    while let Some(node) = it.next() {
        match node {
            Node::List(children) => out.push(Node::List(rewrite(children)?)),
            Node::Atom(loc, AtomKind::Punct('$')) => out.push(fuse_metavar(loc, &mut it)),
            Node::Atom(loc, AtomKind::Punct('.')) => fuse_dots(loc, &mut it, &mut out)?,
            other => out.push(other),
        }
    }
    Ok(out)
}

/// A `$` glued to an `[A-Z][A-Z0-9_]*` word becomes a metavariable; any
/// other `$` stays an ordinary punct and matches literally.
fn fuse_metavar(loc: Loc, it: &mut Peekable<impl Iterator<Item = Node>>) -> Node {
    let glued = matches!(it.peek(),
        Some(Node::Atom(next, AtomKind::Word(name))) if loc.touches(next) && is_metavar_name(name));
    if glued
        && let Some(Node::Atom(next, AtomKind::Word(name))) = it.next()
    {
        Node::Atom(loc.union(next), AtomKind::Metavar(name))
    } else {
        Node::Atom(loc, AtomKind::Punct('$'))
    }
}

/// Exactly three adjacent dots fuse into one ellipsis atom. One or two stay
/// ordinary puncts; four or more is an error rather than a guess.
fn fuse_dots(
    first: Loc,
    it: &mut Peekable<impl Iterator<Item = Node>>,
    out: &mut Vec<Node>,
) -> Result<(), PatternError> {
    let mut locs = vec![first];
    loop {
        let adjacent = matches!(it.peek(),
            Some(Node::Atom(next, AtomKind::Punct('.'))) if locs.last().unwrap().touches(next));
        if !adjacent {
            break;
        }
        let Some(Node::Atom(next, _)) = it.next() else {
            unreachable!()
        };
        locs.push(next);
    }
    match locs.len() {
        3 => out.push(Node::Atom(locs[0].union(locs[2]), AtomKind::Dots)),
        n if n > 3 => return Err(PatternError::TooManyDots),
        _ => out.extend(
            locs.into_iter()
                .map(|loc| Node::Atom(loc, AtomKind::Punct('.'))),
        ),
    }
    Ok(())
}

fn is_metavar_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes[0].is_ascii_uppercase()
        && bytes[1..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || *b == b'_')
}
