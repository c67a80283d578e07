//! Lexical layer: raw text to a token-plus-indentation tree.
//!
//! There is no grammar. A word is a maximal run of `[A-Za-z0-9_]`, any other
//! printable ASCII character is a one-character punct atom, and everything
//! else (controls, non-ASCII) falls back to per-byte atoms. Indentation does
//! the only structuring: a line indented deeper than the one before it opens
//! a [`Node::List`], and dedenting closes every deeper block. Blank lines are
//! invisible to the tree.

use crate::loc::{Loc, Pos};
use crate::tree::{AtomKind, Node};

/// An open indentation block while the tree is being built.
struct Block {
    indent: usize,
    nodes: Vec<Node>,
}

/// Tokenize `text` into a document tree.
pub fn lex(text: &str) -> Vec<Node> {
    let mut stack = vec![Block {
        indent: 0,
        nodes: Vec::new(),
    }];
    let mut offset = 0;

    for (line_no, raw) in text.split('\n').enumerate() {
        let line_offset = offset;
        offset += raw.len() + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        let (indent, body_start) = measure_indent(line);
        if body_start == line.len() {
            continue; // blank line
        }

        // Dedent closes blocks; a strictly deeper line opens one. A partial
        // dedent closes down to the innermost enclosing level and then opens
        // a fresh block at the new depth.
        while stack.last().unwrap().indent > indent {
            let block = stack.pop().unwrap();
            stack.last_mut().unwrap().nodes.push(Node::List(block.nodes));
        }
        if indent > stack.last().unwrap().indent {
            stack.push(Block {
                indent,
                nodes: Vec::new(),
            });
        }

        tokenize_line(
            line,
            line_no,
            line_offset,
            body_start,
            &mut stack.last_mut().unwrap().nodes,
        );
    }

    while stack.len() > 1 {
        let block = stack.pop().unwrap();
        stack.last_mut().unwrap().nodes.push(Node::List(block.nodes));
    }
    stack.pop().unwrap().nodes
}

/// Measure leading whitespace. Returns the indentation width (tab advances to
/// the next multiple of 8) and the byte index of the first non-blank byte.
fn measure_indent(line: &str) -> (usize, usize) {
    let bytes = line.as_bytes();
    let mut width = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' => width += 1,
            b'\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
        i += 1;
    }
    (width, i)
}

fn tokenize_line(line: &str, line_no: usize, line_offset: usize, from: usize, out: &mut Vec<Node>) {
    let bytes = line.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b' ' || b == b'\t' {
            i += 1;
            continue;
        }
        let start = i;
        let kind = if b.is_ascii_alphanumeric() || b == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            AtomKind::Word(line[start..i].to_string())
        } else if b.is_ascii_graphic() {
            i += 1;
            AtomKind::Punct(b as char)
        } else {
            i += 1;
            AtomKind::Byte(b)
        };
        let loc = Loc::new(
            Pos::new(line_no, start, line_offset + start),
            Pos::new(line_no, i, line_offset + i),
        );
        out.push(Node::Atom(loc, kind));
    }
}
