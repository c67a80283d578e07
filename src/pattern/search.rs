//! Search driver: find every non-overlapping match in a document.
//!
//! The document is traversed in pre-order and the matcher is anchored at
//! every atom, paired with the remaining tail at that nesting level. A match
//! may therefore start inside an indented block, but it never escapes the
//! block it started in.

use crate::loc::{Loc, Pos};
use crate::tree::Node;

use super::matcher::{Capture, match_at};
use super::parser::Pattern;

/// One match: the source region it covers and the metavariable captures, in
/// binding order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub region: Loc,
    pub captures: Vec<Capture>,
}

/// Find all matches of `pattern` in `doc`, in source order, pairwise
/// non-overlapping. The leftmost candidate wins; later candidates must start
/// strictly after the previous match's end.
pub fn search(pattern: &Pattern, doc: &[Node], trace: bool) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut last_end: Option<Pos> = None;
    scan(pattern.nodes(), doc, trace, &mut last_end, &mut matches);
    matches
}

fn scan(
    pat: &[Node],
    level: &[Node],
    trace: bool,
    last_end: &mut Option<Pos>,
    out: &mut Vec<Match>,
) {
    let mut rest = level;
    while let Some((node, tail)) = rest.split_first() {
        match node {
            Node::Atom(loc, _) => {
                if last_end.is_none_or(|end| loc.start > end)
                    && let Some((env, last_loc)) = match_at(pat, rest, *loc, trace)
                {
                    *last_end = Some(last_loc.end);
                    out.push(Match {
                        region: Loc::new(loc.start, last_loc.end),
                        captures: env.into_captures(),
                    });
                }
            }
            Node::List(children) => scan(pat, children, trace, last_end, out),
        }
        rest = tail;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
