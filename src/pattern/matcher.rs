//! Matcher core: align a pattern against a document prefix.
//!
//! The matcher is a recursive, backtracking walk over two token trees. It is
//! pure: the only outcomes are a completion carrying the capture environment
//! and the location of the last consumed atom, or failure, which callers
//! consume by trying something else. Backtracking is the ordinary return of
//! `None` up the stack; since the environment is threaded as a value, no
//! undo log is needed.
//!
//! Descending into an indented document block with a flat pattern pushes the
//! block's parent tail onto an explicit continuation stack; exhausting the
//! block pops it and resumes in the parent. The empty stack is the
//! full-match continuation: once the document runs out entirely, only
//! ellipsis and the end sentinel may remain in the pattern.

use crate::loc::Loc;
use crate::tree::{AtomKind, Node, atoms};

/// Maximum number of lines a single `...` may span. Chained ellipses extend
/// the cap by this much each.
pub const DOTS_MAX_LINES: usize = 10;

/// One captured metavariable: the name, the word it captured, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    pub value: String,
    pub loc: Loc,
}

/// Insertion-ordered capture environment.
///
/// A name is bound at most once; a repeat occurrence of the metavariable is
/// a consistency check against the first binding, never an overwrite. The
/// environment is cloned at each new binding, so a failed branch simply
/// drops its clone and the caller's environment is intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureEnv {
    bindings: Vec<Capture>,
}

impl CaptureEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a binding by metavariable name.
    pub fn get(&self, name: &str) -> Option<&Capture> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// The captures in binding order.
    pub fn into_captures(self) -> Vec<Capture> {
        self.bindings
    }

    fn bind(&self, name: &str, loc: Loc, value: &str) -> CaptureEnv {
        debug_assert!(self.get(name).is_none());
        let mut next = self.clone();
        next.bindings.push(Capture {
            name: name.to_string(),
            value: value.to_string(),
            loc,
        });
        next
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Attempt to match `pat` against a prefix of `doc`.
///
/// `start_loc` anchors the attempt: it seeds `last_loc` before anything is
/// consumed, so a pattern beginning with `...` measures its line cap from
/// the candidate atom. Returns the environment and the location of the last
/// consumed atom on success.
pub(crate) fn match_at(
    pat: &[Node],
    doc: &[Node],
    start_loc: Loc,
    trace: bool,
) -> Option<(CaptureEnv, Loc)> {
    let ctx = Ctx { trace };
    mtch(
        &ctx,
        None,
        &CaptureEnv::new(),
        start_loc,
        pat,
        doc,
        &Cont::Done,
    )
}

struct Ctx {
    /// Dump each step to stderr.
    trace: bool,
}

/// Pending parent document tails, innermost first.
enum Cont<'a, 'd> {
    /// Nothing to resume: remaining pattern must be satisfiable by nothing.
    Done,
    /// On sub-document exhaustion, resume against `tail` under `parent`.
    Resume {
        tail: &'d [Node],
        parent: &'a Cont<'a, 'd>,
    },
}

// ─── Core rules ─────────────────────────────────────────────────────────────

/// `dots` is the active ellipsis cap: document atoms at or before this line
/// may be skipped, atoms beyond it refuse to match. Consuming any atom
/// clears it.
fn mtch<'d>(
    ctx: &Ctx,
    dots: Option<usize>,
    env: &CaptureEnv,
    last_loc: Loc,
    pat: &[Node],
    doc: &'d [Node],
    cont: &Cont<'_, 'd>,
) -> Option<(CaptureEnv, Loc)> {
    if ctx.trace {
        eprintln!(
            "match dots={dots:?} pat={} doc={}",
            summarize(pat),
            summarize(doc)
        );
    }
    let Some((pat_head, pat_tail)) = pat.split_first() else {
        // Implicit end: the (sub)document must be exhausted too, unless an
        // active ellipsis absorbs the remainder within its line cap.
        return absorb_remaining(doc, dots, last_loc).map(|last| (env.clone(), last));
    };

    match pat_head {
        // Explicit end: hard accept, regardless of remaining document.
        Node::Atom(_, AtomKind::End) => {
            debug_assert!(pat_tail.is_empty(), "End sentinel must be last");
            Some((env.clone(), last_loc))
        }

        // Ellipsis: extend the cap and move on; the skipping itself happens
        // where document atoms are considered.
        Node::Atom(_, AtomKind::Dots) => {
            let cap = match dots {
                None => last_loc.end.line + DOTS_MAX_LINES,
                Some(cap) => cap + DOTS_MAX_LINES,
            };
            mtch(ctx, Some(cap), env, last_loc, pat_tail, doc, cont)
        }

        // An indented pattern block is a structural constraint: it aligns
        // only with an indented document block at the same depth.
        Node::List(pat1) => match doc.split_first() {
            None => {
                if matches_empty(pat1) && matches_empty(pat_tail) {
                    Some((env.clone(), last_loc))
                } else {
                    None
                }
            }
            Some((Node::List(doc1), doc_tail)) => {
                // The block must account for all of doc1: the inner pattern
                // carries no End sentinel, so exhaustion rules apply inside.
                let (env1, last1) = mtch(ctx, None, env, last_loc, pat1, doc1, &Cont::Done)?;
                mtch(ctx, None, &env1, last1, pat_tail, doc_tail, cont)
            }
            Some((Node::Atom(loc, _), doc_tail)) => {
                if let Some(cap) = dots
                    && loc.line() <= cap
                    && let Some(hit) = mtch(ctx, dots, env, last_loc, pat, doc_tail, cont)
                {
                    return Some(hit);
                }
                if matches_empty(pat1) {
                    mtch(ctx, dots, env, last_loc, pat_tail, doc, cont)
                } else {
                    None
                }
            }
        },

        // A flat pattern atom is permissive: it crosses document indentation
        // transparently in both directions.
        Node::Atom(_, pat_kind) => match doc.split_first() {
            None => apply_cont(ctx, dots, env, last_loc, pat, cont),
            Some((Node::List(doc1), doc_tail)) => {
                let resume = Cont::Resume {
                    tail: doc_tail,
                    parent: cont,
                };
                mtch(ctx, dots, env, last_loc, pat, doc1, &resume)
            }
            Some((Node::Atom(doc_loc, doc_kind), doc_tail)) => {
                if let Some(cap) = dots
                    && doc_loc.line() > cap
                {
                    return None;
                }
                match unify(env, pat_kind, doc_kind, *doc_loc) {
                    Unified::Bound(env1) => {
                        if let Some(hit) = mtch(ctx, None, &env1, *doc_loc, pat_tail, doc_tail, cont)
                        {
                            return Some(hit);
                        }
                    }
                    Unified::Plain => {
                        if let Some(hit) = mtch(ctx, None, env, *doc_loc, pat_tail, doc_tail, cont)
                        {
                            return Some(hit);
                        }
                    }
                    Unified::No => {}
                }
                // Under an active ellipsis the atom is skippable, both when
                // it refused to unify and when consuming it led nowhere.
                if dots.is_some() {
                    mtch(ctx, dots, env, last_loc, pat, doc_tail, cont)
                } else {
                    None
                }
            }
        },
    }
}

fn apply_cont<'d>(
    ctx: &Ctx,
    dots: Option<usize>,
    env: &CaptureEnv,
    last_loc: Loc,
    pat: &[Node],
    cont: &Cont<'_, 'd>,
) -> Option<(CaptureEnv, Loc)> {
    match cont {
        Cont::Done => full_match(env, last_loc, pat),
        Cont::Resume { tail, parent } => mtch(ctx, dots, env, last_loc, pat, tail, parent),
    }
}

/// The full-match continuation: with no document left anywhere, only
/// ellipsis (matching nothing) and the end sentinel may remain.
fn full_match(env: &CaptureEnv, last_loc: Loc, pat: &[Node]) -> Option<(CaptureEnv, Loc)> {
    match pat.split_first() {
        None => Some((env.clone(), last_loc)),
        Some((Node::Atom(_, AtomKind::Dots), rest)) => full_match(env, last_loc, rest),
        Some((Node::Atom(_, AtomKind::End), rest)) => {
            debug_assert!(rest.is_empty(), "End sentinel must be last");
            Some((env.clone(), last_loc))
        }
        Some(_) => None,
    }
}

// ─── Atom unification ───────────────────────────────────────────────────────

/// Outcome of aligning one pattern atom with one document atom.
enum Unified {
    /// Atoms align and a new binding was recorded.
    Bound(CaptureEnv),
    /// Atoms align with no new binding.
    Plain,
    /// Atoms do not align.
    No,
}

fn unify(env: &CaptureEnv, pat: &AtomKind, doc: &AtomKind, doc_loc: Loc) -> Unified {
    debug_assert!(
        matches!(
            doc,
            AtomKind::Word(_) | AtomKind::Punct(_) | AtomKind::Byte(_)
        ),
        "document contains a pattern-only atom"
    );
    match (pat, doc) {
        (AtomKind::Metavar(name), AtomKind::Word(value)) => match env.get(name) {
            None => Unified::Bound(env.bind(name, doc_loc, value)),
            Some(first) if first.value == *value => Unified::Plain,
            Some(_) => Unified::No,
        },
        (AtomKind::Word(a), AtomKind::Word(b)) if a == b => Unified::Plain,
        (AtomKind::Punct(a), AtomKind::Punct(b)) if a == b => Unified::Plain,
        (AtomKind::Byte(a), AtomKind::Byte(b)) if a == b => Unified::Plain,
        _ => Unified::No,
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Pattern exhausted: accept the remaining (sub)document if it is empty, or
/// if an active ellipsis cap covers every remaining atom, advancing the last
/// location over what it absorbs.
fn absorb_remaining(doc: &[Node], dots: Option<usize>, last_loc: Loc) -> Option<Loc> {
    if doc.is_empty() {
        return Some(last_loc);
    }
    let cap = dots?;
    let mut last = last_loc;
    for (loc, _) in atoms(doc) {
        if loc.line() > cap {
            return None;
        }
        last = *loc;
    }
    Some(last)
}

/// Whether `nodes` can match the empty document: only ellipsis, the end
/// sentinel, and blocks of the same, recursively.
fn matches_empty(nodes: &[Node]) -> bool {
    nodes.iter().all(|node| match node {
        Node::Atom(_, AtomKind::Dots | AtomKind::End) => true,
        Node::Atom(..) => false,
        Node::List(children) => matches_empty(children),
    })
}

/// Compact one-line rendering of a sequence head for trace output.
fn summarize(nodes: &[Node]) -> String {
    match nodes.split_first() {
        None => "<empty>".to_string(),
        Some((Node::Atom(_, kind), rest)) => format!("{kind} (+{})", rest.len()),
        Some((Node::List(children), rest)) => {
            format!("[{} nodes] (+{})", children.len(), rest.len())
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::loc::Pos;
    use crate::pattern::parser::Pattern;

    /// Match the pattern anchored at the very first document atom.
    fn attempt(pattern: &str, doc_text: &str) -> Option<(CaptureEnv, Loc)> {
        let pattern = Pattern::parse(pattern).unwrap();
        let doc = lex(doc_text);
        let Some(Node::Atom(loc, _)) = doc.first() else {
            panic!("document must start with an atom");
        };
        match_at(pattern.nodes(), &doc, *loc, false)
    }

    fn end_line(pattern: &str, doc_text: &str) -> Option<usize> {
        attempt(pattern, doc_text).map(|(_, last)| last.end.line)
    }

    // --- Unification ---

    #[test]
    fn words_match_by_equality() {
        assert!(attempt("foo", "foo").is_some());
        assert!(attempt("foo", "bar").is_none());
    }

    #[test]
    fn puncts_and_words_do_not_cross() {
        assert!(attempt(";", "x").is_none());
        assert!(attempt("x", ";").is_none());
    }

    #[test]
    fn metavar_binds_words_only() {
        let (env, _) = attempt("$X", "hello").unwrap();
        assert_eq!(env.get("X").unwrap().value, "hello");
        assert!(attempt("$X", ";").is_none());
    }

    #[test]
    fn metavar_rebind_must_agree() {
        assert!(attempt("$X = $X", "y = y").is_some());
        assert!(attempt("$X = $X", "y = z").is_none());
    }

    #[test]
    fn metavar_capture_records_location() {
        let (env, _) = attempt("f ( $X )", "f ( val )").unwrap();
        let cap = env.get("X").unwrap();
        assert_eq!(cap.loc.start.column, 4);
        assert_eq!(cap.loc.end.column, 7);
    }

    // --- End sentinel and exhaustion ---

    #[test]
    fn explicit_end_ignores_document_tail() {
        // The parser appends End, so a top-level prefix match succeeds.
        assert!(attempt("a b", "a b c d e").is_some());
    }

    #[test]
    fn end_location_is_last_consumed_atom() {
        assert_eq!(end_line("a b", "a\nb\nc"), Some(1));
    }

    #[test]
    fn block_must_be_fully_accounted_for() {
        // Inner patterns carry no End: a trailing unmatched token in the
        // document block is fatal.
        assert!(attempt("f:\n  a ;", "f:\n  a ;").is_some());
        assert!(attempt("f:\n  a ;", "f:\n  a ; b").is_none());
    }

    #[test]
    fn trailing_dots_absorbs_block_remainder() {
        assert!(attempt("f:\n  a ...", "f:\n  a ; b ; c").is_some());
    }

    // --- Ellipsis ---

    #[test]
    fn dots_skip_unmatched_atoms() {
        assert!(attempt("a ... z", "a b c z").is_some());
        assert!(attempt("a z", "a b c z").is_none());
    }

    #[test]
    fn dots_cap_is_ten_lines() {
        // `z` on line 10 is the last line the cap from line 0 still covers.
        let near = format!("a{}\nz", "\nx".repeat(9));
        let far = format!("a{}\nz", "\nx".repeat(10));
        assert!(attempt("a ... z", &near).is_some());
        assert!(attempt("a ... z", &far).is_none());
    }

    #[test]
    fn chained_dots_extend_the_cap() {
        let far = format!("a{}\nz", "\nx".repeat(10));
        assert!(attempt("a ... ... z", &far).is_some());
    }

    #[test]
    fn dots_backtrack_over_a_dead_end_anchor() {
        // The first `b` cannot be followed by `c`; the match must revisit
        // the skip alternative and anchor on the second `b`.
        assert!(attempt("a ... b c", "a b x b c").is_some());
    }

    #[test]
    fn absorbed_tail_advances_the_end() {
        // Inside a block the trailing ellipsis absorbs the remainder and the
        // match extends over it.
        assert_eq!(end_line("f:\n  a ...", "f:\n  a b\n  c"), Some(2));
    }

    #[test]
    fn top_level_trailing_dots_are_inert() {
        // The end sentinel follows the ellipsis and accepts immediately, so
        // the region stops at the last consumed atom.
        assert_eq!(end_line("a ...", "a\nb\nc"), Some(0));
    }

    // --- Indentation ---

    #[test]
    fn flat_pattern_crosses_into_blocks() {
        assert!(attempt("a b c", "a\n  b\nc").is_some());
    }

    #[test]
    fn indented_pattern_requires_a_block() {
        assert!(attempt("f:\n  a", "f:\n  a").is_some());
        assert!(attempt("f:\n  a", "f: a").is_none());
    }

    #[test]
    fn empty_matching_block_is_vacuous_against_atoms() {
        // The block consists only of dots, so it may match nothing and the
        // rest of the pattern continues against the flat document.
        assert!(attempt("f:\n  ...\ng", "f:\ng").is_some());
    }

    #[test]
    fn indented_pattern_against_exhausted_document() {
        assert!(attempt("a:\n  ...", "a:").is_some());
        assert!(attempt("a:\n  b", "a:").is_none());
    }

    // --- Environment ---

    #[test]
    fn bindings_keep_insertion_order() {
        let (env, _) = attempt("$A $B $C", "one two three").unwrap();
        let caps = env.into_captures();
        let names: Vec<&str> = caps.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn repeat_occurrence_adds_no_capture() {
        let (env, _) = attempt("$X $X", "w w").unwrap();
        assert_eq!(env.into_captures().len(), 1);
    }

    #[test]
    fn failed_branch_leaves_no_binding() {
        // `$X` first binds `b`, which leads nowhere; after backtracking to
        // the skip alternative the stale binding must be gone.
        let (env, _) = attempt("... $X z", "b c z").unwrap();
        let caps = env.into_captures();
        assert_eq!(caps.len(), 1);
        assert_eq!((caps[0].name.as_str(), caps[0].value.as_str()), ("X", "c"));
    }

    // --- matches_empty ---

    #[test]
    fn empty_acceptance_is_recursive() {
        let pattern = Pattern::parse("...").unwrap();
        assert!(matches_empty(pattern.nodes()));
        let pattern = Pattern::parse("x").unwrap();
        assert!(!matches_empty(pattern.nodes()));
    }

    // --- Guards ---

    #[test]
    fn start_loc_seeds_the_dots_cap() {
        // Pattern starting with `...`: the cap counts from the candidate.
        let pattern = Pattern::parse("... z").unwrap();
        let doc = lex("a\nz");
        let start = Loc::new(Pos::new(0, 0, 0), Pos::new(0, 1, 1));
        let (_, last) = match_at(pattern.nodes(), &doc, start, false).unwrap();
        assert_eq!(last.end.line, 1);
    }
}
