//! Structural grep over token-and-indentation trees.
//!
//! Any text is lexed into words, punctuation and indented blocks; patterns
//! are written in the same token language plus metavariables (`$X`) and
//! ellipsis (`...`). No grammar, no regexes.
//!
//! # Example
//!
//! ```rust
//! use stgrep::{Pattern, lex, search};
//!
//! let pattern = Pattern::parse("f($X)").unwrap();
//! let doc = lex("f(config)\ng(other)\n");
//! let matches = search(&pattern, &doc, false);
//!
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].captures[0].value, "config");
//! ```

pub mod lexer;
pub mod loc;
pub mod pattern;
pub mod render;
pub mod source;
pub mod tree;

pub use lexer::lex;
pub use loc::{Loc, Pos};
pub use pattern::{Capture, Match, Pattern, PatternError, search};
pub use render::{RenderOptions, print_matches};
pub use source::Source;
pub use tree::{AtomKind, Node};
