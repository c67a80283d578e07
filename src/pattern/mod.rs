//! Structural pattern engine.
//!
//! Patterns are written in the same token language as the documents they
//! search, with two extensions recognized by the pattern parser:
//!
//! # Pattern syntax
//!
//! | Syntax   | Meaning                                                    |
//! |----------|------------------------------------------------------------|
//! | `word`   | Matches the identical word token                           |
//! | `;`      | Any punctuation matches the identical punct token          |
//! | `$X`     | Metavariable: captures one word, equal on every reuse      |
//! | `...`    | Skips unmatched tokens spanning at most 10 lines           |
//! | indent   | An indented pattern block matches only an indented block   |
//!
//! A metavariable name is `[A-Z][A-Z0-9_]*` glued directly to the `$`;
//! anything else (`$x`, `$ X`, a lone `$`) stays ordinary tokens and matches
//! literally. A flat pattern crosses document indentation freely; an
//! indented pattern block must align with a document block and account for
//! all of it.

pub mod matcher;
pub mod parser;
pub mod search;

pub use matcher::{Capture, CaptureEnv};
pub use parser::{Pattern, PatternError};
pub use search::{Match, search};
