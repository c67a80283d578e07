//! Where searched text comes from.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use ropey::Rope;

/// A searchable input: an origin label plus its full text, held as a rope so
/// the renderer can slice line ranges without re-scanning.
///
/// The label is what the renderer prints in front of matched lines; the
/// matcher itself never looks at it.
#[derive(Debug, Clone)]
pub struct Source {
    label: String,
    text: Rope,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Source {
    /// Read a file into memory.
    pub fn from_file(path: &Path) -> Result<Source> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Source {
            label: path.display().to_string(),
            text: Rope::from_str(&text),
        })
    }

    /// Read all of stdin.
    pub fn from_stdin() -> Result<Source> {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(Source {
            label: "<stdin>".to_string(),
            text: Rope::from_str(&text),
        })
    }

    /// An in-memory source with an explicit label.
    pub fn from_string(label: &str, text: &str) -> Source {
        Source {
            label: label.to_string(),
            text: Rope::from_str(text),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The rope backing this source. The lexer wants contiguous text
    /// instead; it goes through the `Display` impl.
    pub fn rope(&self) -> &Rope {
        &self.text
    }
}
