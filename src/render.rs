//! Match output: the source lines each region covers, with an optional
//! `path:` prefix and ANSI highlight of the matched byte range.

use std::io::{self, Write};

use crossterm::style::Stylize;
use itertools::{Itertools, Position};
use ropey::Rope;

use crate::pattern::Match;
use crate::source::Source;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Prefix every printed line with the source label.
    pub show_path: bool,
    /// Style the matched byte range (bold red).
    pub highlight: bool,
    /// Print the metavariable captures under each match.
    pub show_captures: bool,
}

/// Print `matches` against their source, separated by blank lines.
pub fn print_matches(
    out: &mut impl Write,
    source: &Source,
    matches: &[Match],
    opts: &RenderOptions,
) -> io::Result<()> {
    for (pos, m) in matches.iter().with_position() {
        if !matches!(pos, Position::First | Position::Only) {
            writeln!(out)?;
        }
        print_match(out, source, source.rope(), m, opts)?;
    }
    Ok(())
}

fn print_match(
    out: &mut impl Write,
    source: &Source,
    rope: &Rope,
    m: &Match,
    opts: &RenderOptions,
) -> io::Result<()> {
    let (start, end) = (m.region.start, m.region.end);
    for line_idx in start.line..=end.line {
        let line_offset = rope.line_to_byte(line_idx);
        let line = rope.line(line_idx).to_string();
        let line = line.trim_end_matches(['\n', '\r']);

        if opts.show_path {
            write!(out, "{}:", source.label())?;
        }
        if opts.highlight {
            // Clamp the region to this line. Byte atoms can end mid-character
            // in multi-byte text, so slice bytes and re-decode lossily.
            let bytes = line.as_bytes();
            let from = start.offset.saturating_sub(line_offset).min(bytes.len());
            let to = end.offset.saturating_sub(line_offset).min(bytes.len());
            let from = from.min(to);
            let matched = String::from_utf8_lossy(&bytes[from..to]);
            write!(out, "{}", String::from_utf8_lossy(&bytes[..from]))?;
            write!(out, "{}", (&*matched).red().bold())?;
            writeln!(out, "{}", String::from_utf8_lossy(&bytes[to..]))?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    if opts.show_captures {
        for c in &m.captures {
            writeln!(out, "{}={}", c.name, c.value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::pattern::{Pattern, search};

    fn render(pattern: &str, text: &str, opts: RenderOptions) -> String {
        let source = Source::from_string("demo.txt", text);
        let pattern = Pattern::parse(pattern).unwrap();
        let matches = search(&pattern, &lex(text), false);
        let mut out = Vec::new();
        print_matches(&mut out, &source, &matches, &opts).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn prints_covered_lines() {
        let text = "f(x) {\n  a;\n}\nother";
        let opts = RenderOptions::default();
        assert_eq!(render("f(x) { a; }", text, opts), "f(x) {\n  a;\n}\n");
    }

    #[test]
    fn blank_line_between_matches() {
        let text = "x\ny\nx";
        let opts = RenderOptions::default();
        assert_eq!(render("x", text, opts), "x\n\nx\n");
    }

    #[test]
    fn path_prefix_on_every_line() {
        let text = "a\n  b";
        let opts = RenderOptions {
            show_path: true,
            ..Default::default()
        };
        assert_eq!(render("a b", text, opts), "demo.txt:a\ndemo.txt:  b\n");
    }

    #[test]
    fn one_capture_line_per_binding() {
        let opts = RenderOptions {
            show_captures: true,
            ..Default::default()
        };
        assert_eq!(
            render("$F($A)", "copy(src)", opts),
            "copy(src)\nF=copy\nA=src\n"
        );
    }

    #[test]
    fn highlight_keeps_surrounding_text() {
        let opts = RenderOptions {
            highlight: true,
            ..Default::default()
        };
        let rendered = render("b", "a b c", opts);
        // The styled segment sits between the untouched flanks.
        assert!(rendered.starts_with("a "));
        assert!(rendered.contains('b'));
        assert!(rendered.ends_with(" c\n"));
    }
}
