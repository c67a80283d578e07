use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;

use stgrep::{Pattern, RenderOptions, Source, lex, print_matches, search};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pattern, in the document's own token language
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// Files to search; stdin when none given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// When to highlight matched text
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,

    /// Print match counts instead of matched text
    #[arg(short = 'c', long)]
    count: bool,

    /// Print metavariable captures under each match
    #[arg(long)]
    captures: bool,

    /// Never prefix output with file names
    #[arg(long, conflicts_with = "with_filename")]
    no_filename: bool,

    /// Always prefix output with file names
    #[arg(short = 'H', long)]
    with_filename: bool,

    /// Dump matcher steps to stderr
    #[arg(long)]
    trace: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

fn main() {
    let args = Args::parse();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("stgrep: {err:#}");
            process::exit(2);
        }
    }
}

/// Returns whether anything matched (grep exit-status convention).
fn run(args: &Args) -> Result<bool> {
    let pattern = Pattern::parse(&args.pattern)?;

    let sources = if args.files.is_empty() {
        vec![Source::from_stdin()?]
    } else {
        args.files
            .iter()
            .map(|path| Source::from_file(path))
            .collect::<Result<Vec<_>>>()?
    };

    let opts = RenderOptions {
        show_path: if args.no_filename {
            false
        } else {
            args.with_filename || sources.len() > 1
        },
        highlight: match args.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => io::stdout().is_terminal(),
        },
        show_captures: args.captures,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut found = false;
    let mut printed = false;

    for source in &sources {
        let text = source.to_string();
        let doc = lex(&text);
        let matches = search(&pattern, &doc, args.trace);
        if args.count {
            if opts.show_path {
                writeln!(out, "{}:{}", source.label(), matches.len())?;
            } else {
                writeln!(out, "{}", matches.len())?;
            }
        } else if !matches.is_empty() {
            if printed {
                writeln!(out)?;
            }
            print_matches(&mut out, source, &matches, &opts)?;
            printed = true;
        }
        found |= !matches.is_empty();
    }
    Ok(found)
}
