//! Command handlers for the brook CLI.
//!
//! Each submodule implements one command. The shared stream options and
//! the grammar/input helpers live in the module root.

use std::path::Path;

use brook_core::{Flags, Grammar};

use crate::grammar_file::{self, GrammarFileError};

mod repl;
mod tokens;

pub use repl::run_repl;
pub use tokens::tokenize_file;

/// Options shared by the streaming commands.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Grammar file path; `None` selects the built-in demo grammar.
    pub grammar: Option<String>,
    /// Token buffer capacity in bytes.
    pub capacity: usize,
    /// Refill chunk size in bytes.
    pub chunk: usize,
    /// Emit one JSON object per token instead of the table format.
    pub json: bool,
    pub flags: Flags,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            grammar: None,
            capacity: 4096,
            chunk: 4096,
            json: false,
            flags: Flags::STRIP_MARKERS,
        }
    }
}

impl StreamOptions {
    /// Parse flags and options. Returns the options plus the first
    /// positional argument, if any.
    pub fn parse(args: &[String]) -> Result<(Self, Option<String>), String> {
        let mut options = Self::default();
        let mut positional = None;

        for arg in args {
            if let Some(path) = arg.strip_prefix("--grammar=") {
                options.grammar = Some(path.to_string());
            } else if let Some(value) = arg.strip_prefix("--buffer=") {
                options.capacity = parse_size("--buffer", value)?;
            } else if let Some(value) = arg.strip_prefix("--chunk=") {
                options.chunk = parse_size("--chunk", value)?;
            } else if arg == "--keep-markers" {
                options.flags.remove(Flags::STRIP_MARKERS);
            } else if arg == "--spaces" {
                options.flags.insert(Flags::SPACE_IN_TOKENS);
            } else if arg == "--union" {
                options.flags.insert(Flags::UNION_DELIMITERS);
            } else if arg == "--json" {
                options.json = true;
            } else if arg.starts_with('-') && arg != "-" {
                return Err(format!("unknown option '{arg}'"));
            } else if positional.is_none() {
                positional = Some(arg.clone());
            } else {
                return Err(format!("unexpected argument '{arg}'"));
            }
        }

        Ok((options, positional))
    }
}

fn parse_size(option: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(format!("{option} must be at least 1")),
        Err(_) => Err(format!("{option} expects a byte count, got '{value}'")),
    }
}

/// Load the requested grammar, or the built-in demo grammar, exiting
/// with a user-friendly error message on failure.
pub(super) fn resolve_grammar(source: Option<&str>) -> Grammar {
    let built = match source {
        Some(path) => grammar_file::load(Path::new(path)),
        None => grammar_file::demo().map_err(GrammarFileError::Invalid),
    };
    match built {
        Ok(grammar) => grammar,
        Err(e) => {
            match source {
                Some(path) => eprintln!("error in '{path}': {e}"),
                None => eprintln!("error: {e}"),
            }
            std::process::exit(1);
        }
    }
}

/// Read a file's raw bytes, or standard input when the path is `-`,
/// exiting with a user-friendly error message on failure.
pub(super) fn read_bytes(path: &str) -> Vec<u8> {
    let result = if path == "-" {
        use std::io::Read;
        let mut buf = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buf).map(|_| buf)
    } else {
        std::fs::read(path)
    };
    match result {
        Ok(bytes) => bytes,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}
