//! Grammar definitions loaded from JSON files.
//!
//! The on-disk format mirrors the builder: four optional tables, applied
//! in file order so that array positions become token ids.
//!
//! ```text
//! {
//!   "punctuations": ["==", "!=", "="],
//!   "keywords": ["if", "else"],
//!   "expressions": [{ "begin": "\"", "end": "\"" }],
//!   "delimiters": [{ "lo": 0 }, { "lo": 48, "hi": 57 }]
//! }
//! ```
//!
//! Marker and entry strings are taken as their UTF-8 bytes. Grammars with
//! non-textual entries have to be built through the
//! [`Grammar::builder`] API instead; the file format does not reach them.

use std::fmt;
use std::path::Path;

use brook_core::{Grammar, GrammarError};
use serde::Deserialize;

/// Deserialized grammar file, not yet validated.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct GrammarFile {
    #[serde(default)]
    pub punctuations: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub expressions: Vec<ExpressionEntry>,
    #[serde(default)]
    pub delimiters: Vec<DelimiterEntry>,
}

/// One begin/end marker pair.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ExpressionEntry {
    pub begin: String,
    pub end: String,
}

/// One inclusive delimiter byte range; `hi` defaults to `lo`.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct DelimiterEntry {
    pub lo: u8,
    #[serde(default)]
    pub hi: Option<u8>,
}

impl GrammarFile {
    /// Validate the tables into an engine grammar.
    pub fn into_grammar(self) -> Result<Grammar, GrammarError> {
        let mut builder = Grammar::builder()
            .punctuations(&self.punctuations)
            .keywords(&self.keywords);
        for pair in &self.expressions {
            builder = builder.expression(&pair.begin, &pair.end);
        }
        for range in &self.delimiters {
            builder = builder.delimiter_range(range.lo, range.hi.unwrap_or(range.lo));
        }
        builder.build()
    }
}

/// Why a grammar file could not be turned into a [`Grammar`].
#[derive(Debug)]
pub enum GrammarFileError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid JSON for the schema above.
    Parse(serde_json::Error),
    /// The tables parsed but fail engine validation.
    Invalid(GrammarError),
}

impl fmt::Display for GrammarFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarFileError::Io(e) => write!(f, "cannot read grammar file: {e}"),
            GrammarFileError::Parse(e) => write!(f, "invalid grammar JSON: {e}"),
            GrammarFileError::Invalid(e) => write!(f, "invalid grammar: {e}"),
        }
    }
}

impl std::error::Error for GrammarFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GrammarFileError::Io(e) => Some(e),
            GrammarFileError::Parse(e) => Some(e),
            GrammarFileError::Invalid(e) => Some(e),
        }
    }
}

/// Read, parse, and validate a grammar file.
pub fn load(path: &Path) -> Result<Grammar, GrammarFileError> {
    let text = std::fs::read_to_string(path).map_err(GrammarFileError::Io)?;
    let file: GrammarFile = serde_json::from_str(&text).map_err(GrammarFileError::Parse)?;
    file.into_grammar().map_err(GrammarFileError::Invalid)
}

/// The built-in demonstration grammar, used when no file is given: a
/// small expression language with comparison and arithmetic punctuation,
/// three keywords, and four expression kinds.
pub fn demo() -> Result<Grammar, GrammarError> {
    Grammar::builder()
        .punctuation("==")
        .punctuation("!=")
        .punctuation("=")
        .punctuation("+")
        .punctuation("-")
        .punctuation("*")
        .punctuation("/")
        .punctuation(",")
        .punctuation(";")
        .keyword("if")
        .keyword("else")
        .keyword("fi")
        .expression("\"", "\"")
        .expression("'", "'")
        .expression("(", ")")
        .expression("{", "}")
        .build()
}
