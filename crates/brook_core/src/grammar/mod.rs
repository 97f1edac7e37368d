//! Grammar tables: what the engine matches against.
//!
//! A [`Grammar`] is four ordered tables, frozen at build time:
//!
//! - **punctuations**: matched longest-suffix-first against the token being
//!   accumulated, ties broken by earliest table index;
//! - **keywords**: exact-value lookup for a finished token; a miss is not
//!   an error, the token is just unknown;
//! - **expressions**: begin/end marker pairs; the first begin marker (table
//!   order) to end at the newest byte opens the expression, and only the
//!   open pair's end marker closes it (no nesting);
//! - **delimiter ranges**: inclusive byte ranges that split tokens. An
//!   empty table means the default set: every byte below `0x20`, plus
//!   space unless [`Flags::SPACE_IN_TOKENS`] is set.
//!
//! Table index doubles as the token id reported on a match, so insertion
//! order is part of the caller's contract with itself.
//!
//! Markers containing delimiter bytes never match: the delimiter check
//! runs first and splits the token under them. That is a configuration
//! responsibility, not a validated property.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::flags::Flags;


/// Invalid grammar table entry, reported by [`GrammarBuilder::build`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum GrammarError {
    /// Punctuation entries must be non-empty (an empty entry would match
    /// at every byte).
    EmptyPunctuation {
        /// Table index of the offending entry.
        index: usize,
    },
    /// Keyword entries must be non-empty.
    EmptyKeyword {
        /// Table index of the offending entry.
        index: usize,
    },
    /// Expression begin markers must be non-empty.
    EmptyExpressionBegin {
        /// Table index of the offending pair.
        index: usize,
    },
    /// Expression end markers must be non-empty (the expression could
    /// never close).
    EmptyExpressionEnd {
        /// Table index of the offending pair.
        index: usize,
    },
    /// Delimiter ranges are inclusive `lo..=hi`; `lo > hi` is empty and
    /// almost certainly a transposition.
    InvertedDelimiterRange {
        /// Table index of the offending range.
        index: usize,
        /// Low bound as given.
        lo: u8,
        /// High bound as given.
        hi: u8,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::EmptyPunctuation { index } => {
                write!(f, "punctuation {index} is empty")
            }
            GrammarError::EmptyKeyword { index } => {
                write!(f, "keyword {index} is empty")
            }
            GrammarError::EmptyExpressionBegin { index } => {
                write!(f, "expression {index} has an empty begin marker")
            }
            GrammarError::EmptyExpressionEnd { index } => {
                write!(f, "expression {index} has an empty end marker")
            }
            GrammarError::InvertedDelimiterRange { index, lo, hi } => {
                write!(
                    f,
                    "delimiter range {index} is inverted (0x{lo:02x} > 0x{hi:02x})"
                )
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// One begin/end marker pair.
#[derive(Clone, Debug)]
pub(crate) struct ExprPair {
    begin: Box<[u8]>,
    end: Box<[u8]>,
}

impl ExprPair {
    pub(crate) fn begin(&self) -> &[u8] {
        &self.begin
    }

    pub(crate) fn end(&self) -> &[u8] {
        &self.end
    }
}

/// Inclusive byte range.
#[derive(Copy, Clone, Debug)]
struct DelimRange {
    lo: u8,
    hi: u8,
}

impl DelimRange {
    fn contains(self, byte: u8) -> bool {
        self.lo <= byte && byte <= self.hi
    }
}

/// A punctuation suffix match: which entry, and how many trailing bytes.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct PuncMatch {
    pub(crate) index: usize,
    pub(crate) len: usize,
}

/// Frozen tokenization tables. Build one with [`Grammar::builder`], then
/// hand it to [`Lexer::new`](crate::Lexer::new). Reconfiguration means
/// building a new grammar; there is no mutation API.
#[derive(Clone, Debug)]
pub struct Grammar {
    puncs: Box<[Box<[u8]>]>,
    keywords: Box<[Box<[u8]>]>,
    keyword_ids: FxHashMap<Box<[u8]>, usize>,
    exprs: Box<[ExprPair]>,
    delims: Box<[DelimRange]>,
}

impl Grammar {
    /// Start an empty grammar. All tables optional; an entirely empty
    /// grammar splits input into unknown keywords on default delimiters.
    #[must_use]
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// Whether `byte` splits tokens under `flags`.
    ///
    /// Configured ranges replace the default set; [`Flags::UNION_DELIMITERS`]
    /// applies both. [`Flags::SPACE_IN_TOKENS`] only affects the default
    /// set's space byte.
    #[must_use]
    pub fn is_delimiter(&self, byte: u8, flags: Flags) -> bool {
        if !self.delims.is_empty() {
            if self.delims.iter().any(|r| r.contains(byte)) {
                return true;
            }
            if !flags.contains(Flags::UNION_DELIMITERS) {
                return false;
            }
        }
        byte < 0x20 || (byte == b' ' && !flags.contains(Flags::SPACE_IN_TOKENS))
    }

    /// Exact keyword lookup: earliest table index, `None` if absent.
    #[must_use]
    pub fn keyword_id(&self, bytes: &[u8]) -> Option<usize> {
        self.keyword_ids.get(bytes).copied()
    }

    /// Punctuation entry by table index.
    #[must_use]
    pub fn punctuation(&self, id: usize) -> Option<&[u8]> {
        self.puncs.get(id).map(AsRef::as_ref)
    }

    /// Keyword entry by table index.
    #[must_use]
    pub fn keyword(&self, id: usize) -> Option<&[u8]> {
        self.keywords.get(id).map(AsRef::as_ref)
    }

    /// Expression pair by table index.
    #[must_use]
    pub fn expression(&self, id: usize) -> Option<(&[u8], &[u8])> {
        self.exprs.get(id).map(|e| (e.begin(), e.end()))
    }

    /// Number of punctuation entries.
    #[must_use]
    pub fn punctuation_count(&self) -> usize {
        self.puncs.len()
    }

    /// Number of keyword entries.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Number of expression pairs.
    #[must_use]
    pub fn expression_count(&self) -> usize {
        self.exprs.len()
    }

    /// Longest punctuation entry matching a trailing substring of the
    /// accumulated token; ties go to the earliest table index.
    pub(crate) fn longest_punctuation_suffix(&self, acc: &[u8]) -> Option<PuncMatch> {
        let mut best: Option<PuncMatch> = None;
        for (index, p) in self.puncs.iter().enumerate() {
            if acc.ends_with(p) && best.is_none_or(|b| p.len() > b.len) {
                best = Some(PuncMatch {
                    index,
                    len: p.len(),
                });
            }
        }
        best
    }

    /// Whether some longer punctuation entry begins with the `len` matched
    /// trailing bytes of `acc`. Drives the one-byte munch deferral.
    pub(crate) fn punctuation_extends(&self, acc: &[u8], len: usize) -> bool {
        let matched = &acc[acc.len() - len..];
        self.puncs
            .iter()
            .any(|p| p.len() > len && p.starts_with(matched))
    }

    /// First expression pair (table order) whose begin marker ends at the
    /// newest byte; returns the pair's index and the marker's offset within
    /// the accumulated token.
    pub(crate) fn expression_begin_suffix(&self, acc: &[u8]) -> Option<(usize, usize)> {
        self.exprs
            .iter()
            .position(|e| acc.ends_with(e.begin()))
            .map(|index| (index, acc.len() - self.exprs[index].begin().len()))
    }

    /// Punctuation bytes by index. Index comes from a previous match.
    pub(crate) fn punc(&self, index: usize) -> &[u8] {
        &self.puncs[index]
    }

    /// Expression pair by index. Index comes from a previous match.
    pub(crate) fn expr(&self, index: usize) -> &ExprPair {
        &self.exprs[index]
    }
}

/// Accumulates table entries, then validates them into a [`Grammar`].
#[derive(Default, Debug)]
pub struct GrammarBuilder {
    puncs: Vec<Box<[u8]>>,
    keywords: Vec<Box<[u8]>>,
    exprs: Vec<ExprPair>,
    delims: Vec<DelimRange>,
}

impl GrammarBuilder {
    /// Append one punctuation entry.
    #[must_use]
    pub fn punctuation(mut self, entry: impl AsRef<[u8]>) -> Self {
        self.puncs.push(entry.as_ref().into());
        self
    }

    /// Append punctuation entries in iteration order.
    #[must_use]
    pub fn punctuations<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.puncs.extend(entries.into_iter().map(|e| e.as_ref().into()));
        self
    }

    /// Append one keyword entry.
    #[must_use]
    pub fn keyword(mut self, entry: impl AsRef<[u8]>) -> Self {
        self.keywords.push(entry.as_ref().into());
        self
    }

    /// Append keyword entries in iteration order.
    #[must_use]
    pub fn keywords<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.keywords
            .extend(entries.into_iter().map(|e| e.as_ref().into()));
        self
    }

    /// Append one begin/end expression pair.
    #[must_use]
    pub fn expression(mut self, begin: impl AsRef<[u8]>, end: impl AsRef<[u8]>) -> Self {
        self.exprs.push(ExprPair {
            begin: begin.as_ref().into(),
            end: end.as_ref().into(),
        });
        self
    }

    /// Append a single-byte delimiter.
    #[must_use]
    pub fn delimiter(self, byte: u8) -> Self {
        self.delimiter_range(byte, byte)
    }

    /// Append an inclusive delimiter range.
    #[must_use]
    pub fn delimiter_range(mut self, lo: u8, hi: u8) -> Self {
        self.delims.push(DelimRange { lo, hi });
        self
    }

    /// Validate and freeze the tables.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        for (index, p) in self.puncs.iter().enumerate() {
            if p.is_empty() {
                return Err(GrammarError::EmptyPunctuation { index });
            }
        }
        for (index, k) in self.keywords.iter().enumerate() {
            if k.is_empty() {
                return Err(GrammarError::EmptyKeyword { index });
            }
        }
        for (index, e) in self.exprs.iter().enumerate() {
            if e.begin.is_empty() {
                return Err(GrammarError::EmptyExpressionBegin { index });
            }
            if e.end.is_empty() {
                return Err(GrammarError::EmptyExpressionEnd { index });
            }
        }
        for (index, r) in self.delims.iter().enumerate() {
            if r.lo > r.hi {
                return Err(GrammarError::InvertedDelimiterRange {
                    index,
                    lo: r.lo,
                    hi: r.hi,
                });
            }
        }

        let mut keyword_ids = FxHashMap::default();
        for (index, k) in self.keywords.iter().enumerate() {
            // Duplicates resolve to the earliest index.
            keyword_ids.entry(k.clone()).or_insert(index);
        }

        Ok(Grammar {
            puncs: self.puncs.into_boxed_slice(),
            keywords: self.keywords.into_boxed_slice(),
            keyword_ids,
            exprs: self.exprs.into_boxed_slice(),
            delims: self.delims.into_boxed_slice(),
        })
    }
}
