//! Token storage and classification.
//!
//! A [`Token`] owns a fixed-capacity byte buffer allocated once, at the
//! caller's request, and reused for every token of a stream. The engine
//! writes into it and never resizes it; when the buffer fills before a
//! match completes, the engine emits the bytes as a fragment and continues
//! into the same storage (see [`Scan::Fragment`](crate::Scan::Fragment)).
//!
//! Completed content is length-delimited: [`Token::bytes`] returns exactly
//! the matched bytes, with no terminator and no partial write-in-progress
//! bytes.

use std::fmt;


/// Classification of a completed token (or fragment).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TokenKind {
    /// No classification yet; only observable mid-stream.
    #[default]
    Unset,
    /// A run of non-delimiter bytes, known or unknown (see [`Token::id`]).
    Keyword,
    /// An entry from the punctuation table.
    Punctuation,
    /// A begin/end delimited span from the expression table.
    Expression,
    /// Reserved by the data model; the engine never produces it.
    Comment,
}

const _: () = assert!(std::mem::size_of::<TokenKind>() == 1);

impl TokenKind {
    /// Stable lowercase label, for diagnostics and trace output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Unset => "unset",
            TokenKind::Keyword => "keyword",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Expression => "expression",
            TokenKind::Comment => "comment",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reusable fixed-capacity token buffer plus the final classification.
///
/// The storage is owned, so it can never alias the input chunk handed to
/// [`Lexer::next_token`](crate::Lexer::next_token); the C-style "input and
/// output must be distinct allocations" precondition holds by construction.
#[derive(Debug)]
pub struct Token {
    buf: Box<[u8]>,
    /// Write position of the in-progress token.
    write: usize,
    /// Length of the last completed token or fragment.
    len: usize,
    kind: TokenKind,
    id: Option<usize>,
}

impl Token {
    /// Allocate token storage once. `capacity` bounds the longest atomic
    /// match; longer tokens are delivered in fragments.
    ///
    /// A zero capacity is accepted here but rejected by the engine on the
    /// first call with [`Misuse::ZeroCapacityToken`](crate::Misuse).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            write: 0,
            len: 0,
            kind: TokenKind::Unset,
            id: None,
        }
    }

    /// Fixed capacity of the storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes of the last completed token or fragment.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Length of the last completed token or fragment.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the last completion carried no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Classification of the last completed token or fragment.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Table index of the match. `None` for a keyword absent from the
    /// configured table (still a normal token, merely unknown).
    #[must_use]
    pub fn id(&self) -> Option<usize> {
        self.id
    }

    /// Whether the token matched a configured table entry.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.id.is_some()
    }

    // Engine-facing mutators. Invariant throughout: `write` never exceeds
    // capacity; the engine checks room before every copy.

    /// Reset classification and positions for the next token.
    pub(crate) fn begin(&mut self) {
        self.kind = TokenKind::Unset;
        self.id = None;
        self.len = 0;
        self.write = 0;
    }

    /// Append one byte. Caller guarantees room.
    pub(crate) fn push(&mut self, byte: u8) {
        self.buf[self.write] = byte;
        self.write += 1;
    }

    /// Append a run of bytes. Caller guarantees room.
    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.buf[self.write..self.write + bytes.len()].copy_from_slice(bytes);
        self.write += bytes.len();
    }

    /// Bytes accumulated so far for the in-progress token.
    pub(crate) fn accumulated(&self) -> &[u8] {
        &self.buf[..self.write]
    }

    /// Current write position.
    pub(crate) fn write_pos(&self) -> usize {
        self.write
    }

    /// Drop the accumulated bytes without completing anything.
    pub(crate) fn rewind(&mut self) {
        self.write = 0;
    }

    /// Set the classification without completing the token.
    pub(crate) fn classify(&mut self, kind: TokenKind, id: Option<usize>) {
        self.kind = kind;
        self.id = id;
    }

    /// Complete a token: classify it and expose `len` bytes.
    pub(crate) fn complete(&mut self, kind: TokenKind, id: Option<usize>, len: usize) {
        self.kind = kind;
        self.id = id;
        self.len = len;
        self.write = 0;
    }

    /// Complete a fragment: expose everything accumulated, keep the
    /// classification for the continuation.
    pub(crate) fn fragment(&mut self) {
        self.len = self.write;
        self.write = 0;
    }
}
