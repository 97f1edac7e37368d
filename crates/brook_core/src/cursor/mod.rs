//! Cross-call matching state.
//!
//! A [`Cursor`] is everything the engine must remember between calls to
//! keep a token stream correct across arbitrary chunk boundaries: the
//! state tag, the restoration slot for fragment boundaries, which
//! expression is open, which punctuation is awaiting emission or still
//! being extended, one held byte awaiting reclassification, the
//! end-of-input flag, and the read position inside the caller's current
//! chunk.
//!
//! The chunk itself is not stored here. It is an argument to every call,
//! so the caller's refill buffer is never frozen by a long-lived borrow,
//! and the engine's output storage ([`Token`](crate::Token)) can never
//! alias it. After a need-input status the read position is zero and the
//! next call must bring the next chunk; passing the same chunk again
//! re-reads it.


/// State tag of the matching state machine.
///
/// `Escape` carries its own return position: an escape entered inside an
/// expression body resumes the body, anywhere else it resumes plain
/// accumulation. Together with [`Cursor::prev`] this is the explicit
/// two-slot holder that survives a fragment boundary landing on either
/// side of an escaped byte.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub(crate) enum State {
    /// Between tokens.
    #[default]
    Dummy,
    /// Accumulating an unclassified token.
    Middle,
    /// The previous byte was an unescaped backslash; the next byte is
    /// copied without interpretation.
    Escape {
        /// Whether the suppressed byte belongs to an expression body.
        from_expression: bool,
    },
    /// A detected punctuation awaits emission on the next call, without
    /// consuming input. Its table index is in [`Cursor::last_punc`].
    PuncRecover,
    /// Inside an open expression body; only the active end marker closes
    /// it. The pair's table index is in [`Cursor::last_expr`].
    InExpression,
    /// A detected begin marker awaits re-injection on the next call,
    /// which then keeps consuming the expression body.
    ExprRecover,
    /// The token buffer filled mid-match; the next call restores the
    /// state saved in [`Cursor::prev`] before consuming anything.
    Chunk,
    /// One completed token awaits pickup; consumed on the next call.
    Done,
}

impl State {
    /// Stable lowercase label, for diagnostics and trace output.
    pub(crate) fn name(self) -> &'static str {
        match self {
            State::Dummy => "dummy",
            State::Middle => "middle",
            State::Escape { .. } => "escape",
            State::PuncRecover => "punc-recover",
            State::InExpression => "in-expression",
            State::ExprRecover => "expr-recover",
            State::Chunk => "chunk",
            State::Done => "done",
        }
    }
}

/// An accepted punctuation match withheld for one byte because a longer
/// configured entry could still complete (maximal munch).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct PendingPunc {
    /// Matched length, in trailing bytes of the accumulated token.
    pub(crate) len: usize,
    /// Table index of the matched entry.
    pub(crate) index: usize,
}

/// Persistent cross-call state for one token stream.
///
/// Create one per stream with [`Cursor::new`], feed it to every
/// [`Lexer::next_token`](crate::Lexer::next_token) call for that stream,
/// and call [`Cursor::finish`] when no more input will ever arrive. A
/// cursor is cheap; recursive re-tokenization uses a fresh one per nested
/// stream over the same lexer.
#[derive(Clone, Debug, Default)]
pub struct Cursor {
    pub(crate) state: State,
    /// Restoration slot for fragment boundaries.
    pub(crate) prev: State,
    /// Read position inside the caller's current chunk.
    pub(crate) pos: usize,
    pub(crate) eof: bool,
    /// Table index of the open (or recovering) expression pair.
    pub(crate) last_expr: usize,
    /// Table index of the punctuation awaiting recover emission.
    pub(crate) last_punc: usize,
    pub(crate) pending: Option<PendingPunc>,
    /// A byte displaced by pending-punctuation resolution, reclassified
    /// before any chunk byte on the next call.
    pub(crate) held: Option<u8>,
}

impl Cursor {
    /// Fresh stream state: between tokens, nothing pending, input not
    /// finished.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that no more input will ever arrive. May accompany the last
    /// chunk or follow it; once set, exhausting the chunk flushes any
    /// partial token and then reports the end status.
    pub fn finish(&mut self) {
        self.eof = true;
    }

    /// Whether end of input has been signaled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.eof
    }

    /// Stable lowercase label of the current state, for diagnostics.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }
}
