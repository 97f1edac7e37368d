//! The matching state machine.
//!
//! One call to [`Lexer::next_token`] consumes zero or more bytes from the
//! caller's current chunk and ends in exactly one of the [`Scan`] statuses.
//! All cross-call memory lives in the [`Cursor`] and the partially written
//! [`Token`], which is what makes the stream independent of how the input
//! is cut into chunks.
//!
//! # Per-byte order
//!
//! Each consumed byte is copied into the token buffer first, then runs
//! through the checks in a fixed order: escape consumption, delimiter,
//! expression (begin outside, end inside), escape entry, punctuation, and
//! finally the buffer-full check. The order is observable: an expression
//! begin marker beats a punctuation ending on the same byte, and a
//! delimiter byte inside a marker splits the token before the marker can
//! complete.
//!
//! # Recover states and the held byte
//!
//! Matches that complete adjacent to preceding content are emitted over
//! two calls: the preceding keyword now, the punctuation or expression
//! marker on the next call (re-injected without consuming input, except
//! that an expression recover keeps consuming its body). Punctuation
//! additionally munches greedily: an accepted match that some longer
//! configured entry could extend is withheld for one byte. When the next
//! byte does not extend it, the withheld match is emitted and that byte is
//! handed back through the cursor, to be reclassified from scratch on the
//! following call.

use crate::cursor::{Cursor, PendingPunc, State};
use crate::flags::Flags;
use crate::grammar::Grammar;
use crate::scan::{Misuse, Scan};
use crate::token::{Token, TokenKind};

#[cfg(test)]
mod tests;

/// A matching strategy, chosen when the [`Lexer`] is constructed.
///
/// Only the incremental strategy exists. An eager whole-buffer strategy is
/// deliberately not provided; running [`Incremental`] with
/// [`Cursor::finish`] pre-set and the entire input as one chunk
/// approximates it, but that equivalence is a convenience, not a contract.
pub trait Matching {
    /// Produce the next token, fragment, or flow status. See
    /// [`Lexer::next_token`] for the call contract.
    fn next_token(
        &self,
        grammar: &Grammar,
        cursor: &mut Cursor,
        chunk: &[u8],
        token: &mut Token,
        flags: Flags,
    ) -> Result<Scan, Misuse>;
}

/// The incremental (chunk-at-a-time, resumable) matching strategy.
#[derive(Copy, Clone, Debug, Default)]
pub struct Incremental;

/// A grammar bound to a matching strategy.
///
/// The lexer is immutable during tokenization; every mutable thing is in
/// the caller's [`Cursor`] and [`Token`]. One lexer can therefore drive
/// any number of independent streams, which is how expression contents get
/// re-tokenized recursively.
#[derive(Clone, Debug)]
pub struct Lexer<M: Matching = Incremental> {
    grammar: Grammar,
    matching: M,
}

impl Lexer {
    /// Bind a grammar to the incremental strategy.
    #[must_use]
    pub fn new(grammar: Grammar) -> Self {
        Self::with_matching(grammar, Incremental)
    }
}

impl<M: Matching> Lexer<M> {
    /// Bind a grammar to an explicit strategy.
    #[must_use]
    pub fn with_matching(grammar: Grammar, matching: M) -> Self {
        tracing::debug!(
            "lexer: {} punctuations, {} keywords, {} expressions",
            grammar.punctuation_count(),
            grammar.keyword_count(),
            grammar.expression_count(),
        );
        Self { grammar, matching }
    }

    /// The bound grammar.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Advance one stream by at most one token.
    ///
    /// `chunk` is the caller's current input window; `cursor` carries the
    /// stream's cross-call state and its read position within that window.
    /// On [`Scan::NeedInput`] the position has been reset and the next
    /// call must bring the next chunk (or [`Cursor::finish`]). On
    /// [`Scan::Match`], [`Scan::Fragment`], and [`Scan::ZeroByte`] the
    /// token buffer holds the emitted bytes and classification.
    ///
    /// The engine allocates nothing and never resizes the token buffer.
    pub fn next_token(
        &self,
        cursor: &mut Cursor,
        chunk: &[u8],
        token: &mut Token,
        flags: Flags,
    ) -> Result<Scan, Misuse> {
        self.matching
            .next_token(&self.grammar, cursor, chunk, token, flags)
    }
}

impl Matching for Incremental {
    fn next_token(
        &self,
        grammar: &Grammar,
        cursor: &mut Cursor,
        chunk: &[u8],
        token: &mut Token,
        flags: Flags,
    ) -> Result<Scan, Misuse> {
        if token.capacity() == 0 {
            return Err(Misuse::ZeroCapacityToken);
        }
        let mut machine = Machine {
            grammar,
            cursor,
            token,
            flags,
        };
        if let Some(early) = machine.enter()? {
            return Ok(early);
        }
        loop {
            let Some(byte) = machine.next_byte(chunk) else {
                break;
            };
            if let Some(scan) = machine.consume(byte) {
                return Ok(scan);
            }
        }
        Ok(machine.exhausted())
    }
}

/// One call's working set. All state mutations go through the cursor and
/// token; the machine itself is scratch.
struct Machine<'a> {
    grammar: &'a Grammar,
    cursor: &'a mut Cursor,
    token: &'a mut Token,
    flags: Flags,
}

impl Machine<'_> {
    /// Consume a transient state left by the previous call. `Some` means
    /// the call is already over (recover emission).
    fn enter(&mut self) -> Result<Option<Scan>, Misuse> {
        match self.cursor.state {
            State::Done => {
                self.token.begin();
                self.cursor.state = State::Dummy;
            }
            State::Chunk => {
                // A fragment boundary is transparent: restore before any
                // byte of this call is classified.
                self.cursor.state = self.cursor.prev;
            }
            State::PuncRecover => {
                let index = self.cursor.last_punc;
                let punc = self.grammar.punc(index);
                if punc.len() > self.token.capacity() {
                    return Err(Misuse::TokenTooSmall {
                        required: punc.len(),
                    });
                }
                self.token.begin();
                self.token.extend(punc);
                self.token
                    .complete(TokenKind::Punctuation, Some(index), punc.len());
                self.cursor.state = State::Done;
                tracing::trace!("recover: punctuation {index}");
                return Ok(Some(Scan::Match));
            }
            State::ExprRecover => {
                let index = self.cursor.last_expr;
                self.token.begin();
                if !self.flags.contains(Flags::STRIP_MARKERS) {
                    let begin = self.grammar.expr(index).begin();
                    if begin.len() > self.token.capacity() {
                        return Err(Misuse::TokenTooSmall {
                            required: begin.len(),
                        });
                    }
                    self.token.extend(begin);
                }
                self.token.classify(TokenKind::Expression, Some(index));
                self.cursor.state = State::InExpression;
                tracing::trace!("recover: expression {index} reopened");
                if self.token.write_pos() == self.token.capacity() {
                    return Ok(Some(self.overflow()));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    /// Next byte to classify: the held byte first, then the chunk.
    fn next_byte(&mut self, chunk: &[u8]) -> Option<u8> {
        if let Some(byte) = self.cursor.held.take() {
            return Some(byte);
        }
        if self.cursor.state == State::InExpression {
            self.bulk_copy(chunk);
        }
        let byte = *chunk.get(self.cursor.pos)?;
        self.cursor.pos += 1;
        Some(byte)
    }

    /// Bulk-copy a run of expression body bytes that cannot close the
    /// expression or start an escape. A multi-byte end marker can only
    /// complete on its final byte, so stopping at that byte (and at
    /// backslashes) preserves per-byte semantics exactly.
    fn bulk_copy(&mut self, chunk: &[u8]) {
        let end = self.grammar.expr(self.cursor.last_expr).end();
        let stop = end[end.len() - 1];
        let rest = chunk.get(self.cursor.pos..).unwrap_or(&[]);
        // Keep one byte of room so the byte after the run still goes
        // through the per-byte path and its buffer-full check.
        let room = (self.token.capacity() - self.token.write_pos()).saturating_sub(1);
        if room == 0 || rest.is_empty() {
            return;
        }
        let run = memchr::memchr2(stop, b'\\', rest).unwrap_or(rest.len());
        let run = run.min(room);
        if run > 0 {
            self.token.extend(&rest[..run]);
            self.cursor.pos += run;
        }
    }

    /// Classify one byte. `Some` ends the call with that status.
    fn consume(&mut self, byte: u8) -> Option<Scan> {
        self.token.push(byte);

        // An escaped byte is copied with no interpretation at all.
        if let State::Escape { from_expression } = self.cursor.state {
            self.cursor.state = if from_expression {
                State::InExpression
            } else {
                State::Middle
            };
            return self.check_overflow();
        }

        let in_expr = self.cursor.state == State::InExpression;

        if !in_expr && self.grammar.is_delimiter(byte, self.flags) {
            return self.delimiter(byte);
        }

        if in_expr {
            if let Some(scan) = self.expression_end() {
                return Some(scan);
            }
        } else if let Some((index, offset)) = self
            .grammar
            .expression_begin_suffix(self.token.accumulated())
        {
            return self.expression_begin(index, offset, byte);
        }

        if byte == b'\\' {
            if let Some(pending) = self.cursor.pending.take() {
                return Some(self.resolve_pending(pending, byte));
            }
            self.cursor.state = State::Escape {
                from_expression: in_expr,
            };
            return self.check_overflow();
        }

        if !in_expr {
            if let Some(scan) = self.punctuation(byte) {
                return Some(scan);
            }
        }

        if self.cursor.state == State::Dummy {
            self.cursor.state = State::Middle;
        }
        self.check_overflow()
    }

    /// Delimiter byte outside an expression: finalize, discard, or
    /// resolve a withheld punctuation first.
    fn delimiter(&mut self, byte: u8) -> Option<Scan> {
        if let Some(pending) = self.cursor.pending.take() {
            return Some(self.resolve_pending(pending, byte));
        }
        let write = self.token.write_pos();
        if write > 1 {
            let id = self.grammar.keyword_id(&self.token.accumulated()[..write - 1]);
            self.token.complete(TokenKind::Keyword, id, write - 1);
            self.cursor.state = State::Done;
            tracing::trace!("match: keyword len {} id {id:?}", write - 1);
            return Some(if byte == 0 { Scan::ZeroByte } else { Scan::Match });
        }
        // Only the delimiter itself accumulated: drop it and keep going.
        self.token.rewind();
        None
    }

    /// End-marker test against the accumulated tail while inside an
    /// expression body.
    fn expression_end(&mut self) -> Option<Scan> {
        let end = self.grammar.expr(self.cursor.last_expr).end();
        if !self.token.accumulated().ends_with(end) {
            return None;
        }
        let write = self.token.write_pos();
        let len = if self.flags.contains(Flags::STRIP_MARKERS) {
            write - end.len()
        } else {
            write
        };
        let index = self.cursor.last_expr;
        self.token.complete(TokenKind::Expression, Some(index), len);
        self.cursor.state = State::Done;
        tracing::trace!("match: expression {index} closed, len {len}");
        Some(Scan::Match)
    }

    /// A begin marker ends at the newest byte: open the expression here,
    /// or emit what precedes the marker and recover it next call.
    fn expression_begin(&mut self, index: usize, offset: usize, byte: u8) -> Option<Scan> {
        if let Some(pending) = self.cursor.pending.take() {
            let marker_len = self.token.write_pos() - offset;
            if offset > 0 && marker_len == 1 {
                // The withheld punctuation sits wholly before the marker;
                // the marker byte re-forms from the held byte next call.
                return Some(self.resolve_pending(pending, byte));
            }
            // A multi-byte marker claims the withheld bytes; the longer
            // structure wins and the pending match is dropped.
        }
        self.cursor.last_expr = index;
        if offset == 0 {
            if self.flags.contains(Flags::STRIP_MARKERS) {
                self.token.begin();
            }
            self.token.classify(TokenKind::Expression, Some(index));
            self.cursor.state = State::InExpression;
            tracing::trace!("expression {index} opened");
            self.check_overflow()
        } else {
            let id = self.grammar.keyword_id(&self.token.accumulated()[..offset]);
            self.token.complete(TokenKind::Keyword, id, offset);
            self.cursor.state = State::ExprRecover;
            tracing::trace!("match: keyword len {offset}, expression {index} deferred");
            Some(Scan::Match)
        }
    }

    /// Punctuation suffix matching with one byte of munch lookahead.
    fn punctuation(&mut self, byte: u8) -> Option<Scan> {
        let Some(m) = self
            .grammar
            .longest_punctuation_suffix(self.token.accumulated())
        else {
            if let Some(pending) = self.cursor.pending.take() {
                return Some(self.resolve_pending(pending, byte));
            }
            return None;
        };
        if let Some(pending) = self.cursor.pending {
            if m.len <= pending.len {
                // Not an extension of the withheld match: that match is
                // final, and this byte starts over from the held slot.
                self.cursor.pending = None;
                return Some(self.resolve_pending(pending, byte));
            }
            // The new match covers the withheld bytes and more.
        }
        let write = self.token.write_pos();
        if write < self.token.capacity()
            && self
                .grammar
                .punctuation_extends(self.token.accumulated(), m.len)
        {
            self.cursor.pending = Some(PendingPunc {
                len: m.len,
                index: m.index,
            });
            return None;
        }
        self.cursor.pending = None;
        if m.len == write {
            self.token.complete(TokenKind::Punctuation, Some(m.index), write);
            self.cursor.state = State::Done;
            tracing::trace!("match: punctuation {} len {write}", m.index);
            Some(Scan::Match)
        } else {
            let id = self
                .grammar
                .keyword_id(&self.token.accumulated()[..write - m.len]);
            self.token.complete(TokenKind::Keyword, id, write - m.len);
            self.cursor.last_punc = m.index;
            self.cursor.state = State::PuncRecover;
            tracing::trace!(
                "match: keyword len {}, punctuation {} deferred",
                write - m.len,
                m.index
            );
            Some(Scan::Match)
        }
    }

    /// Emit a withheld punctuation that the current byte did not extend.
    /// The byte is handed back through the cursor and reclassified from
    /// scratch on the next call.
    fn resolve_pending(&mut self, pending: PendingPunc, byte: u8) -> Scan {
        self.cursor.held = Some(byte);
        let write = self.token.write_pos();
        let prefix = write - 1 - pending.len;
        if prefix == 0 {
            self.token
                .complete(TokenKind::Punctuation, Some(pending.index), pending.len);
            self.cursor.state = State::Done;
            tracing::trace!("match: punctuation {} after munch", pending.index);
            Scan::Match
        } else {
            let id = self.grammar.keyword_id(&self.token.accumulated()[..prefix]);
            self.token.complete(TokenKind::Keyword, id, prefix);
            self.cursor.last_punc = pending.index;
            self.cursor.state = State::PuncRecover;
            tracing::trace!(
                "match: keyword len {prefix}, punctuation {} deferred",
                pending.index
            );
            Scan::Match
        }
    }

    /// Buffer-full check, run after every classified byte.
    fn check_overflow(&mut self) -> Option<Scan> {
        if self.token.write_pos() < self.token.capacity() {
            None
        } else {
            Some(self.overflow())
        }
    }

    /// Emit the accumulated bytes as a fragment and arrange transparent
    /// resumption.
    fn overflow(&mut self) -> Scan {
        if self.token.kind() == TokenKind::Unset {
            self.token.classify(TokenKind::Keyword, None);
        }
        self.cursor.prev = self.cursor.state;
        self.cursor.state = State::Chunk;
        self.token.fragment();
        tracing::trace!(
            "fragment: {} bytes, {}",
            self.token.len(),
            self.token.kind().name()
        );
        Scan::Fragment
    }

    /// The chunk ran out: ask for more, or flush at end of input.
    fn exhausted(&mut self) -> Scan {
        if !self.cursor.eof {
            self.cursor.pos = 0;
            tracing::trace!("need-input: {} bytes buffered", self.token.write_pos());
            return Scan::NeedInput;
        }
        self.flush()
    }

    /// End of input: resolve a withheld punctuation, flush any partial
    /// token as a keyword, or report the end.
    fn flush(&mut self) -> Scan {
        let write = self.token.write_pos();
        if let Some(pending) = self.cursor.pending.take() {
            // The withheld match ends exactly at the buffer edge; no byte
            // followed it, so nothing is held.
            if pending.len == write {
                self.token
                    .complete(TokenKind::Punctuation, Some(pending.index), write);
                self.cursor.state = State::Done;
                return Scan::Match;
            }
            let id = self
                .grammar
                .keyword_id(&self.token.accumulated()[..write - pending.len]);
            self.token.complete(TokenKind::Keyword, id, write - pending.len);
            self.cursor.last_punc = pending.index;
            self.cursor.state = State::PuncRecover;
            return Scan::Match;
        }
        if write == 0 {
            self.token.begin();
            return Scan::End;
        }
        // Whatever is buffered, including an unterminated expression body
        // or a dangling escape, flushes as a keyword.
        let id = self.grammar.keyword_id(self.token.accumulated());
        self.token.complete(TokenKind::Keyword, id, write);
        self.cursor.state = State::Done;
        tracing::trace!("flush: keyword len {write} id {id:?}");
        Scan::Match
    }
}
