//! Call outcomes: flow statuses and fatal misuse faults.
//!
//! Every normal outcome of a tokenize call, including "give me more input"
//! and "the buffer filled mid-token", is a [`Scan`] value. [`Misuse`] is
//! reserved for contract violations that make progress impossible; those
//! come back as `Err` and are never retried internally.

use std::fmt;

/// Flow status of one tokenize call.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Scan {
    /// A complete token is in the buffer.
    Match,
    /// The token buffer filled before a match completed. The buffer holds
    /// a non-final fragment; call again to continue the same token.
    Fragment,
    /// A complete token terminated by a NUL delimiter. Callers that treat
    /// NUL as logical end-of-string can stop here; the token is valid.
    ZeroByte,
    /// The current chunk is exhausted. Supply the next chunk, or signal
    /// end of input via [`Cursor::finish`](crate::Cursor::finish).
    NeedInput,
    /// End of input, no further tokens.
    End,
}

impl Scan {
    /// Stable lowercase label, for diagnostics and trace output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Scan::Match => "match",
            Scan::Fragment => "fragment",
            Scan::ZeroByte => "zero-byte",
            Scan::NeedInput => "need-input",
            Scan::End => "end",
        }
    }

    /// Whether the buffer holds token bytes to consume (complete or not).
    #[must_use]
    pub fn has_token(self) -> bool {
        matches!(self, Scan::Match | Scan::Fragment | Scan::ZeroByte)
    }
}

impl fmt::Display for Scan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fatal caller-contract violation.
///
/// These indicate misuse, not input conditions: the call made no progress
/// and repeating it will fail the same way until the caller fixes the
/// buffers or the grammar.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Misuse {
    /// The token buffer has zero capacity; nothing can ever be written.
    ZeroCapacityToken,
    /// A configured marker does not fit the token buffer, so a recover
    /// state cannot re-inject it. Carries the capacity that would suffice.
    TokenTooSmall {
        /// Minimum token buffer capacity that would make progress.
        required: usize,
    },
}

impl fmt::Display for Misuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Misuse::ZeroCapacityToken => f.write_str("token buffer has zero capacity"),
            Misuse::TokenTooSmall { required } => write!(
                f,
                "token buffer too small for a configured marker ({required} bytes required)"
            ),
        }
    }
}

impl std::error::Error for Misuse {}
