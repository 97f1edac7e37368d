//! Behavior flags for a tokenize call.
//!
//! Flags are passed per call, not stored in the lexer, so one lexer can
//! serve callers with different needs (one stream stripping expression
//! markers while another keeps them, for instance).

use bitflags::bitflags;

bitflags! {
    /// Independently combinable tokenization options.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Flags: u32 {
        /// Strip expression begin/end markers from emitted content.
        ///
        /// With this set, tokenizing `"abc"` against a quote expression
        /// yields `abc`; without it the token carries the quotes.
        const STRIP_MARKERS = 1 << 0;

        /// Treat space (`0x20`) as an ordinary token byte.
        ///
        /// Only affects the default delimiter set; configured delimiter
        /// ranges are applied as given.
        const SPACE_IN_TOKENS = 1 << 1;

        /// Apply configured delimiter ranges in addition to the default
        /// set instead of replacing it.
        const UNION_DELIMITERS = 1 << 2;
    }
}
