//! Chunk-at-a-time tokenizer with grammars built at runtime.
//!
//! The engine splits a byte stream into keywords, punctuation, and
//! begin/end delimited expressions according to a [`Grammar`] constructed
//! by the caller, not compiled in. Input arrives in chunks of any size and
//! the stream can pause between any two bytes: all progress lives in a
//! [`Cursor`] and a reusable [`Token`] buffer, both owned by the caller,
//! so the token stream is byte-for-byte independent of how the input was
//! cut. Tokenization itself allocates nothing.
//!
//! # Call protocol
//!
//! One call to [`Lexer::next_token`] yields at most one token and reports
//! one [`Scan`] status:
//!
//! - [`Scan::Match`] / [`Scan::ZeroByte`]: a complete token is in the
//!   buffer (the latter when a NUL delimiter finalized it);
//! - [`Scan::Fragment`]: the buffer filled mid-token; consume the bytes
//!   and call again for the continuation;
//! - [`Scan::NeedInput`]: the chunk is exhausted; bring the next chunk or
//!   call [`Cursor::finish`];
//! - [`Scan::End`]: nothing more will be produced.
//!
//! Contract violations (a zero-capacity buffer, a buffer smaller than a
//! configured marker) surface as [`Misuse`] errors instead of statuses.
//!
//! # Example
//!
//! ```text
//! use brook_core::{Cursor, Flags, Grammar, Lexer, Scan, Token};
//!
//! let grammar = Grammar::builder()
//!     .punctuation("==")
//!     .keyword("if")
//!     .expression("\"", "\"")
//!     .build()?;
//! let lexer = Lexer::new(grammar);
//!
//! let mut cursor = Cursor::new();
//! let mut token = Token::with_capacity(256);
//! let mut chunk: &[u8] = b"if a==\"hi\" ";
//! cursor.finish(); // the single chunk above is all the input there is
//! loop {
//!     match lexer.next_token(&mut cursor, chunk, &mut token, Flags::STRIP_MARKERS)? {
//!         Scan::Match | Scan::ZeroByte => println!("{} {:?}", token.kind(), token.bytes()),
//!         Scan::Fragment => println!("fragment {:?}", token.bytes()),
//!         Scan::NeedInput => chunk = b"", // refill here in a real stream
//!         Scan::End => break,
//!     }
//! }
//! ```
//!
//! # Capacity
//!
//! The token buffer's capacity bounds the longest atomic match. Content
//! longer than the buffer arrives as fragments; punctuation entries and
//! expression markers must fit the buffer outright. A capacity of the
//! longest configured entry plus expected token length is the practical
//! floor.
//!
//! # Recursion
//!
//! A [`Lexer`] is immutable while matching, so expression contents can be
//! re-tokenized by running a fresh [`Cursor`] and [`Token`] over the same
//! lexer, to any depth.

pub mod cursor;
pub mod engine;
pub mod flags;
pub mod grammar;
pub mod scan;
pub mod token;

pub use cursor::Cursor;
pub use engine::{Incremental, Lexer, Matching};
pub use flags::Flags;
pub use grammar::{Grammar, GrammarBuilder, GrammarError};
pub use scan::{Misuse, Scan};
pub use token::{Token, TokenKind};
