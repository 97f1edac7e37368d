//! Command-line driver for the brook tokenizer.
//!
//! The binary stays thin: argument handling lives in `main`, the actual
//! work in [`commands`], and the JSON grammar format in [`grammar_file`].
//! The engine crate (`brook_core`) knows nothing about files, JSON, or
//! terminals; everything of that sort lives here.

use std::sync::Once;

pub mod commands;
pub mod grammar_file;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=brook_core=trace` or `RUST_LOG=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
