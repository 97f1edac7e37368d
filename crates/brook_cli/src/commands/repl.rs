//! The `repl` command: a line-at-a-time interactive tokenizer.
//!
//! Each line is a complete input, so the cursor starts finished and the
//! trailing token flushes at the line end. Expression content is fed
//! back through the same lexer and printed one indent level deeper,
//! which makes nesting visible without any grammar support for it. That
//! recursion only happens when markers are stripped; with markers kept
//! the content would re-open the same expression forever.

use std::io::Write;

use brook_core::{Cursor, Flags, Grammar, Lexer, Scan, Token, TokenKind};

use super::{resolve_grammar, StreamOptions};

/// Nesting cap for expression re-tokenization.
const MAX_DEPTH: usize = 8;

pub fn run_repl(options: &StreamOptions) {
    let grammar = resolve_grammar(options.grammar.as_deref());
    let lexer = Lexer::new(grammar);

    println!("brook {}", env!("CARGO_PKG_VERSION"));
    println!("Type input to tokenize. :grammar shows the tables, :quit exits.");

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("brook> ");
        if std::io::stdout().flush().is_err() {
            break;
        }
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
        match line.trim_end_matches(['\r', '\n']) {
            ":quit" | ":q" => break,
            ":grammar" => print_grammar(lexer.grammar()),
            "" => {}
            input => print_stream(&lexer, input.as_bytes(), options, 1),
        }
    }
}

fn print_grammar(grammar: &Grammar) {
    println!("punctuations ({}):", grammar.punctuation_count());
    for id in 0..grammar.punctuation_count() {
        if let Some(entry) = grammar.punctuation(id) {
            println!("  #{id} {}", entry.escape_ascii());
        }
    }
    println!("keywords ({}):", grammar.keyword_count());
    for id in 0..grammar.keyword_count() {
        if let Some(entry) = grammar.keyword(id) {
            println!("  #{id} {}", entry.escape_ascii());
        }
    }
    println!("expressions ({}):", grammar.expression_count());
    for id in 0..grammar.expression_count() {
        if let Some((begin, end)) = grammar.expression(id) {
            println!("  #{id} {} .. {}", begin.escape_ascii(), end.escape_ascii());
        }
    }
}

fn print_stream(lexer: &Lexer, input: &[u8], options: &StreamOptions, depth: usize) {
    let mut cursor = Cursor::new();
    cursor.finish();
    let mut token = Token::with_capacity(options.capacity);
    let indent = "  ".repeat(depth);

    loop {
        let scan = match lexer.next_token(&mut cursor, input, &mut token, options.flags) {
            Ok(scan) => scan,
            Err(e) => {
                eprintln!("{indent}error: {e}");
                return;
            }
        };
        match scan {
            Scan::Match | Scan::ZeroByte => {
                print_line(&indent, &token, false);
                if token.kind() == TokenKind::Expression
                    && options.flags.contains(Flags::STRIP_MARKERS)
                    && !token.is_empty()
                    && depth < MAX_DEPTH
                {
                    let content = token.bytes().to_vec();
                    print_stream(lexer, &content, options, depth + 1);
                }
            }
            Scan::Fragment => print_line(&indent, &token, true),
            Scan::NeedInput | Scan::End => break,
        }
    }
}

fn print_line(indent: &str, token: &Token, fragment: bool) {
    let kind = token.kind().name();
    let mark = if fragment { "+" } else { "" };
    let text = token.bytes().escape_ascii().to_string();
    match token.id() {
        Some(id) => println!("{indent}{kind}{mark} #{id} {text}"),
        None => println!("{indent}{kind}{mark} {text}"),
    }
}
