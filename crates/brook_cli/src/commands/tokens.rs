//! The `tokens` command: tokenize a file (or standard input) and print
//! the stream.

use std::borrow::Cow;

use brook_core::{Cursor, Lexer, Scan, Token};
use serde::Serialize;

use super::{read_bytes, resolve_grammar, StreamOptions};

pub fn tokenize_file(path: &str, options: &StreamOptions) {
    let grammar = resolve_grammar(options.grammar.as_deref());
    let lexer = Lexer::new(grammar);
    let data = read_bytes(path);
    tracing::debug!("tokenizing {} bytes from '{path}'", data.len());

    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(options.capacity);
    let mut chunks = data.chunks(options.chunk.max(1));
    let mut chunk: &[u8] = chunks.next().unwrap_or(b"");
    let mut matches = 0usize;
    let mut fragments = 0usize;

    loop {
        let scan = match lexer.next_token(&mut cursor, chunk, &mut token, options.flags) {
            Ok(scan) => scan,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        };
        match scan {
            Scan::Match | Scan::ZeroByte => {
                matches += 1;
                print_token(&token, false, options.json);
            }
            Scan::Fragment => {
                fragments += 1;
                print_token(&token, true, options.json);
            }
            Scan::NeedInput => match chunks.next() {
                Some(next) => chunk = next,
                None => {
                    cursor.finish();
                    chunk = b"";
                }
            },
            Scan::End => break,
        }
    }

    if !options.json {
        println!();
        if fragments > 0 {
            println!("{matches} tokens, {fragments} fragments");
        } else {
            println!("{matches} tokens");
        }
    }
}

/// One line of `--json` output. Bytes outside UTF-8 come through lossily;
/// `len` always counts the raw bytes.
#[derive(Serialize)]
struct TokenRecord<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<usize>,
    text: Cow<'a, str>,
    len: usize,
    fragment: bool,
}

fn print_token(token: &Token, fragment: bool, json: bool) {
    if json {
        let record = TokenRecord {
            kind: token.kind().name(),
            id: token.id(),
            text: String::from_utf8_lossy(token.bytes()),
            len: token.len(),
            fragment,
        };
        match serde_json::to_string(&record) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("error: cannot encode token: {e}"),
        }
    } else {
        let kind = token.kind().name();
        let mark = if fragment { "+" } else { " " };
        let text = token.bytes().escape_ascii().to_string();
        match token.id() {
            Some(id) => println!("  {kind:<11}{mark} #{id:<3} {text}"),
            None => println!("  {kind:<11}{mark}      {text}"),
        }
    }
}
