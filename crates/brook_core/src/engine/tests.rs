use pretty_assertions::assert_eq;

use super::*;

const CAP: usize = 64;

/// `+`/`==`/`=` punctuation, `if`/`else` keywords, a quote pair.
fn demo() -> Grammar {
    let built = Grammar::builder()
        .punctuation(b"+")
        .punctuation(b"==")
        .punctuation(b"=")
        .keyword(b"if")
        .keyword(b"else")
        .expression(b"\"", b"\"")
        .build();
    match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("demo grammar invalid: {e}"),
    }
}

fn angle() -> Grammar {
    let built = Grammar::builder().expression(b"<<", b">>").build();
    match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("angle grammar invalid: {e}"),
    }
}

fn parens() -> Grammar {
    let built = Grammar::builder().expression(b"(", b")").build();
    match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("paren grammar invalid: {e}"),
    }
}

/// One emitted token, fragment, or zero-byte match.
#[derive(Debug, PartialEq, Eq)]
enum Emit {
    Tok(TokenKind, Option<usize>, Vec<u8>),
    Frag(TokenKind, Option<usize>, Vec<u8>),
    Zero(TokenKind, Option<usize>, Vec<u8>),
}

fn kw(text: &[u8]) -> Emit {
    Emit::Tok(TokenKind::Keyword, None, text.to_vec())
}

fn kw_id(id: usize, text: &[u8]) -> Emit {
    Emit::Tok(TokenKind::Keyword, Some(id), text.to_vec())
}

fn punc_id(id: usize, text: &[u8]) -> Emit {
    Emit::Tok(TokenKind::Punctuation, Some(id), text.to_vec())
}

fn expr_id(id: usize, text: &[u8]) -> Emit {
    Emit::Tok(TokenKind::Expression, Some(id), text.to_vec())
}

/// Drive a full stream: feed `chunks` in order, finish after the last,
/// and collect everything emitted up to the end status.
fn run(grammar: &Grammar, chunks: &[&[u8]], capacity: usize, flags: Flags) -> Vec<Emit> {
    let lexer = Lexer::new(grammar.clone());
    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(capacity);
    let mut out = Vec::new();
    let mut rest = chunks.iter().copied();
    let mut chunk: &[u8] = rest.next().unwrap_or(b"");
    for _ in 0..10_000 {
        let scan = match lexer.next_token(&mut cursor, chunk, &mut token, flags) {
            Ok(scan) => scan,
            Err(e) => panic!("unexpected misuse fault: {e}"),
        };
        match scan {
            Scan::Match => out.push(Emit::Tok(token.kind(), token.id(), token.bytes().to_vec())),
            Scan::Fragment => {
                out.push(Emit::Frag(token.kind(), token.id(), token.bytes().to_vec()));
            }
            Scan::ZeroByte => {
                out.push(Emit::Zero(token.kind(), token.id(), token.bytes().to_vec()));
            }
            Scan::NeedInput => match rest.next() {
                Some(next) => chunk = next,
                None => {
                    cursor.finish();
                    chunk = b"";
                }
            },
            Scan::End => return out,
        }
    }
    panic!("stream never reached the end status");
}

fn tokens(grammar: &Grammar, input: &[u8], flags: Flags) -> Vec<Emit> {
    run(grammar, &[input], CAP, flags)
}

// === Delimiters and keywords ===

#[test]
fn splits_on_default_delimiters() {
    assert_eq!(
        tokens(&demo(), b"if else x\t\ny", Flags::empty()),
        vec![kw_id(0, b"if"), kw_id(1, b"else"), kw(b"x"), kw(b"y")]
    );
}

#[test]
fn leading_and_repeated_delimiters_discarded() {
    assert_eq!(
        tokens(&demo(), b"  if   ", Flags::empty()),
        vec![kw_id(0, b"if")]
    );
}

#[test]
fn flushes_trailing_bytes_at_end_of_input() {
    assert_eq!(tokens(&demo(), b"abc", Flags::empty()), vec![kw(b"abc")]);
}

#[test]
fn empty_input_reports_end() {
    assert_eq!(tokens(&demo(), b"", Flags::empty()), vec![]);
}

#[test]
fn end_is_repeatable() {
    let lexer = Lexer::new(demo());
    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(CAP);
    cursor.finish();
    for _ in 0..3 {
        match lexer.next_token(&mut cursor, b"", &mut token, Flags::empty()) {
            Ok(Scan::End) => {}
            other => panic!("expected end, got {other:?}"),
        }
    }
}

#[test]
fn zero_byte_finalizes_with_distinct_status() {
    assert_eq!(
        tokens(&demo(), b"ab\0cd", Flags::empty()),
        vec![
            Emit::Zero(TokenKind::Keyword, None, b"ab".to_vec()),
            kw(b"cd"),
        ]
    );
}

#[test]
fn lone_zero_byte_is_silent() {
    assert_eq!(tokens(&demo(), b"\0", Flags::empty()), vec![]);
}

#[test]
fn zero_byte_status_with_configured_delimiters() {
    let built = Grammar::builder().delimiter(0).build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    // NUL is the only delimiter here, so the space stays in the token.
    assert_eq!(
        tokens(&grammar, b"a b\0cd", Flags::empty()),
        vec![
            Emit::Zero(TokenKind::Keyword, None, b"a b".to_vec()),
            kw(b"cd"),
        ]
    );
}

#[test]
fn custom_delimiters_replace_default() {
    let built = Grammar::builder().delimiter(b';').build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    assert_eq!(
        tokens(&grammar, b"a b;c", Flags::empty()),
        vec![kw(b"a b"), kw(b"c")]
    );
}

#[test]
fn union_flag_adds_default_delimiters_back() {
    let built = Grammar::builder().delimiter(b';').build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    assert_eq!(
        tokens(&grammar, b"a b;c", Flags::UNION_DELIMITERS),
        vec![kw(b"a"), kw(b"b"), kw(b"c")]
    );
}

#[test]
fn space_in_tokens_keeps_spaces() {
    assert_eq!(
        tokens(&demo(), b"a b\nc", Flags::SPACE_IN_TOKENS),
        vec![kw(b"a b"), kw(b"c")]
    );
}

// === Punctuation ===

#[test]
fn scenario_keywords_punctuation_expression() {
    assert_eq!(
        tokens(&demo(), b"if a==\"x\" ", Flags::STRIP_MARKERS),
        vec![
            kw_id(0, b"if"),
            kw(b"a"),
            punc_id(1, b"=="),
            expr_id(0, b"x"),
        ]
    );
}

#[test]
fn adjacent_equals_munch_to_longest() {
    assert_eq!(
        tokens(&demo(), b"==", Flags::empty()),
        vec![punc_id(1, b"==")]
    );
}

#[test]
fn non_extendable_match_emits_without_lookahead() {
    let lexer = Lexer::new(demo());
    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(CAP);
    // No entry extends "+", so the match needs neither a following byte
    // nor the end of input.
    match lexer.next_token(&mut cursor, b"+", &mut token, Flags::empty()) {
        Ok(Scan::Match) => {}
        other => panic!("expected match, got {other:?}"),
    }
    assert_eq!(token.kind(), TokenKind::Punctuation);
    assert_eq!(token.bytes(), b"+");
}

#[test]
fn extendable_match_withholds_for_one_byte() {
    let lexer = Lexer::new(demo());
    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(CAP);
    // "=" could still become "==": not emitted while input may continue.
    match lexer.next_token(&mut cursor, b"=", &mut token, Flags::empty()) {
        Ok(Scan::NeedInput) => {}
        other => panic!("expected need-input, got {other:?}"),
    }
    cursor.finish();
    match lexer.next_token(&mut cursor, b"", &mut token, Flags::empty()) {
        Ok(Scan::Match) => {}
        other => panic!("expected match, got {other:?}"),
    }
    assert_eq!(token.kind(), TokenKind::Punctuation);
    assert_eq!(token.id(), Some(2));
    assert_eq!(token.bytes(), b"=");
}

#[test]
fn punctuation_releases_when_not_extended() {
    assert_eq!(
        tokens(&demo(), b"=x", Flags::empty()),
        vec![punc_id(2, b"="), kw(b"x")]
    );
}

#[test]
fn keyword_prefix_split_before_punctuation() {
    assert_eq!(
        tokens(&demo(), b"a=b", Flags::empty()),
        vec![kw(b"a"), punc_id(2, b"="), kw(b"b")]
    );
}

#[test]
fn pending_punctuation_flushes_at_end_of_input() {
    assert_eq!(
        tokens(&demo(), b"a=", Flags::empty()),
        vec![kw(b"a"), punc_id(2, b"=")]
    );
}

#[test]
fn munch_supersedes_through_chain() {
    let built = Grammar::builder()
        .punctuation(b"=")
        .punctuation(b"==")
        .punctuation(b"===")
        .build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    assert_eq!(
        tokens(&grammar, b"a===b", Flags::empty()),
        vec![kw(b"a"), punc_id(2, b"==="), kw(b"b")]
    );
}

#[test]
fn negation_pair_matches_once() {
    let built = Grammar::builder().punctuation(b"=").punctuation(b"!=").build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    assert_eq!(
        tokens(&grammar, b"!=", Flags::empty()),
        vec![punc_id(1, b"!=")]
    );
}

#[test]
fn duplicate_entries_report_earliest_index() {
    let built = Grammar::builder().punctuation(b"=").punctuation(b"=").build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    assert_eq!(
        tokens(&grammar, b"=", Flags::empty()),
        vec![punc_id(0, b"=")]
    );
}

#[test]
fn punctuation_resolves_before_delimiter() {
    assert_eq!(
        tokens(&demo(), b"a= b", Flags::empty()),
        vec![kw(b"a"), punc_id(2, b"="), kw(b"b")]
    );
}

#[test]
fn distinct_punctuations_back_to_back() {
    let built = Grammar::builder()
        .punctuation(b"=")
        .punctuation(b"==")
        .punctuation(b"*")
        .build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    assert_eq!(
        tokens(&grammar, b"=*", Flags::empty()),
        vec![punc_id(0, b"="), punc_id(2, b"*")]
    );
}

// === Expressions ===

#[test]
fn expression_keeps_markers_by_default() {
    assert_eq!(
        tokens(&demo(), b"\"hi\" ", Flags::empty()),
        vec![expr_id(0, b"\"hi\"")]
    );
}

#[test]
fn expression_strips_markers_on_request() {
    assert_eq!(
        tokens(&demo(), b"\"hi\" ", Flags::STRIP_MARKERS),
        vec![expr_id(0, b"hi")]
    );
}

#[test]
fn expression_adjacent_to_keyword_recovers() {
    assert_eq!(
        tokens(&demo(), b"abc\"x\"", Flags::STRIP_MARKERS),
        vec![kw(b"abc"), expr_id(0, b"x")]
    );
    assert_eq!(
        tokens(&demo(), b"abc\"x\"", Flags::empty()),
        vec![kw(b"abc"), expr_id(0, b"\"x\"")]
    );
}

#[test]
fn empty_expression() {
    assert_eq!(
        tokens(&demo(), b"\"\"", Flags::STRIP_MARKERS),
        vec![expr_id(0, b"")]
    );
    assert_eq!(
        tokens(&demo(), b"\"\"", Flags::empty()),
        vec![expr_id(0, b"\"\"")]
    );
}

#[test]
fn multi_byte_markers() {
    assert_eq!(
        tokens(&angle(), b"x<<ab>>y ", Flags::STRIP_MARKERS),
        vec![kw(b"x"), expr_id(0, b"ab"), kw(b"y")]
    );
}

#[test]
fn expressions_do_not_nest() {
    // The first end marker closes; a begin marker in the body is content.
    assert_eq!(
        tokens(&parens(), b"(a(b)c) ", Flags::STRIP_MARKERS),
        vec![expr_id(0, b"a(b"), kw(b"c)")]
    );
}

#[test]
fn second_pair_reports_its_own_id() {
    let built = Grammar::builder()
        .expression(b"(", b")")
        .expression(b"[", b"]")
        .build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    assert_eq!(
        tokens(&grammar, b"[x]", Flags::STRIP_MARKERS),
        vec![expr_id(1, b"x")]
    );
}

#[test]
fn earlier_pair_wins_when_begins_overlap() {
    let built = Grammar::builder()
        .expression(b"<", b"|")
        .expression(b"<<", b"|")
        .build();
    let grammar = match built {
        Ok(grammar) => grammar,
        Err(e) => panic!("grammar invalid: {e}"),
    };
    // Pair 0 opens on the first `<`; the second `<` is already body.
    assert_eq!(
        tokens(&grammar, b"<<x|", Flags::STRIP_MARKERS),
        vec![expr_id(0, b"<x")]
    );
}

#[test]
fn unterminated_expression_flushes_as_keyword() {
    assert_eq!(
        tokens(&demo(), b"\"abc", Flags::STRIP_MARKERS),
        vec![kw(b"abc")]
    );
    assert_eq!(
        tokens(&demo(), b"\"abc", Flags::empty()),
        vec![kw(b"\"abc")]
    );
}

#[test]
fn input_ending_at_begin_marker() {
    // The recover call re-injects the marker, then the flush takes over:
    // stripped it vanishes, kept it flushes as a keyword.
    assert_eq!(
        tokens(&demo(), b"abc\"", Flags::STRIP_MARKERS),
        vec![kw(b"abc")]
    );
    assert_eq!(
        tokens(&demo(), b"abc\"", Flags::empty()),
        vec![kw(b"abc"), kw(b"\"")]
    );
}

// === Escapes ===

#[test]
fn escape_suppresses_closing_marker() {
    assert_eq!(
        tokens(&demo(), b"\"a\\\"b\" ", Flags::STRIP_MARKERS),
        vec![expr_id(0, b"a\\\"b")]
    );
}

#[test]
fn escape_outside_expression_makes_delimiter_literal() {
    assert_eq!(
        tokens(&demo(), b"a\\ b c", Flags::empty()),
        vec![kw(b"a\\ b"), kw(b"c")]
    );
}

#[test]
fn escaped_begin_marker_does_not_open() {
    assert_eq!(
        tokens(&parens(), b"a\\(x ", Flags::empty()),
        vec![kw(b"a\\(x")]
    );
}

#[test]
fn dangling_escape_flushes() {
    assert_eq!(tokens(&demo(), b"ab\\", Flags::empty()), vec![kw(b"ab\\")]);
}

// === Fragments ===

#[test]
fn long_token_fragments_and_completes() {
    assert_eq!(
        run(&demo(), &[&b"abcdefg "[..]], 4, Flags::empty()),
        vec![
            Emit::Frag(TokenKind::Keyword, None, b"abcd".to_vec()),
            kw(b"efg"),
        ]
    );
}

#[test]
fn delimiter_right_after_fragment_discards_silently() {
    // The delimiter lands as the first byte after the boundary, so the
    // fragmented token gets no completing match.
    assert_eq!(
        run(&demo(), &[&b"abcd efg"[..]], 4, Flags::empty()),
        vec![
            Emit::Frag(TokenKind::Keyword, None, b"abcd".to_vec()),
            kw(b"efg"),
        ]
    );
}

#[test]
fn fragment_keeps_expression_classification() {
    assert_eq!(
        run(&demo(), &[&b"\"abcdef\""[..]], 4, Flags::STRIP_MARKERS),
        vec![
            Emit::Frag(TokenKind::Expression, Some(0), b"abcd".to_vec()),
            expr_id(0, b"ef"),
        ]
    );
}

#[test]
fn capacity_one_fragments_each_byte() {
    assert_eq!(
        run(&demo(), &[&b"ab "[..]], 1, Flags::empty()),
        vec![
            Emit::Frag(TokenKind::Keyword, None, b"a".to_vec()),
            Emit::Frag(TokenKind::Keyword, None, b"b".to_vec()),
        ]
    );
}

#[test]
fn capacity_equal_to_longest_punctuation_suffices() {
    // The munch resolves "==" without ever needing a third buffer slot.
    assert_eq!(
        run(&demo(), &[&b"=="[..]], 2, Flags::empty()),
        vec![punc_id(1, b"==")]
    );
}

// === Misuse ===

#[test]
fn zero_capacity_token_is_a_fault() {
    let lexer = Lexer::new(demo());
    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(0);
    match lexer.next_token(&mut cursor, b"a", &mut token, Flags::empty()) {
        Err(Misuse::ZeroCapacityToken) => {}
        other => panic!("expected zero-capacity fault, got {other:?}"),
    }
}

#[test]
fn recover_into_too_small_buffer_is_a_fault() {
    let lexer = Lexer::new(demo());
    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(CAP);
    match lexer.next_token(&mut cursor, b"a==", &mut token, Flags::empty()) {
        Ok(Scan::Match) => assert_eq!(token.bytes(), b"a"),
        other => panic!("expected keyword match, got {other:?}"),
    }
    // The recover call must re-inject "==", which a one-byte buffer
    // cannot hold. The fault consumes nothing.
    let mut small = Token::with_capacity(1);
    match lexer.next_token(&mut cursor, b"a==", &mut small, Flags::empty()) {
        Err(Misuse::TokenTooSmall { required: 2 }) => {}
        other => panic!("expected too-small fault, got {other:?}"),
    }
    match lexer.next_token(&mut cursor, b"a==", &mut token, Flags::empty()) {
        Ok(Scan::Match) => {
            assert_eq!(token.kind(), TokenKind::Punctuation);
            assert_eq!(token.bytes(), b"==");
        }
        other => panic!("expected punctuation match, got {other:?}"),
    }
}

// === Chunked input ===

#[test]
fn need_input_resets_position() {
    let lexer = Lexer::new(demo());
    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(CAP);
    match lexer.next_token(&mut cursor, b"ab", &mut token, Flags::empty()) {
        Ok(Scan::NeedInput) => {}
        other => panic!("expected need-input, got {other:?}"),
    }
    match lexer.next_token(&mut cursor, b"c ", &mut token, Flags::empty()) {
        Ok(Scan::Match) => assert_eq!(token.bytes(), b"abc"),
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn pending_punctuation_survives_chunk_boundary() {
    assert_eq!(
        run(&demo(), &[&b"a="[..], b"=b "], CAP, Flags::empty()),
        vec![kw(b"a"), punc_id(1, b"=="), kw(b"b")]
    );
}

#[test]
fn token_stream_is_chunk_invariant() {
    let input: &[u8] = b"if a==\"x\"+else ";
    let grammar = demo();
    let whole = run(&grammar, &[input], CAP, Flags::STRIP_MARKERS);
    assert_eq!(
        whole,
        vec![
            kw_id(0, b"if"),
            kw(b"a"),
            punc_id(1, b"=="),
            expr_id(0, b"x"),
            punc_id(0, b"+"),
            kw_id(1, b"else"),
        ]
    );
    for cut in 1..input.len() {
        let halves: [&[u8]; 2] = [&input[..cut], &input[cut..]];
        assert_eq!(
            run(&grammar, &halves, CAP, Flags::STRIP_MARKERS),
            whole,
            "cut at {cut}"
        );
    }
}

#[test]
fn swapping_token_buffers_between_calls() {
    let lexer = Lexer::new(angle());
    let mut cursor = Cursor::new();
    let mut big = Token::with_capacity(8);
    match lexer.next_token(&mut cursor, b"x<<ab>>", &mut big, Flags::empty()) {
        Ok(Scan::Match) => assert_eq!(big.bytes(), b"x"),
        other => panic!("expected keyword match, got {other:?}"),
    }
    // The reopened marker exactly fills the smaller buffer, so the
    // expression arrives as fragments plus a final match.
    let mut small = Token::with_capacity(2);
    let mut pieces = Vec::new();
    for _ in 0..10 {
        match lexer.next_token(&mut cursor, b"x<<ab>>", &mut small, Flags::empty()) {
            Ok(Scan::Fragment) => {
                assert_eq!(small.kind(), TokenKind::Expression);
                pieces.extend_from_slice(small.bytes());
            }
            Ok(Scan::Match) => {
                assert_eq!(small.kind(), TokenKind::Expression);
                pieces.extend_from_slice(small.bytes());
                break;
            }
            other => panic!("expected expression pieces, got {other:?}"),
        }
    }
    assert_eq!(pieces, b"<<ab>>");
}

// === Strategy seam ===

/// Delegates straight to the incremental strategy.
struct Delegating(Incremental);

impl Matching for Delegating {
    fn next_token(
        &self,
        grammar: &Grammar,
        cursor: &mut Cursor,
        chunk: &[u8],
        token: &mut Token,
        flags: Flags,
    ) -> Result<Scan, Misuse> {
        self.0.next_token(grammar, cursor, chunk, token, flags)
    }
}

#[test]
fn custom_strategy_plugs_in() {
    let lexer = Lexer::with_matching(demo(), Delegating(Incremental));
    let mut cursor = Cursor::new();
    let mut token = Token::with_capacity(CAP);
    cursor.finish();
    match lexer.next_token(&mut cursor, b"if ", &mut token, Flags::empty()) {
        Ok(Scan::Match) => {}
        other => panic!("expected match, got {other:?}"),
    }
    assert_eq!(token.kind(), TokenKind::Keyword);
    assert_eq!(token.id(), Some(0));
    assert_eq!(lexer.grammar().keyword_count(), 2);
}
