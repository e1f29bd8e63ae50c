use expect_test::{expect, Expect};

use super::*;
use crate::diagnostics::Diagnostics;

/// Lex the input and render one `kind [start-end] lexeme` line per
/// token.
fn check_tokens(input: &str, expect: Expect) {
    let mut diagnostics = Diagnostics::new();
    let tokens = lex(input, &mut diagnostics);
    let rendered: String = tokens
        .iter()
        .map(|token| {
            format!(
                "{:?} [{}:{}-{}:{}] {:?}\n",
                token.kind,
                token.span.start.line,
                token.span.start.column,
                token.span.end.line,
                token.span.end.column,
                token.lexeme(input),
            )
        })
        .collect();
    expect.assert_eq(&rendered);
}

fn lex_with_diagnostics(input: &str) -> (Vec<Token>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = lex(input, &mut diagnostics);
    (tokens, diagnostics)
}

#[test]
fn lex_integer_literal() {
    check_tokens(
        "42",
        expect![[r#"
            IntegerLiteral [1:1-1:2] "42"
            Eof [1:3-1:3] ""
        "#]],
    );
}

#[test]
fn lex_float_literal() {
    check_tokens(
        "3.14",
        expect![[r#"
            FloatLiteral [1:1-1:4] "3.14"
            Eof [1:5-1:5] ""
        "#]],
    );
}

#[test]
fn lex_trailing_dot_is_not_part_of_number() {
    check_tokens(
        "7.",
        expect![[r#"
            IntegerLiteral [1:1-1:1] "7"
            Dot [1:2-1:2] "."
            Eof [1:3-1:3] ""
        "#]],
    );
}

#[test]
fn lex_string_literal() {
    check_tokens(
        "\"hi\"",
        expect![[r#"
            StringLiteral [1:1-1:4] "\"hi\""
            Eof [1:5-1:5] ""
        "#]],
    );
}

#[test]
fn lex_let_statement() {
    check_tokens(
        "let x = true;",
        expect![[r#"
            Let [1:1-1:3] "let"
            Identifier [1:5-1:5] "x"
            Equal [1:7-1:7] "="
            True [1:9-1:12] "true"
            Semicolon [1:13-1:13] ";"
            Eof [1:14-1:14] ""
        "#]],
    );
}

#[test]
fn lex_keywords() {
    check_tokens(
        "let fun class new this if else while for return true false break continue or and print",
        expect![[r#"
            Let [1:1-1:3] "let"
            Fun [1:5-1:7] "fun"
            Class [1:9-1:13] "class"
            New [1:15-1:17] "new"
            This [1:19-1:22] "this"
            If [1:24-1:25] "if"
            Else [1:27-1:30] "else"
            While [1:32-1:36] "while"
            For [1:38-1:40] "for"
            Return [1:42-1:47] "return"
            True [1:49-1:52] "true"
            False [1:54-1:58] "false"
            Break [1:60-1:64] "break"
            Continue [1:66-1:73] "continue"
            Or [1:75-1:76] "or"
            And [1:78-1:80] "and"
            Print [1:82-1:86] "print"
            Eof [1:87-1:87] ""
        "#]],
    );
}

#[test]
fn lex_two_character_operators() {
    check_tokens(
        "+= -= *= /= == != <= >= -> =>",
        expect![[r#"
            PlusEqual [1:1-1:2] "+="
            MinusEqual [1:4-1:5] "-="
            StarEqual [1:7-1:8] "*="
            SlashEqual [1:10-1:11] "/="
            EqualEqual [1:13-1:14] "=="
            BangEqual [1:16-1:17] "!="
            LessEqual [1:19-1:20] "<="
            GreaterEqual [1:22-1:23] ">="
            Arrow [1:25-1:26] "->"
            FatArrow [1:28-1:29] "=>"
            Eof [1:30-1:30] ""
        "#]],
    );
}

#[test]
fn lex_single_character_tokens() {
    check_tokens(
        "+ - * / = ! < > ( ) { } [ ] , ; : .",
        expect![[r#"
            Plus [1:1-1:1] "+"
            Minus [1:3-1:3] "-"
            Star [1:5-1:5] "*"
            Slash [1:7-1:7] "/"
            Equal [1:9-1:9] "="
            Bang [1:11-1:11] "!"
            Less [1:13-1:13] "<"
            Greater [1:15-1:15] ">"
            LeftParen [1:17-1:17] "("
            RightParen [1:19-1:19] ")"
            LeftBrace [1:21-1:21] "{"
            RightBrace [1:23-1:23] "}"
            LeftBracket [1:25-1:25] "["
            RightBracket [1:27-1:27] "]"
            Comma [1:29-1:29] ","
            Semicolon [1:31-1:31] ";"
            Colon [1:33-1:33] ":"
            Dot [1:35-1:35] "."
            Eof [1:36-1:36] ""
        "#]],
    );
}

#[test]
fn lex_line_comment_is_discarded() {
    check_tokens(
        "1 // note\n2",
        expect![[r#"
            IntegerLiteral [1:1-1:1] "1"
            IntegerLiteral [2:1-2:1] "2"
            Eof [2:2-2:2] ""
        "#]],
    );
}

#[test]
fn lex_doc_comment_spans_contiguous_lines() {
    check_tokens(
        "/// a\n/// b\nlet",
        expect![[r#"
            DocStringComment [1:1-2:5] "/// a\n/// b"
            Let [3:1-3:3] "let"
            Eof [3:4-3:4] ""
        "#]],
    );
}

#[test]
fn lex_character_literals() {
    check_tokens(
        "'a' '\\n'",
        expect![[r#"
            CharacterLiteral [1:1-1:3] "'a'"
            CharacterLiteral [1:5-1:8] "'\\n'"
            Eof [1:9-1:9] ""
        "#]],
    );
}

#[test]
fn lex_positions_across_lines() {
    check_tokens(
        "a\n  b",
        expect![[r#"
            Identifier [1:1-1:1] "a"
            Identifier [2:3-2:3] "b"
            Eof [2:4-2:4] ""
        "#]],
    );
}

#[test]
fn lex_unterminated_string() {
    let (tokens, diagnostics) = lex_with_diagnostics("\"abc");
    assert_eq!(tokens[0].kind, TokenKind::Invalid);
    assert_eq!(tokens[1].kind, TokenKind::Eof);
    assert!(diagnostics.had_error());
    assert_eq!(diagnostics.entries()[0].message, "Unterminated String");
}

#[test]
fn lex_unexpected_character() {
    let (tokens, diagnostics) = lex_with_diagnostics("let @ = 1;");
    assert_eq!(tokens[1].kind, TokenKind::Invalid);
    assert_eq!(diagnostics.entries()[0].message, "Unexpected Character '@'");
    assert_eq!(diagnostics.entries()[0].span.start.column, 5);
    assert_eq!(diagnostics.entries()[0].span.end.column, 5);
}

#[test]
fn lex_malformed_character_literal() {
    let (tokens, diagnostics) = lex_with_diagnostics("'ab'");
    assert_eq!(tokens[0].kind, TokenKind::Invalid);
    assert_eq!(diagnostics.entries()[0].message, "Malformed character literal");
}

#[test]
fn lex_empty_character_literal() {
    let (tokens, diagnostics) = lex_with_diagnostics("''");
    assert_eq!(tokens[0].kind, TokenKind::Invalid);
    assert!(diagnostics.had_error());
}

#[test]
fn lex_stream_ends_with_single_eof() {
    for input in ["", "   ", "// only a comment", "let x = 1;"] {
        let (tokens, _) = lex_with_diagnostics(input);
        let eof_count = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        assert_eq!(eof_count, 1, "input {:?}", input);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }
}

#[test]
fn lexemes_round_trip_through_span_slicing() {
    let source = "let total = 4 + 2; // sum\nprintln(\"ok\");";
    let (tokens, diagnostics) = lex_with_diagnostics(source);
    assert!(!diagnostics.had_error());

    let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme(source)).collect();
    assert_eq!(
        lexemes,
        [
            "let", "total", "=", "4", "+", "2", ";", "println", "(", "\"ok\"", ")", ";", ""
        ]
    );
}
