pub mod token;

pub use token::{Position, Span, Token, TokenKind};

use crate::diagnostics::Diagnostics;

#[cfg(test)]
mod tests;

/// Tokenize the whole source string. Lexical errors are reported to the
/// sink and surface in the stream as `Invalid` tokens; the stream always
/// ends with exactly one `Eof` token.
pub fn lex(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    lexer.lex_all(diagnostics)
}

/// Snapshot of the cursor, used to back out of speculative scans.
#[derive(Clone, Copy)]
struct Checkpoint {
    position: usize,
    offset: usize,
    line: u32,
    column: u32,
    line_start: usize,
    last: Position,
}

struct Lexer {
    input: Vec<char>,
    position: usize,
    offset: usize,
    line: u32,
    column: u32,
    line_start: usize,
    /// Position of the most recently consumed character; token spans end
    /// here so that slicing a span recovers the exact lexeme.
    last: Position,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
            line_start: 0,
            last: Position::start(),
        }
    }

    fn lex_all(&mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                let pos = self.current_position();
                tokens.push(Token::new(TokenKind::Eof, Span::new(pos, pos)));
                break;
            }

            tokens.push(self.next_token(diagnostics));
        }

        tokens
    }

    fn next_token(&mut self, diagnostics: &mut Diagnostics) -> Token {
        let start = self.current_position();
        let ch = self.peek();

        let kind = match ch {
            '0'..='9' => self.lex_number(),
            '"' => self.lex_string(start, diagnostics),
            '\'' => self.lex_character(start, diagnostics),
            'a'..='z' | 'A'..='Z' => self.lex_identifier_or_keyword(),
            '+' => {
                self.advance();
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::PlusEqual
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                self.advance();
                match self.peek() {
                    '=' => {
                        self.advance();
                        TokenKind::MinusEqual
                    }
                    '>' => {
                        self.advance();
                        TokenKind::Arrow
                    }
                    _ => TokenKind::Minus,
                }
            }
            '*' => {
                self.advance();
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::StarEqual
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                self.advance();
                match self.peek() {
                    '=' => {
                        self.advance();
                        TokenKind::SlashEqual
                    }
                    // Two-slash comments were skipped before this token
                    // started, so a second slash here opens a `///` run.
                    '/' => self.lex_doc_comment(),
                    _ => TokenKind::Slash,
                }
            }
            '=' => {
                self.advance();
                match self.peek() {
                    '=' => {
                        self.advance();
                        TokenKind::EqualEqual
                    }
                    '>' => {
                        self.advance();
                        TokenKind::FatArrow
                    }
                    _ => TokenKind::Equal,
                }
            }
            '!' => {
                self.advance();
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                self.advance();
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                self.advance();
                if self.peek() == '=' {
                    self.advance();
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            '(' => {
                self.advance();
                TokenKind::LeftParen
            }
            ')' => {
                self.advance();
                TokenKind::RightParen
            }
            '{' => {
                self.advance();
                TokenKind::LeftBrace
            }
            '}' => {
                self.advance();
                TokenKind::RightBrace
            }
            '[' => {
                self.advance();
                TokenKind::LeftBracket
            }
            ']' => {
                self.advance();
                TokenKind::RightBracket
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            ';' => {
                self.advance();
                TokenKind::Semicolon
            }
            ':' => {
                self.advance();
                TokenKind::Colon
            }
            '.' => {
                self.advance();
                TokenKind::Dot
            }
            _ => {
                self.advance();
                diagnostics.report(
                    format!("Unexpected Character '{}'", ch),
                    Span::new(start, self.last),
                );
                TokenKind::Invalid
            }
        };

        Token::new(kind, Span::new(start, self.last))
    }

    fn lex_identifier_or_keyword(&mut self) -> TokenKind {
        let mut name = String::new();
        while !self.is_at_end() {
            match self.peek() {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => name.push(self.advance()),
                _ => break,
            }
        }

        match name.as_str() {
            "let" => TokenKind::Let,
            "fun" => TokenKind::Fun,
            "class" => TokenKind::Class,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "or" => TokenKind::Or,
            "and" => TokenKind::And,
            "print" => TokenKind::Print,
            _ => TokenKind::Identifier,
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A dot only belongs to the number when another digit follows;
        // a lone trailing dot is left for the next token.
        if self.peek() == '.' && self.peek_at(1).is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        }
    }

    fn lex_string(&mut self, start: Position, diagnostics: &mut Diagnostics) -> TokenKind {
        self.advance(); // opening quote

        while !self.is_at_end() {
            if self.advance() == '"' {
                return TokenKind::StringLiteral;
            }
        }

        diagnostics.report("Unterminated String", Span::new(start, self.last));
        TokenKind::Invalid
    }

    fn lex_character(&mut self, start: Position, diagnostics: &mut Diagnostics) -> TokenKind {
        self.advance(); // opening quote

        if self.is_at_end() {
            diagnostics.report("Malformed character literal", Span::new(start, self.last));
            return TokenKind::Invalid;
        }

        if self.peek() == '\\' {
            self.advance();
            match self.peek() {
                '0' | 'n' | 'r' | 't' | '\\' | '\'' | '"' => {
                    self.advance();
                }
                _ => {
                    if !self.is_at_end() {
                        self.advance();
                    }
                    diagnostics.report("Malformed character literal", Span::new(start, self.last));
                    return TokenKind::Invalid;
                }
            }
        } else if self.peek() == '\'' {
            // Empty literal.
            self.advance();
            diagnostics.report("Malformed character literal", Span::new(start, self.last));
            return TokenKind::Invalid;
        } else {
            self.advance();
        }

        if self.peek() == '\'' {
            self.advance();
            TokenKind::CharacterLiteral
        } else {
            diagnostics.report("Malformed character literal", Span::new(start, self.last));
            TokenKind::Invalid
        }
    }

    /// Lex a `///` doc comment, absorbing every contiguous `///` line
    /// (and the whitespace between them) into a single token.
    fn lex_doc_comment(&mut self) -> TokenKind {
        // The first slash is already consumed; take the second and third.
        self.advance();
        self.advance();
        self.consume_until_newline();

        loop {
            let checkpoint = self.checkpoint();
            while !self.is_at_end() && self.peek().is_whitespace() {
                self.advance();
            }
            if self.peek() == '/' && self.peek_at(1) == '/' && self.peek_at(2) == '/' {
                self.advance();
                self.advance();
                self.advance();
                self.consume_until_newline();
            } else {
                self.restore(checkpoint);
                break;
            }
        }

        TokenKind::DocStringComment
    }

    fn consume_until_newline(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if !self.is_at_end() && self.peek().is_whitespace() {
                self.advance();
                continue;
            }
            // Exactly-two-slash comments are discarded here; `///` runs
            // are lexed as DocStringComment tokens by next_token.
            if self.peek() == '/' && self.peek_at(1) == '/' && self.peek_at(2) != '/' {
                self.advance();
                self.advance();
                self.consume_until_newline();
                continue;
            }
            break;
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            offset: self.offset,
            line: self.line,
            column: self.column,
            line_start: self.line_start,
            last: self.last,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.offset = checkpoint.offset;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.line_start = checkpoint.line_start;
        self.last = checkpoint.last;
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.offset, self.line_start)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, lookahead: usize) -> char {
        self.input.get(self.position + lookahead).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let ch = self.peek();
        self.last = self.current_position();
        self.position += 1;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
            self.line_start = self.offset;
        } else {
            self.column += 1;
        }
        ch
    }
}
