//! Lexical analyzer

use std::iter::Peekable;
use std::rc::Rc;
use std::str::CharIndices;

use crate::ctx::Context;
use crate::diag::{Position, SyntaxError};
use crate::token::{Literal, Token, TokenKind};

/// Turn source text into a sequence of tokens.
///
/// Scanning never stops early: bad input is recorded as a diagnostic and skipped.
#[derive(Debug)]
pub struct Scanner<'a> {
    source: &'a str,
    input: Peekable<CharIndices<'a>>,
    ctx: Rc<Context>,

    // Byte offset of the first character of the token being scanned.
    start: usize,
    line: Position,

    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner operating on `source`.
    pub fn new(source: &'a str, ctx: Rc<Context>) -> Scanner<'a> {
        Scanner {
            source,
            input: source.char_indices().peekable(),
            ctx,
            start: 0,
            line: 1,
            tokens: vec![],
            errors: vec![],
        }
    }

    /// Scan the whole source.
    ///
    /// The token sequence always ends with exactly one `Eof` token.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<SyntaxError>) {
        while let Some((start, ch)) = self.input.next() {
            self.start = start;
            self.scan_token(ch);
        }
        let eof = Token::new(TokenKind::Eof, self.ctx.symbol(""), None, self.line);
        self.tokens.push(eof);
        tracing::trace!(
            tokens = self.tokens.len(),
            errors = self.errors.len(),
            "scanned"
        );
        (self.tokens, self.errors)
    }

    fn scan_token(&mut self, ch: char) {
        match ch {
            '\n' => self.line += 1,
            ' ' | '\t' | '\r' => (),
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '!' => self.add_either('=', TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.add_either('=', TokenKind::EqualEqual, TokenKind::Equal),
            '<' => self.add_either('=', TokenKind::LessEqual, TokenKind::Less),
            '>' => self.add_either('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '/' => {
                if self.next_if_eq('/') {
                    self.skip_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            '"' => self.scan_string(),
            '0'..='9' => self.scan_number(),
            'a'..='z' | 'A'..='Z' | '_' => self.scan_identifier(),
            _ => self.errors.push(SyntaxError::at_line(
                self.line,
                "Unexpected character.",
            )),
        }
    }

    fn add_either(&mut self, second: char, two_chars: TokenKind, one_char: TokenKind) {
        let kind = if self.next_if_eq(second) {
            two_chars
        } else {
            one_char
        };
        self.add_token(kind);
    }

    fn skip_comment(&mut self) {
        while self.input.next_if(|&(_, ch)| ch != '\n').is_some() {}
    }

    fn scan_string(&mut self) {
        loop {
            match self.input.next() {
                Some((_, '"')) => break,
                Some((_, '\n')) => self.line += 1,
                Some(_) => (),
                None => {
                    self.errors
                        .push(SyntaxError::at_line(self.line, "Unterminated string."));
                    return;
                }
            }
        }

        let lexeme = self.lexeme();
        let value = &lexeme[1..lexeme.len() - 1];
        self.add_literal(TokenKind::String, Literal::Str(Rc::from(value)));
    }

    fn scan_number(&mut self) {
        self.skip_digits();

        // A trailing dot without a digit after it is not part of the number.
        if self.peek() == Some('.') && self.peek_next().map_or(false, |ch| ch.is_ascii_digit()) {
            self.input.next();
            self.skip_digits();
        }

        if let Ok(n) = self.lexeme().parse::<f64>() {
            self.add_literal(TokenKind::Number, Literal::Number(n));
        }
    }

    fn skip_digits(&mut self) {
        while self.input.next_if(|&(_, ch)| ch.is_ascii_digit()).is_some() {}
    }

    fn scan_identifier(&mut self) {
        while self
            .input
            .next_if(|&(_, ch)| ch.is_ascii_alphanumeric() || ch == '_')
            .is_some()
        {}

        let text = self.lexeme();
        let sym = self.ctx.symbol(text);
        let kind = self.ctx.keyword(&sym).unwrap_or(TokenKind::Identifier);
        self.tokens.push(Token::new(kind, sym, None, self.line));
    }

    fn add_token(&mut self, kind: TokenKind) {
        let text = self.lexeme();
        let lexeme = self.ctx.symbol(text);
        self.tokens.push(Token::new(kind, lexeme, None, self.line));
    }

    fn add_literal(&mut self, kind: TokenKind, literal: Literal) {
        let text = self.lexeme();
        let lexeme = self.ctx.symbol(text);
        self.tokens
            .push(Token::new(kind, lexeme, Some(literal), self.line));
    }

    /// Source text of the token being scanned.
    fn lexeme(&mut self) -> &'a str {
        let source = self.source;
        let end = self.input.peek().map_or(source.len(), |&(i, _)| i);
        &source[self.start..end]
    }

    fn next_if_eq(&mut self, expected: char) -> bool {
        self.input.next_if(|&(_, ch)| ch == expected).is_some()
    }

    fn peek(&mut self) -> Option<char> {
        self.input.peek().map(|&(_, ch)| ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut ahead = self.input.clone();
        ahead.next();
        ahead.next().map(|(_, ch)| ch)
    }
}
