//! Tokenizer for one line of s-expression text.
//!
//! `(`, `)` and `'` are single-character tokens. Every other token is an atom:
//! a maximal run of characters that are neither whitespace nor one of those
//! three delimiters. There are no strings, escapes or comments at this level.

use log::trace;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{map, value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    LParen,
    RParen,
    Quote,
    /// Integer or symbol text, classified by the parser
    Atom(&'a str),
}

/// A token together with its byte offset in the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub offset: usize,
}

impl Token<'_> {
    /// Source text of the token.
    pub fn text(&self) -> &str {
        match self.kind {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Quote => "'",
            TokenKind::Atom(text) => text,
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '\'')
}

fn skip_whitespace(input: &str) -> IResult<&str, &str> {
    take_while(char::is_whitespace).parse(input)
}

fn token_kind(input: &str) -> IResult<&str, TokenKind<'_>> {
    alt((
        value(TokenKind::LParen, char('(')),
        value(TokenKind::RParen, char(')')),
        value(TokenKind::Quote, char('\'')),
        map(take_while1(|c: char| !is_delimiter(c)), TokenKind::Atom),
    ))
    .parse(input)
}

/// Cursor over the remaining input of a line.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    rest: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, rest: input }
    }

    /// The complete line this lexer was created from.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Input not consumed yet.
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    /// Byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.input.len() - self.rest.len()
    }

    /// Skip whitespace and consume one token. `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if let Ok((rest, _)) = skip_whitespace(self.rest) {
            self.rest = rest;
        }
        if self.rest.is_empty() {
            return None;
        }

        let offset = self.offset();
        let (rest, kind) = token_kind(self.rest).ok()?;
        self.rest = rest;
        trace!("token {kind:?} at {offset}");
        Some(Token { kind, offset })
    }

    /// The token `next_token` would return, without consuming it.
    pub fn peek_token(&self) -> Option<Token<'a>> {
        self.clone().next_token()
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Split a whole line into tokens.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}
