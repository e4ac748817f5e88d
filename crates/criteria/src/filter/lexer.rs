//! Lexer (tokenizer) for filter expressions.

use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{FilterError, FilterResult};

/// A token in a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterToken {
    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,

    /// A bracketed field path, without the brackets (`[Owner.Name]`).
    Field(String),

    /// A double-quoted text literal with escapes resolved.
    Text(String),

    /// Any other run of non-space characters: operators, connectives,
    /// `TRUE`/`FALSE`/`NULL`, numbers, and UUIDs.
    Word(String),
}

impl FilterToken {
    /// Describes the token for error messages.
    pub fn describe(&self) -> String {
        match self {
            FilterToken::OpenParen => "(".to_string(),
            FilterToken::CloseParen => ")".to_string(),
            FilterToken::Field(path) => format!("[{path}]"),
            FilterToken::Text(text) => format!("\"{text}\""),
            FilterToken::Word(word) => word.clone(),
        }
    }
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: FilterToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// Lexer for tokenizing filter expressions.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Tokenizes the whole input.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Syntax` for an unterminated field name or text literal.
    pub fn tokenize(mut self) -> FilterResult<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn next_token(&mut self) -> FilterResult<Option<PositionedToken>> {
        self.skip_whitespace();

        let Some(&(position, c)) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match c {
            '(' => {
                self.chars.next();
                FilterToken::OpenParen
            }
            ')' => {
                self.chars.next();
                FilterToken::CloseParen
            }
            '[' => self.read_field(position)?,
            '"' => self.read_text(position)?,
            _ => self.read_word(),
        };

        Ok(Some(PositionedToken { token, position }))
    }

    /// Reads `[path]`, scanning to the next `]`.
    fn read_field(&mut self, start: usize) -> FilterResult<FilterToken> {
        self.chars.next(); // consume '['

        let mut path = String::new();
        for (_, c) in self.chars.by_ref() {
            if c == ']' {
                return Ok(FilterToken::Field(path));
            }
            path.push(c);
        }
        Err(FilterError::syntax(
            "unterminated field name",
            &self.input[start..],
        ))
    }

    /// Reads a double-quoted text literal.
    ///
    /// `\"` stands for a quote and `\\` for a backslash; a backslash before any
    /// other character is kept as is.
    fn read_text(&mut self, start: usize) -> FilterResult<FilterToken> {
        self.chars.next(); // consume opening quote

        let mut text = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '"' => return Ok(FilterToken::Text(text)),
                '\\' => match self.chars.next_if(|(_, next)| *next == '"' || *next == '\\') {
                    Some((_, escaped)) => text.push(escaped),
                    None => text.push('\\'),
                },
                _ => text.push(c),
            }
        }
        Err(FilterError::syntax(
            "unterminated text value",
            &self.input[start..],
        ))
    }

    /// Reads a bare word up to whitespace or a structural character.
    fn read_word(&mut self) -> FilterToken {
        let mut word = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|(_, c)| !c.is_whitespace() && !matches!(c, '(' | ')' | '[' | '"'))
        {
            word.push(c);
        }
        FilterToken::Word(word)
    }
}
