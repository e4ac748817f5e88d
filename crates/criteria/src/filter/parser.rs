//! Recursive descent parser for filter expressions.

use std::str::FromStr;

use tracing::trace;
use uuid::Uuid;

use super::ast::{Clause, Condition, Connective, FieldPath, Filter, Operand, Operator, Predicate};
use super::error::{FilterError, FilterResult};
use super::lexer::{FilterToken, Lexer, PositionedToken};
use super::value::Number;
use crate::config::EngineSettings;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Parser for the textual filter grammar.
///
/// # Grammar
///
/// ```text
/// filter     ::= term (connective term)*
/// term       ::= "(" filter ")" | condition
/// condition  ::= "[" path "]" operator operand
/// connective ::= "AND" | "OR"
/// operator   ::= "CONTAINS" | "STARTSWITH" | "ENDSWITH"
///              | "==" | "!=" | ">=" | "<=" | ">" | "<"
/// operand    ::= "[" path "]" | '"' text '"' | "TRUE" | "FALSE" | "NULL"
///              | uuid | number
/// ```
///
/// The grammar itself is a flat chain and parentheses are the only way to
/// nest. Evaluation reads the chain as AND-runs separated by `OR`, so
/// `AND` binds tighter: `[A] == 1 AND [B] == 2 OR [C] == 3` is
/// `([A] == 1 AND [B] == 2) OR [C] == 3`.
/// Keywords are case-insensitive.
///
/// # Example
///
/// ```
/// use criteria_rs::filter::{FilterParser, Operator};
///
/// let filter = FilterParser::parse("[Age] > 30 AND [Age] < 40").unwrap();
/// assert_eq!(filter.len(), 2);
///
/// let first = filter.clauses()[0].as_condition().unwrap();
/// assert_eq!(first.operator(), Operator::GreaterThan);
/// ```
pub struct FilterParser<'a> {
    input: &'a str,
    tokens: Vec<PositionedToken>,
    position: usize,
    max_depth: usize,
}

impl<'a> FilterParser<'a> {
    /// Parses a filter expression with default settings.
    ///
    /// Blank input parses to the empty filter.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Syntax` for unterminated brackets or quotes,
    /// unbalanced parentheses, unknown operators or connectives, and values
    /// that cannot be read.
    pub fn parse(input: &str) -> FilterResult<Filter> {
        FilterParser::parse_with(input, &EngineSettings::default())
    }

    /// Parses a filter expression, limiting group nesting to `settings.max_depth`.
    ///
    /// # Errors
    ///
    /// Same as [`FilterParser::parse`], plus a syntax error when groups nest
    /// deeper than allowed.
    pub fn parse_with(input: &'a str, settings: &EngineSettings) -> FilterResult<Filter> {
        let tokens = Lexer::new(input).tokenize()?;
        if tokens.is_empty() {
            return Ok(Filter::empty());
        }

        let mut parser = Self {
            input,
            tokens,
            position: 0,
            max_depth: settings.max_depth,
        };
        let clauses = parser.parse_chain(0)?;

        // Anything left over can only be a stray ')'
        if let Some(remaining) = parser.peek_positioned() {
            return Err(FilterError::syntax(
                "unbalanced parenthesis: unexpected ')'",
                &input[remaining.position..],
            ));
        }

        let filter = Filter::from_clauses(clauses);
        trace!(clauses = filter.len(), "parsed filter expression");
        Ok(filter)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&FilterToken> {
        self.peek_positioned().map(|t| &t.token)
    }

    fn peek_positioned(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Input from the given token onwards, for error messages.
    fn fragment_at(&self, token: &PositionedToken) -> &'a str {
        &self.input[token.position..]
    }

    fn end_of_input(&self, expected: &str) -> FilterError {
        let tail_start = self
            .tokens
            .last()
            .map_or(0, |last| last.position);
        FilterError::syntax(
            format!("unexpected end of expression, expected {expected}"),
            &self.input[tail_start..],
        )
    }

    /// Parses `term (connective term)*`, stopping before `)` or end of input.
    fn parse_chain(&mut self, depth: usize) -> FilterResult<Vec<Clause>> {
        let mut clauses = Vec::new();
        let mut connective = Connective::None;

        loop {
            let predicate = self.parse_term(depth)?;
            clauses.push(Clause {
                connective,
                predicate,
            });

            match self.peek() {
                None | Some(FilterToken::CloseParen) => break,
                Some(_) => connective = self.parse_connective()?,
            }
        }

        Ok(clauses)
    }

    fn parse_connective(&mut self) -> FilterResult<Connective> {
        let Some(token) = self.advance() else {
            return Err(self.end_of_input("AND or OR"));
        };
        if let FilterToken::Word(word) = &token.token {
            if let Some(connective) = Connective::from_keyword(word) {
                return Ok(connective);
            }
        }
        let found = token.token.describe();
        let message = match suggest(&found, &["AND", "OR"]) {
            Some(keyword) => format!("unknown connective '{found}' (did you mean '{keyword}'?)"),
            None => format!("expected AND or OR, found '{found}'"),
        };
        Err(FilterError::syntax(message, self.fragment_at(&token)))
    }

    /// Parses `"(" filter ")"` or a condition.
    fn parse_term(&mut self, depth: usize) -> FilterResult<Predicate> {
        let Some(token) = self.advance() else {
            return Err(self.end_of_input("'(' or '['"));
        };

        match &token.token {
            FilterToken::OpenParen => {
                if depth >= self.max_depth {
                    return Err(FilterError::syntax(
                        format!("groups nest deeper than {} levels", self.max_depth),
                        self.fragment_at(&token),
                    ));
                }
                let inner = self.parse_chain(depth + 1)?;
                match self.advance() {
                    Some(PositionedToken {
                        token: FilterToken::CloseParen,
                        ..
                    }) => Ok(Predicate::Group(Filter::from_clauses(inner))),
                    _ => Err(FilterError::syntax(
                        "unbalanced parenthesis: missing ')'",
                        self.fragment_at(&token),
                    )),
                }
            }
            FilterToken::Field(path) => {
                let field = self.parse_field_path(path, &token)?;
                let condition = self.parse_condition(field, &token)?;
                Ok(Predicate::Condition(condition))
            }
            other => Err(FilterError::syntax(
                format!("expected '(' or '[', found '{}'", other.describe()),
                self.fragment_at(&token),
            )),
        }
    }

    fn parse_field_path(&self, path: &str, token: &PositionedToken) -> FilterResult<FieldPath> {
        FieldPath::parse(path).map_err(|e| {
            let reason = match e {
                FilterError::InvalidFilter { reason } => reason,
                other => other.to_string(),
            };
            FilterError::syntax(reason, self.fragment_at(token))
        })
    }

    /// Parses `operator operand` after the field has been read.
    fn parse_condition(
        &mut self,
        field: FieldPath,
        field_token: &PositionedToken,
    ) -> FilterResult<Condition> {
        let operator = self.parse_operator()?;
        let operand = self.parse_operand(operator)?;
        Condition::new(field, operator, operand).map_err(|e| {
            FilterError::syntax(e.to_string(), self.fragment_at(field_token))
        })
    }

    fn parse_operator(&mut self) -> FilterResult<Operator> {
        let Some(token) = self.advance() else {
            return Err(self.end_of_input("an operator"));
        };
        if let FilterToken::Word(word) = &token.token {
            if let Some(operator) = Operator::from_keyword(word) {
                return Ok(operator);
            }
        }
        let found = token.token.describe();
        let keywords: Vec<&str> = Operator::ALL.iter().map(|op| op.keyword()).collect();
        let message = match suggest(&found, &keywords) {
            Some(keyword) => format!("unknown operator '{found}' (did you mean '{keyword}'?)"),
            None => format!("unknown operator '{found}'"),
        };
        Err(FilterError::syntax(message, self.fragment_at(&token)))
    }

    /// Parses an operand: field, text, boolean, null, UUID, or number, in that order.
    fn parse_operand(&mut self, operator: Operator) -> FilterResult<Operand> {
        let Some(token) = self.advance() else {
            return Err(self.end_of_input("a value"));
        };

        match &token.token {
            FilterToken::Field(path) => Ok(Operand::Field(self.parse_field_path(path, &token)?)),
            FilterToken::Text(text) => Ok(Operand::Text(text.clone())),
            FilterToken::Word(word) => {
                if word.eq_ignore_ascii_case("TRUE") {
                    Ok(Operand::Bool(true))
                } else if word.eq_ignore_ascii_case("FALSE") {
                    Ok(Operand::Bool(false))
                } else if word.eq_ignore_ascii_case("NULL") {
                    if operator.is_equality() {
                        Ok(Operand::Null)
                    } else {
                        Err(FilterError::syntax(
                            format!("NULL can only be compared with == or !=, not {operator}"),
                            self.fragment_at(&token),
                        ))
                    }
                } else if let Ok(uuid) = Uuid::parse_str(word) {
                    Ok(Operand::Uuid(uuid))
                } else if let Some(number) = Number::parse_narrowest(word) {
                    Ok(Operand::Number(number))
                } else {
                    Err(FilterError::syntax(
                        format!("invalid value '{word}'"),
                        self.fragment_at(&token),
                    ))
                }
            }
            other => Err(FilterError::syntax(
                format!("expected a value, found '{}'", other.describe()),
                self.fragment_at(&token),
            )),
        }
    }
}

/// Returns the keyword closest to `found`, if any is close enough.
fn suggest<'k>(found: &str, keywords: &[&'k str]) -> Option<&'k str> {
    let found = found.to_ascii_uppercase();
    keywords
        .iter()
        .map(|keyword| (*keyword, strsim::jaro_winkler(&found, keyword)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(keyword, _)| keyword)
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterParser::parse(s)
    }
}
