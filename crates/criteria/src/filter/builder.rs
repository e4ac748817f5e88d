//! Serializer from the filter AST to the textual grammar.

use std::fmt::{self, Write};

use super::ast::{Condition, Filter, Operand, Predicate};

/// Serializes filters to the textual grammar read by [`FilterParser`].
///
/// The output is what backends and URLs exchange, so the layout is fixed:
/// single spaces around operators and connectives, uppercase keywords, text
/// in double quotes, and `== NULL` / `!= NULL` for null comparisons.
///
/// [`FilterParser`]: super::FilterParser
pub struct FilterBuilder;

impl FilterBuilder {
    /// Returns the textual form of `filter`; the empty filter yields `""`.
    pub fn build(filter: &Filter) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = write_chain(&mut out, filter);
        out
    }

    /// Returns the textual form of a single condition.
    pub fn build_condition(condition: &Condition) -> String {
        let mut out = String::new();
        let _ = write_condition(&mut out, condition);
        out
    }
}

fn write_chain<W: Write>(out: &mut W, filter: &Filter) -> fmt::Result {
    for (i, clause) in filter.iter().enumerate() {
        if i > 0 {
            write!(out, " {} ", clause.connective().keyword())?;
        }
        match clause.predicate() {
            Predicate::Condition(condition) => write_condition(out, condition)?,
            Predicate::Group(group) => {
                out.write_char('(')?;
                write_chain(out, group)?;
                out.write_char(')')?;
            }
        }
    }
    Ok(())
}

fn write_condition<W: Write>(out: &mut W, condition: &Condition) -> fmt::Result {
    write!(out, "[{}] {} ", condition.field(), condition.operator())?;
    write_operand(out, condition.operand())
}

fn write_operand<W: Write>(out: &mut W, operand: &Operand) -> fmt::Result {
    match operand {
        Operand::Null => out.write_str("NULL"),
        Operand::Field(path) => write!(out, "[{path}]"),
        Operand::Bool(true) => out.write_str("TRUE"),
        Operand::Bool(false) => out.write_str("FALSE"),
        Operand::Uuid(uuid) => write!(out, "{}", uuid.hyphenated()),
        Operand::Number(number) => write!(out, "{number}"),
        Operand::Text(text) => write_quoted(out, text),
    }
}

/// Writes `text` in double quotes, escaping `"` and `\` with a backslash.
fn write_quoted<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.write_char('\\')?;
        }
        out.write_char(c)?;
    }
    out.write_char('"')
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_chain(f, self)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_condition(f, self)
    }
}

impl Filter {
    /// Returns the textual form of this filter.
    pub fn to_query_string(&self) -> String {
        FilterBuilder::build(self)
    }
}
