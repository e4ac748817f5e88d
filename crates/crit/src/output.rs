//! Output formatting utilities for the crit CLI.
//!
//! Text output renders filters in their canonical grammar, optionally with
//! field paths and connectives highlighted. JSON output structures live here
//! too so every command emits the same shapes.

use criteria_rs::filter::{Condition, Predicate};
use criteria_rs::Filter;
use owo_colors::OwoColorize;
use serde::Serialize;

/// JSON output structure for a single filter.
#[derive(Serialize)]
pub struct FilterOutput<'a> {
    /// Canonical text form.
    pub filter: String,
    /// Number of leaf conditions at every nesting level.
    pub conditions: usize,
    /// Structured tree.
    pub tree: &'a Filter,
}

impl<'a> FilterOutput<'a> {
    pub fn new(filter: &'a Filter) -> Self {
        Self {
            filter: filter.to_string(),
            conditions: filter.condition_count(),
            tree: filter,
        }
    }
}

/// JSON output structure for the split command.
#[derive(Serialize)]
pub struct SplitOutput {
    pub split: bool,
    pub chunk_size: usize,
    pub chunks: Vec<String>,
}

/// JSON output structure for the match command.
#[derive(Serialize)]
pub struct MatchOutput<'a> {
    pub filter: String,
    pub total: usize,
    pub matched: usize,
    pub items: Vec<&'a serde_json::Value>,
}

/// Formats a filter as text, highlighting field paths and connectives.
///
/// Without colors this is exactly the canonical form.
pub fn format_filter(filter: &Filter, use_colors: bool) -> String {
    if !use_colors {
        return filter.to_string();
    }
    if filter.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    for (i, clause) in filter.iter().enumerate() {
        if i > 0 {
            out.push_str(&format!(" {} ", clause.connective().keyword().bold()));
        }
        match clause.predicate() {
            Predicate::Condition(condition) => out.push_str(&paint_condition(condition)),
            Predicate::Group(group) => {
                out.push_str(&format!("{}", "(".dimmed()));
                out.push_str(&format_filter(group, use_colors));
                out.push_str(&format!("{}", ")".dimmed()));
            }
        }
    }
    out
}

fn paint_condition(condition: &Condition) -> String {
    let text = condition.to_string();
    let field = format!("[{}]", condition.field());
    let rest = text.strip_prefix(field.as_str()).unwrap_or(&text);
    format!("{}{}", field.cyan(), rest)
}

/// Formats the result of a split, one chunk per line.
pub fn format_chunks(chunks: &[Filter], use_colors: bool) -> String {
    let mut output = String::new();
    for chunk in chunks {
        output.push_str(&format_filter(chunk, use_colors));
        output.push('\n');
    }
    output
}

/// Formats the one-line match summary.
pub fn format_match_summary(matched: usize, total: usize, use_colors: bool) -> String {
    let noun = if total == 1 { "document" } else { "documents" };
    let summary = format!("{matched} of {total} {noun} matched");
    if use_colors {
        if matched > 0 {
            summary.green().to_string()
        } else {
            summary.yellow().to_string()
        }
    } else {
        summary
    }
}
