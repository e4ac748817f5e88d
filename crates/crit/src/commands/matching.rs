//! Match command implementation.
//!
//! Evaluates a filter against JSON documents read from a file or stdin and
//! prints the documents that match.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use criteria_rs::filter::FilterEvaluator;
use serde_json::Value;
use tracing::debug;

use super::{CommandContext, Result};
use crate::output::{format_match_summary, MatchOutput};

/// Reads the input documents; a top-level array is a list of documents.
fn read_documents(input: Option<&Path>) -> Result<Vec<Value>> {
    let content = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    Ok(match serde_json::from_str(&content)? {
        Value::Array(documents) => documents,
        document => vec![document],
    })
}

/// Executes the match command.
pub fn execute(ctx: &CommandContext, expr: &str, input: Option<&Path>) -> Result<()> {
    let filter = ctx.parse(expr)?;
    let documents = read_documents(input)?;
    debug!(documents = documents.len(), "read input documents");

    let matched = FilterEvaluator::new(&filter).filter_items(&documents)?;

    if ctx.json_output {
        let output = MatchOutput {
            filter: filter.to_string(),
            total: documents.len(),
            matched: matched.len(),
            items: matched,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for document in &matched {
        println!("{}", serde_json::to_string(document)?);
    }
    if !ctx.quiet {
        eprintln!(
            "{}",
            format_match_summary(matched.len(), documents.len(), ctx.use_colors)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_input(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_array_of_documents() {
        let file = write_input(r#"[{"A": 1}, {"A": 2}]"#);
        let documents = read_documents(Some(file.path())).unwrap();
        assert_eq!(documents.len(), 2);
    }

    #[test]
    fn test_read_single_document() {
        let file = write_input(r#"{"A": 1}"#);
        let documents = read_documents(Some(file.path())).unwrap();
        assert_eq!(documents, vec![serde_json::json!({ "A": 1 })]);
    }

    #[test]
    fn test_read_invalid_json() {
        let file = write_input("{not json");
        let err = read_documents(Some(file.path())).unwrap_err();
        assert!(matches!(err, super::super::CommandError::Json(_)));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_documents(Some(Path::new("/nonexistent/docs.json"))).unwrap_err();
        assert!(matches!(err, super::super::CommandError::Io(_)));
    }
}
