//! Split command implementation.
//!
//! Breaks a flat OR-chain into filters of at most `chunk_size` conditions.

use criteria_rs::{try_split_into_chunks, Filter};

use super::{CommandContext, Result};
use crate::output::{format_chunks, SplitOutput};

/// Executes the split command.
///
/// A filter that cannot be split is printed unchanged as its only chunk.
pub fn execute(ctx: &CommandContext, expr: &str, chunk_size: Option<u64>) -> Result<()> {
    let filter = ctx.parse(expr)?;
    let chunk_size = chunk_size
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(ctx.settings.chunk_size);

    let (split, chunks) = match try_split_into_chunks(&filter, chunk_size) {
        Some(chunks) => (true, chunks),
        None => (false, vec![filter]),
    };

    if ctx.json_output {
        let output = SplitOutput {
            split,
            chunk_size,
            chunks: chunks.iter().map(Filter::to_string).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !split && !ctx.quiet {
        eprintln!("Filter is not splittable with chunk size {chunk_size}; printing it unchanged.");
    }
    print!("{}", format_chunks(&chunks, ctx.use_colors));

    Ok(())
}
