//! Fmt command implementation.
//!
//! Parses a filter expression and prints its canonical form.

use tracing::debug;

use super::{CommandContext, Result};
use crate::output::{format_filter, FilterOutput};

/// Executes the fmt command.
pub fn execute(ctx: &CommandContext, expr: &str) -> Result<()> {
    let filter = ctx.parse(expr)?;
    debug!(clauses = filter.len(), "parsed expression");

    if ctx.json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&FilterOutput::new(&filter))?
        );
    } else {
        println!("{}", format_filter(&filter, ctx.use_colors));
    }

    Ok(())
}
